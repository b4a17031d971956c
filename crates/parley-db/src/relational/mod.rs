//! Relational backend: typed `users` and `messages` tables in SQLite.

pub mod migrations;
pub mod models;
pub mod queries;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use parley_types::models::{Message, User};

use crate::error::StoreError;
use crate::store::Store;
use crate::{Database, StoreConfig, StoreKind};

use self::models::format_timestamp;

pub struct RelationalStore {
    db: Arc<Database>,
    timeout: Duration,
}

impl RelationalStore {
    pub fn open(path: &Path, config: StoreConfig) -> anyhow::Result<Self> {
        let db = Database::open(path, migrations::run)?;
        Ok(Self::from_database(Arc::new(db), config))
    }

    pub fn open_in_memory(config: StoreConfig) -> anyhow::Result<Self> {
        let db = Database::open_in_memory(migrations::run)?;
        Ok(Self::from_database(Arc::new(db), config))
    }

    pub fn from_database(db: Arc<Database>, config: StoreConfig) -> Self {
        Self {
            db,
            timeout: config.timeout,
        }
    }
}

#[async_trait]
impl Store for RelationalStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Relational
    }

    async fn create_user(&self, user: &User) -> Result<(), StoreError> {
        let user = user.clone();
        self.db
            .call("create_user", self.timeout, move |conn| queries::insert_user(conn, &user))
            .await
    }

    async fn get_user(&self, id: &str) -> Result<User, StoreError> {
        let id = id.to_string();
        self.db
            .call("get_user", self.timeout, move |conn| {
                queries::query_user_by_id(conn, &id)?.ok_or_else(|| StoreError::user_not_found(&id))
            })
            .await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let email = email.to_string();
        self.db
            .call("find_user_by_email", self.timeout, move |conn| {
                queries::query_user_by_email(conn, &email)
            })
            .await
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        self.db
            .call("list_users", self.timeout, queries::query_users)
            .await
    }

    async fn update_user(
        &self,
        id: &str,
        email: &str,
        password_hash: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<User, StoreError> {
        let id = id.to_string();
        let email = email.to_string();
        let password_hash = password_hash.to_string();
        let updated_at = format_timestamp(updated_at);
        self.db
            .call("update_user", self.timeout, move |conn| {
                let changed = queries::update_user(conn, &id, &email, &password_hash, &updated_at)?;
                if changed == 0 {
                    return Err(StoreError::user_not_found(&id));
                }
                queries::query_user_by_id(conn, &id)?.ok_or_else(|| StoreError::user_not_found(&id))
            })
            .await
    }

    async fn delete_user(&self, id: &str) -> Result<(), StoreError> {
        let id = id.to_string();
        self.db
            .call("delete_user", self.timeout, move |conn| {
                match queries::delete_user(conn, &id)? {
                    0 => Err(StoreError::user_not_found(&id)),
                    _ => Ok(()),
                }
            })
            .await
    }

    async fn create_message(&self, message: &Message) -> Result<(), StoreError> {
        let message = message.clone();
        self.db
            .call("create_message", self.timeout, move |conn| {
                queries::insert_message(conn, &message)
            })
            .await
    }

    async fn get_message(&self, id: &str) -> Result<Message, StoreError> {
        let id = id.to_string();
        self.db
            .call("get_message", self.timeout, move |conn| {
                queries::query_message_by_id(conn, &id)?
                    .ok_or_else(|| StoreError::message_not_found(&id))
            })
            .await
    }

    async fn list_messages(&self) -> Result<Vec<Message>, StoreError> {
        self.db
            .call("list_messages", self.timeout, queries::query_messages)
            .await
    }

    async fn update_message(
        &self,
        id: &str,
        body: &str,
        owner_id: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Message, StoreError> {
        let id = id.to_string();
        let body = body.to_string();
        let owner_id = owner_id.to_string();
        let updated_at = format_timestamp(updated_at);
        self.db
            .call("update_message", self.timeout, move |conn| {
                let changed = queries::update_message(conn, &id, &body, &owner_id, &updated_at)?;
                if changed == 0 {
                    return Err(StoreError::message_not_found(&id));
                }
                queries::query_message_by_id(conn, &id)?
                    .ok_or_else(|| StoreError::message_not_found(&id))
            })
            .await
    }

    async fn delete_message(&self, id: &str, owner_id: &str) -> Result<(), StoreError> {
        let id = id.to_string();
        let owner_id = owner_id.to_string();
        self.db
            .call("delete_message", self.timeout, move |conn| {
                match queries::delete_message(conn, &id, &owner_id)? {
                    0 => Err(StoreError::message_not_found(&id)),
                    _ => Ok(()),
                }
            })
            .await
    }
}
