//! Document backend: schemaless JSON collections.

pub mod collection;
pub mod models;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;

use parley_types::models::{Message, User};

use crate::error::{StoreError, is_unique_violation};
use crate::store::Store;
use crate::{Database, StoreConfig, StoreKind};

use self::collection::{Collection, MESSAGES, USERS};
use self::models::{MessageDocument, UserDocument};

const SORT_ORDER: [&str; 2] = ["created_at", "id"];

pub struct DocumentStore {
    db: Arc<Database>,
    timeout: Duration,
}

impl DocumentStore {
    pub fn open(path: &Path, config: StoreConfig) -> anyhow::Result<Self> {
        let db = Database::open(path, collection::migrate)?;
        Ok(Self::from_database(Arc::new(db), config))
    }

    pub fn open_in_memory(config: StoreConfig) -> anyhow::Result<Self> {
        let db = Database::open_in_memory(collection::migrate)?;
        Ok(Self::from_database(Arc::new(db), config))
    }

    pub fn from_database(db: Arc<Database>, config: StoreConfig) -> Self {
        Self {
            db,
            timeout: config.timeout,
        }
    }
}

fn map_email_conflict(err: StoreError) -> StoreError {
    match err {
        StoreError::Sqlite(ref e) if is_unique_violation(e) => StoreError::email_taken(),
        other => other,
    }
}

fn timestamp_micros(ts: DateTime<Utc>) -> serde_json::Value {
    json!(ts.timestamp_micros())
}

#[async_trait]
impl Store for DocumentStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Document
    }

    async fn create_user(&self, user: &User) -> Result<(), StoreError> {
        let doc = UserDocument::from(user);
        self.db
            .call("create_user", self.timeout, move |conn| {
                let users = Collection::new(conn, USERS);
                if users.count(&[("email", doc.email.as_str())])? > 0 {
                    return Err(StoreError::email_taken());
                }
                users.insert_one(&doc.id, &doc).map_err(map_email_conflict)
            })
            .await
    }

    async fn get_user(&self, id: &str) -> Result<User, StoreError> {
        let id = id.to_string();
        self.db
            .call("get_user", self.timeout, move |conn| {
                Collection::new(conn, USERS)
                    .find_one::<UserDocument>(&[("id", id.as_str())])?
                    .map(User::from)
                    .ok_or_else(|| StoreError::user_not_found(&id))
            })
            .await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let email = email.to_string();
        self.db
            .call("find_user_by_email", self.timeout, move |conn| {
                let doc = Collection::new(conn, USERS).find_one::<UserDocument>(&[("email", email.as_str())])?;
                Ok(doc.map(User::from))
            })
            .await
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        self.db
            .call("list_users", self.timeout, |conn| {
                let docs = Collection::new(conn, USERS).find_all::<UserDocument>(&SORT_ORDER)?;
                Ok(docs.into_iter().map(User::from).collect())
            })
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
        let set = [
            ("email", json!(email)),
            ("password", json!(password_hash)),
            ("updated_at", timestamp_micros(updated_at)),
        ];
        self.db
            .call("update_user", self.timeout, move |conn| {
                let users = Collection::new(conn, USERS);
                let changed = users
                    .update_one(&[("id", id.as_str())], &set)
                    .map_err(map_email_conflict)?;
                if changed == 0 {
                    return Err(StoreError::user_not_found(&id));
                }
                users
                    .find_one::<UserDocument>(&[("id", id.as_str())])?
                    .map(User::from)
                    .ok_or_else(|| StoreError::user_not_found(&id))
            })
            .await
    }

    async fn delete_user(&self, id: &str) -> Result<(), StoreError> {
        let id = id.to_string();
        self.db
            .call("delete_user", self.timeout, move |conn| {
                match Collection::new(conn, USERS).delete_one(&[("id", id.as_str())])? {
                    0 => Err(StoreError::user_not_found(&id)),
                    _ => Ok(()),
                }
            })
            .await
    }

    async fn create_message(&self, message: &Message) -> Result<(), StoreError> {
        let doc = MessageDocument::from(message);
        self.db
            .call("create_message", self.timeout, move |conn| {
                Collection::new(conn, MESSAGES).insert_one(&doc.id, &doc)
            })
            .await
    }

    async fn get_message(&self, id: &str) -> Result<Message, StoreError> {
        let id = id.to_string();
        self.db
            .call("get_message", self.timeout, move |conn| {
                Collection::new(conn, MESSAGES)
                    .find_one::<MessageDocument>(&[("id", id.as_str())])?
                    .map(Message::from)
                    .ok_or_else(|| StoreError::message_not_found(&id))
            })
            .await
    }

    async fn list_messages(&self) -> Result<Vec<Message>, StoreError> {
        self.db
            .call("list_messages", self.timeout, |conn| {
                let docs = Collection::new(conn, MESSAGES).find_all::<MessageDocument>(&SORT_ORDER)?;
                Ok(docs.into_iter().map(Message::from).collect())
            })
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
        let owner_id = owner_id.to_string();
        let set = [("body", json!(body)), ("updated_at", timestamp_micros(updated_at))];
        self.db
            .call("update_message", self.timeout, move |conn| {
                let messages = Collection::new(conn, MESSAGES);
                let filter = [("id", id.as_str()), ("owner_id", owner_id.as_str())];
                if messages.update_one(&filter, &set)? == 0 {
                    return Err(StoreError::message_not_found(&id));
                }
                messages
                    .find_one::<MessageDocument>(&filter)?
                    .map(Message::from)
                    .ok_or_else(|| StoreError::message_not_found(&id))
            })
            .await
    }

    async fn delete_message(&self, id: &str, owner_id: &str) -> Result<(), StoreError> {
        let id = id.to_string();
        let owner_id = owner_id.to_string();
        self.db
            .call("delete_message", self.timeout, move |conn| {
                let filter = [("id", id.as_str()), ("owner_id", owner_id.as_str())];
                match Collection::new(conn, MESSAGES).delete_one(&filter)? {
                    0 => Err(StoreError::message_not_found(&id)),
                    _ => Ok(()),
                }
            })
            .await
    }
}
