use async_trait::async_trait;
use chrono::{DateTime, Utc};

use parley_types::models::{Message, User};

use crate::StoreKind;
use crate::error::StoreError;

/// Persistence contract shared by every backend.
///
/// Backends must agree on all externally visible behavior:
/// - `create_user` fails with `Conflict` when the email is taken, and so
///   does `update_user` when moving to an email another user holds.
/// - single-record reads, updates and deletes fail with `NotFound` when
///   nothing matches; list calls return an empty vec instead.
/// - `update_message` / `delete_message` match on id AND owner, so a
///   message owned by someone else is reported exactly like a missing one.
/// - lists are ordered by `created_at`, then `id`.
#[async_trait]
pub trait Store: Send + Sync {
    fn kind(&self) -> StoreKind;

    // -- Users --

    async fn create_user(&self, user: &User) -> Result<(), StoreError>;

    async fn get_user(&self, id: &str) -> Result<User, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    /// Replace email and password hash, returning the stored record.
    async fn update_user(
        &self,
        id: &str,
        email: &str,
        password_hash: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<User, StoreError>;

    async fn delete_user(&self, id: &str) -> Result<(), StoreError>;

    // -- Messages --

    async fn create_message(&self, message: &Message) -> Result<(), StoreError>;

    async fn get_message(&self, id: &str) -> Result<Message, StoreError>;

    async fn list_messages(&self) -> Result<Vec<Message>, StoreError>;

    async fn update_message(
        &self,
        id: &str,
        body: &str,
        owner_id: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Message, StoreError>;

    async fn delete_message(&self, id: &str, owner_id: &str) -> Result<(), StoreError>;
}
