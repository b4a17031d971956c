//! Document shapes stored in the `users` and `messages` collections.
//! Timestamps are integer microseconds so collection sorts stay numeric.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use parley_types::models::{Message, User};

#[derive(Debug, Serialize, Deserialize)]
pub struct UserDocument {
    pub id: String,
    pub email: String,
    pub password: String,
    #[serde(with = "chrono::serde::ts_microseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_microseconds")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageDocument {
    pub id: String,
    pub body: String,
    pub owner_id: String,
    #[serde(with = "chrono::serde::ts_microseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_microseconds")]
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserDocument {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            password: user.password_hash.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<UserDocument> for User {
    fn from(doc: UserDocument) -> Self {
        Self {
            id: doc.id,
            email: doc.email,
            password_hash: doc.password,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

impl From<&Message> for MessageDocument {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.clone(),
            body: message.body.clone(),
            owner_id: message.owner_id.clone(),
            created_at: message.created_at,
            updated_at: message.updated_at,
        }
    }
}

impl From<MessageDocument> for Message {
    fn from(doc: MessageDocument) -> Self {
        Self {
            id: doc.id,
            body: doc.body,
            owner_id: doc.owner_id,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}
