//! Row types for the relational tables. Timestamps are RFC 3339 text with
//! fixed microsecond precision, so lexical order matches time order.

use chrono::{DateTime, SecondsFormat, Utc};

use parley_types::models::{Message, User};

use crate::error::StoreError;

pub struct UserRow {
    pub id: String,
    pub email: String,
    pub password: String,
    pub created_at: String,
    pub updated_at: String,
}

pub struct MessageRow {
    pub id: String,
    pub body: String,
    pub user_id: String,
    pub created_at: String,
    pub updated_at: String,
}

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str, column: &str, id: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| StoreError::Internal(format!("corrupt {} '{}' on row '{}': {}", column, raw, id, e)))
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let created_at = parse_timestamp(&row.created_at, "created_at", &row.id)?;
        let updated_at = parse_timestamp(&row.updated_at, "updated_at", &row.id)?;
        Ok(User {
            id: row.id,
            email: row.email,
            password_hash: row.password,
            created_at,
            updated_at,
        })
    }
}

impl TryFrom<MessageRow> for Message {
    type Error = StoreError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        let created_at = parse_timestamp(&row.created_at, "created_at", &row.id)?;
        let updated_at = parse_timestamp(&row.updated_at, "updated_at", &row.id)?;
        Ok(Message {
            id: row.id,
            body: row.body,
            owner_id: row.user_id,
            created_at,
            updated_at,
        })
    }
}
