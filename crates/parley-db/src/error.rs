use std::time::Duration;

use rusqlite::ffi;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Conflict(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("storage call `{op}` timed out after {after:?}")]
    Timeout { op: &'static str, after: Duration },

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("document encoding error: {0}")]
    Document(#[from] serde_json::Error),

    #[error("{0}")]
    Internal(String),
}

impl StoreError {
    pub(crate) fn email_taken() -> Self {
        Self::Conflict("email is already registered".into())
    }

    pub(crate) fn user_not_found(id: &str) -> Self {
        Self::NotFound(format!("user {}", id))
    }

    pub(crate) fn message_not_found(id: &str) -> Self {
        Self::NotFound(format!("message {}", id))
    }
}

/// True for UNIQUE / PRIMARY KEY violations, whichever index raised them.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => {
            e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        }
        _ => false,
    }
}
