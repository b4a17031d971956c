//! Account and messaging services.
//!
//! Services take a `Store` and, for anything that mutates on behalf of a
//! caller, an already-validated `Subject`. They never look at raw headers.

pub mod accounts;
pub mod error;
pub mod messaging;

use chrono::{DateTime, SubsecRound, Utc};
use uuid::Uuid;

pub use accounts::{AccountService, Session};
pub use error::{CoreError, ErrorKind};
pub use messaging::MessagingService;

/// Current time at the microsecond precision both stores persist.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}
