//! Credential handling for Parley.
//!
//! - `password`: salted Argon2id hashing and verification of account passwords.
//! - `token`: HMAC-signed bearer tokens carrying a user id as subject.
//!
//! Both halves are pure CPU work. Nothing here touches storage.

pub mod error;
pub mod password;
pub mod token;

pub use error::AuthError;
pub use password::{hash_password, verify_dummy, verify_password};
pub use token::{Subject, TokenIssuer};
