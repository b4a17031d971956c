use std::sync::LazyLock;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use rand_core::OsRng;

use crate::error::AuthError;

/// Hash a password with Argon2id (default cost) and a fresh random salt.
/// Returns the PHC string, which embeds algorithm, parameters and salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Hashing(e.to_string()))?;
    Ok(hash.to_string())
}

/// Check `candidate` against a stored PHC hash.
///
/// Returns `false` on mismatch and on any hash it cannot parse.
pub fn verify_password(hash: &str, candidate: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(candidate.as_bytes(), &parsed)
        .is_ok()
}

/// Real hash with the default cost, used when there is no stored hash to check.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("parley-unknown-account").ok());

/// Burn one full verification against a throwaway hash.
///
/// Lookups that miss call this so they take as long as a wrong password.
/// The outcome is discarded.
pub fn verify_dummy(candidate: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(hash, candidate);
    }
}
