use std::sync::Arc;

use tracing::{info, warn};

use parley_crypto::{TokenIssuer, hash_password, verify_dummy, verify_password};
use parley_db::Store;
use parley_types::models::User;

use crate::error::CoreError;
use crate::{new_id, now};

/// Passwords shorter than this are refused at registration and update.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub token: String,
}

pub struct AccountService {
    store: Arc<dyn Store>,
    tokens: TokenIssuer,
}

impl AccountService {
    pub fn new(store: Arc<dyn Store>, tokens: TokenIssuer) -> Self {
        Self { store, tokens }
    }

    /// Create an account with a server-generated id.
    pub async fn register(&self, email: &str, password: &str) -> Result<User, CoreError> {
        let email = email.trim();
        validate_credentials(email, password)?;

        let now = now();
        let user = User {
            id: new_id(),
            email: email.to_string(),
            password_hash: hash_password(password)?,
            created_at: now,
            updated_at: now,
        };

        self.store.create_user(&user).await?;
        info!("Registered user {}", user.id);
        Ok(user)
    }

    /// Verify credentials and issue a bearer token.
    ///
    /// An unknown email and a wrong password produce the same error, and
    /// both pay for one argon2 verification.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, CoreError> {
        let user = match self.store.find_user_by_email(email.trim()).await? {
            Some(user) if verify_password(&user.password_hash, password) => Some(user),
            Some(_) => None,
            None => {
                verify_dummy(password);
                None
            }
        };

        let Some(user) = user else {
            warn!("Rejected login attempt");
            return Err(CoreError::invalid_credentials());
        };

        let token = self.tokens.issue(&user.id)?;
        info!("User {} logged in", user.id);

        Ok(Session {
            user_id: user.id,
            email: user.email,
            token,
        })
    }

    pub async fn get_one(&self, id: &str) -> Result<User, CoreError> {
        Ok(self.store.get_user(id).await?)
    }

    pub async fn get_all(&self) -> Result<Vec<User>, CoreError> {
        Ok(self.store.list_users().await?)
    }

    /// Replace email and password. The password is always re-hashed.
    pub async fn update(&self, id: &str, email: &str, password: &str) -> Result<User, CoreError> {
        let email = email.trim();
        validate_credentials(email, password)?;

        let password_hash = hash_password(password)?;
        let user = self.store.update_user(id, email, &password_hash, now()).await?;
        info!("Updated user {}", id);
        Ok(user)
    }

    pub async fn delete(&self, id: &str) -> Result<(), CoreError> {
        self.store.delete_user(id).await?;
        info!("Deleted user {}", id);
        Ok(())
    }
}

/// `email` must already be trimmed.
fn validate_credentials(email: &str, password: &str) -> Result<(), CoreError> {
    let well_formed = email
        .split_once('@')
        .is_some_and(|(local, domain)| {
            !local.is_empty() && !domain.is_empty() && !email.chars().any(char::is_whitespace)
        });
    if !well_formed {
        return Err(CoreError::Invalid("email must be a valid address".into()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(CoreError::Invalid(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}
