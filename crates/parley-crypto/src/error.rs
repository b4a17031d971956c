use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("authorization header is not a bearer token")]
    MalformedHeader,

    #[error("invalid token: {0}")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),

    #[error("token has expired")]
    Expired,

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("token signing failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

impl AuthError {
    /// True when the caller presented bad credentials, as opposed to a
    /// failure on our side while hashing or signing.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            Self::MissingToken | Self::MalformedHeader | Self::InvalidToken(_) | Self::Expired
        )
    }
}
