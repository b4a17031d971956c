use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::debug;

use parley_types::api::Claims;

use crate::error::AuthError;

/// Scheme prefix stripped from the `Authorization` header value.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Tokens are valid for one hour from issuance.
pub const TOKEN_TTL_SECS: i64 = 3600;

/// Only the symmetric HMAC family is accepted when validating.
const ALLOWED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// A user id recovered from a token that passed validation.
///
/// Only `TokenIssuer::validate*` can produce one, so anything holding a
/// `Subject` has gone through signature and expiry checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subject(String);

impl Subject {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Signs and validates bearer tokens with a shared HMAC secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer").finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issue a token for `subject`, valid from now for `TOKEN_TTL_SECS`.
    pub fn issue(&self, subject: &str) -> Result<String, AuthError> {
        self.issue_at(subject, Utc::now())
    }

    pub fn issue_at(&self, subject: &str, now: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(TOKEN_TTL_SECS)).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(AuthError::Signing)
    }

    /// Validate a raw `Authorization` header value against the current time.
    pub fn validate(&self, header_value: &str) -> Result<Subject, AuthError> {
        self.validate_at(header_value, Utc::now())
    }

    pub fn validate_at(&self, header_value: &str, now: DateTime<Utc>) -> Result<Subject, AuthError> {
        if header_value.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let token = header_value
            .strip_prefix(BEARER_PREFIX)
            .ok_or(AuthError::MalformedHeader)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = ALLOWED_ALGORITHMS.to_vec();
        // Expiry is compared against `now` below, with no leeway.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            debug!("Token rejected: {}", e);
            AuthError::InvalidToken(e)
        })?;

        // Expiry is exclusive: a token whose exp equals now is already dead.
        if data.claims.exp <= now.timestamp() {
            return Err(AuthError::Expired);
        }

        Ok(Subject(data.claims.sub))
    }
}

#[cfg(test)]
mod tests {
    use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
    use serde_json::json;

    use super::*;

    const SECRET: &str = "test-secret-with-enough-entropy";

    fn bearer(token: &str) -> String {
        format!("{BEARER_PREFIX}{token}")
    }

    #[test]
    fn issue_then_validate_returns_subject() {
        let issuer = TokenIssuer::new(SECRET);
        let token = issuer.issue("user-42").unwrap();

        let subject = issuer.validate(&bearer(&token)).unwrap();
        assert_eq!(subject.as_str(), "user-42");
    }

    #[test]
    fn expired_token_is_rejected() {
        let issuer = TokenIssuer::new(SECRET);
        let two_hours_ago = Utc::now() - Duration::hours(2);
        let token = issuer.issue_at("user-42", two_hours_ago).unwrap();

        let err = issuer.validate(&bearer(&token)).unwrap_err();
        assert!(matches!(err, AuthError::Expired));
        assert!(err.is_unauthenticated());
    }

    #[test]
    fn expiry_instant_is_exclusive() {
        let issuer = TokenIssuer::new(SECRET);
        let issued = Utc::now();
        let token = issuer.issue_at("user-42", issued).unwrap();

        let just_before = issued + Duration::seconds(TOKEN_TTL_SECS - 1);
        assert!(issuer.validate_at(&bearer(&token), just_before).is_ok());

        let at_expiry = issued + Duration::seconds(TOKEN_TTL_SECS);
        assert!(matches!(
            issuer.validate_at(&bearer(&token), at_expiry),
            Err(AuthError::Expired)
        ));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = TokenIssuer::new(SECRET).issue("user-42").unwrap();
        let other = TokenIssuer::new("a-different-secret");

        let err = other.validate(&bearer(&token)).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
    }

    #[test]
    fn empty_header_is_missing_token() {
        let issuer = TokenIssuer::new(SECRET);
        assert!(matches!(issuer.validate(""), Err(AuthError::MissingToken)));
    }

    #[test]
    fn non_bearer_scheme_is_rejected() {
        let issuer = TokenIssuer::new(SECRET);
        let token = issuer.issue("user-42").unwrap();

        assert!(matches!(
            issuer.validate(&format!("Basic {token}")),
            Err(AuthError::MalformedHeader)
        ));
        assert!(matches!(issuer.validate("Bear"), Err(AuthError::MalformedHeader)));
    }

    #[test]
    fn garbage_token_is_rejected() {
        let issuer = TokenIssuer::new(SECRET);
        let err = issuer.validate("Bearer not.a.jwt").unwrap_err();
        assert!(err.is_unauthenticated());
    }

    #[test]
    fn other_hmac_variants_are_accepted() {
        let claims = Claims {
            sub: "user-42".into(),
            iat: Utc::now().timestamp(),
            exp: (Utc::now() + Duration::minutes(5)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let subject = TokenIssuer::new(SECRET).validate(&bearer(&token)).unwrap();
        assert_eq!(subject.to_string(), "user-42");
    }

    fn segment(json: &str) -> String {
        URL_SAFE_NO_PAD.encode(json.as_bytes())
    }

    fn live_payload() -> String {
        let exp = (Utc::now() + Duration::minutes(5)).timestamp();
        segment(&format!(r#"{{"sub":"user-42","iat":0,"exp":{exp}}}"#))
    }

    #[test]
    fn unsigned_token_is_rejected() {
        let token = format!("{}.{}.", segment(r#"{"alg":"none","typ":"JWT"}"#), live_payload());

        let err = TokenIssuer::new(SECRET).validate(&bearer(&token)).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
        assert!(err.is_unauthenticated());
    }

    #[test]
    fn asymmetric_algorithms_are_rejected() {
        let signature = URL_SAFE_NO_PAD.encode([7u8; 64]);
        for alg in ["RS256", "ES256", "PS256", "EdDSA"] {
            let header = segment(&format!(r#"{{"alg":"{alg}","typ":"JWT"}}"#));
            let token = format!("{}.{}.{}", header, live_payload(), signature);

            let err = TokenIssuer::new(SECRET).validate(&bearer(&token)).unwrap_err();
            assert!(matches!(err, AuthError::InvalidToken(_)), "{alg} accepted");
            assert!(err.is_unauthenticated());
        }
    }

    #[test]
    fn token_without_expiry_is_rejected() {
        let claims = json!({ "sub": "user-42", "iat": Utc::now().timestamp() });
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let err = TokenIssuer::new(SECRET).validate(&bearer(&token)).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
    }

    #[test]
    fn scheme_without_token_is_rejected() {
        let issuer = TokenIssuer::new(SECRET);
        assert!(matches!(issuer.validate("Bearer "), Err(AuthError::InvalidToken(_))));
        assert!(matches!(issuer.validate("bearer x"), Err(AuthError::MalformedHeader)));
    }

    #[test]
    fn debug_output_hides_keys() {
        let debug = format!("{:?}", TokenIssuer::new(SECRET));
        assert!(!debug.contains(SECRET));
    }
}
