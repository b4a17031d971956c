use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use parley_db::{DEFAULT_TIMEOUT, StoreConfig, StoreKind};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
    "secret",
];

/// Runtime settings read from `PARLEY_*` environment variables.
#[derive(Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub store: StoreKind,
    pub db_path: PathBuf,
    pub store_timeout: Duration,
    pub host: String,
    pub port: u16,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("jwt_secret", &"<redacted>")
            .field("store", &self.store)
            .field("db_path", &self.db_path)
            .field("store_timeout", &self.store_timeout)
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let jwt_secret = var("PARLEY_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("PARLEY_JWT_SECRET is unset or still a placeholder");
        }

        let store: StoreKind = match var("PARLEY_STORE") {
            Some(raw) => raw.parse()?,
            None => StoreKind::Relational,
        };
        let db_path = var("PARLEY_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| store.default_path());
        let store_timeout = match var("PARLEY_STORE_TIMEOUT_MS") {
            Some(raw) => {
                let ms: u64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("invalid PARLEY_STORE_TIMEOUT_MS '{}'", raw))?;
                if ms == 0 {
                    bail!("PARLEY_STORE_TIMEOUT_MS must be greater than zero");
                }
                Duration::from_millis(ms)
            }
            None => DEFAULT_TIMEOUT,
        };
        let host = var("PARLEY_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = var("PARLEY_PORT")
            .unwrap_or_else(|| "5000".into())
            .parse()
            .context("invalid PARLEY_PORT")?;

        Ok(Self {
            jwt_secret,
            store,
            db_path,
            store_timeout,
            host,
            port,
        })
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            timeout: self.store_timeout,
        }
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}
