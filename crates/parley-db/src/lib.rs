//! Storage for Parley users and messages.
//!
//! `Store` is the port every backend implements. Two backends ship:
//! `RelationalStore` (typed SQL tables) and `DocumentStore` (schemaless JSON
//! collections). Which one runs is decided once at startup via `StoreKind`.

pub mod document;
pub mod error;
pub mod relational;
pub mod store;

#[cfg(test)]
mod conformance;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use rusqlite::Connection;
use tracing::{debug, error, info, warn};

pub use document::DocumentStore;
pub use error::StoreError;
pub use relational::RelationalStore;
pub use store::Store;

/// Default per-call deadline for storage operations.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy)]
pub struct StoreConfig {
    /// Deadline applied to every individual storage call.
    pub timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Relational,
    Document,
}

impl StoreKind {
    pub fn default_path(self) -> PathBuf {
        match self {
            Self::Relational => PathBuf::from("parley.db"),
            Self::Document => PathBuf::from("parley-docs.db"),
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Relational => f.write_str("relational"),
            Self::Document => f.write_str("document"),
        }
    }
}

impl FromStr for StoreKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relational" | "sql" | "sqlite" => Ok(Self::Relational),
            "document" | "doc" | "docs" => Ok(Self::Document),
            other => Err(anyhow::anyhow!(
                "unknown store kind '{}' (expected 'relational' or 'document')",
                other
            )),
        }
    }
}

/// Open the backend selected by `kind` at `path`.
pub fn open_store(kind: StoreKind, path: &Path, config: StoreConfig) -> Result<Arc<dyn Store>> {
    let store: Arc<dyn Store> = match kind {
        StoreKind::Relational => Arc::new(RelationalStore::open(path, config)?),
        StoreKind::Document => Arc::new(DocumentStore::open(path, config)?),
    };
    info!(
        "Using {} store at {} (per-call timeout {:?})",
        store.kind(),
        path.display(),
        config.timeout
    );
    Ok(store)
}

/// A single SQLite connection guarded by a mutex. Both backends sit on one.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path, migrate: fn(&Connection) -> Result<()>) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;

        migrate(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory(migrate: fn(&Connection) -> Result<()>) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StoreError::Internal(format!("DB lock poisoned: {}", e)))?;
        f(&conn)
    }

    /// Run `f` on the blocking pool, giving up after `timeout`.
    ///
    /// A call that times out keeps running to completion on its worker
    /// thread; only the caller stops waiting for it.
    pub(crate) async fn call<F, T>(
        self: &Arc<Self>,
        op: &'static str,
        timeout: Duration,
        f: F,
    ) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        debug!("store call: {}", op);
        let db = Arc::clone(self);
        let task = tokio::task::spawn_blocking(move || db.with_conn(f));

        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                error!("spawn_blocking join error in {}: {}", op, e);
                Err(StoreError::Internal(format!("{}: storage worker failed", op)))
            }
            Err(_) => {
                warn!("store call {} exceeded {:?}", op, timeout);
                Err(StoreError::Timeout { op, after: timeout })
            }
        }
    }
}
