//! A minimal document collection on top of SQLite's JSON functions.
//!
//! Every document lives in the shared `documents` table, keyed by
//! `(collection, id)`, with its fields stored as a JSON object in `body`.
//! Queries filter on top-level fields by exact string match.

use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, ToSql};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::info;

use crate::error::StoreError;

pub const USERS: &str = "users";
pub const MESSAGES: &str = "messages";

/// Exact-match conditions on top-level document fields.
pub type Filter<'a> = [(&'static str, &'a str)];

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS documents (
            collection  TEXT NOT NULL,
            id          TEXT NOT NULL,
            body        TEXT NOT NULL CHECK (json_valid(body)),
            PRIMARY KEY (collection, id)
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email
            ON documents (json_extract(body, '$.email'))
            WHERE collection = 'users';

        CREATE INDEX IF NOT EXISTS idx_messages_owner
            ON documents (json_extract(body, '$.owner_id'))
            WHERE collection = 'messages';
        ",
    )?;

    info!("Document store collections ready");
    Ok(())
}

pub struct Collection<'c> {
    conn: &'c Connection,
    name: &'static str,
}

impl<'c> Collection<'c> {
    pub fn new(conn: &'c Connection, name: &'static str) -> Self {
        Self { conn, name }
    }

    pub fn insert_one<D: Serialize>(&self, id: &str, doc: &D) -> Result<(), StoreError> {
        let body = serde_json::to_string(doc)?;
        self.conn.execute(
            "INSERT INTO documents (collection, id, body) VALUES (?1, ?2, ?3)",
            (self.name, id, &body),
        )?;
        Ok(())
    }

    pub fn count(&self, filter: &Filter<'_>) -> Result<u64, StoreError> {
        let (clause, params) = self.where_clause(filter);
        let sql = format!("SELECT COUNT(*) FROM documents WHERE {}", clause);
        let count: i64 = self
            .conn
            .query_row(&sql, params_ref(&params).as_slice(), |r| r.get(0))?;
        Ok(count as u64)
    }

    pub fn find_one<D: DeserializeOwned>(&self, filter: &Filter<'_>) -> Result<Option<D>, StoreError> {
        let (clause, params) = self.where_clause(filter);
        let sql = format!("SELECT body FROM documents WHERE {} LIMIT 1", clause);
        let body: Option<String> = self
            .conn
            .query_row(&sql, params_ref(&params).as_slice(), |r| r.get(0))
            .optional()?;

        Ok(body.map(|b| serde_json::from_str(&b)).transpose()?)
    }

    /// All documents in the collection, ordered by the given fields.
    pub fn find_all<D: DeserializeOwned>(&self, sort: &[&'static str]) -> Result<Vec<D>, StoreError> {
        let order = sort
            .iter()
            .map(|field| format!("json_extract(body, '$.{}')", field))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = if order.is_empty() {
            "SELECT body FROM documents WHERE collection = ?1".to_string()
        } else {
            format!("SELECT body FROM documents WHERE collection = ?1 ORDER BY {}", order)
        };

        let mut stmt = self.conn.prepare(&sql)?;
        let bodies = stmt
            .query_map([self.name], |r| r.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        bodies
            .iter()
            .map(|b| serde_json::from_str(b).map_err(StoreError::from))
            .collect()
    }

    /// Set top-level fields on the first document matching `filter`.
    /// Returns the number of documents changed.
    pub fn update_one(
        &self,
        filter: &Filter<'_>,
        set: &[(&'static str, Value)],
    ) -> Result<usize, StoreError> {
        if set.is_empty() {
            return Ok(0);
        }

        let (clause, mut params) = self.where_clause(filter);
        let offset = params.len();
        let assignments = set
            .iter()
            .enumerate()
            .map(|(i, (field, _))| format!("'$.{}', json(?{})", field, offset + i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        params.extend(set.iter().map(|(_, value)| value.to_string()));

        let sql = format!(
            "UPDATE documents SET body = json_set(body, {}) WHERE rowid = (SELECT rowid FROM documents WHERE {} LIMIT 1)",
            assignments, clause
        );
        Ok(self.conn.execute(&sql, params_ref(&params).as_slice())?)
    }

    /// Remove the first document matching `filter`. Returns the number removed.
    pub fn delete_one(&self, filter: &Filter<'_>) -> Result<usize, StoreError> {
        let (clause, params) = self.where_clause(filter);
        let sql = format!(
            "DELETE FROM documents WHERE rowid = (SELECT rowid FROM documents WHERE {} LIMIT 1)",
            clause
        );
        Ok(self.conn.execute(&sql, params_ref(&params).as_slice())?)
    }

    // Field names are compile-time constants; only values are bound.
    fn where_clause(&self, filter: &Filter<'_>) -> (String, Vec<String>) {
        let mut clause = String::from("collection = ?1");
        let mut params = vec![self.name.to_string()];
        for (field, value) in filter {
            params.push((*value).to_string());
            clause.push_str(&format!(" AND json_extract(body, '$.{}') = ?{}", field, params.len()));
        }
        (clause, params)
    }
}

fn params_ref(params: &[String]) -> Vec<&dyn ToSql> {
    params.iter().map(|p| p as &dyn ToSql).collect()
}
