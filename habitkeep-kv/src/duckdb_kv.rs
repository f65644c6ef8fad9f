//! DuckDB-backed persistent key-value store.
//!
//! Single `kv_entries` table: key, ciphertext value, optional expiry.
//! Expired rows are filtered on read and reclaimed by `purge_expired`.

use crate::error::{KvError, KvResult};
use crate::store::{Consistency, KvStore, SetOptions};
use async_trait::async_trait;
use chrono::Utc;
use duckdb::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Persistent key-value store backed by DuckDB.
#[derive(Clone)]
pub struct DuckDbKv {
    conn: Arc<Mutex<Connection>>,
}

impl DuckDbKv {
    /// Opens (or creates) a store at the given path.
    pub fn open(path: &Path) -> KvResult<Self> {
        let conn = Connection::open(path).map_err(|e| KvError::Backend(e.to_string()))?;
        // Cap memory/threads — DuckDB defaults to ~80% RAM per connection
        conn.execute_batch("PRAGMA memory_limit='64MB'; PRAGMA threads=1;")?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Opens an in-memory store (for testing).
    pub fn open_in_memory() -> KvResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| KvError::Backend(e.to_string()))?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock_conn(&self) -> KvResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| KvError::Backend(e.to_string()))
    }

    /// Deletes every expired row. Returns the number removed.
    pub fn purge_expired(&self) -> KvResult<usize> {
        let conn = self.lock_conn()?;
        let removed = conn.execute(
            "DELETE FROM kv_entries WHERE expires_at IS NOT NULL AND expires_at <= ?",
            params![Utc::now().timestamp_millis()],
        )?;
        Ok(removed)
    }
}

fn initialize_schema(conn: &Connection) -> KvResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS kv_entries (
            key VARCHAR PRIMARY KEY,
            value BLOB NOT NULL,
            expires_at BIGINT
        );
        "#,
    )?;
    Ok(())
}

/// Escapes LIKE wildcards so a key prefix matches literally.
/// Key paths contain `_` (e.g. `user/public_...`), which LIKE treats
/// as a single-character wildcard.
fn escape_like(prefix: &str) -> String {
    let mut out = String::with_capacity(prefix.len());
    for c in prefix.chars() {
        if c == '\\' || c == '%' || c == '_' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[async_trait]
impl KvStore for DuckDbKv {
    async fn get_with(&self, key: &str, _consistency: Consistency) -> KvResult<Option<Vec<u8>>> {
        let conn = self.lock_conn()?;
        let result = conn.query_row(
            "SELECT value, expires_at FROM kv_entries WHERE key = ?",
            params![key],
            |row| {
                Ok((
                    row.get::<_, Vec<u8>>(0)?,
                    row.get::<_, Option<i64>>(1)?,
                ))
            },
        );
        match result {
            Ok((value, expires_at)) => {
                let now = Utc::now().timestamp_millis();
                if expires_at.is_some_and(|at| now >= at) {
                    return Ok(None);
                }
                Ok(Some(value))
            }
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>, opts: SetOptions) -> KvResult<()> {
        let expires_at = opts
            .ttl
            .map(|ttl| Utc::now().timestamp_millis() + ttl.as_millis() as i64);
        let conn = self.lock_conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO kv_entries (key, value, expires_at) VALUES (?, ?, ?)",
            params![key, value, expires_at],
        )?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> KvResult<()> {
        let conn = self.lock_conn()?;
        conn.execute("DELETE FROM kv_entries WHERE key = ?", params![key])?;
        Ok(())
    }

    async fn list_by_prefix(&self, prefix: &str) -> KvResult<Vec<(String, Vec<u8>)>> {
        let pattern = format!("{}%", escape_like(prefix));
        let now = Utc::now().timestamp_millis();
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT key, value FROM kv_entries \
             WHERE key LIKE ? ESCAPE '\\' \
               AND (expires_at IS NULL OR expires_at > ?) \
             ORDER BY key",
        )?;
        let rows: Vec<(String, Vec<u8>)> = stmt
            .query_map(params![pattern, now], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, Vec<u8>>(1)?))
            })?
            .filter_map(|r| r.ok())
            .collect();
        Ok(rows)
    }
}
