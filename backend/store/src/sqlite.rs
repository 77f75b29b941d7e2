//! SQLite-backed durable key-value store.
//!
//! Stands in for browser profile storage when running outside a browser:
//! values survive restarts and live in a single `kv` table.

use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info};

use readerstats_core::{KeyValueStore, StatsError, StatsResult};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS kv (
                          key        TEXT PRIMARY KEY,
                          value      TEXT NOT NULL,
                          updated_at INTEGER NOT NULL
                      );";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Create or open a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create storage directory: {}", parent.display())
                })?;
            }
        }

        let conn = Connection::open(path.as_ref())
            .context("Failed to open SQLite key-value database")?;
        conn.execute_batch(&format!("PRAGMA journal_mode=WAL; {SCHEMA}"))
            .context("Failed to initialize kv schema")?;

        info!("SqliteStore opened at {:?}", path.as_ref());
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Open an in-memory database (for tests).
    pub fn in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> StatsResult<T> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StatsError::Storage("sqlite connection lock poisoned".into()))?;
        f(&conn).map_err(|e| StatsError::Storage(e.to_string()))
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> StatsResult<Option<String>> {
        self.with_conn(|conn| {
            conn.query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()
        })
    }

    fn set(&self, key: &str, value: &str) -> StatsResult<()> {
        let now = chrono::Utc::now().timestamp_millis();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)",
                params![key, value, now],
            )
        })?;
        debug!(key, "kv set");
        Ok(())
    }

    fn remove(&self, key: &str) -> StatsResult<()> {
        self.with_conn(|conn| conn.execute("DELETE FROM kv WHERE key = ?1", params![key]))?;
        Ok(())
    }
}
