//! SqliteKv: the persistent key-value store behind the mirror and queue.
//!
//! One `kv` table of JSON string values. All access goes through a single
//! locked connection; consumers perform whole-document read-modify-write,
//! so one lock acquisition per operation is the only transaction needed.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;

use pantry_core::errors::{PantryResult, StoreError};
use pantry_core::traits::KeyValueStore;

/// SQLite-backed [`KeyValueStore`].
pub struct SqliteKv {
    conn: Mutex<Connection>,
}

impl SqliteKv {
    /// Open (creating if needed) a store backed by a file on disk.
    pub fn open(path: &Path) -> PantryResult<Self> {
        let conn = Connection::open(path).map_err(sqlite_err)?;
        let kv = Self {
            conn: Mutex::new(conn),
        };
        kv.initialize()?;
        Ok(kv)
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> PantryResult<Self> {
        let conn = Connection::open_in_memory().map_err(sqlite_err)?;
        let kv = Self {
            conn: Mutex::new(conn),
        };
        kv.initialize()?;
        Ok(kv)
    }

    fn initialize(&self) -> PantryResult<()> {
        self.with_conn(|conn| {
            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );",
            )
            .map_err(sqlite_err)?;
            Ok(())
        })
    }

    fn with_conn<F, T>(&self, f: F) -> PantryResult<T>
    where
        F: FnOnce(&Connection) -> PantryResult<T>,
    {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        f(&conn)
    }
}

impl KeyValueStore for SqliteKv {
    fn get(&self, key: &str) -> PantryResult<Option<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare_cached("SELECT value FROM kv WHERE key = ?1")
                .map_err(sqlite_err)?;
            let mut rows = stmt.query([key]).map_err(sqlite_err)?;
            match rows.next().map_err(sqlite_err)? {
                Some(row) => Ok(Some(row.get(0).map_err(sqlite_err)?)),
                None => Ok(None),
            }
        })
    }

    fn set(&self, key: &str, value: &str) -> PantryResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                [key, value],
            )
            .map_err(sqlite_err)?;
            Ok(())
        })
    }

    fn remove(&self, key: &str) -> PantryResult<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM kv WHERE key = ?1", [key])
                .map_err(sqlite_err)?;
            Ok(())
        })
    }

    fn multi_remove(&self, keys: &[&str]) -> PantryResult<()> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare_cached("DELETE FROM kv WHERE key = ?1")
                .map_err(sqlite_err)?;
            for key in keys {
                stmt.execute([key]).map_err(sqlite_err)?;
            }
            Ok(())
        })
    }
}

fn sqlite_err(e: rusqlite::Error) -> StoreError {
    StoreError::Sqlite {
        message: e.to_string(),
    }
}
