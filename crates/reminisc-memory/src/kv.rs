//! Key-value blob storage.
//!
//! Every collection is stored as a single JSON blob under a well-known key.
//! There is no schema versioning: new fields must be optional to stay
//! readable by older data.
//!
//! # Storage layout
//!
//! [`SqliteKv`] keeps a single table `kv` (created if it does not already
//! exist):
//!
//! | column | type | description                 |
//! |--------|------|-----------------------------|
//! | key    | TEXT | primary key                 |
//! | value  | BLOB | encoded collection          |
//!
//! # Example
//!
//! ```rust
//! use reminisc_memory::kv::{KeyValueStore, SqliteKv, load_json, save_json};
//!
//! let mut kv = SqliteKv::open_in_memory().unwrap();
//! save_json(&mut kv, "numbers", &vec![1, 2, 3]).unwrap();
//! let back: Option<Vec<i32>> = load_json(&kv, "numbers").unwrap();
//! assert_eq!(back, Some(vec![1, 2, 3]));
//! ```

use std::collections::HashMap;
use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

// ─────────────────────────────────────────────────────────────────────────────
// Error type
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can arise while persisting or loading collections and media.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("JSON codec error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ─────────────────────────────────────────────────────────────────────────────
// KeyValueStore
// ─────────────────────────────────────────────────────────────────────────────

/// Simple keyed blob storage.
pub trait KeyValueStore: Send {
    /// Fetch the blob stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Store `value` under `key`, replacing any previous blob.
    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Delete `key`. Deleting a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// Decode the JSON blob under `key`. Returns `Ok(None)` when the key is
/// absent.
pub fn load_json<T, K>(kv: &K, key: &str) -> Result<Option<T>, StoreError>
where
    T: DeserializeOwned,
    K: KeyValueStore + ?Sized,
{
    match kv.get(key)? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

/// Encode `value` as JSON and store it under `key`.
pub fn save_json<T, K>(kv: &mut K, key: &str, value: &T) -> Result<(), StoreError>
where
    T: Serialize + ?Sized,
    K: KeyValueStore + ?Sized,
{
    let bytes = serde_json::to_vec(value)?;
    kv.set(key, &bytes)
}

// ─────────────────────────────────────────────────────────────────────────────
// SqliteKv
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite-backed [`KeyValueStore`].
pub struct SqliteKv {
    conn: Connection,
}

impl SqliteKv {
    /// Open (or create) a persistent SQLite database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Open a temporary in-memory database (useful for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT NOT NULL PRIMARY KEY,
                value BLOB NOT NULL
            );",
        )?;
        Ok(())
    }
}

impl KeyValueStore for SqliteKv {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, Vec<u8>>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MemoryKv
// ─────────────────────────────────────────────────────────────────────────────

/// Process-local [`KeyValueStore`]; nothing survives the value.
#[derive(Debug, Default, Clone)]
pub struct MemoryKv {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
