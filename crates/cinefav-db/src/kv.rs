//! Versioned string key-value store.
//!
//! Every key carries a version tag that starts at 1 and is bumped on each
//! write. Writers pass the version they read to `compare_and_set`, so a
//! write that raced with another one is reported instead of silently
//! overwriting it.
#![allow(clippy::future_not_send)]

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use tokio::sync::Mutex;

use super::connection::open_db;

/// A stored value with its version tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedValue {
    /// Raw string value.
    pub value: String,
    /// Version tag (1 after the first write).
    pub version: u64,
}

/// Result of a conditional write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasOutcome {
    /// The value was written and now carries `version`.
    Written {
        /// New version tag.
        version: u64,
    },
    /// The stored version did not match; nothing was written.
    Conflict {
        /// Version currently stored (`None` if the key is absent).
        current: Option<u64>,
    },
}

/// Async key-value store trait.
///
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(KvStore: Send)]
pub trait LocalKvStore {
    /// Reads the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be read.
    async fn get(&self, key: &str) -> Result<Option<VersionedValue>>;

    /// Writes `value` under `key` if the stored version equals `expected`.
    ///
    /// `expected = None` requires the key to be absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be written.
    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<u64>,
        value: &str,
    ) -> Result<CasOutcome>;
}

// --- SQLite ---

/// Key-value store backed by the `kv` table.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct SqliteKvStore {
    /// Database connection.
    conn: Mutex<Connection>,
}

impl SqliteKvStore {
    /// Wraps an already migrated connection.
    #[must_use]
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Opens the database in `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(data_dir: &Path) -> Result<Self> {
        let conn = open_db(data_dir)?;
        Ok(Self::new(conn))
    }
}

impl LocalKvStore for SqliteKvStore {
    async fn get(&self, key: &str) -> Result<Option<VersionedValue>> {
        let conn = self.conn.lock().await;
        conn.query_row(
            "SELECT value, version FROM kv WHERE key = ?1",
            [key],
            |row| {
                Ok(VersionedValue {
                    value: row.get(0)?,
                    version: row.get(1)?,
                })
            },
        )
        .optional()
        .with_context(|| format!("failed to read key {key}"))
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<u64>,
        value: &str,
    ) -> Result<CasOutcome> {
        let conn = self.conn.lock().await;

        let changed = match expected {
            None => conn
                .execute(
                    "INSERT INTO kv (key, value, version) VALUES (?1, ?2, 1)
                     ON CONFLICT(key) DO NOTHING",
                    rusqlite::params![key, value],
                )
                .with_context(|| format!("failed to insert key {key}"))?,
            Some(version) => conn
                .execute(
                    "UPDATE kv SET value = ?2, version = version + 1, updated_at = datetime('now')
                     WHERE key = ?1 AND version = ?3",
                    rusqlite::params![key, value, version],
                )
                .with_context(|| format!("failed to update key {key}"))?,
        };

        if changed == 1 {
            return Ok(CasOutcome::Written {
                version: expected.map_or(1, |v| v.saturating_add(1)),
            });
        }

        let current: Option<u64> = conn
            .query_row("SELECT version FROM kv WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()
            .with_context(|| format!("failed to read version of key {key}"))?;
        Ok(CasOutcome::Conflict { current })
    }
}

// --- Memory ---

/// Process-local key-value store with the same versioning rules.
///
/// Nothing survives the process; useful for tests and throwaway sessions.
#[derive(Debug, Default)]
#[allow(clippy::module_name_repetitions)]
pub struct MemoryKvStore {
    /// Stored entries.
    entries: Mutex<HashMap<String, VersionedValue>>,
}

impl MemoryKvStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalKvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<VersionedValue>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<u64>,
        value: &str,
    ) -> Result<CasOutcome> {
        let mut entries = self.entries.lock().await;
        let current = entries.get(key).map(|entry| entry.version);
        if current != expected {
            return Ok(CasOutcome::Conflict { current });
        }

        let version = current.map_or(1, |v| v.saturating_add(1));
        entries.insert(
            String::from(key),
            VersionedValue {
                value: String::from(value),
                version,
            },
        );
        Ok(CasOutcome::Written { version })
    }
}
