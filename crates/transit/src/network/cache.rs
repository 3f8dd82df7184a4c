//! [`DatasetCache`] implementations.

use std::collections::HashMap;
use std::future;
use std::path::Path;

use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension};

use crate::models::types::Result;
use crate::network::traits::{BoxFuture, DatasetCache};

/// SQLite file with a single `kv` table.
///
/// Calls run synchronously on the calling task; the table holds one row per
/// key and reads are a single indexed lookup.
pub struct SqliteCache {
    conn: Mutex<Connection>,
}

impl SqliteCache {
    /// Open (or create) the cache database at `path` and initialise the schema.
    pub fn open(path: &Path) -> Result<Self> {
        Self::init(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                 key   TEXT PRIMARY KEY NOT NULL,
                 value BLOB NOT NULL
             );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let conn = self.conn.lock();
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn write(&self, key: &str, data: &[u8]) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            rusqlite::params![key, data],
        )?;
        Ok(())
    }
}

impl DatasetCache for SqliteCache {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<Vec<u8>>>> {
        Box::pin(future::ready(self.read(key)))
    }

    fn set<'a>(&'a self, key: &'a str, data: &'a [u8]) -> BoxFuture<'a, Result<()>> {
        Box::pin(future::ready(self.write(key, data)))
    }
}

/// Process-local cache; contents are lost on exit.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DatasetCache for MemoryCache {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<Vec<u8>>>> {
        let value = self.entries.lock().get(key).cloned();
        Box::pin(future::ready(Ok(value)))
    }

    fn set<'a>(&'a self, key: &'a str, data: &'a [u8]) -> BoxFuture<'a, Result<()>> {
        self.entries.lock().insert(key.to_string(), data.to_vec());
        Box::pin(future::ready(Ok(())))
    }
}

/// Never stores anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCache;

impl DatasetCache for NoCache {
    fn get<'a>(&'a self, _key: &'a str) -> BoxFuture<'a, Result<Option<Vec<u8>>>> {
        Box::pin(future::ready(Ok(None)))
    }

    fn set<'a>(&'a self, _key: &'a str, _data: &'a [u8]) -> BoxFuture<'a, Result<()>> {
        Box::pin(future::ready(Ok(())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sqlite_cache_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.db");

        let cache = SqliteCache::open(&path).unwrap();
        assert_eq!(cache.get("dataset").await.unwrap(), None);

        cache.set("dataset", b"first").await.unwrap();
        cache.set("dataset", b"second").await.unwrap();
        assert_eq!(cache.get("dataset").await.unwrap(), Some(b"second".to_vec()));

        // Survives reopening.
        drop(cache);
        let reopened = SqliteCache::open(&path).unwrap();
        assert_eq!(reopened.get("dataset").await.unwrap(), Some(b"second".to_vec()));
    }

    #[tokio::test]
    async fn test_sqlite_cache_keys_are_independent() {
        let cache = SqliteCache::in_memory().unwrap();
        cache.set("a", b"one").await.unwrap();
        cache.set("b", b"two").await.unwrap();
        assert_eq!(cache.get("a").await.unwrap(), Some(b"one".to_vec()));
        assert_eq!(cache.get("b").await.unwrap(), Some(b"two".to_vec()));
        assert_eq!(cache.get("c").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_cache() {
        let cache = MemoryCache::new();
        assert!(cache.is_empty());
        cache.set("k", b"v").await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some(b"v".to_vec()));
        assert_eq!(cache.get("other").await.unwrap(), None);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_no_cache() {
        NoCache.set("k", b"v").await.unwrap();
        assert_eq!(NoCache.get("k").await.unwrap(), None);
    }
}
