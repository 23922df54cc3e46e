use std::path::Path;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub status: u16,
    pub body: String,
    pub fetched_at: String,
}

/// Response bodies keyed by request URL, stored in a SQLite file that
/// survives between runs. Entries are never expired.
#[derive(Debug)]
pub struct ResponseCache {
    conn: Connection,
}

impl ResponseCache {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        let path = path.as_ref();
        log::debug!("Opening response cache at {}", path.display());
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, CacheError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, CacheError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS responses (
                url        TEXT PRIMARY KEY,
                status     INTEGER NOT NULL,
                body       TEXT NOT NULL,
                fetched_at TEXT NOT NULL
            );",
        )?;
        Ok(Self { conn })
    }

    pub fn get(&self, url: &str) -> Result<Option<CachedResponse>, CacheError> {
        let cached = self
            .conn
            .query_row(
                "SELECT status, body, fetched_at FROM responses WHERE url = ?1",
                params![url],
                |row| {
                    Ok(CachedResponse {
                        status: row.get(0)?,
                        body: row.get(1)?,
                        fetched_at: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(cached)
    }

    pub fn put(&self, url: &str, status: u16, body: &str) -> Result<(), CacheError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO responses (url, status, body, fetched_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![url, status, body, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn len(&self) -> Result<usize, CacheError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM responses", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool, CacheError> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_then_get() {
        let cache = ResponseCache::open_in_memory().unwrap();
        assert!(cache.get("http://host/ccf/ccf-1.jsp").unwrap().is_none());

        cache.put("http://host/ccf/ccf-1.jsp", 200, "<html></html>").unwrap();

        let cached = cache.get("http://host/ccf/ccf-1.jsp").unwrap().unwrap();
        assert_eq!(cached.status, 200);
        assert_eq!(cached.body, "<html></html>");
        assert!(!cached.fetched_at.is_empty());
        assert_eq!(cache.len().unwrap(), 1);
    }

    #[test]
    fn test_put_replaces_existing_entry() {
        let cache = ResponseCache::open_in_memory().unwrap();
        cache.put("u", 200, "old").unwrap();
        cache.put("u", 200, "new").unwrap();

        assert_eq!(cache.get("u").unwrap().unwrap().body, "new");
        assert_eq!(cache.len().unwrap(), 1);
    }

    #[test]
    fn test_cache_persists_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.sqlite");

        {
            let cache = ResponseCache::open(&path).unwrap();
            cache.put("u", 200, "body").unwrap();
        }

        let reopened = ResponseCache::open(&path).unwrap();
        assert_eq!(reopened.get("u").unwrap().unwrap().body, "body");
        assert!(!reopened.is_empty().unwrap());
    }
}
