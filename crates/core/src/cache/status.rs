//! Index verdict storage.
//!
//! Rows in `index_status` are keyed by the raw page URL exactly as the tab
//! reported it; no canonicalization is applied.

use super::connection::CacheDb;
use super::result::{CacheEntry, StatusStore};
use crate::Error;
use chrono::{DateTime, Duration, Utc};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::CorruptEntry(format!("last_checked {raw:?}: {e}")))
}

#[async_trait::async_trait]
impl StatusStore for CacheDb {
    async fn get_status(&self, url: &str) -> Result<Option<CacheEntry>, Error> {
        let url = url.to_string();
        self.conn
            .call(move |conn| -> Result<Option<CacheEntry>, Error> {
                let mut stmt = conn.prepare("SELECT is_indexed, last_checked FROM index_status WHERE url = ?1")?;

                let result =
                    stmt.query_row(params![url], |row| Ok((row.get::<_, bool>(0)?, row.get::<_, String>(1)?)));

                match result {
                    Ok((is_indexed, last_checked)) => {
                        Ok(Some(CacheEntry { last_checked: parse_timestamp(&last_checked)?, is_indexed }))
                    }
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Uses UPSERT semantics: a second verdict for the same URL replaces the first.
    async fn put_status(&self, url: &str, entry: &CacheEntry) -> Result<(), Error> {
        let url = url.to_string();
        let last_checked = entry.last_checked.to_rfc3339();
        let is_indexed = entry.is_indexed;

        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO index_status (url, is_indexed, last_checked)
                    VALUES (?1, ?2, ?3)
                    ON CONFLICT(url) DO UPDATE SET
                        is_indexed = excluded.is_indexed,
                        last_checked = excluded.last_checked",
                    params![url, is_indexed, last_checked],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}

impl CacheDb {
    /// Delete verdicts last checked more than `ttl` ago, and rows whose
    /// timestamp cannot be parsed. Backs the `cache_purge` tool.
    ///
    /// Returns the number of deleted entries.
    pub async fn purge_stale_status(&self, ttl: Duration) -> Result<u64, Error> {
        let now = Utc::now();
        let rows: Vec<(String, String)> = self
            .conn
            .call(|conn| -> Result<Vec<(String, String)>, Error> {
                let mut stmt = conn.prepare("SELECT url, last_checked FROM index_status")?;
                let rows = stmt
                    .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(Error::from)?;

        let stale: Vec<String> = rows
            .into_iter()
            .filter(|(_, raw)| match parse_timestamp(raw) {
                Ok(checked) => now.signed_duration_since(checked) > ttl,
                Err(_) => true,
            })
            .map(|(url, _)| url)
            .collect();

        if stale.is_empty() {
            return Ok(0);
        }

        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let tx = conn.transaction()?;
                let mut deleted = 0u64;
                {
                    let mut stmt = tx.prepare("DELETE FROM index_status WHERE url = ?1")?;
                    for url in &stale {
                        deleted += stmt.execute(params![url])? as u64;
                    }
                }
                tx.commit()?;
                Ok(deleted)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_and_get_status() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let entry = CacheEntry::new(true);

        db.put_status("https://example.com/page", &entry).await.unwrap();

        let retrieved = db.get_status("https://example.com/page").await.unwrap().unwrap();
        assert_eq!(retrieved, entry);
    }

    #[tokio::test]
    async fn test_get_missing_status() {
        let db = CacheDb::open_in_memory().await.unwrap();
        assert!(db.get_status("https://example.com/none").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_keys_are_raw_urls() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.put_status("https://example.com/page", &CacheEntry::new(true)).await.unwrap();

        assert!(db.get_status("https://example.com/page/").await.unwrap().is_none());
        assert!(db.get_status("https://EXAMPLE.com/page").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_status() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.put_status("https://example.com/", &CacheEntry::new(false)).await.unwrap();
        db.put_status("https://example.com/", &CacheEntry::new(true)).await.unwrap();

        let retrieved = db.get_status("https://example.com/").await.unwrap().unwrap();
        assert!(retrieved.is_indexed);
    }

    #[tokio::test]
    async fn test_corrupt_timestamp() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.conn
            .call(|conn| {
                conn.execute(
                    "INSERT INTO index_status (url, is_indexed, last_checked) VALUES ('https://example.com/', 1, 'yesterday')",
                    [],
                )
            })
            .await
            .unwrap();

        let result = db.get_status("https://example.com/").await;
        assert!(matches!(result, Err(Error::CorruptEntry(_))));
    }

    #[tokio::test]
    async fn test_purge_stale_status() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let old = CacheEntry { last_checked: Utc::now() - Duration::hours(48), is_indexed: true };
        db.put_status("https://example.com/old", &old).await.unwrap();
        db.put_status("https://example.com/new", &CacheEntry::new(false)).await.unwrap();

        let deleted = db.purge_stale_status(Duration::hours(24)).await.unwrap();
        assert_eq!(deleted, 1);
        assert!(db.get_status("https://example.com/old").await.unwrap().is_none());
        assert!(db.get_status("https://example.com/new").await.unwrap().is_some());
    }
}
