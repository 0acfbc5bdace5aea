//! TTL-bounded result cache for index verdicts.
//!
//! `ResultCache` adds two things on top of a [`StatusStore`]: entries older
//! than the TTL read as absent, and a [`CacheMode::Disabled`] switch that
//! short-circuits every read and write. Expired entries are never deleted
//! here; they are simply ignored until overwritten.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Default maximum age of a cached verdict, in seconds (24 hours).
pub const DEFAULT_TTL_SECS: i64 = 24 * 60 * 60;

/// A previously computed verdict for one URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub last_checked: DateTime<Utc>,
    pub is_indexed: bool,
}

impl CacheEntry {
    pub fn new(is_indexed: bool) -> Self {
        Self { last_checked: Utc::now(), is_indexed }
    }

    /// An entry is fresh while `now - last_checked <= ttl`.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now.signed_duration_since(self.last_checked) <= ttl
    }
}

/// Whether the cache participates at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    #[default]
    Enabled,
    /// Every `get` misses and every `set` is dropped.
    Disabled,
}

/// Raw key-value persistence for verdicts, keyed by URL.
#[async_trait::async_trait]
pub trait StatusStore: Send + Sync {
    async fn get_status(&self, url: &str) -> Result<Option<CacheEntry>, Error>;

    async fn put_status(&self, url: &str, entry: &CacheEntry) -> Result<(), Error>;
}

/// TTL and mode layer over a [`StatusStore`].
#[derive(Clone)]
pub struct ResultCache {
    store: Arc<dyn StatusStore>,
    mode: CacheMode,
    ttl: Duration,
}

impl ResultCache {
    pub fn new(store: Arc<dyn StatusStore>, mode: CacheMode) -> Self {
        Self { store, mode, ttl: Duration::seconds(DEFAULT_TTL_SECS) }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Maximum age of a verdict served by [`ResultCache::get`].
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up a fresh verdict for `url`.
    ///
    /// Returns `None` when the cache is disabled, the URL was never stored,
    /// or the stored entry is older than the TTL.
    pub async fn get(&self, url: &str) -> Result<Option<CacheEntry>, Error> {
        if self.mode == CacheMode::Disabled {
            tracing::debug!("cache disabled, skipping lookup");
            return Ok(None);
        }

        let Some(entry) = self.store.get_status(url).await? else {
            return Ok(None);
        };

        if !entry.is_fresh(Utc::now(), self.ttl) {
            tracing::debug!(url, last_checked = %entry.last_checked, "cached verdict expired");
            return Ok(None);
        }

        Ok(Some(entry))
    }

    /// Record a verdict for `url`, replacing any previous entry.
    pub async fn set(&self, url: &str, is_indexed: bool) -> Result<(), Error> {
        if self.mode == CacheMode::Disabled {
            tracing::debug!("cache disabled, skipping save");
            return Ok(());
        }

        self.store.put_status(url, &CacheEntry::new(is_indexed)).await
    }
}

impl std::fmt::Debug for ResultCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache")
            .field("mode", &self.mode)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
