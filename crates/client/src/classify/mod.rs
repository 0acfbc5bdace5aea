//! Index status classification.
//!
//! One `site:` query per call, one scan of the returned page, one cache write
//! on success. Every failure is absorbed and reported as indeterminate.

pub mod signals;

pub use signals::{INDEXED_SIGNALS, NOT_INDEXED_SIGNALS, SignalReport, scan_signals};

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use idxwatch_core::{Error, ResultCache};

use crate::fetch::PageFetcher;
use crate::search::SearchQuery;

/// Outcome of a successful check, with the evidence it was based on.
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub url: String,
    pub is_indexed: bool,
    #[serde(flatten)]
    pub signals: SignalReport,
    /// HTTP status of the results page. Diagnostic only.
    pub status: u16,
}

/// Fetches a results page for a URL and decides whether the URL is indexed.
#[derive(Clone)]
pub struct StatusClassifier {
    fetcher: Arc<dyn PageFetcher>,
    search: SearchQuery,
    cache: ResultCache,
}

impl StatusClassifier {
    pub fn new(fetcher: Arc<dyn PageFetcher>, search: SearchQuery, cache: ResultCache) -> Self {
        Self { fetcher, search, cache }
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Classify `url` as indexed (`Some(true)`), not indexed (`Some(false)`)
    /// or indeterminate (`None`).
    ///
    /// Never fails. Network, decode and storage errors are logged and turn
    /// into `None`; the cache is only written when a verdict was reached.
    pub async fn classify(&self, url: &str) -> Option<bool> {
        tracing::info!(url, "checking index status");

        match self.check(url).await {
            Ok(classification) => Some(classification.is_indexed),
            Err(e) => {
                tracing::error!(
                    url,
                    error = %e,
                    details = ?e,
                    timestamp = %Utc::now().to_rfc3339(),
                    "index status check failed"
                );
                None
            }
        }
    }

    /// Run the check and return the full evidence, propagating failures.
    ///
    /// Writes the verdict through to the cache before returning.
    pub async fn check(&self, url: &str) -> Result<Classification, Error> {
        let request_url = self.search.query_url(url)?;
        tracing::debug!(request_url = %request_url, "requesting results page");

        let response = self.fetcher.fetch(&request_url).await?;
        let text = response.text()?;
        tracing::trace!(body = text, "results page body");

        let signals = scan_signals(text);
        let classification = Classification {
            url: url.to_string(),
            is_indexed: signals.is_indexed(),
            signals,
            status: response.status.as_u16(),
        };

        tracing::info!(
            url,
            is_indexed = classification.is_indexed,
            not_indexed_signal = classification.signals.not_indexed_signal.unwrap_or("none"),
            indexed_signals = ?classification.signals.indexed_signals,
            response_status = classification.status,
            response_ok = response.status.is_success(),
            "index status check result"
        );

        self.cache.set(url, classification.is_indexed).await?;

        Ok(classification)
    }
}

impl std::fmt::Debug for StatusClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusClassifier")
            .field("search", &self.search)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{FetchClient, FetchConfig, FetchResponse};
    use bytes::Bytes;
    use idxwatch_core::{CacheDb, CacheEntry, CacheMode, StatusStore};
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use url::Url;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct StaticFetcher {
        body: Vec<u8>,
        calls: AtomicUsize,
    }

    impl StaticFetcher {
        fn new(body: impl Into<Vec<u8>>) -> Arc<Self> {
            Arc::new(Self { body: body.into(), calls: AtomicUsize::new(0) })
        }
    }

    #[async_trait::async_trait]
    impl PageFetcher for StaticFetcher {
        async fn fetch(&self, url: &Url) -> Result<FetchResponse, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(FetchResponse {
                url: url.clone(),
                final_url: url.clone(),
                status: StatusCode::OK,
                content_type: Some("text/html".into()),
                bytes: Bytes::from(self.body.clone()),
                fetch_ms: 1,
            })
        }
    }

    struct FailingFetcher;

    #[async_trait::async_trait]
    impl PageFetcher for FailingFetcher {
        async fn fetch(&self, _url: &Url) -> Result<FetchResponse, Error> {
            Err(Error::HttpError("network error: connection refused".into()))
        }
    }

    struct BrokenStore;

    #[async_trait::async_trait]
    impl StatusStore for BrokenStore {
        async fn get_status(&self, _url: &str) -> Result<Option<CacheEntry>, Error> {
            Err(Error::Storage("store unavailable".into()))
        }

        async fn put_status(&self, _url: &str, _entry: &CacheEntry) -> Result<(), Error> {
            Err(Error::Storage("store unavailable".into()))
        }
    }

    async fn classifier(fetcher: Arc<dyn PageFetcher>) -> (CacheDb, StatusClassifier) {
        let db = CacheDb::open_in_memory().await.unwrap();
        let cache = ResultCache::new(Arc::new(db.clone()), CacheMode::Enabled);
        (db.clone(), StatusClassifier::new(fetcher, SearchQuery::default(), cache))
    }

    #[tokio::test]
    async fn test_no_results_phrase_beats_result_markup() {
        let fetcher =
            StaticFetcher::new(r#"<p>Your search did not match any documents</p><h3 class="LC20lb">ad</h3>"#);
        let (db, classifier) = classifier(fetcher).await;

        assert_eq!(classifier.classify("https://example.com/a").await, Some(false));
        assert!(!db.get_status("https://example.com/a").await.unwrap().unwrap().is_indexed);
    }

    #[tokio::test]
    async fn test_result_markup_alone_is_indexed() {
        let (db, classifier) = classifier(StaticFetcher::new(r#"<div data-hveid="CAIQAA"></div>"#)).await;

        assert_eq!(classifier.classify("https://example.com/b").await, Some(true));
        assert!(db.get_status("https://example.com/b").await.unwrap().unwrap().is_indexed);
    }

    #[tokio::test]
    async fn test_same_text_same_verdict() {
        let (_db, classifier) = classifier(StaticFetcher::new(r#"<div class="yuRUbf"></div>"#)).await;

        let first = classifier.classify("https://example.com/c").await;
        let second = classifier.classify("https://example.com/c").await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_network_error_is_indeterminate_and_not_cached() {
        let (db, classifier) = classifier(Arc::new(FailingFetcher)).await;

        assert_eq!(classifier.classify("https://example.com/d").await, None);
        assert!(db.get_status("https://example.com/d").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_decode_error_is_indeterminate() {
        let (db, classifier) = classifier(StaticFetcher::new(vec![0xc3, 0x28, 0xa0])).await;

        assert_eq!(classifier.classify("https://example.com/e").await, None);
        assert!(db.get_status("https://example.com/e").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_storage_error_is_indeterminate() {
        let cache = ResultCache::new(Arc::new(BrokenStore), CacheMode::Enabled);
        let classifier =
            StatusClassifier::new(StaticFetcher::new("data-hveid"), SearchQuery::default(), cache);

        assert_eq!(classifier.classify("https://example.com/f").await, None);
    }

    #[tokio::test]
    async fn test_one_fetch_per_call() {
        let fetcher = StaticFetcher::new("data-hveid");
        let (_db, classifier) = classifier(fetcher.clone()).await;

        classifier.classify("https://example.com/g").await;
        classifier.classify("https://example.com/g").await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_check_reports_evidence() {
        let (_db, classifier) = classifier(StaticFetcher::new(r#"class="VwiC3b" data-hveid"#)).await;

        let result = classifier.check("https://example.com/h").await.unwrap();
        assert!(result.is_indexed);
        assert_eq!(result.status, 200);
        assert_eq!(result.signals.indexed_signals, vec![r#"class="VwiC3b""#, "data-hveid"]);
        assert!(result.signals.not_indexed_signal.is_none());

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["is_indexed"], true);
        assert_eq!(json["indexed_signals"][1], "data-hveid");
        assert!(json["not_indexed_signal"].is_null());
    }

    #[tokio::test]
    async fn test_against_http_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "site:https://example.com/page"))
            .and(query_param("sourceid", "chrome"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(r#"<div class="yuRUbf"><h3 class="LC20lb">Page</h3></div>"#, "text/html; charset=UTF-8"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let db = CacheDb::open_in_memory().await.unwrap();
        let cache = ResultCache::new(Arc::new(db.clone()), CacheMode::Enabled);
        let fetcher = Arc::new(FetchClient::new(FetchConfig::default()).unwrap());
        let classifier = StatusClassifier::new(fetcher, SearchQuery::new(&server.uri(), "token"), cache);

        assert_eq!(classifier.classify("https://example.com/page").await, Some(true));
        assert!(db.get_status("https://example.com/page").await.unwrap().unwrap().is_indexed);
    }
}
