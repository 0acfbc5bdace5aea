//! Search engine URL builders.
//!
//! The query template mimics what the browser's own omnibox sends for a
//! `site:` search, including the opaque `gs_lcrp` parameter. That parameter
//! is not documented anywhere and may expire, so the whole template is an
//! unstable external contract: if classification starts returning
//! indeterminate results across the board, rotate `search_token` first.

use url::Url;

use idxwatch_core::config::{DEFAULT_SEARCH_BASE_URL, DEFAULT_SEARCH_TOKEN};
use idxwatch_core::{AppConfig, Error};

/// Search Console URL inspection endpoint.
const INSPECT_BASE_URL: &str = "https://search.google.com/search-console/inspect";

/// Builds `site:` query URLs.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    base_url: String,
    token: String,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self { base_url: DEFAULT_SEARCH_BASE_URL.to_string(), token: DEFAULT_SEARCH_TOKEN.to_string() }
    }
}

impl From<&AppConfig> for SearchQuery {
    fn from(config: &AppConfig) -> Self {
        Self::new(&config.search_base_url, &config.search_token)
    }
}

impl SearchQuery {
    pub fn new(base_url: &str, token: &str) -> Self {
        Self { base_url: base_url.trim_end_matches('/').to_string(), token: token.to_string() }
    }

    /// Build the results page URL for `site:<page_url>`.
    ///
    /// The page URL is embedded verbatim (percent-encoded), so two spellings
    /// of the same page produce two different queries.
    pub fn query_url(&self, page_url: &str) -> Result<Url, Error> {
        if page_url.trim().is_empty() {
            return Err(Error::InvalidInput("url cannot be empty".into()));
        }

        let mut url = Url::parse(&format!("{}/search", self.base_url))
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", self.base_url, e)))?;

        let query = format!("site:{page_url}");
        url.query_pairs_mut()
            .append_pair("q", &query)
            .append_pair("oq", &query)
            .append_pair("gs_lcrp", &self.token)
            .append_pair("sourceid", "chrome")
            .append_pair("ie", "UTF-8");

        Ok(url)
    }
}

/// Search Console inspection link for a page.
///
/// Scoped to the page's hostname as a domain property. Returns `None` when
/// the URL has no host.
pub fn inspect_url(page_url: &str) -> Option<String> {
    let parsed = Url::parse(page_url).ok()?;
    let host = parsed.host_str()?;

    let mut url = Url::parse(INSPECT_BASE_URL).ok()?;
    url.query_pairs_mut()
        .append_pair("resource_id", &format!("sc-domain:{host}"))
        .append_pair("url", page_url);

    Some(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_url_shape() {
        let url = SearchQuery::default().query_url("https://example.com/page").unwrap();

        assert_eq!(url.host_str(), Some("www.google.com"));
        assert_eq!(url.path(), "/search");

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs[0], ("q".into(), "site:https://example.com/page".into()));
        assert_eq!(pairs[1], ("oq".into(), "site:https://example.com/page".into()));
        assert_eq!(pairs[2], ("gs_lcrp".into(), DEFAULT_SEARCH_TOKEN.into()));
        assert_eq!(pairs[3], ("sourceid".into(), "chrome".into()));
        assert_eq!(pairs[4], ("ie".into(), "UTF-8".into()));
    }

    #[test]
    fn test_query_url_encodes_page_url() {
        let url = SearchQuery::default().query_url("https://example.com/a?b=c&d=e").unwrap();
        let raw = url.query().unwrap();

        assert!(raw.starts_with("q=site%3Ahttps%3A%2F%2Fexample.com%2Fa%3Fb%3Dc%26d%3De&"));
        assert!(!raw.contains("&d=e"));
    }

    #[test]
    fn test_query_url_custom_base() {
        let query = SearchQuery::new("http://127.0.0.1:8080/", "tok");
        let url = query.query_url("https://example.com").unwrap();
        assert_eq!(url.as_str().split('?').next(), Some("http://127.0.0.1:8080/search"));
        assert!(url.query().unwrap().contains("gs_lcrp=tok"));
    }

    #[test]
    fn test_query_url_empty() {
        let result = SearchQuery::default().query_url("  ");
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_query_url_bad_base() {
        let result = SearchQuery::new("not a base", "tok").query_url("https://example.com");
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_inspect_url() {
        let link = inspect_url("https://blog.example.com/post?id=1").unwrap();
        let parsed = Url::parse(&link).unwrap();
        let pairs: Vec<(String, String)> = parsed.query_pairs().into_owned().collect();

        assert_eq!(parsed.host_str(), Some("search.google.com"));
        assert_eq!(parsed.path(), "/search-console/inspect");
        assert_eq!(pairs[0], ("resource_id".into(), "sc-domain:blog.example.com".into()));
        assert_eq!(pairs[1], ("url".into(), "https://blog.example.com/post?id=1".into()));
    }

    #[test]
    fn test_inspect_url_without_host() {
        assert!(inspect_url("not a url").is_none());
        assert!(inspect_url("mailto:a@example.com").is_none());
    }
}
