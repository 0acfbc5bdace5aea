//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (IDXWATCH_*)
//! 2. TOML config file (if IDXWATCH_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::cache::CacheMode;

mod validation;

pub use validation::ConfigError;

/// Base URL of the search engine queried for `site:` lookups.
/// Upper bound for `cache_ttl_secs`: one year.
pub const MAX_CACHE_TTL_SECS: u64 = 365 * 24 * 60 * 60;

pub const DEFAULT_SEARCH_BASE_URL: &str = "https://www.google.com";

/// Opaque `gs_lcrp` value the extension shipped with.
///
/// It looks like a session/consistency token and may stop being accepted at
/// some point; it is configuration so it can be rotated without a release.
pub const DEFAULT_SEARCH_TOKEN: &str = "EgZjaHJvbWUqBggAEEUYOzIGCAAQRRg7MgYIARBFGDrSAQgyMjM0ajBqN6gCCLACAQ";

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (IDXWATCH_*)
/// 2. TOML config file (if IDXWATCH_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to SQLite cache database.
    ///
    /// Set via IDXWATCH_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via IDXWATCH_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    ///
    /// Set via IDXWATCH_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via IDXWATCH_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Whether cached verdicts are read and written at all.
    ///
    /// Set via IDXWATCH_CACHE_MODE (`enabled` or `disabled`).
    #[serde(default)]
    pub cache_mode: CacheMode,

    /// Maximum age of a cached verdict, in seconds.
    ///
    /// Set via IDXWATCH_CACHE_TTL_SECS environment variable.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Search engine base URL.
    ///
    /// Set via IDXWATCH_SEARCH_BASE_URL environment variable.
    #[serde(default = "default_search_base_url")]
    pub search_base_url: String,

    /// `gs_lcrp` token embedded in every query URL.
    ///
    /// Set via IDXWATCH_SEARCH_TOKEN environment variable.
    #[serde(default = "default_search_token")]
    pub search_token: String,

    /// Domains to seed the monitored set with at startup.
    ///
    /// Empty means the persisted set is left untouched.
    #[serde(default)]
    pub target_domains: Vec<String>,

    /// Operator domains that are never checked (the search engine itself).
    #[serde(default = "default_excluded_domains")]
    pub excluded_domains: Vec<String>,

    /// URL schemes that are never checked (the extension's own pages).
    #[serde(default = "default_excluded_schemes")]
    pub excluded_schemes: Vec<String>,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./idxwatch-cache.sqlite")
}

fn default_user_agent() -> String {
    "idxwatch/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_cache_ttl_secs() -> u64 {
    24 * 60 * 60
}

fn default_search_base_url() -> String {
    DEFAULT_SEARCH_BASE_URL.into()
}

fn default_search_token() -> String {
    DEFAULT_SEARCH_TOKEN.into()
}

fn default_excluded_domains() -> Vec<String> {
    vec!["google.com".into(), "google.co.jp".into()]
}

fn default_excluded_schemes() -> Vec<String> {
    vec!["chrome-extension".into()]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            cache_mode: CacheMode::default(),
            cache_ttl_secs: default_cache_ttl_secs(),
            search_base_url: default_search_base_url(),
            search_token: default_search_token(),
            target_domains: Vec::new(),
            excluded_domains: default_excluded_domains(),
            excluded_schemes: default_excluded_schemes(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Cache TTL as a chrono duration, the unit cache entries are compared in.
    ///
    /// Values above [`MAX_CACHE_TTL_SECS`] are rejected by `validate()`; an
    /// unvalidated config is clamped to that bound here.
    pub fn cache_ttl(&self) -> chrono::Duration {
        i64::try_from(self.cache_ttl_secs.min(MAX_CACHE_TTL_SECS))
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or_else(|| chrono::Duration::days(365))
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `IDXWATCH_`
    /// 2. TOML file from `IDXWATCH_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("IDXWATCH_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("IDXWATCH_")
                .ignore(&["config_file"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
