//! Per-tab status controller.
//!
//! Every completed navigation starts from `Unknown` and walks the same gate
//! sequence: excluded pages, monitored domains, cached verdict, fresh check.
//! Each navigation runs as its own task. There is no deduplication of
//! overlapping checks for one URL and no cancellation when a tab moves on;
//! a late verdict still lands in the cache and on the tab's indicator.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use url::Url;

use idxwatch_client::{StatusClassifier, inspect_url};
use idxwatch_core::{AppConfig, DomainSource, Error, domain};

use crate::indicator::{Indicator, IndicatorState, TabId};

/// Loading phase reported with a tab update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TabStatus {
    Loading,
    #[default]
    Complete,
}

/// A tab finished (or started) loading `url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationEvent {
    pub tab_id: TabId,
    pub url: String,
    pub status: TabStatus,
}

/// Pages that are never checked regardless of the monitored set.
#[derive(Debug, Clone)]
pub struct Exclusions {
    /// Matched as substrings of the hostname.
    pub domains: Vec<String>,
    pub schemes: Vec<String>,
}

impl From<&AppConfig> for Exclusions {
    fn from(config: &AppConfig) -> Self {
        Self { domains: config.excluded_domains.clone(), schemes: config.excluded_schemes.clone() }
    }
}

impl Exclusions {
    /// `true` when the URL is unparseable or belongs to an excluded page.
    fn excludes(&self, url: &str) -> bool {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!(url, error = %e, "invalid URL");
                return true;
            }
        };

        if self.schemes.iter().any(|s| s.eq_ignore_ascii_case(parsed.scheme())) {
            return true;
        }

        let host = parsed.host_str().unwrap_or_default();
        self.domains
            .iter()
            .any(|d| !d.is_empty() && host.contains(d.to_ascii_lowercase().as_str()))
    }
}

/// What the popup shows for a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PageStatus {
    pub url: String,
    pub is_target: bool,
    pub is_indexed: Option<bool>,
    pub from_cache: bool,
    /// Search Console inspection link, offered for monitored pages that are not indexed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inspect_url: Option<String>,
}

/// Drives tab indicators from navigation events.
#[derive(Clone)]
pub struct StatusController {
    classifier: StatusClassifier,
    domains: Arc<dyn DomainSource>,
    indicator: Arc<dyn Indicator>,
    exclusions: Exclusions,
}

impl StatusController {
    pub fn new(
        classifier: StatusClassifier, domains: Arc<dyn DomainSource>, indicator: Arc<dyn Indicator>,
        exclusions: Exclusions,
    ) -> Self {
        Self { classifier, domains, indicator, exclusions }
    }

    /// How long a cached verdict is served before it is rechecked.
    pub fn cache_ttl(&self) -> chrono::Duration {
        self.classifier.cache().ttl()
    }

    /// Decide the indicator state for `url`.
    ///
    /// Only storage failures (domain set or cache reads) are errors; a
    /// failed remote check resolves to `Unknown`.
    pub async fn resolve(&self, url: &str) -> Result<IndicatorState, Error> {
        if self.exclusions.excludes(url) {
            tracing::debug!(url, "excluded page, skipping check");
            return Ok(IndicatorState::Unknown);
        }

        let domains = self.domains.domains().await?;
        if domains.is_empty() {
            tracing::debug!("no target domains configured");
            return Ok(IndicatorState::Unknown);
        }

        if !domain::is_target(url, &domains) {
            tracing::debug!(url, "URL not in target domains");
            return Ok(IndicatorState::Unknown);
        }

        if let Some(entry) = self.classifier.cache().get(url).await? {
            tracing::debug!(url, is_indexed = entry.is_indexed, last_checked = %entry.last_checked, "using cached result");
            return Ok(IndicatorState::from_verdict(Some(entry.is_indexed)));
        }

        tracing::debug!(url, "checking fresh index status");
        Ok(IndicatorState::from_verdict(self.classifier.classify(url).await))
    }

    /// Resolve and render the indicator for one navigation.
    pub async fn transition(&self, event: &NavigationEvent) -> Result<IndicatorState, Error> {
        let state = self.resolve(&event.url).await?;
        self.indicator.set_indicator(event.tab_id, state).await?;
        tracing::info!(tab_id = event.tab_id, url = %event.url, state = ?state, "indicator updated");
        Ok(state)
    }

    /// Handle a tab update in its own task.
    ///
    /// Returns `None` for updates that are not a completed load. A failed
    /// task is logged and leaves the tab's previous indicator in place.
    pub fn on_navigation(&self, event: NavigationEvent) -> Option<JoinHandle<()>> {
        if event.status != TabStatus::Complete {
            return None;
        }

        tracing::debug!(tab_id = event.tab_id, url = %event.url, "tab updated");

        let controller = self.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = controller.transition(&event).await {
                tracing::error!(tab_id = event.tab_id, url = %event.url, error = %e, "navigation handling failed");
            }
        }))
    }

    /// Popup request: always runs a fresh check, never consults the cache.
    ///
    /// Says nothing about whether `url` is monitored; combine with
    /// [`domain::is_target`] before showing the result.
    pub async fn check_index_status(&self, url: &str) -> Option<bool> {
        self.classifier.classify(url).await
    }

    /// Everything the popup displays for `url`.
    ///
    /// Uses a fresh cached verdict when there is one, otherwise checks.
    pub async fn page_status(&self, url: &str) -> Result<PageStatus, Error> {
        let domains = self.domains.domains().await?;
        let is_target = domain::is_target(url, &domains);

        let (is_indexed, from_cache) = if !is_target {
            (None, false)
        } else if let Some(entry) = self.classifier.cache().get(url).await? {
            (Some(entry.is_indexed), true)
        } else {
            (self.classifier.classify(url).await, false)
        };

        let inspect_url = if is_target && is_indexed == Some(false) { inspect_url(url) } else { None };

        Ok(PageStatus { url: url.to_string(), is_target, is_indexed, from_cache, inspect_url })
    }

    /// Register the process-lifetime navigation listener.
    ///
    /// Events sent through the returned [`NavigationSender`] are handled in
    /// arrival order, each in its own task. The listener is not expected to
    /// be removed; it stops only when every sender is dropped.
    pub fn subscribe(self) -> (NavigationSender, Subscription) {
        let (tx, mut rx) = mpsc::unbounded_channel::<NavigationEvent>();

        let handle = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let _ = self.on_navigation(event);
            }
            tracing::info!("navigation listener stopped");
        });

        (NavigationSender { tx }, Subscription { handle })
    }
}

/// Feeds tab updates into a [`Subscription`].
#[derive(Debug, Clone)]
pub struct NavigationSender {
    tx: mpsc::UnboundedSender<NavigationEvent>,
}

impl NavigationSender {
    /// Queue an event. Returns `false` once the listener has stopped.
    pub fn send(&self, event: NavigationEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// The running navigation listener.
#[derive(Debug)]
pub struct Subscription {
    handle: JoinHandle<()>,
}

impl Subscription {
    /// Stop the listener. Checks already spawned run to completion.
    pub async fn stop(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }
}
