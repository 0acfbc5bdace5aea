//! Client code for idxwatch.
//!
//! This crate provides the HTTP fetch pipeline, the search query builder and
//! the index status classifier used by the host.

pub mod classify;
pub mod fetch;
pub mod search;

pub use classify::{Classification, SignalReport, StatusClassifier, scan_signals};
pub use fetch::{FetchClient, FetchConfig, FetchResponse, PageFetcher};
pub use search::{SearchQuery, inspect_url};
