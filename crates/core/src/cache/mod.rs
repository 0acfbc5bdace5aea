//! SQLite-backed persistence for index verdicts and monitored domains.
//!
//! This module provides a persistent cache using SQLite with async access
//! via tokio-rusqlite. It supports:
//!
//! - Per-URL index verdicts with a TTL applied on read
//! - An explicit enable/disable mode for forcing fresh checks
//! - The ordered set of monitored domains
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod connection;
pub mod domains;
pub mod migrations;
pub mod result;
pub mod status;

pub use crate::Error;

pub use connection::CacheDb;
pub use domains::DomainSource;
pub use result::{CacheEntry, CacheMode, DEFAULT_TTL_SECS, ResultCache, StatusStore};
