//! Core types and shared functionality for idxwatch.
//!
//! This crate provides:
//! - Domain membership matching
//! - Index status cache with SQLite backend
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod domain;
pub mod error;

pub use cache::{CacheDb, CacheEntry, CacheMode, DomainSource, ResultCache, StatusStore};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
