//! cache_purge tool implementation.
//!
//! Deletes stored verdicts older than an age bound. Stale rows are already
//! ignored on read; purging only keeps the table from growing.

use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use idxwatch_core::{CacheDb, Error};

/// Parameters for the cache_purge tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeParams {
    /// Purge verdicts last checked more than this many seconds ago.
    /// Defaults to the cache TTL.
    pub older_than_secs: Option<u64>,
}

/// Output from the cache_purge tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeOutput {
    /// Number of verdicts deleted.
    pub deleted: u64,
}

/// Purge stale verdicts, using `default_ttl` when no age is given.
pub async fn cache_purge(
    db: &CacheDb, default_ttl: chrono::Duration, params: CachePurgeParams,
) -> Result<CachePurgeOutput, Error> {
    let older_than = match params.older_than_secs {
        None => default_ttl,
        Some(secs) => i64::try_from(secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .ok_or_else(|| Error::InvalidInput(format!("older_than_secs out of range: {secs}")))?,
    };

    let deleted = db.purge_stale_status(older_than).await?;
    tracing::info!(deleted, older_than_secs = older_than.num_seconds(), "purged stale verdicts");

    Ok(CachePurgeOutput { deleted })
}

/// Implementation of the cache_purge tool.
pub async fn purge_impl(
    db: &CacheDb, default_ttl: chrono::Duration, params: CachePurgeParams,
) -> Result<CallToolResult, McpError> {
    let output = cache_purge(db, default_ttl, params).await?;
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
