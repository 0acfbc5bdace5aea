//! tab_updated tool implementation.
//!
//! Entry point for the browser's tab lifecycle notifications. The event is
//! queued for the navigation listener and the call returns straight away;
//! the indicator changes once the check finishes.

use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use idxwatch_core::Error;

use crate::controller::{NavigationEvent, NavigationSender, TabStatus};
use crate::indicator::TabId;

/// Input parameters for tab_updated tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TabUpdatedParams {
    /// Browser tab identifier.
    pub tab_id: TabId,

    /// URL the tab is showing.
    pub url: String,

    /// Load phase: "loading" or "complete" (default).
    #[serde(default)]
    pub status: TabStatus,
}

/// Output structure for tab_updated tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TabUpdatedOutput {
    /// Whether the event reached the navigation listener.
    pub accepted: bool,
}

/// Forward a tab update to the navigation listener.
pub fn tab_updated(navigation: &NavigationSender, params: TabUpdatedParams) -> TabUpdatedOutput {
    let accepted =
        navigation.send(NavigationEvent { tab_id: params.tab_id, url: params.url, status: params.status });

    if !accepted {
        tracing::warn!(tab_id = params.tab_id, "navigation listener is gone, dropping tab update");
    }

    TabUpdatedOutput { accepted }
}

/// Implementation of the tab_updated tool.
pub fn tab_updated_impl(navigation: &NavigationSender, params: TabUpdatedParams) -> Result<CallToolResult, McpError> {
    let output = tab_updated(navigation, params);
    let json = serde_json::to_string(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
