//! page_status tool implementation.
//!
//! Combines domain membership, the cached verdict and a fresh check into the
//! single answer the popup renders.

use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use idxwatch_core::Error;

use crate::controller::StatusController;

/// Input parameters for page_status tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PageStatusParams {
    /// URL of the active tab.
    pub url: String,
}

/// Implementation of the page_status tool.
pub async fn page_status_impl(
    controller: &StatusController, params: PageStatusParams,
) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()).into());
    }

    let status = controller.page_status(&params.url).await?;
    let json = serde_json::to_string_pretty(&status)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
