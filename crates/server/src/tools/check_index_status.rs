//! check_index_status tool implementation.
//!
//! The popup's request/response endpoint: runs a fresh classification for a
//! URL and replies with `{"isIndexed": true | false | null}`.

use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use idxwatch_core::Error;

use crate::controller::StatusController;

/// Input parameters for check_index_status tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CheckIndexStatusParams {
    /// The page URL to check.
    pub url: String,
}

/// Output structure for check_index_status tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckIndexStatusOutput {
    /// `null` when the check could not reach a verdict.
    pub is_indexed: Option<bool>,
}

/// Run a fresh check for the requested URL.
pub async fn check_index_status(
    controller: &StatusController, params: CheckIndexStatusParams,
) -> Result<CheckIndexStatusOutput, Error> {
    if params.url.trim().is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()));
    }

    let is_indexed = controller.check_index_status(&params.url).await;
    Ok(CheckIndexStatusOutput { is_indexed })
}

/// Implementation of the check_index_status tool.
pub async fn check_impl(
    controller: &StatusController, params: CheckIndexStatusParams,
) -> Result<CallToolResult, McpError> {
    let output = check_index_status(controller, params).await?;
    let json = serde_json::to_string(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
