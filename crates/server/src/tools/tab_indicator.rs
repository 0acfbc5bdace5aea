//! tab_indicator tool implementation.
//!
//! Reports which icon a tab should currently show.

use std::collections::BTreeMap;

use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use idxwatch_core::Error;

use crate::indicator::{IconBoard, IndicatorState, TabId};

/// Parameters for the tab_indicator tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TabIndicatorParams {
    /// Browser tab identifier.
    pub tab_id: TabId,
}

/// Output from the tab_indicator tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabIndicatorOutput {
    pub tab_id: TabId,
    /// `unknown` until the tab's first completed navigation is handled.
    pub state: IndicatorState,
    /// Icon asset path per pixel size.
    pub icon: BTreeMap<u16, String>,
}

/// Look up the indicator for a tab.
pub async fn tab_indicator(board: &IconBoard, params: TabIndicatorParams) -> TabIndicatorOutput {
    let state = board.state_of(params.tab_id).await.unwrap_or_default();
    TabIndicatorOutput { tab_id: params.tab_id, state, icon: state.icon_paths() }
}

/// Implementation of the tab_indicator tool.
pub async fn tab_indicator_impl(board: &IconBoard, params: TabIndicatorParams) -> Result<CallToolResult, McpError> {
    let output = tab_indicator(board, params).await;
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
