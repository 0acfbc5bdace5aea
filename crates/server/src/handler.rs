//! MCP server handler implementation.
//!
//! Routes tool calls from the browser bridge and the popup onto the status
//! controller and the icon board.
use std::sync::Arc;

use idxwatch_core::CacheDb;

use crate::controller::{NavigationSender, StatusController};
use crate::indicator::IconBoard;
use crate::tools::cache_purge::{CachePurgeParams, purge_impl};
use crate::tools::check_index_status::{CheckIndexStatusParams, check_impl};
use crate::tools::page_status::{PageStatusParams, page_status_impl};
use crate::tools::tab_indicator::{TabIndicatorParams, tab_indicator_impl};
use crate::tools::tab_updated::{TabUpdatedParams, tab_updated_impl};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for idxwatch.
#[derive(Clone)]
pub struct IdxWatchServer {
    tool_router: ToolRouter<Self>,
    controller: StatusController,
    navigation: NavigationSender,
    board: Arc<IconBoard>,
    db: CacheDb,
}

#[tool_router]
impl IdxWatchServer {
    pub fn new(
        controller: StatusController, navigation: NavigationSender, board: Arc<IconBoard>, db: CacheDb,
    ) -> Self {
        Self { tool_router: Self::tool_router(), controller, navigation, board, db }
    }

    /// Report a tab update.
    ///
    /// Only `complete` loads are acted on. The check runs in the background and
    /// the tab's indicator is updated when it finishes.
    #[tool(
        description = "Report a browser tab update (tab_id, url, status). Completed loads on monitored domains trigger an index check that updates the tab's indicator."
    )]
    async fn tab_updated(&self, params: Parameters<TabUpdatedParams>) -> Result<CallToolResult, McpError> {
        tab_updated_impl(&self.navigation, params.0)
    }

    #[tool(description = "Get the indicator state (unknown, indexed, not-indexed) and icon paths for a browser tab.")]
    async fn tab_indicator(&self, params: Parameters<TabIndicatorParams>) -> Result<CallToolResult, McpError> {
        tab_indicator_impl(&self.board, params.0).await
    }

    /// Popup request/response endpoint.
    #[tool(
        description = "Check whether a URL is indexed by the search engine. Always runs a fresh check and returns {\"isIndexed\": true | false | null}."
    )]
    async fn check_index_status(&self, params: Parameters<CheckIndexStatusParams>) -> Result<CallToolResult, McpError> {
        check_impl(&self.controller, params.0).await
    }

    #[tool(
        description = "Summarise a page for the popup: whether its domain is monitored, the cached or fresh verdict, and a Search Console inspection link."
    )]
    async fn page_status(&self, params: Parameters<PageStatusParams>) -> Result<CallToolResult, McpError> {
        page_status_impl(&self.controller, params.0).await
    }

    #[tool(
        description = "Delete cached verdicts older than older_than_secs (defaults to the cache TTL). Returns the number deleted."
    )]
    async fn cache_purge(&self, params: Parameters<CachePurgeParams>) -> Result<CallToolResult, McpError> {
        purge_impl(&self.db, self.controller.cache_ttl(), params.0).await
    }
}

impl ServerHandler for IdxWatchServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "idxwatch".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
