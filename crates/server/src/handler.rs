//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::tools::{
    CachePurgeParams, CacheStatsParams, CatalogNavigateParams, CatalogPageParams, CatalogSearchParams,
    CatalogViewParams, cache, catalog,
};

use holocron_client::Browser;
use holocron_core::ResourceCache;
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

/// The main MCP server handler for holocron.
#[derive(Clone)]
pub struct HolocronServer {
    tool_router: ToolRouter<Self>,
    browser: Arc<Mutex<Browser>>,
    cache: Arc<ResourceCache>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl HolocronServer {
    /// Create a new server handler around a browser and the cache its catalog uses.
    pub fn new(browser: Browser) -> Self {
        let cache = Arc::clone(browser.catalog().cache());
        Self { tool_router: Self::tool_router(), browser: Arc::new(Mutex::new(browser)), cache }
    }

    /// Navigate to a view path.
    #[tool(
        description = "Open a view path such as /films or /characters/4. Waits for the list unless wait=false."
    )]
    async fn catalog_navigate(&self, params: Parameters<CatalogNavigateParams>) -> Result<CallToolResult, McpError> {
        catalog::navigate_impl(&self.browser, params.0).await
    }

    /// Type into the active section's search box.
    #[tool(
        description = "Set the search term. It applies after the debounce window; settle=true waits for it."
    )]
    async fn catalog_search(&self, params: Parameters<CatalogSearchParams>) -> Result<CallToolResult, McpError> {
        catalog::search_impl(&self.browser, params.0).await
    }

    /// Press a pagination control.
    #[tool(description = "Move between pages of the active section: action prev, next, or goto with page.")]
    async fn catalog_page(&self, params: Parameters<CatalogPageParams>) -> Result<CallToolResult, McpError> {
        catalog::page_impl(&self.browser, params.0).await
    }

    /// Render the current view.
    #[tool(
        description = "Return the current view. wait_related=true waits for every related link to load."
    )]
    async fn catalog_view(&self, params: Parameters<CatalogViewParams>) -> Result<CallToolResult, McpError> {
        catalog::view_impl(&self.browser, params.0).await
    }

    /// Report cache counters and entries.
    #[tool(description = "Report resource cache statistics and the state of every cached key.")]
    async fn cache_stats(&self, params: Parameters<CacheStatsParams>) -> Result<CallToolResult, McpError> {
        cache::stats_impl(&self.cache, params.0).await
    }

    /// Purge cache entries.
    #[tool(
        description = "Purge the resource cache: one key, expired entries (expired_only=true), or all idle entries."
    )]
    async fn cache_purge(&self, params: Parameters<CachePurgeParams>) -> Result<CallToolResult, McpError> {
        cache::purge_impl(&self.cache, params.0).await
    }
}

impl ServerHandler for HolocronServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "holocron".into(),
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
