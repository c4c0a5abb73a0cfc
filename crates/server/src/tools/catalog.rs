//! catalog_* tool implementations.
//!
//! Every tool drives the shared [`Browser`] and answers with the rendered
//! view of the active section. The browser lock is never held while waiting
//! on the network or the debounce timer; waiting tools release it and retake
//! it after each background delivery.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use holocron_client::Browser;
use holocron_core::Error;

use crate::tools::json_result;

/// Input parameters for catalog_navigate tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CatalogNavigateParams {
    /// View path: "/", "/films", "/films/1", "/characters" or "/characters/4".
    pub path: String,

    /// Wait for the section's collection to load (default: true).
    #[serde(default = "default_true")]
    pub wait: bool,
}

fn default_true() -> bool {
    true
}

/// Input parameters for catalog_search tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CatalogSearchParams {
    /// Full contents of the search box; an empty term clears the filter.
    pub term: String,

    /// Wait for the debounce window and return the filtered list (default: false).
    #[serde(default)]
    pub settle: bool,
}

/// Pagination control to press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PageAction {
    Prev,
    Next,
    Goto,
}

/// Input parameters for catalog_page tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CatalogPageParams {
    pub action: PageAction,

    /// Target page for "goto" (1-based, clamped to the available pages).
    #[serde(default)]
    pub page: Option<usize>,
}

/// Input parameters for catalog_view tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CatalogViewParams {
    /// Wait until every related link of the selection has loaded (default: false).
    #[serde(default)]
    pub wait_related: bool,
}

/// Implementation of the catalog_navigate tool.
pub async fn navigate_impl(
    browser: &Mutex<Browser>, params: CatalogNavigateParams,
) -> Result<CallToolResult, McpError> {
    browser.lock().await.navigate(&params.path).await?;
    let wait = params.wait;
    render_when(browser, |state| !wait || !state.is_loading()).await
}

/// Implementation of the catalog_search tool.
pub async fn search_impl(browser: &Mutex<Browser>, params: CatalogSearchParams) -> Result<CallToolResult, McpError> {
    let mut deadline = {
        let mut state = browser.lock().await;
        state.type_search(&params.term);
        state.search_deadline()
    };

    if params.settle {
        while let Some(at) = deadline {
            tokio::time::sleep_until(at).await;
            let mut state = browser.lock().await;
            state.refresh();
            deadline = state.search_deadline();
        }
    }

    let mut state = browser.lock().await;
    state.refresh();
    json_result(&state.render())
}

/// Implementation of the catalog_page tool.
pub async fn page_impl(browser: &Mutex<Browser>, params: CatalogPageParams) -> Result<CallToolResult, McpError> {
    let mut browser = browser.lock().await;
    browser.refresh();

    match params.action {
        PageAction::Prev => browser.prev_page(),
        PageAction::Next => browser.next_page(),
        PageAction::Goto => {
            let page = params
                .page
                .ok_or_else(|| Error::InvalidInput("page is required for goto".to_string()))?;
            browser.go_to_page(page)
        }
    };

    json_result(&browser.render())
}

/// Implementation of the catalog_view tool.
pub async fn view_impl(browser: &Mutex<Browser>, params: CatalogViewParams) -> Result<CallToolResult, McpError> {
    let wait = params.wait_related;
    render_when(browser, |state| !wait || (!state.is_loading() && !state.is_related_loading())).await
}

/// Render once `ready` holds, releasing the lock between background deliveries.
async fn render_when(
    browser: &Mutex<Browser>, ready: impl Fn(&Browser) -> bool,
) -> Result<CallToolResult, McpError> {
    loop {
        let mut progress = {
            let mut state = browser.lock().await;
            let progress = state.catalog().subscribe();
            state.refresh();
            if ready(&*state) {
                return json_result(&state.render());
            }
            progress
        };

        if progress.changed().await.is_err() {
            return json_result(&browser.lock().await.render());
        }
    }
}
