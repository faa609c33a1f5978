//! MCP (Model Context Protocol) server implementation for page capture
//!
//! This module provides rmcp-compatible tools by wrapping the tool registry and the stylesheet fetcher.

pub mod handler;
pub use handler::BrowserServer;

use crate::tools::{ToolContext, ToolResult as InternalToolResult};
use rmcp::{
    ErrorData as McpError,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content},
    tool, tool_router,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Navigate tool parameters
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NavigateParams {
    /// URL to navigate to
    pub url: String,
    /// Wait for navigation to complete (default: true)
    #[serde(default = "default_true")]
    pub wait_for_load: bool,
}

/// Parameters for the capture tools (none)
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct EmptyParams {}

/// Stylesheet fetch parameters
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FetchStylesheetParams {
    /// Absolute http(s) URL of the stylesheet
    pub url: String,
}

fn default_true() -> bool {
    true
}

/// Convert internal ToolResult to MCP CallToolResult.
///
/// Capture tools put the captured text under `data`; it is returned as-is
/// rather than wrapped in JSON.
fn convert_result(result: InternalToolResult) -> Result<CallToolResult, McpError> {
    if !result.success {
        let error_msg = result.error.unwrap_or_else(|| "Unknown error".to_string());
        return Err(McpError::internal_error(error_msg, None));
    }

    let text = match result.data {
        Some(data) => match data.get("data").and_then(|d| d.as_str()) {
            Some(captured) => captured.to_string(),
            None => serde_json::to_string_pretty(&data).unwrap_or_else(|_| data.to_string()),
        },
        None => "Success".to_string(),
    };
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

impl BrowserServer {
    fn run_tool(&self, name: &str, params: serde_json::Value) -> Result<CallToolResult, McpError> {
        let session = self.session();
        let mut context = ToolContext::new(&*session);

        let result = session
            .tool_registry()
            .execute(name, params, &mut context)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;

        convert_result(result)
    }
}

#[tool_router]
impl BrowserServer {
    /// Navigate to a URL
    #[tool(description = "Navigate to a specified URL in the browser")]
    fn navigate(&self, params: Parameters<NavigateParams>) -> Result<CallToolResult, McpError> {
        self.run_tool(
            "navigate",
            serde_json::json!({
                "url": params.0.url,
                "wait_for_load": params.0.wait_for_load
            }),
        )
    }

    /// Capture the page as a self-contained HTML document
    #[tool(description = "Capture the current page as one HTML document with all readable styles inlined")]
    fn capture_page(&self, _params: Parameters<EmptyParams>) -> Result<CallToolResult, McpError> {
        self.run_tool("capture_page", serde_json::json!({}))
    }

    /// Return the page HTML as-is
    #[tool(description = "Return the current page's HTML without any style flattening")]
    fn scrape_html(&self, _params: Parameters<EmptyParams>) -> Result<CallToolResult, McpError> {
        self.run_tool("scrape_html", serde_json::json!({}))
    }

    /// Return a CSS report of the page's stylesheets
    #[tool(description = "Return every stylesheet on the current page, with @import rules expanded")]
    fn scrape_css(&self, _params: Parameters<EmptyParams>) -> Result<CallToolResult, McpError> {
        self.run_tool("scrape_css", serde_json::json!({}))
    }

    /// Fetch a stylesheet body outside page context
    #[tool(description = "Download a stylesheet by http(s) URL outside page context (5 second timeout)")]
    async fn fetch_stylesheet(&self, params: Parameters<FetchStylesheetParams>) -> Result<CallToolResult, McpError> {
        match self.fetcher().fetch_stylesheet(&params.0.url).await {
            Ok(css) => Ok(CallToolResult::success(vec![Content::text(css)])),
            Err(e) => Ok(CallToolResult::error(vec![Content::text(e.to_string())])),
        }
    }
}
