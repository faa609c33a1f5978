//! Capture tools
//!
//! Each tool is a typed operation over a [`BrowserSession`] with JSON
//! parameters, so the same set can be driven from the CLI, the MCP server or
//! plain Rust code through a [`ToolRegistry`].

pub mod capture;
pub mod navigate;
pub mod scrape;
pub mod utils;

pub use capture::{CapturePageParams, CapturePageTool};
pub use navigate::{NavigateParams, NavigateTool};
pub use scrape::{ScrapeCssParams, ScrapeCssTool, ScrapeHtmlParams, ScrapeHtmlTool};

use crate::browser::BrowserSession;
use crate::dom::PageDocument;
use crate::error::{CaptureError, Result};
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Outcome of a tool execution
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolResult {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    pub fn success() -> Self {
        Self { success: true, data: None, error: None }
    }

    pub fn success_with(data: serde_json::Value) -> Self {
        Self { success: true, data: Some(data), error: None }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(error.into()) }
    }
}

/// Execution context shared by the tools of one call
pub struct ToolContext<'a> {
    pub session: &'a BrowserSession,

    /// Page read cached for the duration of the call
    document: Option<PageDocument>,
}

impl<'a> ToolContext<'a> {
    pub fn new(session: &'a BrowserSession) -> Self {
        Self { session, document: None }
    }

    /// Read the active page once and reuse it for the rest of the call
    pub fn get_document(&mut self) -> Result<&PageDocument> {
        if self.document.is_none() {
            self.document = Some(self.session.read_document()?);
        }
        self.document
            .as_ref()
            .ok_or_else(|| CaptureError::DomParseFailed("Page document not available".to_string()))
    }

    /// Forget the cached page, e.g. after navigating
    pub fn invalidate_document(&mut self) {
        self.document = None;
    }
}

/// A typed capture tool
pub trait Tool: Send + Sync + Default {
    type Params: DeserializeOwned + JsonSchema;

    fn name(&self) -> &str;

    /// JSON schema of the parameters
    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::to_value(schemars::schema_for!(Self::Params)).unwrap_or_default()
    }

    fn execute_typed(&self, params: Self::Params, context: &mut ToolContext) -> Result<ToolResult>;
}

/// Object-safe form of [`Tool`] used by the registry
pub trait DynTool: Send + Sync {
    fn name(&self) -> &str;

    fn parameters_schema(&self) -> serde_json::Value;

    fn execute(&self, params: serde_json::Value, context: &mut ToolContext) -> Result<ToolResult>;
}

impl<T: Tool> DynTool for T {
    fn name(&self) -> &str {
        Tool::name(self)
    }

    fn parameters_schema(&self) -> serde_json::Value {
        Tool::parameters_schema(self)
    }

    fn execute(&self, params: serde_json::Value, context: &mut ToolContext) -> Result<ToolResult> {
        let typed: T::Params = serde_json::from_value(params).map_err(|e| CaptureError::InvalidArguments {
            tool: Tool::name(self).to_string(),
            reason: e.to_string(),
        })?;
        self.execute_typed(typed, context)
    }
}

/// Name-indexed set of tools, in registration order
#[derive(Default)]
pub struct ToolRegistry {
    tools: IndexMap<String, Box<dyn DynTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in tool
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(NavigateTool);
        registry.register(CapturePageTool);
        registry.register(ScrapeHtmlTool);
        registry.register(ScrapeCssTool);
        registry
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.tools.insert(Tool::name(&tool).to_string(), Box::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<&dyn DynTool> {
        self.tools.get(name).map(|tool| tool.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Registered tool names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute a tool by name
    pub fn execute(&self, name: &str, params: serde_json::Value, context: &mut ToolContext) -> Result<ToolResult> {
        let tool = self.get(name).ok_or_else(|| CaptureError::UnknownTool(name.to_string()))?;
        log::debug!("Executing tool '{}'", name);
        tool.execute(params, context)
    }
}
