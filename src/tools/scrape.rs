use crate::capture::{extract_css, extract_html};
use crate::error::Result;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for scraping raw HTML (no parameters needed)
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ScrapeHtmlParams {}

/// Parameters for scraping the CSS report (no parameters needed)
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ScrapeCssParams {}

/// Tool returning the active tab's serialized root element
#[derive(Default)]
pub struct ScrapeHtmlTool;

impl Tool for ScrapeHtmlTool {
    type Params = ScrapeHtmlParams;

    fn name(&self) -> &str {
        "scrape_html"
    }

    fn execute_typed(&self, _params: ScrapeHtmlParams, context: &mut ToolContext) -> Result<ToolResult> {
        let document = context.get_document()?;
        let html = extract_html(document);

        Ok(ToolResult::success_with(serde_json::json!({
            "url": document.url,
            "length": html.len(),
            "data": html,
        })))
    }
}

/// Tool returning a CSS report of every stylesheet on the active tab
#[derive(Default)]
pub struct ScrapeCssTool;

impl Tool for ScrapeCssTool {
    type Params = ScrapeCssParams;

    fn name(&self) -> &str {
        "scrape_css"
    }

    fn execute_typed(&self, _params: ScrapeCssParams, context: &mut ToolContext) -> Result<ToolResult> {
        let document = context.get_document()?;
        let css = extract_css(document);

        Ok(ToolResult::success_with(serde_json::json!({
            "url": document.url,
            "stylesheets": document.top_level_sheets().count(),
            "data": css,
        })))
    }
}
