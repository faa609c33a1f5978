use crate::error::{CaptureError, Result};
use crate::tools::utils::{is_restricted_url, normalize_url};
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for opening a page to capture
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NavigateParams {
    /// URL of the page; `example.com` is read as `https://example.com`
    pub url: String,

    /// Wait for the page to finish loading (default: true)
    #[serde(default = "default_wait")]
    pub wait_for_load: bool,
}

fn default_wait() -> bool {
    true
}

/// Opens the page later capture calls read from.
///
/// Browser-internal pages are refused up front since none of the capture
/// tools can read them.
#[derive(Default)]
pub struct NavigateTool;

impl Tool for NavigateTool {
    type Params = NavigateParams;

    fn name(&self) -> &str {
        "navigate"
    }

    fn execute_typed(&self, params: NavigateParams, context: &mut ToolContext) -> Result<ToolResult> {
        let target = normalize_url(&params.url);
        if is_restricted_url(&target) {
            return Err(CaptureError::InvalidArguments {
                tool: "navigate".to_string(),
                reason: format!("{} is a browser page and cannot be captured", target),
            });
        }

        context.invalidate_document();
        context.session.navigate(&target)?;
        if params.wait_for_load {
            context.session.wait_for_navigation()?;
        }

        let loaded_url = context.session.tab()?.get_url();
        log::info!("Opened {} for capture", loaded_url);

        Ok(ToolResult::success_with(serde_json::json!({
            "requested_url": target,
            "url": loaded_url,
            "loaded": params.wait_for_load,
        })))
    }
}
