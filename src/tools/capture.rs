use crate::capture::SnapshotBuilder;
use crate::error::Result;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for capturing a page snapshot (no parameters needed)
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CapturePageParams {}

/// Tool producing a self-contained HTML snapshot of the active tab.
///
/// Cross-origin stylesheets are kept as links; inlining them needs the async
/// fetch path in [`crate::messaging`].
#[derive(Default)]
pub struct CapturePageTool;

impl Tool for CapturePageTool {
    type Params = CapturePageParams;

    fn name(&self) -> &str {
        "capture_page"
    }

    fn execute_typed(&self, _params: CapturePageParams, context: &mut ToolContext) -> Result<ToolResult> {
        let document = context.get_document()?;
        let snapshot = SnapshotBuilder::new(document).build();

        Ok(ToolResult::success_with(serde_json::json!({
            "url": document.url,
            "length": snapshot.len(),
            "data": snapshot.into_string(),
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_page_tool_name() {
        let tool = CapturePageTool::default();
        assert_eq!(tool.name(), "capture_page");
    }

    #[test]
    fn test_capture_page_takes_no_parameters() {
        let params: CapturePageParams = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(serde_json::to_value(params).unwrap(), serde_json::json!({}));

        let schema = Tool::parameters_schema(&CapturePageTool);
        assert_eq!(schema["type"], "object");
        assert!(schema.get("required").is_none());
    }
}
