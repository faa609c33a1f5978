use thiserror::Error;

use crate::fetch::FetchError;

/// Errors that can occur while driving the browser or capturing a page
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("Failed to connect to browser: {0}")]
    ConnectionFailed(String),

    #[error("Tab operation failed: {0}")]
    TabOperationFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("JavaScript evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("Failed to read page structure: {0}")]
    DomParseFailed(String),

    #[error("Invalid page document: {0}")]
    InvalidDocument(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for tool '{tool}': {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error("Tool '{tool}' failed: {reason}")]
    ToolExecutionFailed { tool: String, reason: String },

    #[error("Stylesheet fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Message channel closed")]
    ChannelClosed,

    #[error("Nothing captured yet")]
    NothingCaptured,

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for page capture operations
pub type Result<T> = std::result::Result<T, CaptureError>;
