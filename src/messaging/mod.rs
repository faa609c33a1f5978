//! One-shot request/response messages between the capture front end and its workers
//!
//! The JSON form matches the extension protocol:
//! `{"action": "capturePage"}` answered by `{"data": "..."}`,
//! `{"action": "fetchStylesheet", "url": "..."}` answered by `{"css": "..."}`
//! or `{"error": "..."}`.

pub mod router;

pub use router::{MessageClient, MessageRouter, PageSource, StaticPage};

use serde::{Deserialize, Serialize};

/// A request sent to the router
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action")]
pub enum Request {
    /// Flattened snapshot of the page
    #[serde(rename = "capturePage")]
    CapturePage,

    /// The page's HTML as-is
    #[serde(rename = "scrapeHTML")]
    ScrapeHtml,

    /// CSS report of the page's stylesheets
    #[serde(rename = "scrapeCSS")]
    ScrapeCss,

    /// Stylesheet body fetched outside page context
    #[serde(rename = "fetchStylesheet")]
    FetchStylesheet { url: String },
}

impl Request {
    /// Wire name of the action
    pub fn action(&self) -> &'static str {
        match self {
            Request::CapturePage => "capturePage",
            Request::ScrapeHtml => "scrapeHTML",
            Request::ScrapeCss => "scrapeCSS",
            Request::FetchStylesheet { .. } => "fetchStylesheet",
        }
    }
}

/// The single reply to a [`Request`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Response {
    Data { data: String },
    Css { css: String },
    Error { error: String },
}

impl Response {
    pub fn data(data: impl Into<String>) -> Self {
        Response::Data { data: data.into() }
    }

    pub fn error(error: impl ToString) -> Self {
        Response::Error { error: error.to_string() }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error { .. })
    }

    /// The payload text, whichever kind of success this is
    pub fn text(&self) -> Result<&str, &str> {
        match self {
            Response::Data { data } => Ok(data),
            Response::Css { css } => Ok(css),
            Response::Error { error } => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_format() {
        assert_eq!(serde_json::to_value(Request::CapturePage).unwrap(), json!({"action": "capturePage"}));
        assert_eq!(serde_json::to_value(Request::ScrapeHtml).unwrap(), json!({"action": "scrapeHTML"}));
        assert_eq!(serde_json::to_value(Request::ScrapeCss).unwrap(), json!({"action": "scrapeCSS"}));
        assert_eq!(
            serde_json::to_value(Request::FetchStylesheet { url: "https://a.test/x.css".into() }).unwrap(),
            json!({"action": "fetchStylesheet", "url": "https://a.test/x.css"})
        );
    }

    #[test]
    fn test_request_parse() {
        let request: Request = serde_json::from_str(r#"{"action":"fetchStylesheet","url":"https://a.test/"}"#).unwrap();
        assert_eq!(request, Request::FetchStylesheet { url: "https://a.test/".into() });
        assert_eq!(request.action(), "fetchStylesheet");

        assert!(serde_json::from_str::<Request>(r#"{"action":"click"}"#).is_err());
    }

    #[test]
    fn test_response_wire_format() {
        assert_eq!(serde_json::to_value(Response::data("<html>")).unwrap(), json!({"data": "<html>"}));
        assert_eq!(serde_json::to_value(Response::Css { css: "a{}".into() }).unwrap(), json!({"css": "a{}"}));
        assert_eq!(serde_json::to_value(Response::error("Invalid URL")).unwrap(), json!({"error": "Invalid URL"}));

        let parsed: Response = serde_json::from_str(r#"{"css":"b{}"}"#).unwrap();
        assert_eq!(parsed.text(), Ok("b{}"));
    }
}
