use crate::browser::{BrowserSession, LaunchOptions};
use crate::error;
use crate::fetch::StylesheetFetcher;
use rmcp::{
    ServerHandler,
    handler::server::router::tool::ToolRouter,
    model::{Implementation, ServerCapabilities, ServerInfo},
    tool_handler,
};
use std::sync::{Arc, Mutex, MutexGuard};

/// MCP server exposing page capture tools over one browser session
#[derive(Clone)]
pub struct BrowserServer {
    session: Arc<Mutex<BrowserSession>>,
    fetcher: StylesheetFetcher,
    pub(crate) tool_router: ToolRouter<Self>,
}

impl BrowserServer {
    /// Launch a browser with default options
    pub fn new() -> error::Result<Self> {
        Self::with_options(LaunchOptions::default())
    }

    /// Launch a browser with the given options
    pub fn with_options(options: LaunchOptions) -> error::Result<Self> {
        Ok(Self::with_session(BrowserSession::launch(options)?, StylesheetFetcher::new()?))
    }

    /// Serve an existing session
    pub fn with_session(session: BrowserSession, fetcher: StylesheetFetcher) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            fetcher,
            tool_router: Self::tool_router(),
        }
    }

    /// Lock the browser session, recovering from a poisoned lock
    pub(crate) fn session(&self) -> MutexGuard<'_, BrowserSession> {
        self.session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn fetcher(&self) -> &StylesheetFetcher {
        &self.fetcher
    }
}

#[tool_handler]
impl ServerHandler for BrowserServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(
                "Capture web pages: navigate to a URL, then call capture_page for a self-contained HTML \
                 snapshot, scrape_html for the raw markup or scrape_css for a stylesheet report. \
                 fetch_stylesheet downloads a stylesheet body by URL."
                    .to_string(),
            ),
            ..Default::default()
        }
    }
}
