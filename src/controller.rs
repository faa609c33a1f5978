//! Front-end state: what was captured last, and the copy/download actions on it

use crate::error::{CaptureError, Result};
use crate::messaging::{MessageClient, Request, Response};
use log::{info, warn};
use std::path::{Path, PathBuf};

/// Hint appended to page errors; restricted pages cannot be read at all
const RESTRICTED_PAGE_HINT: &str =
    "Make sure you're on a regular web page (not a chrome:// or extension page).";

/// Which capture produced the current output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    Page,
    Html,
    Css,
}

impl CaptureMode {
    pub fn request(self) -> Request {
        match self {
            CaptureMode::Page => Request::CapturePage,
            CaptureMode::Html => Request::ScrapeHtml,
            CaptureMode::Css => Request::ScrapeCss,
        }
    }

    /// Heading shown above the output
    pub fn title(self) -> &'static str {
        match self {
            CaptureMode::Page => "Captured Page",
            CaptureMode::Html => "HTML Content",
            CaptureMode::Css => "CSS Content",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            CaptureMode::Page => "captured-page.html",
            CaptureMode::Html => "page-html.html",
            CaptureMode::Css => "page-css.css",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            CaptureMode::Page | CaptureMode::Html => "text/html",
            CaptureMode::Css => "text/plain",
        }
    }
}

/// The text currently on display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub mode: CaptureMode,
    pub text: String,
    /// The capture failed and `text` holds the message
    pub is_error: bool,
}

/// Drives captures through a [`MessageClient`] and keeps the latest result
pub struct CaptureController {
    client: MessageClient,
    current: Option<Output>,
}

impl CaptureController {
    pub fn new(client: MessageClient) -> Self {
        Self { client, current: None }
    }

    /// Run a capture and replace the current output with its result.
    ///
    /// Errors are not returned: they are rendered into the output text, the way
    /// they would be shown to the user.
    pub async fn run(&mut self, mode: CaptureMode) -> &Output {
        info!("{}: capturing page...", mode.title());

        let response = self.client.send(mode.request()).await;
        let failure = match response {
            Ok(Response::Data { data }) => {
                info!("{}: {} bytes", mode.title(), data.len());
                return self.current.insert(Output {
                    mode,
                    text: data,
                    is_error: false,
                });
            }
            Ok(Response::Error { error }) => error,
            Ok(Response::Css { .. }) => "unexpected stylesheet response".to_string(),
            Err(e) => e.to_string(),
        };

        warn!("{}: {}", mode.title(), failure);
        self.current.insert(Output {
            mode,
            text: format!("Error: {}. {}", failure, RESTRICTED_PAGE_HINT),
            is_error: true,
        })
    }

    pub async fn capture_page(&mut self) -> &Output {
        self.run(CaptureMode::Page).await
    }

    pub async fn scrape_html(&mut self) -> &Output {
        self.run(CaptureMode::Html).await
    }

    pub async fn scrape_css(&mut self) -> &Output {
        self.run(CaptureMode::Css).await
    }

    pub fn current(&self) -> Option<&Output> {
        self.current.as_ref().filter(|output| !output.text.is_empty())
    }

    /// Write the current output into `dir` under its mode's file name.
    ///
    /// Returns `None` when there is nothing to save.
    pub async fn download(&self, dir: &Path) -> Result<Option<PathBuf>> {
        let Some(output) = self.current() else {
            warn!("Nothing to download");
            return Ok(None);
        };

        let path = dir.join(output.mode.file_name());
        tokio::fs::write(&path, output.text.as_bytes()).await?;
        info!("Saved {} ({}) to {}", output.mode.file_name(), output.mode.mime_type(), path.display());
        Ok(Some(path))
    }

    /// Put the current output on the system clipboard. Returns `false` when there is nothing to copy.
    #[cfg(feature = "clipboard")]
    pub fn copy(&self) -> Result<bool> {
        let Some(output) = self.current() else {
            warn!("Nothing to copy");
            return Ok(false);
        };

        let mut clipboard = arboard::Clipboard::new().map_err(|e| CaptureError::Clipboard(e.to_string()))?;
        clipboard
            .set_text(output.text.clone())
            .map_err(|e| CaptureError::Clipboard(e.to_string()))?;
        info!("Copied {} bytes to the clipboard", output.text.len());
        Ok(true)
    }

    /// The current output text, or an error if nothing has been captured
    pub fn text(&self) -> Result<&str> {
        self.current()
            .map(|output| output.text.as_str())
            .ok_or(CaptureError::NothingCaptured)
    }
}
