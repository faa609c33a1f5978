//! # page-capture
//!
//! Capture the HTML and CSS of a live web page through Chrome DevTools Protocol (CDP) and export it
//! as a single self-contained document.
//!
//! ## Features
//!
//! - **Snapshots**: one HTML file with every readable style source (linked and `<style>` sheets,
//!   `style` attributes, shadow trees) flattened into a single `<style>` block and a `<base>` pointing
//!   back at the page
//! - **CSS reports**: every stylesheet with its source, `@import` rules expanded once each
//! - **Stylesheet fetching**: cross-origin stylesheet bodies fetched outside the page, with a 5 second
//!   timeout
//! - **MCP Server**: the capture tools exposed to AI agents over the Model Context Protocol
//!
//! ## Command line
//!
//! ```bash
//! # Save captured-page.html for a URL
//! cargo run --bin page-capture -- capture https://example.com
//!
//! # Print the CSS report
//! cargo run --bin page-capture -- css https://example.com --stdout
//! ```
//!
//! ## Library Usage
//!
//! ```rust,no_run
//! use page_capture::{BrowserSession, LaunchOptions};
//!
//! # fn main() -> page_capture::Result<()> {
//! let session = BrowserSession::launch(LaunchOptions::default())?;
//! session.navigate("https://example.com")?;
//! session.wait_for_navigation()?;
//!
//! let snapshot = session.capture_page()?;
//! std::fs::write("captured-page.html", snapshot.as_str())?;
//! # Ok(())
//! # }
//! ```
//!
//! The flattening itself works on a typed [`PageDocument`] and needs no browser:
//!
//! ```rust
//! use page_capture::dom::{ElementNode, PageDocument, html_skeleton};
//! use page_capture::capture::build_snapshot;
//!
//! let body = vec![ElementNode::new("p").with_attribute("id", "x").with_attribute("style", "color:red").into()];
//! let page = PageDocument::new("https://example.com/", html_skeleton(vec![], body));
//!
//! let snapshot = build_snapshot(&page);
//! assert!(snapshot.as_str().contains("#x { color:red }"));
//! ```
//!
//! ## Module Overview
//!
//! - [`browser`]: Browser session management and the page probe
//! - [`dom`]: Typed page model, HTML serialization and inline-style selectors
//! - [`capture`]: Snapshot building and CSS/HTML extraction
//! - [`fetch`]: Stylesheet fetching outside page context
//! - [`messaging`]: Request/response messages and the router that answers them
//! - [`controller`]: Current output with copy and download actions
//! - [`tools`]: Typed capture tools and their registry
//! - [`error`]: Error types and result aliases
//! - [`mcp`]: Model Context Protocol server (requires `mcp-handler` feature)

pub mod browser;
pub mod capture;
pub mod controller;
pub mod dom;
pub mod error;
pub mod fetch;
pub mod messaging;
pub mod tools;

#[cfg(feature = "mcp-handler")]
pub mod mcp;

pub use browser::{BrowserSession, ConnectionOptions, LaunchOptions};
pub use capture::{CrossOriginPolicy, Snapshot, SnapshotBuilder, SnapshotOptions};
pub use controller::{CaptureController, CaptureMode};
pub use dom::{CssRule, ElementNode, PageDocument, SheetId, StyleSheet};
pub use error::{CaptureError, Result};
pub use fetch::{FetchError, FetcherConfig, StylesheetFetcher};
pub use messaging::{MessageClient, MessageRouter, PageSource, Request, Response, StaticPage};
pub use tools::{Tool, ToolContext, ToolRegistry, ToolResult};

#[cfg(feature = "mcp-handler")]
pub use mcp::BrowserServer;
#[cfg(feature = "mcp-handler")]
pub use rmcp::ServiceExt;
