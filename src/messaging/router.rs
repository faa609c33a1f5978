use crate::browser::BrowserSession;
use crate::capture::{self, SnapshotOptions};
use crate::dom::PageDocument;
use crate::error::{CaptureError, Result};
use crate::fetch::StylesheetFetcher;
use crate::messaging::{Request, Response};
use async_trait::async_trait;
use log::{debug, warn};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Where page requests read the page from
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn load_document(&self) -> Result<PageDocument>;
}

/// The probe blocks until the page has loaded, so it runs on the blocking pool
#[async_trait]
impl PageSource for Arc<BrowserSession> {
    async fn load_document(&self) -> Result<PageDocument> {
        let session = Arc::clone(self);
        read_off_runtime(move || session.read_document()).await
    }
}

async fn read_off_runtime<F>(read: F) -> Result<PageDocument>
where
    F: FnOnce() -> Result<PageDocument> + Send + 'static,
{
    tokio::task::spawn_blocking(read)
        .await
        .map_err(|e| CaptureError::EvaluationFailed(format!("Page read task failed: {}", e)))?
}

/// An already-read page, e.g. one loaded from a saved probe dump
#[derive(Debug, Clone)]
pub struct StaticPage(pub PageDocument);

#[async_trait]
impl PageSource for StaticPage {
    async fn load_document(&self) -> Result<PageDocument> {
        Ok(self.0.clone())
    }
}

type Envelope = (Request, oneshot::Sender<Response>);

/// Answers [`Request`]s against a page source and a stylesheet fetcher
pub struct MessageRouter<S> {
    source: S,
    fetcher: StylesheetFetcher,
    snapshot_options: SnapshotOptions,
}

impl<S: PageSource> MessageRouter<S> {
    pub fn new(source: S, fetcher: StylesheetFetcher) -> Self {
        Self {
            source,
            fetcher,
            snapshot_options: SnapshotOptions::default(),
        }
    }

    /// Builder method: options used for `capturePage`
    pub fn with_snapshot_options(mut self, options: SnapshotOptions) -> Self {
        self.snapshot_options = options;
        self
    }

    /// Answer one request. Failures become [`Response::Error`]; nothing is retried.
    pub async fn handle(&self, request: Request) -> Response {
        debug!("Handling {} request", request.action());

        match request {
            Request::CapturePage => match self.source.load_document().await {
                Ok(document) => {
                    let snapshot =
                        capture::capture_snapshot(&document, self.snapshot_options.clone(), &self.fetcher).await;
                    Response::data(snapshot.into_string())
                }
                Err(e) => page_error(e),
            },
            Request::ScrapeHtml => match self.source.load_document().await {
                Ok(document) => Response::data(capture::extract_html(&document)),
                Err(e) => page_error(e),
            },
            Request::ScrapeCss => match self.source.load_document().await {
                Ok(document) => Response::data(capture::extract_css(&document)),
                Err(e) => page_error(e),
            },
            Request::FetchStylesheet { url } => match self.fetcher.fetch_stylesheet(&url).await {
                Ok(css) => Response::Css { css },
                Err(e) => Response::error(e),
            },
        }
    }
}

impl<S: PageSource + 'static> MessageRouter<S> {
    /// Run the router on its own task, handling one request at a time
    pub fn spawn(self) -> MessageClient {
        let (sender, mut receiver) = mpsc::channel::<Envelope>(16);

        tokio::spawn(async move {
            while let Some((request, reply)) = receiver.recv().await {
                let response = self.handle(request).await;
                if reply.send(response).is_err() {
                    debug!("Requester went away before the response was ready");
                }
            }
            debug!("Message router stopped");
        });

        MessageClient { sender }
    }
}

fn page_error(error: CaptureError) -> Response {
    warn!("Page request failed: {}", error);
    Response::error(error)
}

/// Sending half of a spawned [`MessageRouter`]. Each request gets its own reply channel.
#[derive(Debug, Clone)]
pub struct MessageClient {
    sender: mpsc::Sender<Envelope>,
}

impl MessageClient {
    pub async fn send(&self, request: Request) -> Result<Response> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send((request, reply))
            .await
            .map_err(|_| CaptureError::ChannelClosed)?;
        response.await.map_err(|_| CaptureError::ChannelClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{CssRule, ElementNode, StyleSheet, html_skeleton};

    struct BrokenPage;

    #[async_trait]
    impl PageSource for BrokenPage {
        async fn load_document(&self) -> Result<PageDocument> {
            Err(CaptureError::EvaluationFailed("Cannot access a chrome:// URL".to_string()))
        }
    }

    fn sample_page() -> StaticPage {
        let body = vec![ElementNode::new("h1")
            .with_attribute("id", "title")
            .with_attribute("style", "color:red")
            .into()];
        let sheet = StyleSheet::linked(
            0,
            "https://example.com/a.css",
            Some(vec![CssRule::plain("a { color: green; }")]),
        );
        StaticPage(PageDocument::new("https://example.com/", html_skeleton(vec![], body)).with_stylesheet(sheet))
    }

    #[tokio::test]
    async fn test_capture_page_request() {
        let router = MessageRouter::new(sample_page(), StylesheetFetcher::new().unwrap());
        let response = router.handle(Request::CapturePage).await;

        let html = response.text().unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("#title { color:red }"));
        assert!(html.contains("a { color: green; }"));
    }

    #[tokio::test]
    async fn test_scrape_requests() {
        let router = MessageRouter::new(sample_page(), StylesheetFetcher::new().unwrap());

        let html = router.handle(Request::ScrapeHtml).await;
        assert!(html.text().unwrap().starts_with("<html>"));

        let css = router.handle(Request::ScrapeCss).await;
        assert!(css.text().unwrap().contains("/* Stylesheet: https://example.com/a.css */"));
    }

    #[tokio::test]
    async fn test_page_failure_becomes_error_response() {
        let router = MessageRouter::new(BrokenPage, StylesheetFetcher::new().unwrap());
        let response = router.handle(Request::CapturePage).await;

        assert!(response.is_error());
        assert!(response.text().unwrap_err().contains("chrome://"));
    }

    #[tokio::test]
    async fn test_invalid_fetch_is_error_response() {
        let router = MessageRouter::new(sample_page(), StylesheetFetcher::new().unwrap());
        let response = router
            .handle(Request::FetchStylesheet { url: "file:///etc/hosts".into() })
            .await;

        assert_eq!(response, Response::error("Invalid protocol"));
    }

    #[tokio::test]
    async fn test_spawned_router_replies_once_per_request() {
        let client = MessageRouter::new(sample_page(), StylesheetFetcher::new().unwrap()).spawn();

        let first = client.send(Request::ScrapeHtml).await.unwrap();
        let second = client.send(Request::FetchStylesheet { url: "nope".into() }).await.unwrap();

        assert!(first.text().is_ok());
        assert_eq!(second, Response::error("Invalid URL"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_blocking_read_leaves_runtime_free() {
        let (signal, wait) = std::sync::mpsc::channel::<()>();

        let read = read_off_runtime(move || {
            wait.recv_timeout(std::time::Duration::from_secs(5))
                .map_err(|_| CaptureError::EvaluationFailed("runtime was blocked".to_string()))?;
            Ok(PageDocument::new("https://example.com/", html_skeleton(vec![], vec![])))
        });
        let unblock = async move {
            tokio::task::yield_now().await;
            signal.send(()).unwrap();
        };

        let (document, ()) = tokio::join!(read, unblock);
        assert_eq!(document.unwrap().url, "https://example.com/");
    }

    #[tokio::test]
    async fn test_panicking_read_becomes_error() {
        let result = read_off_runtime(|| panic!("page script crashed")).await;
        assert!(matches!(
            result,
            Err(CaptureError::EvaluationFailed(message)) if message.contains("Page read task failed")
        ));
    }
}
