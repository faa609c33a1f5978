//! Privileged stylesheet fetching
//!
//! Page scripts cannot read the body of a cross-origin stylesheet. This module
//! fetches it from outside the page instead, with URL validation up front and a
//! hard timeout on the whole exchange.

use log::{debug, warn};
use reqwest::header::{ACCEPT, HeaderValue};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Upper bound on one stylesheet request, connect through body
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// `Accept` header sent with every stylesheet request
pub const STYLESHEET_ACCEPT: &str = "text/css,text/plain,*/*";

const ALLOWED_SCHEMES: &[&str] = &["http", "https"];

/// Why a stylesheet could not be fetched
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Invalid URL")]
    InvalidUrl,

    #[error("Invalid protocol")]
    InvalidProtocol,

    #[error("HTTP error! status: {0}")]
    Http(u16),

    #[error("Request timed out")]
    Timeout,

    #[error("{0}")]
    Network(String),
}

impl FetchError {
    /// Short machine-readable tag
    pub fn tag(&self) -> &'static str {
        match self {
            FetchError::InvalidUrl => "invalid-url",
            FetchError::InvalidProtocol => "invalid-protocol",
            FetchError::Http(_) => "http-error",
            FetchError::Timeout => "timeout",
            FetchError::Network(_) => "network-error",
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = error.status() {
            FetchError::Http(status.as_u16())
        } else {
            FetchError::Network(error.to_string())
        }
    }
}

/// Parse `raw` and require an http(s) scheme. No I/O happens here.
pub fn validate_url(raw: &str) -> Result<Url, FetchError> {
    let url = Url::parse(raw.trim()).map_err(|_| FetchError::InvalidUrl)?;
    if !ALLOWED_SCHEMES.contains(&url.scheme()) {
        return Err(FetchError::InvalidProtocol);
    }
    Ok(url)
}

/// Configuration for [`StylesheetFetcher`]
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Timeout for the whole request (default: 5 seconds)
    pub timeout: Duration,

    /// User-Agent header value
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        }
    }
}

impl FetcherConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder method: set the User-Agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Fetches stylesheet bodies on behalf of page-side code
#[derive(Debug, Clone)]
pub struct StylesheetFetcher {
    client: reqwest::Client,
    config: FetcherConfig,
}

impl StylesheetFetcher {
    /// Create a fetcher with the default 5 second timeout
    pub fn new() -> Result<Self, FetchError> {
        Self::with_config(FetcherConfig::default())
    }

    pub fn with_config(config: FetcherConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| FetchError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Fetch the body of the stylesheet at `url`.
    ///
    /// When the timeout elapses the in-flight request future is dropped, which
    /// aborts the connection; a late response is never observed.
    pub async fn fetch_stylesheet(&self, url: &str) -> Result<String, FetchError> {
        let url = validate_url(url)?;
        debug!("Fetching stylesheet {}", url);

        match tokio::time::timeout(self.config.timeout, self.request(url.clone())).await {
            Ok(Ok(css)) => {
                debug!("Fetched {} bytes from {}", css.len(), url);
                Ok(css)
            }
            Ok(Err(e)) => {
                warn!("Stylesheet fetch from {} failed: {}", url, e);
                Err(e)
            }
            Err(_) => {
                warn!("Stylesheet fetch from {} timed out after {:?}", url, self.config.timeout);
                Err(FetchError::Timeout)
            }
        }
    }

    async fn request(&self, url: Url) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, HeaderValue::from_static(STYLESHEET_ACCEPT))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http(status.as_u16()));
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url_accepts_http_and_https() {
        assert!(validate_url("http://example.com/a.css").is_ok());
        assert!(validate_url("https://example.com/a.css").is_ok());
        assert!(validate_url("  https://example.com/a.css  ").is_ok());
    }

    #[test]
    fn test_validate_url_rejects_malformed() {
        assert_eq!(validate_url("not a url"), Err(FetchError::InvalidUrl));
        assert_eq!(validate_url("/relative/a.css"), Err(FetchError::InvalidUrl));
        assert_eq!(validate_url(""), Err(FetchError::InvalidUrl));
    }

    #[test]
    fn test_validate_url_rejects_other_schemes() {
        assert_eq!(validate_url("file:///etc/passwd"), Err(FetchError::InvalidProtocol));
        assert_eq!(validate_url("ftp://example.com/a.css"), Err(FetchError::InvalidProtocol));
        assert_eq!(validate_url("data:text/css,a{}"), Err(FetchError::InvalidProtocol));
    }

    #[test]
    fn test_error_messages_and_tags() {
        assert_eq!(FetchError::Http(404).to_string(), "HTTP error! status: 404");
        assert_eq!(FetchError::Timeout.to_string(), "Request timed out");
        assert_eq!(FetchError::InvalidProtocol.tag(), "invalid-protocol");
        assert_eq!(FetchError::Network("reset".into()).tag(), "network-error");
    }

    #[test]
    fn test_config_builder() {
        let config = FetcherConfig::new()
            .timeout(Duration::from_millis(250))
            .user_agent("Test/1.0");

        assert_eq!(config.timeout, Duration::from_millis(250));
        assert_eq!(config.user_agent, "Test/1.0");
        assert_eq!(FetcherConfig::default().timeout, DEFAULT_TIMEOUT);
    }

    #[tokio::test]
    async fn test_file_url_fails_without_network() {
        let fetcher = StylesheetFetcher::new().unwrap();
        let result = fetcher.fetch_stylesheet("file:///tmp/site.css").await;
        assert_eq!(result, Err(FetchError::InvalidProtocol));
    }
}
