use crate::{browser::config::{ConnectionOptions, LaunchOptions},
            capture::{self, Snapshot},
            dom::PageDocument,
            error::{CaptureError, Result},
            tools::{ToolRegistry, utils::is_restricted_url}};
use headless_chrome::{Browser, Tab};
use std::{ffi::OsStr, sync::Arc, time::Duration};

/// Default CDP call timeout used by headless_chrome
const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(20);

/// Effectively unbounded: reading the page waits for its `load` event, however long that takes
const PAGE_LOAD_WAIT: Duration = Duration::from_secs(60 * 60 * 24 * 365);

/// Browser session that manages a Chrome/Chromium instance
pub struct BrowserSession {
    /// The underlying headless_chrome Browser instance
    browser: Browser,

    /// Tool registry for executing capture tools
    tool_registry: ToolRegistry,
}

impl BrowserSession {
    /// Launch a new browser instance with the given options
    pub fn launch(options: LaunchOptions) -> Result<Self> {
        let mut launch_opts = headless_chrome::LaunchOptions::default();

        // Ignore default arguments to prevent detection by anti-bot services
        launch_opts.ignore_default_args.push(OsStr::new("--enable-automation"));
        launch_opts.args.push(OsStr::new("--disable-blink-features=AutomationControlled"));

        // Keep the browser alive between captures (default idle timeout is 30 seconds)
        launch_opts.idle_browser_timeout = Duration::from_secs(60 * 60);

        launch_opts.headless = options.headless;
        launch_opts.window_size = Some((options.window_width, options.window_height));

        if let Some(path) = options.chrome_path {
            launch_opts.path = Some(path);
        }

        if let Some(dir) = options.user_data_dir {
            launch_opts.user_data_dir = Some(dir);
        }

        launch_opts.sandbox = options.sandbox;

        let browser = Browser::new(launch_opts).map_err(|e| CaptureError::LaunchFailed(e.to_string()))?;

        browser.new_tab().map_err(|e| CaptureError::LaunchFailed(format!("Failed to create tab: {}", e)))?;

        log::info!("Browser launched (headless: {})", options.headless);
        Ok(Self { browser, tool_registry: ToolRegistry::with_defaults() })
    }

    /// Connect to an existing browser instance via WebSocket
    pub fn connect(options: ConnectionOptions) -> Result<Self> {
        let browser = Browser::connect_with_timeout(options.ws_url.clone(), Duration::from_millis(options.timeout))
            .map_err(|e| CaptureError::ConnectionFailed(e.to_string()))?;

        log::info!("Connected to browser at {}", options.ws_url);
        Ok(Self { browser, tool_registry: ToolRegistry::with_defaults() })
    }

    /// Launch a browser with default options
    pub fn new() -> Result<Self> {
        Self::launch(LaunchOptions::default())
    }

    /// Get the active tab
    pub fn tab(&self) -> Result<Arc<Tab>> {
        self.get_active_tab()
    }

    /// Get all tabs
    pub fn get_tabs(&self) -> Result<Vec<Arc<Tab>>> {
        let tabs = self
            .browser
            .get_tabs()
            .lock()
            .map_err(|e| CaptureError::TabOperationFailed(format!("Failed to get tabs: {}", e)))?
            .clone();

        Ok(tabs)
    }

    /// Get the currently active tab by checking the document visibility and focus state
    pub fn get_active_tab(&self) -> Result<Arc<Tab>> {
        let tabs = self.get_tabs()?;

        // First pass: visible and focused
        for tab in &tabs {
            match tab.evaluate("document.visibilityState === 'visible' && document.hasFocus()", false) {
                Ok(remote_object) => {
                    if remote_object.value.and_then(|v| v.as_bool()).unwrap_or(false) {
                        return Ok(tab.clone());
                    }
                }
                Err(e) => {
                    log::debug!("Failed to check tab status: {}", e);
                    continue;
                }
            }
        }

        // Second pass: just visible
        for tab in &tabs {
            if let Ok(remote_object) = tab.evaluate("document.visibilityState === 'visible'", false) {
                if remote_object.value.and_then(|v| v.as_bool()).unwrap_or(false) {
                    return Ok(tab.clone());
                }
            }
        }

        // A freshly launched headless browser may report no visible tab yet
        tabs.into_iter()
            .next()
            .ok_or_else(|| CaptureError::TabOperationFailed("No active tab found".to_string()))
    }

    /// Navigate to a URL using the active tab
    pub fn navigate(&self, url: &str) -> Result<()> {
        self.tab()?
            .navigate_to(url)
            .map_err(|e| CaptureError::NavigationFailed(format!("Failed to navigate to {}: {}", url, e)))?;

        Ok(())
    }

    /// Wait for navigation to complete
    pub fn wait_for_navigation(&self) -> Result<()> {
        self.tab()?
            .wait_until_navigated()
            .map_err(|e| CaptureError::NavigationFailed(format!("Navigation timeout: {}", e)))?;

        Ok(())
    }

    /// Read the active tab into a [`PageDocument`].
    ///
    /// If the page has not finished loading, this waits for its `load` event
    /// without a deadline.
    pub fn read_document(&self) -> Result<PageDocument> {
        let tab = self.tab()?;
        let url = tab.get_url();
        if is_restricted_url(&url) {
            return Err(CaptureError::EvaluationFailed(format!("Cannot access contents of {}", url)));
        }
        let js_code = include_str!("page_probe.js");

        tab.set_default_timeout(PAGE_LOAD_WAIT);
        let result = tab.evaluate(js_code, true);
        tab.set_default_timeout(DEFAULT_CALL_TIMEOUT);

        let remote_object = result
            .map_err(|e| CaptureError::EvaluationFailed(format!("Failed to execute page probe: {}", e)))?;

        let json_value = remote_object
            .value
            .ok_or_else(|| CaptureError::DomParseFailed("No value returned from page probe".to_string()))?;

        // The probe returns a JSON string
        let json_str: String = serde_json::from_value(json_value)
            .map_err(|e| CaptureError::DomParseFailed(format!("Failed to get JSON string: {}", e)))?;

        let document = PageDocument::from_json(&json_str)?;
        log::debug!(
            "Read {} with {} elements and {} stylesheets",
            document.url,
            document.elements().count(),
            document.stylesheets.len()
        );
        Ok(document)
    }

    /// Capture the active tab as a self-contained HTML snapshot
    pub fn capture_page(&self) -> Result<Snapshot> {
        Ok(capture::build_snapshot(&self.read_document()?))
    }

    /// The active tab's HTML, serialized as-is
    pub fn scrape_html(&self) -> Result<String> {
        Ok(capture::extract_html(&self.read_document()?))
    }

    /// A CSS report of the active tab's stylesheets
    pub fn scrape_css(&self) -> Result<String> {
        Ok(capture::extract_css(&self.read_document()?))
    }

    /// Get the tool registry
    pub fn tool_registry(&self) -> &ToolRegistry {
        &self.tool_registry
    }
}
