//! page-capture command line
//!
//! Opens a URL in Chrome, captures it and saves, prints or copies the result.

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use page_capture::{
    BrowserSession, CaptureController, CaptureMode, ConnectionOptions, CrossOriginPolicy, FetcherConfig,
    LaunchOptions, MessageRouter, SnapshotOptions, StylesheetFetcher, tools::utils::normalize_url,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "page-capture")]
#[command(version)]
#[command(about = "Capture a web page's HTML and CSS as a self-contained document", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Stylesheet fetch timeout in seconds
    #[arg(long, global = true, default_value = "5")]
    timeout_secs: u64,
}

#[derive(Subcommand)]
enum Command {
    /// Capture the page as one HTML document with styles inlined
    Capture {
        #[command(flatten)]
        page: PageArgs,

        /// Fetch cross-origin stylesheets and inline them instead of linking
        #[arg(long)]
        inline_cross_origin: bool,
    },
    /// Save the page's HTML as-is
    Html {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Save a report of the page's stylesheets
    Css {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Fetch one stylesheet by URL and print it
    Fetch {
        /// Stylesheet URL (http or https)
        url: String,
    },
}

#[derive(Args)]
struct PageArgs {
    /// Page URL
    url: String,

    /// Directory to save the output in
    #[arg(long, short = 'o', value_name = "DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Print the output instead of saving it
    #[arg(long)]
    stdout: bool,

    /// Also copy the output to the clipboard
    #[arg(long)]
    copy: bool,

    /// Launch browser in headed mode (default: headless)
    #[arg(long, short = 'H')]
    headed: bool,

    /// Path to custom browser executable
    #[arg(long, value_name = "PATH")]
    chrome_path: Option<PathBuf>,

    /// WebSocket endpoint URL of a running browser
    #[arg(long, value_name = "URL")]
    ws_endpoint: Option<String>,
}

impl PageArgs {
    fn open_session(&self) -> anyhow::Result<BrowserSession> {
        let session = match &self.ws_endpoint {
            Some(endpoint) => BrowserSession::connect(ConnectionOptions::new(endpoint.clone()))
                .with_context(|| format!("Failed to connect to {}", endpoint))?,
            None => {
                let mut options = LaunchOptions::new().headless(!self.headed);
                if let Some(path) = &self.chrome_path {
                    options = options.chrome_path(path);
                }
                BrowserSession::launch(options).context("Failed to launch browser")?
            }
        };

        let url = normalize_url(&self.url);
        eprintln!("Opening {}", url);
        session.navigate(&url)?;
        session.wait_for_navigation()?;
        Ok(session)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let fetcher = StylesheetFetcher::with_config(FetcherConfig::new().timeout(Duration::from_secs(cli.timeout_secs)))?;

    let (page, mode, cross_origin) = match cli.command {
        Command::Fetch { url } => {
            let css = fetcher.fetch_stylesheet(&url).await.with_context(|| format!("Failed to fetch {}", url))?;
            println!("{}", css);
            return Ok(());
        }
        Command::Capture { page, inline_cross_origin } => {
            let policy = if inline_cross_origin {
                CrossOriginPolicy::Inline
            } else {
                CrossOriginPolicy::PreserveLink
            };
            (page, CaptureMode::Page, policy)
        }
        Command::Html { page } => (page, CaptureMode::Html, CrossOriginPolicy::PreserveLink),
        Command::Css { page } => (page, CaptureMode::Css, CrossOriginPolicy::PreserveLink),
    };

    let session = Arc::new(page.open_session()?);
    let client = MessageRouter::new(session, fetcher)
        .with_snapshot_options(SnapshotOptions::new().cross_origin(cross_origin))
        .spawn();
    let mut controller = CaptureController::new(client);

    eprintln!("{}", mode.title());
    let output = controller.run(mode).await;
    if output.is_error {
        bail!("{}", output.text);
    }

    if page.copy && controller.copy()? {
        eprintln!("Copied!");
    }

    if page.stdout {
        println!("{}", controller.text()?);
    } else if let Some(path) = controller.download(&page.output_dir).await? {
        eprintln!("Saved {}", path.display());
    }

    Ok(())
}
