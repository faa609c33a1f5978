//! Page capture: flattening a [`PageDocument`](crate::dom::PageDocument) into exportable text
//!
//! - snapshot: one self-contained HTML document with all styles inlined
//! - extract: a CSS-only report with `@import` expansion, and the raw HTML
//! - rebase: resolving relative stylesheet references for inlined rules

pub mod extract;
pub mod rebase;
pub mod snapshot;

pub use extract::{extract_css, extract_html};
pub use snapshot::{CrossOriginPolicy, Snapshot, SnapshotBuilder, SnapshotOptions, build_snapshot};

use crate::dom::PageDocument;
use crate::fetch::StylesheetFetcher;
use log::{info, warn};
use std::collections::HashMap;

/// Fetch the bodies of the page's unreadable top-level stylesheets.
///
/// Requests run one at a time. Failures are logged and left out of the map, so
/// the snapshot keeps a `<link>` for those sheets.
pub async fn prefetch_cross_origin(document: &PageDocument, fetcher: &StylesheetFetcher) -> HashMap<String, String> {
    let mut fetched = HashMap::new();

    for sheet in document.top_level_sheets() {
        let Some(href) = sheet.href.as_ref() else {
            continue;
        };
        if document.is_readable(sheet) || fetched.contains_key(href) {
            continue;
        }

        match fetcher.fetch_stylesheet(href).await {
            Ok(css) => {
                fetched.insert(href.clone(), css);
            }
            Err(e) => warn!("Keeping <link> for {}: {}", href, e),
        }
    }

    info!("Inlined {} cross-origin stylesheets", fetched.len());
    fetched
}

/// Build a snapshot, inlining cross-origin sheets through `fetcher` when the policy asks for it
pub async fn capture_snapshot(
    document: &PageDocument,
    options: SnapshotOptions,
    fetcher: &StylesheetFetcher,
) -> Snapshot {
    let fetched = match options.cross_origin {
        CrossOriginPolicy::Inline => prefetch_cross_origin(document, fetcher).await,
        CrossOriginPolicy::PreserveLink => HashMap::new(),
    };

    SnapshotBuilder::new(document)
        .with_options(options)
        .with_fetched(fetched)
        .build()
}
