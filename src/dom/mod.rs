//! Typed page model
//!
//! This module holds a read-only copy of a live page as the browser sees it:
//! - ElementNode / Node / ShadowRoot: the element tree, including open shadow trees
//! - StyleSheet / CssRule: every stylesheet attached to the page, keyed by a stable SheetId
//! - PageDocument: the page URL, its tree and its stylesheets
//! - serialize / selector: `outerHTML`-compatible output and inline-style selectors

pub mod document;
pub mod element;
pub mod selector;
pub mod serialize;
pub mod stylesheet;

pub use document::{PageDocument, html_skeleton};
pub use element::{Descendants, ElementNode, Node, ShadowRoot};
pub use selector::{compound_selector, simple_selector};
pub use serialize::outer_html;
pub use stylesheet::{CssRule, SheetId, SheetOwner, StyleSheet};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_node_export() {
        let element = ElementNode::new("div");
        assert_eq!(element.tag_name, "div");
    }

    #[test]
    fn test_page_document_export() {
        let doc = PageDocument::new("https://example.com/", html_skeleton(vec![], vec![]));
        assert!(doc.head().is_some());
        assert_eq!(doc.elements().count(), 3);
    }
}
