use crate::dom::element::{ElementNode, Node, ShadowRoot};
use crate::dom::stylesheet::{SheetId, StyleSheet};
use crate::error::{CaptureError, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Typed copy of a live page: its element tree and every stylesheet the browser attached to it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageDocument {
    /// `location.href` of the page
    pub url: String,

    /// The `<html>` element
    pub root: ElementNode,

    /// Top-level sheets in `document.styleSheets` order, followed by sheets reached through `@import`
    #[serde(default)]
    pub stylesheets: Vec<StyleSheet>,
}

impl PageDocument {
    /// Create a document rooted at `root`
    pub fn new(url: impl Into<String>, root: ElementNode) -> Self {
        Self {
            url: url.into(),
            root,
            stylesheets: Vec::new(),
        }
    }

    /// Builder method: attach a stylesheet
    pub fn with_stylesheet(mut self, sheet: StyleSheet) -> Self {
        self.stylesheets.push(sheet);
        self
    }

    /// Parse the JSON payload produced by the page probe
    pub fn from_json(json: &str) -> Result<Self> {
        let document: Self = serde_json::from_str(json)
            .map_err(|e| CaptureError::DomParseFailed(format!("Failed to parse page JSON: {}", e)))?;
        document.validate()?;
        Ok(document)
    }

    /// Check the structural assumptions the capture code relies on
    pub fn validate(&self) -> Result<()> {
        if !self.root.is_tag("html") {
            return Err(CaptureError::InvalidDocument(format!(
                "root element is <{}>, expected <html>",
                self.root.tag_name
            )));
        }
        for sheet in &self.stylesheets {
            let imports = sheet.rules.iter().flatten().filter_map(|rule| match rule {
                crate::dom::CssRule::Import { sheet: Some(id), .. } => Some(*id),
                _ => None,
            });
            for id in imports {
                if self.sheet(id).is_none() {
                    return Err(CaptureError::InvalidDocument(format!(
                        "{} imports unknown {}",
                        sheet.id, id
                    )));
                }
            }
        }
        Ok(())
    }

    /// The `<head>` element, if the document has one
    pub fn head(&self) -> Option<&ElementNode> {
        self.root.find_child("head")
    }

    /// Look up a stylesheet by identity
    pub fn sheet(&self, id: SheetId) -> Option<&StyleSheet> {
        self.stylesheets.iter().find(|sheet| sheet.id == id)
    }

    /// Sheets in `document.styleSheets`, in document order
    pub fn top_level_sheets(&self) -> impl Iterator<Item = &StyleSheet> {
        self.stylesheets.iter().filter(|sheet| sheet.is_top_level())
    }

    /// Light-DOM elements in tree order, starting with `<html>`
    pub fn elements(&self) -> impl Iterator<Item = &ElementNode> {
        self.root.descendants()
    }

    /// Every open shadow root in the page, depth first in tree order.
    ///
    /// Shadow roots nested inside other shadow trees are visited right after
    /// the tree that hosts them.
    pub fn shadow_roots(&self) -> Vec<&ShadowRoot> {
        let mut visited = Vec::new();
        let mut worklist: Vec<&ShadowRoot> = self
            .elements()
            .filter_map(|element| element.shadow_root.as_ref())
            .collect();
        worklist.reverse();

        while let Some(shadow) = worklist.pop() {
            visited.push(shadow);
            let nested: Vec<&ShadowRoot> = shadow
                .descendants()
                .filter_map(|element| element.shadow_root.as_ref())
                .collect();
            worklist.extend(nested.into_iter().rev());
        }
        visited
    }

    /// Whether `href` shares the page's origin.
    ///
    /// Relative URLs resolve against the page; pages with an opaque origin
    /// (`data:`, `about:blank`, `file:`) share it with nothing.
    pub fn is_same_origin(&self, href: &str) -> bool {
        let Ok(page) = Url::parse(&self.url) else {
            return false;
        };
        let Ok(target) = page.join(href) else {
            return false;
        };
        let page_origin = page.origin();
        page_origin.is_tuple() && page_origin == target.origin()
    }

    /// Whether the rules of `sheet` can be read from page context
    pub fn is_readable(&self, sheet: &StyleSheet) -> bool {
        sheet.href.as_deref().is_none_or(|href| self.is_same_origin(href))
    }
}

/// Build a minimal `<html><head/><body/></html>` tree, mostly useful in tests
pub fn html_skeleton(head: Vec<Node>, body: Vec<Node>) -> ElementNode {
    ElementNode::new("html")
        .with_child(ElementNode::new("head").with_children(head))
        .with_child(ElementNode::new("body").with_children(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{CssRule, StyleSheet};

    fn page(url: &str) -> PageDocument {
        PageDocument::new(url, html_skeleton(vec![], vec![]))
    }

    #[test]
    fn test_same_origin_classification() {
        let doc = page("https://example.com/blog/post");

        assert!(doc.is_same_origin("https://example.com/style.css"));
        assert!(doc.is_same_origin("/style.css"));
        assert!(doc.is_same_origin("../style.css"));
        assert!(!doc.is_same_origin("https://cdn.example.com/style.css"));
        assert!(!doc.is_same_origin("http://example.com/style.css"));
        assert!(!doc.is_same_origin("https://example.com:8443/style.css"));
    }

    #[test]
    fn test_opaque_origin_matches_nothing() {
        let doc = page("data:text/html,<p>hi</p>");
        assert!(!doc.is_same_origin("https://example.com/style.css"));
    }

    #[test]
    fn test_inline_sheets_are_readable() {
        let doc = page("https://example.com/");
        assert!(doc.is_readable(&StyleSheet::inline(0, vec![])));
        assert!(!doc.is_readable(&StyleSheet::linked(1, "https://cdn.net/a.css", None)));
    }

    #[test]
    fn test_shadow_roots_depth_first() {
        let inner = ElementNode::new("inner-el").with_shadow_root(ShadowRoot::new(vec![
            ElementNode::new("style").with_text(".inner {}").into(),
        ]));
        let outer = ElementNode::new("outer-el").with_shadow_root(ShadowRoot::new(vec![
            ElementNode::new("style").with_text(".outer {}").into(),
            inner.into(),
        ]));
        let last = ElementNode::new("last-el").with_shadow_root(ShadowRoot::new(vec![
            ElementNode::new("style").with_text(".last {}").into(),
        ]));
        let doc = PageDocument::new(
            "https://example.com/",
            html_skeleton(vec![], vec![outer.into(), last.into()]),
        );

        let order: Vec<String> = doc
            .shadow_roots()
            .iter()
            .map(|shadow| shadow.descendants().next().unwrap().text_content())
            .collect();
        assert_eq!(order, vec![".outer {}", ".inner {}", ".last {}"]);
    }

    #[test]
    fn test_from_json_rejects_unknown_import_target() {
        let doc = page("https://example.com/").with_stylesheet(StyleSheet::inline(
            0,
            vec![CssRule::import("https://example.com/a.css", Some(SheetId(9)))],
        ));
        let json = serde_json::to_string(&doc).unwrap();

        assert!(matches!(PageDocument::from_json(&json), Err(CaptureError::InvalidDocument(_))));
    }

    #[test]
    fn test_from_json_rejects_non_html_root() {
        let doc = PageDocument::new("https://example.com/", ElementNode::new("svg"));
        let json = serde_json::to_string(&doc).unwrap();

        assert!(PageDocument::from_json(&json).is_err());
    }
}
