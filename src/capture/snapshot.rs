use crate::capture::rebase;
use crate::dom::{
    CssRule, ElementNode, Node, PageDocument, SheetId, SheetOwner, StyleSheet, outer_html, simple_selector,
};
use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use std::fmt;
use url::Url;

/// Section header for per-element `style` attributes
pub const INLINE_STYLES_HEADER: &str = "/* Inline element styles */";

/// Section header for styles found in shadow trees
pub const SHADOW_STYLES_HEADER: &str = "/* Shadow DOM styles */";

/// A complete, self-contained HTML document with the page's styles flattened in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot(String);

impl Snapshot {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Snapshot {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// What to do with stylesheets whose rules the page cannot read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CrossOriginPolicy {
    /// Keep a `<link rel="stylesheet">` so the browser loads it at render time
    #[default]
    PreserveLink,
    /// Inline bodies fetched out of page context; sheets that could not be fetched keep their link
    Inline,
}

#[derive(Debug, Clone, Default)]
pub struct SnapshotOptions {
    pub cross_origin: CrossOriginPolicy,
}

impl SnapshotOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the cross-origin policy
    pub fn cross_origin(mut self, policy: CrossOriginPolicy) -> Self {
        self.cross_origin = policy;
        self
    }
}

/// Flattens a [`PageDocument`] into a [`Snapshot`]
pub struct SnapshotBuilder<'a> {
    document: &'a PageDocument,
    options: SnapshotOptions,
    fetched: HashMap<String, String>,
}

impl<'a> SnapshotBuilder<'a> {
    pub fn new(document: &'a PageDocument) -> Self {
        Self {
            document,
            options: SnapshotOptions::default(),
            fetched: HashMap::new(),
        }
    }

    /// Builder method: set options
    pub fn with_options(mut self, options: SnapshotOptions) -> Self {
        self.options = options;
        self
    }

    /// Builder method: stylesheet bodies fetched out of page context, keyed by URL
    pub fn with_fetched(mut self, fetched: HashMap<String, String>) -> Self {
        self.fetched = fetched;
        self
    }

    /// Build the snapshot. The source document is left untouched.
    pub fn build(&self) -> Snapshot {
        let mut root = self.document.root.clone();

        // Every style source ends up in the aggregated block or as a fresh link,
        // so the copied originals go.
        let removed = root.remove_descendants(|e| e.is_tag("style") || e.is_stylesheet_link() || e.is_tag("base"));
        debug!("Removed {} style, link and base elements from the copy", removed);

        let mut block = StyleBlock::default();
        self.collect_style_elements(&mut block);
        self.collect_stylesheets(&mut block);
        self.collect_inline_styles(&mut block.body);
        self.collect_shadow_styles(&mut block.body);
        let styles = block.finish();

        let head_index = ensure_head(&mut root);
        if let Some(Node::Element(head)) = root.children.get_mut(head_index) {
            for href in block.links {
                head.add_child(
                    ElementNode::new("link")
                        .with_attribute("rel", "stylesheet")
                        .with_attribute("href", href),
                );
            }
            if !styles.is_empty() {
                head.add_child(ElementNode::new("style").with_text(styles));
            }
            head.children.insert(
                0,
                Node::Element(ElementNode::new("base").with_attribute("href", self.document.url.clone())),
            );
        }

        Snapshot(format!("<!DOCTYPE html>\n{}", outer_html(&root)))
    }

    /// `<style>` text goes in verbatim. The sheets it imports are expanded
    /// ahead of it, where `@import` is still allowed to take effect.
    fn collect_style_elements(&self, block: &mut StyleBlock) {
        for sheet in self.document.top_level_sheets() {
            if sheet.owner != SheetOwner::StyleElement {
                continue;
            }
            block.visited.insert(sheet.id);
            for rule in sheet.rules.iter().flatten() {
                if let CssRule::Import { .. } = rule {
                    self.expand_import(rule, block);
                }
            }
        }

        for style in self.document.elements().filter(|e| e.is_tag("style")) {
            block.body.push_str(&style.text_content());
            block.body.push('\n');
        }
    }

    fn collect_stylesheets(&self, block: &mut StyleBlock) {
        for sheet in self.document.top_level_sheets() {
            if sheet.owner == SheetOwner::StyleElement {
                continue;
            }

            if self.document.is_readable(sheet) {
                if sheet.rules.is_none() {
                    warn!("Could not process stylesheet {}: rules are not accessible", sheet.source_label());
                    preserve_link(sheet, &mut block.links);
                } else if block.visited.insert(sheet.id) {
                    self.append_sheet(sheet, block);
                }
                continue;
            }

            let fetched = match (self.options.cross_origin, sheet.href.as_ref()) {
                (CrossOriginPolicy::Inline, Some(href)) => self.fetched.get(href).map(|css| (href, css)),
                _ => None,
            };
            match fetched {
                Some((href, css)) => {
                    let inlined = rebase::inline_fetched(css, href);
                    for import in inlined.imports {
                        block.hoist(import);
                    }
                    block.body.push_str(&format!("/* Stylesheet: {} */\n", href));
                    block.body.push_str(&inlined.body);
                    block.body.push('\n');
                }
                None => preserve_link(sheet, &mut block.links),
            }
        }
    }

    /// Rules of a readable sheet, with `@import` expanded in place and
    /// relative references resolved against the sheet's URL
    fn append_sheet(&self, sheet: &StyleSheet, block: &mut StyleBlock) {
        let base = sheet.href.as_deref().and_then(|href| Url::parse(href).ok());
        for rule in sheet.rules.iter().flatten() {
            match rule {
                CssRule::Import { .. } => self.expand_import(rule, block),
                CssRule::Plain { css_text } => {
                    match &base {
                        Some(base) => block.body.push_str(&rebase::rebase_css(css_text, base)),
                        None => block.body.push_str(css_text),
                    }
                    block.body.push('\n');
                }
            }
        }
    }

    /// Inline a readable imported sheet once; anything else stays an `@import`
    /// at the top of the block
    fn expand_import(&self, rule: &CssRule, block: &mut StyleBlock) {
        let CssRule::Import { href, sheet, .. } = rule else {
            return;
        };
        let imported = sheet
            .as_ref()
            .and_then(|id| self.document.sheet(*id))
            .filter(|imported| imported.rules.is_some() && self.document.is_readable(imported));

        match imported {
            Some(imported) => {
                if block.visited.insert(imported.id) {
                    self.append_sheet(imported, block);
                } else {
                    debug!("Skipping already inlined import {}", href);
                }
            }
            None => block.hoist(format!("@import url(\"{}\");", href)),
        }
    }

    fn collect_inline_styles(&self, styles: &mut String) {
        let styled: Vec<&ElementNode> = self
            .document
            .elements()
            .filter(|e| e.get_attribute("style").is_some())
            .collect();
        if styled.is_empty() {
            return;
        }

        styles.push('\n');
        styles.push_str(INLINE_STYLES_HEADER);
        styles.push('\n');
        for element in styled {
            let declarations = element.get_attribute("style").map(|s| s.trim()).unwrap_or_default();
            styles.push_str(&format!("{} {{ {} }}\n", simple_selector(element), declarations));
        }
    }

    fn collect_shadow_styles(&self, styles: &mut String) {
        for shadow in self.document.shadow_roots() {
            let shadow_styles: Vec<String> = shadow
                .descendants()
                .filter(|e| e.is_tag("style"))
                .map(ElementNode::text_content)
                .collect();
            if shadow_styles.is_empty() {
                continue;
            }

            styles.push('\n');
            styles.push_str(SHADOW_STYLES_HEADER);
            styles.push('\n');
            for text in shadow_styles {
                styles.push_str(&text);
                styles.push('\n');
            }
        }
    }
}

/// Flatten `document` with the default options
pub fn build_snapshot(document: &PageDocument) -> Snapshot {
    SnapshotBuilder::new(document).build()
}

/// The aggregated `<style>` text under construction
#[derive(Default)]
struct StyleBlock {
    /// `@import` rules that could not be inlined; they must lead the block
    imports: Vec<String>,
    body: String,
    links: Vec<String>,
    visited: HashSet<SheetId>,
}

impl StyleBlock {
    fn hoist(&mut self, import: String) {
        if !self.imports.contains(&import) {
            self.imports.push(import);
        }
    }

    fn finish(&self) -> String {
        let mut styles = String::new();
        for import in &self.imports {
            styles.push_str(import);
            styles.push('\n');
        }
        styles.push_str(&self.body);
        styles
    }
}

fn preserve_link(sheet: &StyleSheet, links: &mut Vec<String>) {
    if let Some(href) = &sheet.href {
        if !links.contains(href) {
            links.push(href.clone());
        }
    }
}

/// Index of the `<head>` among the root's children, inserting an empty one first if missing
fn ensure_head(root: &mut ElementNode) -> usize {
    let existing = root
        .children
        .iter()
        .position(|child| child.as_element().is_some_and(|e| e.is_tag("head")));
    existing.unwrap_or_else(|| {
        root.children.insert(0, Node::Element(ElementNode::new("head")));
        0
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{ShadowRoot, html_skeleton};

    const PAGE: &str = "https://example.com/articles/1";

    fn count(haystack: &str, needle: &str) -> usize {
        haystack.matches(needle).count()
    }

    #[test]
    fn test_snapshot_prefix_and_base() {
        let doc = PageDocument::new(PAGE, html_skeleton(vec![], vec![]));
        let snapshot = build_snapshot(&doc);

        assert!(snapshot.as_str().starts_with("<!DOCTYPE html>\n<html>"));
        assert!(snapshot.as_str().contains("<head><base href=\"https://example.com/articles/1\"></head>"));
        assert_eq!(count(snapshot.as_str(), "<base"), 1);
    }

    #[test]
    fn test_existing_base_is_replaced() {
        let head = vec![ElementNode::new("base").with_attribute("href", "/other/").into()];
        let doc = PageDocument::new(PAGE, html_skeleton(head, vec![]));
        let snapshot = build_snapshot(&doc);

        assert_eq!(count(snapshot.as_str(), "<base"), 1);
        assert!(!snapshot.as_str().contains("/other/"));
    }

    #[test]
    fn test_missing_head_is_created() {
        let root = ElementNode::new("html").with_child(ElementNode::new("body"));
        let doc = PageDocument::new(PAGE, root);
        let snapshot = build_snapshot(&doc);

        assert!(snapshot.as_str().contains("<html><head><base"));
    }

    #[test]
    fn test_source_document_is_not_mutated() {
        let head = vec![ElementNode::new("style").with_text("p { color: blue; }").into()];
        let doc = PageDocument::new(PAGE, html_skeleton(head, vec![]))
            .with_stylesheet(StyleSheet::inline(0, vec![CssRule::plain("p { color: blue; }")]));
        let before = doc.clone();

        let _ = build_snapshot(&doc);
        assert_eq!(doc, before);
    }

    #[test]
    fn test_style_element_rules_appear_once() {
        let head = vec![ElementNode::new("style").with_text("p { color: blue; }").into()];
        let doc = PageDocument::new(PAGE, html_skeleton(head, vec![]))
            .with_stylesheet(StyleSheet::inline(0, vec![CssRule::plain("p { color: blue; }")]));
        let snapshot = build_snapshot(&doc);

        assert_eq!(count(snapshot.as_str(), "p { color: blue; }"), 1);
        assert_eq!(count(snapshot.as_str(), "<style>"), 1);
    }

    #[test]
    fn test_inaccessible_same_origin_sheet_keeps_link() {
        let href = "https://example.com/locked.css";
        let doc = PageDocument::new(PAGE, html_skeleton(vec![], vec![]))
            .with_stylesheet(StyleSheet::linked(0, href, None));
        let snapshot = build_snapshot(&doc);

        assert!(snapshot.as_str().contains(&format!("<link rel=\"stylesheet\" href=\"{}\">", href)));
    }

    #[test]
    fn test_inline_policy_uses_fetched_body() {
        let href = "https://cdn.example.net/theme.css";
        let doc = PageDocument::new(PAGE, html_skeleton(vec![], vec![]))
            .with_stylesheet(StyleSheet::linked(0, href, None))
            .with_stylesheet(StyleSheet::linked(1, "https://cdn.example.net/down.css", None));
        let fetched = HashMap::from([(href.to_string(), ".theme { color: teal; }".to_string())]);

        let snapshot = SnapshotBuilder::new(&doc)
            .with_options(SnapshotOptions::new().cross_origin(CrossOriginPolicy::Inline))
            .with_fetched(fetched)
            .build();

        assert!(snapshot.as_str().contains(".theme { color: teal; }"));
        assert!(!snapshot.as_str().contains("href=\"https://cdn.example.net/theme.css\""));
        assert!(snapshot.as_str().contains("href=\"https://cdn.example.net/down.css\""));
    }

    #[test]
    fn test_inline_style_attribute_with_class() {
        let body = vec![ElementNode::new("div")
            .with_attribute("class", "banner big")
            .with_attribute("style", " margin: 0 ")
            .into()];
        let doc = PageDocument::new(PAGE, html_skeleton(vec![], body));
        let snapshot = build_snapshot(&doc);

        assert!(snapshot.as_str().contains(INLINE_STYLES_HEADER));
        assert!(snapshot.as_str().contains(".banner { margin: 0 }"));
    }

    #[test]
    fn test_nested_shadow_styles() {
        let inner = ElementNode::new("x-inner").with_shadow_root(ShadowRoot::new(vec![
            ElementNode::new("style").with_text(".inner { color: red; }").into(),
        ]));
        let outer = ElementNode::new("x-outer").with_shadow_root(ShadowRoot::new(vec![
            ElementNode::new("div").with_child(inner).into(),
        ]));
        let doc = PageDocument::new(PAGE, html_skeleton(vec![], vec![outer.into()]));
        let snapshot = build_snapshot(&doc);

        // the outer tree has no <style> of its own
        assert_eq!(count(snapshot.as_str(), SHADOW_STYLES_HEADER), 1);
        assert!(snapshot.as_str().contains(".inner { color: red; }"));
    }

    fn style_block(snapshot: &Snapshot) -> &str {
        let text = snapshot.as_str();
        let start = text.rfind("<style>").map(|i| i + "<style>".len()).unwrap_or(0);
        let end = text.rfind("</style>").unwrap_or(text.len());
        &text[start..end]
    }

    #[test]
    fn test_imports_expand_once_and_never_follow_rules() {
        let head = vec![ElementNode::new("style").with_text("h1 { color: red; }").into()];
        let doc = PageDocument::new(PAGE, html_skeleton(head, vec![]))
            .with_stylesheet(StyleSheet::inline(0, vec![CssRule::plain("h1 { color: red; }")]))
            .with_stylesheet(StyleSheet::linked(
                1,
                "https://example.com/main.css",
                Some(vec![
                    CssRule::import("https://example.com/reset.css", Some(SheetId(2))),
                    CssRule::plain(".main { display: grid; }"),
                ]),
            ))
            .with_stylesheet(StyleSheet::imported(
                2,
                "https://example.com/reset.css",
                Some(vec![CssRule::plain("* { box-sizing: border-box; }")]),
            ))
            .with_stylesheet(StyleSheet::linked(
                3,
                "https://example.com/extra.css",
                Some(vec![
                    CssRule::import("https://example.com/reset.css", Some(SheetId(2))),
                    CssRule::import("https://fonts.example.org/face.css", Some(SheetId(4))),
                    CssRule::import("https://example.com/gone.css", None),
                ]),
            ))
            .with_stylesheet(StyleSheet::imported(4, "https://fonts.example.org/face.css", None));
        let snapshot = build_snapshot(&doc);
        let styles = style_block(&snapshot);

        assert_eq!(count(styles, "* { box-sizing: border-box; }"), 1);
        assert!(styles.find("* { box-sizing").unwrap() < styles.find(".main").unwrap());
        assert!(styles.starts_with(
            "@import url(\"https://fonts.example.org/face.css\");\n\
             @import url(\"https://example.com/gone.css\");\n"
        ));

        let first_rule = styles.find('{').unwrap();
        assert!(!styles[first_rule..].contains("@import"));
    }

    #[test]
    fn test_import_cycle_terminates() {
        let doc = PageDocument::new(PAGE, html_skeleton(vec![], vec![]))
            .with_stylesheet(StyleSheet::linked(
                0,
                "https://example.com/a.css",
                Some(vec![
                    CssRule::import("https://example.com/b.css", Some(SheetId(1))),
                    CssRule::plain(".a { order: 1; }"),
                ]),
            ))
            .with_stylesheet(StyleSheet::imported(
                1,
                "https://example.com/b.css",
                Some(vec![
                    CssRule::import("https://example.com/a.css", Some(SheetId(0))),
                    CssRule::plain(".b { order: 2; }"),
                ]),
            ));
        let snapshot = build_snapshot(&doc);

        assert_eq!(count(snapshot.as_str(), ".a { order: 1; }"), 1);
        assert_eq!(count(snapshot.as_str(), ".b { order: 2; }"), 1);
    }

    #[test]
    fn test_linked_sheet_urls_resolve_against_sheet() {
        let doc = PageDocument::new(PAGE, html_skeleton(vec![], vec![])).with_stylesheet(StyleSheet::linked(
            0,
            "https://example.com/static/css/site.css",
            Some(vec![CssRule::plain(".logo { background: url(\"../img/logo.png\"); }")]),
        ));
        let snapshot = build_snapshot(&doc);

        assert!(snapshot.as_str().contains("url(\"https://example.com/static/img/logo.png\")"));
    }

    #[test]
    fn test_inlined_fetched_sheet_is_rebased_and_imports_hoisted() {
        let href = "https://cdn.example.net/css/theme.css";
        let head = vec![ElementNode::new("style").with_text("p { margin: 0; }").into()];
        let doc = PageDocument::new(PAGE, html_skeleton(head, vec![]))
            .with_stylesheet(StyleSheet::inline(0, vec![CssRule::plain("p { margin: 0; }")]))
            .with_stylesheet(StyleSheet::linked(1, href, None));
        let fetched = HashMap::from([(
            href.to_string(),
            "@import \"base.css\";\n@font-face { src: url(fonts/a.woff2); }".to_string(),
        )]);

        let snapshot = SnapshotBuilder::new(&doc)
            .with_options(SnapshotOptions::new().cross_origin(CrossOriginPolicy::Inline))
            .with_fetched(fetched)
            .build();
        let styles = style_block(&snapshot);

        assert!(styles.contains("url(\"https://cdn.example.net/css/fonts/a.woff2\")"));
        assert!(styles.starts_with("@import url(\"https://cdn.example.net/css/base.css\");\n"));
        assert_eq!(count(styles, "@import"), 1);
    }

    #[test]
    fn test_template_content_is_not_styled() {
        let template = ElementNode::new("template").with_template_content(vec![
            ElementNode::new("style").with_text(".tpl-only { display: none; }").into(),
            ElementNode::new("div")
                .with_attribute("id", "t")
                .with_attribute("style", "color: blue")
                .into(),
        ]);
        let doc = PageDocument::new(PAGE, html_skeleton(vec![], vec![template.into()]));
        let snapshot = build_snapshot(&doc);

        assert!(snapshot.as_str().contains(
            "<template><style>.tpl-only { display: none; }</style>\
             <div id=\"t\" style=\"color: blue\"></div></template>"
        ));
        assert!(!snapshot.as_str().contains(INLINE_STYLES_HEADER));
        assert_eq!(count(snapshot.as_str(), ".tpl-only"), 1);
    }
}
