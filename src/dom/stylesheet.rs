use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a stylesheet within one captured page.
///
/// Assigned by the page probe from the sheet object itself, so two `@import`
/// rules pointing at the same sheet share an id even when their URLs are spelled
/// differently. Sheets without a URL are numbered by document position.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct SheetId(pub usize);

impl fmt::Display for SheetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sheet#{}", self.0)
    }
}

/// What attached a stylesheet to the document
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SheetOwner {
    /// A `<style>` element
    StyleElement,
    /// A `<link rel="stylesheet">` element
    LinkElement,
    /// An `@import` rule in another sheet
    Import,
}

/// A single CSS rule as serialized by the browser
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CssRule {
    /// Any rule other than `@import` (style rules, `@media`, `@font-face`, ...)
    Plain { css_text: String },

    /// An `@import` rule, linked to the imported sheet when the browser loaded it
    Import {
        href: String,
        css_text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sheet: Option<SheetId>,
    },
}

impl CssRule {
    pub fn plain(css_text: impl Into<String>) -> Self {
        CssRule::Plain { css_text: css_text.into() }
    }

    pub fn import(href: impl Into<String>, sheet: Option<SheetId>) -> Self {
        let href = href.into();
        CssRule::Import {
            css_text: format!("@import url(\"{}\");", href),
            href,
            sheet,
        }
    }

    /// Serialized rule text
    pub fn css_text(&self) -> &str {
        match self {
            CssRule::Plain { css_text } | CssRule::Import { css_text, .. } => css_text,
        }
    }
}

/// A stylesheet attached to the page, directly or through `@import`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StyleSheet {
    pub id: SheetId,

    /// Absolute source URL; `None` for sheets defined inline by a `<style>` element
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,

    pub owner: SheetOwner,

    /// Rules, or `None` when the browser denied access to them
    #[serde(default)]
    pub rules: Option<Vec<CssRule>>,
}

impl StyleSheet {
    /// A `<style>` element sheet with readable rules
    pub fn inline(id: usize, rules: Vec<CssRule>) -> Self {
        Self {
            id: SheetId(id),
            href: None,
            owner: SheetOwner::StyleElement,
            rules: Some(rules),
        }
    }

    /// A `<link>` element sheet
    pub fn linked(id: usize, href: impl Into<String>, rules: Option<Vec<CssRule>>) -> Self {
        Self {
            id: SheetId(id),
            href: Some(href.into()),
            owner: SheetOwner::LinkElement,
            rules,
        }
    }

    /// A sheet loaded by an `@import` rule
    pub fn imported(id: usize, href: impl Into<String>, rules: Option<Vec<CssRule>>) -> Self {
        Self {
            id: SheetId(id),
            href: Some(href.into()),
            owner: SheetOwner::Import,
            rules,
        }
    }

    /// Sheets reached only through `@import` are not part of `document.styleSheets`
    pub fn is_top_level(&self) -> bool {
        self.owner != SheetOwner::Import
    }

    /// Label used in report headers: the source URL, or "inline"
    pub fn source_label(&self) -> &str {
        self.href.as_deref().unwrap_or("inline")
    }
}
