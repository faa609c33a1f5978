use crate::capture::snapshot::INLINE_STYLES_HEADER;
use crate::dom::{CssRule, PageDocument, SheetId, StyleSheet, compound_selector, outer_html};
use log::debug;
use std::collections::HashSet;

const INACCESSIBLE_COMMENT: &str = "/* Cross-origin stylesheet: rules are not accessible */";
const INDENT: &str = "  ";

/// The page's root element serialized as-is, without any flattening
pub fn extract_html(document: &PageDocument) -> String {
    outer_html(&document.root)
}

/// A CSS-only report of every stylesheet on the page.
///
/// `@import` rules are expanded in place, one indent level deeper per import.
/// Each sheet is expanded at most once, keyed by [`SheetId`], so import cycles
/// terminate.
pub fn extract_css(document: &PageDocument) -> String {
    let mut report = CssReport {
        document,
        visited: HashSet::new(),
        out: String::new(),
    };

    for sheet in document.top_level_sheets() {
        report.write_sheet(sheet, 0);
    }
    report.write_inline_styles();

    debug!("CSS report covers {} stylesheets", report.visited.len());
    report.out
}

struct CssReport<'a> {
    document: &'a PageDocument,
    visited: HashSet<SheetId>,
    out: String,
}

impl<'a> CssReport<'a> {
    fn line(&mut self, depth: usize, text: &str) {
        for _ in 0..depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn write_sheet(&mut self, sheet: &'a StyleSheet, depth: usize) {
        let document = self.document;
        if !self.visited.insert(sheet.id) {
            self.line(depth, &format!("/* Already included: {} */", sheet.source_label()));
            return;
        }

        self.line(depth, &format!("/* Stylesheet: {} */", sheet.source_label()));

        let rules = match (&sheet.rules, document.is_readable(sheet)) {
            (Some(rules), true) => rules,
            _ => {
                self.line(depth, INACCESSIBLE_COMMENT);
                self.out.push('\n');
                return;
            }
        };

        for rule in rules {
            match rule {
                CssRule::Import { sheet: Some(id), .. } => match document.sheet(*id) {
                    Some(imported) => self.write_sheet(imported, depth + 1),
                    None => self.line(depth, rule.css_text()),
                },
                _ => self.line(depth, rule.css_text()),
            }
        }
        self.out.push('\n');
    }

    fn write_inline_styles(&mut self) {
        let rules: Vec<String> = self
            .document
            .elements()
            .filter_map(|element| {
                let declarations = element.get_attribute("style")?;
                Some(format!("{} {{ {} }}", compound_selector(element), declarations.trim()))
            })
            .collect();
        if rules.is_empty() {
            return;
        }

        self.line(0, INLINE_STYLES_HEADER);
        for rule in rules {
            self.line(0, &rule);
        }
    }
}
