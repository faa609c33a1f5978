//! Resolving a stylesheet's relative references against its own URL.
//!
//! Rules copied out of a linked sheet end up inside the page, where relative
//! `url(...)` and `@import` references would resolve against the page `<base>`
//! instead of the sheet they came from.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use url::Url;

static URL_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"url\(\s*(?:"([^"]*)"|'([^']*)'|([^'")\s]*))\s*\)"#).expect("valid url() pattern")
});

static IMPORT_STRING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"@import\s+(?:"([^"]*)"|'([^']*)')"#).expect("valid @import pattern"));

static IMPORT_STATEMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)@import\s[^;]*;").expect("valid @import statement pattern"));

/// A stylesheet body split for inlining: `@import` statements must lead the
/// aggregated block, everything else goes where the sheet stood.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlinedSheet {
    pub imports: Vec<String>,
    pub body: String,
}

/// Rewrite relative `url(...)` and `@import "..."` references in `css` to absolute URLs.
///
/// Absolute URLs, `data:` URIs and fragment-only references are left as they are.
pub fn rebase_css(css: &str, base: &Url) -> String {
    let imports_rebased = IMPORT_STRING.replace_all(css, |caps: &Captures| {
        match first_group(caps).and_then(|reference| resolve(reference, base)) {
            Some(absolute) => format!("@import url(\"{}\")", absolute),
            None => caps[0].to_string(),
        }
    });

    URL_FUNCTION
        .replace_all(&imports_rebased, |caps: &Captures| {
            match first_group(caps).and_then(|reference| resolve(reference, base)) {
                Some(absolute) => format!("url(\"{}\")", absolute),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Rebase a fetched stylesheet against `href` and pull out its `@import` statements
pub fn inline_fetched(css: &str, href: &str) -> InlinedSheet {
    let rebased = match Url::parse(href) {
        Ok(base) => rebase_css(css, &base),
        Err(_) => css.to_string(),
    };

    let imports = IMPORT_STATEMENT
        .find_iter(&rebased)
        .map(|statement| statement.as_str().to_string())
        .collect();
    let body = IMPORT_STATEMENT.replace_all(&rebased, "").trim().to_string();

    InlinedSheet { imports, body }
}

fn first_group<'t>(caps: &Captures<'t>) -> Option<&'t str> {
    caps.get(1)
        .or_else(|| caps.get(2))
        .or_else(|| caps.get(3))
        .map(|m| m.as_str())
}

fn resolve(reference: &str, base: &Url) -> Option<String> {
    let reference = reference.trim();
    if reference.is_empty() || reference.starts_with('#') || Url::parse(reference).is_ok() {
        return None;
    }
    base.join(reference).ok().map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://cdn.example.net/css/theme.css").unwrap()
    }

    #[test]
    fn test_relative_urls_resolve_against_sheet() {
        let css = "@font-face { src: url(fonts/a.woff2); } .hero { background: url('../img/bg.png'); }";
        let rebased = rebase_css(css, &base());

        assert!(rebased.contains("url(\"https://cdn.example.net/css/fonts/a.woff2\")"));
        assert!(rebased.contains("url(\"https://cdn.example.net/img/bg.png\")"));
    }

    #[test]
    fn test_absolute_data_and_fragment_urls_untouched() {
        let css = "a { background: url(https://other.org/x.png); } b { mask: url(#clip); } \
                   c { background: url(\"data:image/png;base64,AAAA\"); }";
        assert_eq!(rebase_css(css, &base()), css);
    }

    #[test]
    fn test_import_strings_are_rebased() {
        let rebased = rebase_css("@import \"reset.css\";", &base());
        assert_eq!(rebased, "@import url(\"https://cdn.example.net/css/reset.css\");");
    }

    #[test]
    fn test_inline_fetched_hoists_imports() {
        let sheet = inline_fetched(
            "@import url(base.css) screen;\n.card { background: url(card.png); }",
            "https://cdn.example.net/css/theme.css",
        );

        assert_eq!(sheet.imports, vec!["@import url(\"https://cdn.example.net/css/base.css\") screen;"]);
        assert_eq!(sheet.body, ".card { background: url(\"https://cdn.example.net/css/card.png\"); }");
    }
}
