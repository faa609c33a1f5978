//! Best-effort selectors for re-attaching inline `style` attributes as rules.
//!
//! Neither form is guaranteed to be unique in the page; the output is an
//! export artifact meant to be read, not a precise re-application target.

use crate::dom::element::ElementNode;

/// One identifying feature: `#id`, else `.first-class`, else the lowercase tag name
pub fn simple_selector(element: &ElementNode) -> String {
    if let Some(id) = element.id() {
        return format!("#{}", id);
    }

    if let Some(class) = element.classes().next() {
        return format!(".{}", class);
    }

    element.tag_name.to_lowercase()
}

/// Tag, id and every class combined, e.g. `div#main.card.wide`
pub fn compound_selector(element: &ElementNode) -> String {
    let mut selector = element.tag_name.to_lowercase();

    if let Some(id) = element.id() {
        selector.push('#');
        selector.push_str(id);
    }

    for class in element.classes() {
        selector.push('.');
        selector.push_str(class);
    }

    selector
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_selector_prefers_id() {
        let element = ElementNode::new("DIV")
            .with_attribute("id", "main")
            .with_attribute("class", "card wide");
        assert_eq!(simple_selector(&element), "#main");
    }

    #[test]
    fn test_simple_selector_first_class() {
        let element = ElementNode::new("div").with_attribute("class", "  card   wide ");
        assert_eq!(simple_selector(&element), ".card");
    }

    #[test]
    fn test_simple_selector_falls_back_to_tag() {
        let element = ElementNode::new("SECTION").with_attribute("class", "   ");
        assert_eq!(simple_selector(&element), "section");
    }

    #[test]
    fn test_compound_selector() {
        let element = ElementNode::new("div")
            .with_attribute("id", "main")
            .with_attribute("class", "card wide");
        assert_eq!(compound_selector(&element), "div#main.card.wide");

        assert_eq!(compound_selector(&ElementNode::new("P")), "p");
    }
}
