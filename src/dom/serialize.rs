//! HTML serialization of the page tree through html5ever's `outerHTML` serializer.
//!
//! Shadow roots are not serialized, matching what `outerHTML` produces for
//! imperatively attached shadow trees. Template content is written as the
//! template's markup.

use crate::dom::element::{ElementNode, Node};
use html5ever::serialize::{Serialize, SerializeOpts, Serializer, TraversalScope, serialize};
use html5ever::{LocalName, Namespace, QualName, namespace_url, ns};
use std::io;

/// Serialize an element and its subtree
pub fn outer_html(element: &ElementNode) -> String {
    let mut buffer = Vec::new();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };

    if let Err(e) = serialize(&mut buffer, &HtmlNode::root(element), opts) {
        log::warn!("Failed to serialize <{}>: {}", element.tag_name, e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// An element paired with the namespace it lives in. The probe records tag
/// names only, so the namespace is derived from the ancestors the way the
/// HTML parser assigns it.
struct HtmlNode<'a> {
    element: &'a ElementNode,
    namespace: Namespace,
}

impl<'a> HtmlNode<'a> {
    fn root(element: &'a ElementNode) -> Self {
        Self {
            element,
            namespace: namespace_in_html(element),
        }
    }

    fn name(&self) -> QualName {
        QualName::new(None, self.namespace.clone(), LocalName::from(self.element.tag_name.as_str()))
    }

    fn children(&self) -> &'a [Node] {
        self.element
            .template_content
            .as_deref()
            .unwrap_or(&self.element.children)
    }

    fn child(&self, element: &'a ElementNode) -> HtmlNode<'a> {
        let in_html = self.namespace == ns!(html)
            || (self.namespace == ns!(svg) && self.element.is_tag("foreignObject"));
        let namespace = if in_html {
            namespace_in_html(element)
        } else {
            self.namespace.clone()
        };
        HtmlNode { element, namespace }
    }
}

fn namespace_in_html(element: &ElementNode) -> Namespace {
    if element.is_tag("svg") {
        ns!(svg)
    } else if element.is_tag("math") {
        ns!(mathml)
    } else {
        ns!(html)
    }
}

impl Serialize for HtmlNode<'_> {
    fn serialize<S>(&self, serializer: &mut S, traversal_scope: TraversalScope) -> io::Result<()>
    where
        S: Serializer,
    {
        let include_node = matches!(traversal_scope, TraversalScope::IncludeNode);
        let name = self.name();

        if include_node {
            let attributes: Vec<(QualName, &str)> = self
                .element
                .attributes
                .iter()
                .map(|(key, value)| (QualName::new(None, ns!(), LocalName::from(key.as_str())), value.as_str()))
                .collect();
            serializer.start_elem(name.clone(), attributes.iter().map(|(key, value)| (key, *value)))?;
        }

        for child in self.children() {
            match child {
                Node::Element(element) => self.child(element).serialize(serializer, TraversalScope::IncludeNode)?,
                Node::Text { text } => serializer.write_text(text)?,
                Node::Comment { text } => serializer.write_comment(text)?,
            }
        }

        if include_node {
            serializer.end_elem(name)?;
        }
        Ok(())
    }
}
