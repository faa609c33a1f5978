use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A node in the page tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Element(ElementNode),
    Text { text: String },
    Comment { text: String },
}

impl Node {
    /// Create a text node
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text { text: text.into() }
    }

    /// Create a comment node
    pub fn comment(text: impl Into<String>) -> Self {
        Node::Comment { text: text.into() }
    }

    pub fn as_element(&self) -> Option<&ElementNode> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut ElementNode> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }
}

impl From<ElementNode> for Node {
    fn from(element: ElementNode) -> Self {
        Node::Element(element)
    }
}

/// An open shadow root attached to a host element
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ShadowRoot {
    #[serde(default)]
    pub children: Vec<Node>,
}

impl ShadowRoot {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    /// Elements inside this shadow tree, in tree order, not entering nested shadow roots
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants::over(&self.children)
    }
}

/// Represents a DOM element node
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElementNode {
    /// Lowercase local name for HTML elements (e.g., "div", "style", "link")
    pub tag_name: String,

    /// Element attributes in source order
    #[serde(default)]
    pub attributes: IndexMap<String, String>,

    /// Child nodes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,

    /// Open shadow root hosted by this element
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow_root: Option<ShadowRoot>,

    /// Inert content of a `<template>`. Serialized as the element's markup but
    /// never walked as part of the live page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_content: Option<Vec<Node>>,
}

impl ElementNode {
    /// Create a new ElementNode
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
            shadow_root: None,
            template_content: None,
        }
    }

    /// Builder method: add an attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_attribute(key, value);
        self
    }

    /// Builder method: append a text child
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::text(text));
        self
    }

    /// Builder method: append an element child
    pub fn with_child(mut self, child: ElementNode) -> Self {
        self.add_child(child);
        self
    }

    /// Builder method: set children
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    /// Builder method: attach an open shadow root
    pub fn with_shadow_root(mut self, shadow_root: ShadowRoot) -> Self {
        self.shadow_root = Some(shadow_root);
        self
    }

    /// Builder method: set the inert content of a `<template>`
    pub fn with_template_content(mut self, content: Vec<Node>) -> Self {
        self.template_content = Some(content);
        self
    }

    /// Add a single attribute
    pub fn add_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Add a child element
    pub fn add_child(&mut self, child: ElementNode) {
        self.children.push(Node::Element(child));
    }

    /// Get attribute value by key
    pub fn get_attribute(&self, key: &str) -> Option<&String> {
        self.attributes.get(key)
    }

    /// Check if element has a specific class
    pub fn has_class(&self, class_name: &str) -> bool {
        self.classes().any(|c| c == class_name)
    }

    /// Class tokens in attribute order
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .get("class")
            .map(|classes| classes.split_whitespace())
            .into_iter()
            .flatten()
    }

    /// Get element ID, ignoring an empty attribute
    pub fn id(&self) -> Option<&String> {
        self.attributes.get("id").filter(|id| !id.is_empty())
    }

    /// Check if element is a specific tag
    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag_name.eq_ignore_ascii_case(tag)
    }

    /// Whether this is a `<link>` whose `rel` list contains `stylesheet`
    pub fn is_stylesheet_link(&self) -> bool {
        self.is_tag("link")
            && self
                .get_attribute("rel")
                .is_some_and(|rel| rel.split_whitespace().any(|r| r.eq_ignore_ascii_case("stylesheet")))
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        let mut stack: Vec<&Node> = self.children.iter().rev().collect();
        while let Some(node) = stack.pop() {
            match node {
                Node::Text { text: t } => text.push_str(t),
                Node::Element(element) => stack.extend(element.children.iter().rev()),
                Node::Comment { .. } => {}
            }
        }
        text
    }

    /// Direct element children
    pub fn child_elements(&self) -> impl Iterator<Item = &ElementNode> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// First direct child element with the given tag
    pub fn find_child(&self, tag: &str) -> Option<&ElementNode> {
        self.child_elements().find(|child| child.is_tag(tag))
    }

    /// This element and all its light-DOM descendants in tree order, skipping template content
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Remove every light-DOM descendant element matching `predicate`, returning how many were removed
    pub fn remove_descendants<F>(&mut self, predicate: F) -> usize
    where
        F: Fn(&ElementNode) -> bool,
    {
        let mut removed = 0;
        let mut stack: Vec<&mut ElementNode> = vec![self];
        while let Some(element) = stack.pop() {
            let before = element.children.len();
            element
                .children
                .retain(|child| !child.as_element().is_some_and(|e| predicate(e)));
            removed += before - element.children.len();
            stack.extend(element.children.iter_mut().filter_map(Node::as_element_mut));
        }
        removed
    }
}

/// Pre-order iterator over light-DOM elements
pub struct Descendants<'a> {
    stack: Vec<&'a ElementNode>,
}

impl<'a> Descendants<'a> {
    fn over(nodes: &'a [Node]) -> Self {
        Self {
            stack: nodes.iter().rev().filter_map(Node::as_element).collect(),
        }
    }
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a ElementNode;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        self.stack
            .extend(element.children.iter().rev().filter_map(Node::as_element));
        Some(element)
    }
}
