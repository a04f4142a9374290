//! The HTML tree produced by the converter.

use folio_core::{PropValue, Properties};

/// Property holding the class list of an element. Serialized as `class`.
pub const CLASS_NAME: &str = "className";

/// A node in the output HTML tree.
#[derive(Debug, Clone, PartialEq)]
pub enum HtmlNode {
    Element(Element),
    /// Text, escaped on output.
    Text(String),
    /// Markup passed through verbatim.
    Raw(String),
}

/// An HTML element.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub properties: Properties,
    pub children: Vec<HtmlNode>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            properties: Properties::new(),
            children: Vec::new(),
        }
    }

    /// Set a property.
    pub fn prop(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.properties.set(key, value);
        self
    }

    /// Add child nodes.
    pub fn children(mut self, children: impl IntoIterator<Item = HtmlNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Append classes to the class list.
    pub fn add_classes<'a>(&mut self, classes: impl IntoIterator<Item = &'a String>) {
        let mut added = classes
            .into_iter()
            .map(|c| PropValue::String(c.clone()))
            .peekable();
        if added.peek().is_none() {
            return;
        }
        match self.properties.get_mut(CLASS_NAME) {
            Some(PropValue::List(existing)) => existing.extend(added),
            _ => self.properties.set(CLASS_NAME, PropValue::List(added.collect())),
        }
    }

    /// The class list, in order.
    pub fn class_names(&self) -> Vec<&str> {
        match self.properties.get(CLASS_NAME) {
            Some(PropValue::List(items)) => items
                .iter()
                .filter_map(|v| match v {
                    PropValue::String(s) => Some(s.as_str()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl From<Element> for HtmlNode {
    fn from(element: Element) -> Self {
        HtmlNode::Element(element)
    }
}
