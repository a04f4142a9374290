//! Render hints attached to nodes.
//!
//! Transforms record how a node should be rendered without changing what the
//! node is: an output tag override, extra CSS classes and extra attributes.
//! The converter applies these to the element it builds for the node.

/// Render hints for a single node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Data {
    /// Output tag override (e.g. `video` for an image node).
    pub h_name: Option<String>,
    /// CSS classes, in first-seen order. Empty means no class attribute.
    pub classes: Vec<String>,
    /// Extra element attributes.
    pub properties: Properties,
}

impl Data {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if no hint is set.
    pub fn is_empty(&self) -> bool {
        self.h_name.is_none() && self.classes.is_empty() && self.properties.is_empty()
    }

    /// Merge `other` into `self`.
    ///
    /// The tag override and scalar properties from `other` win; class lists
    /// are concatenated. Nothing already present is cleared.
    pub fn merge(&mut self, other: &Data) {
        if let Some(name) = &other.h_name {
            self.h_name = Some(name.clone());
        }
        self.classes.extend(other.classes.iter().cloned());
        for (key, value) in other.properties.iter() {
            self.properties.set(key.clone(), value.clone());
        }
    }

    /// Set the output tag override.
    pub fn h_name(mut self, name: impl Into<String>) -> Self {
        self.h_name = Some(name.into());
        self
    }

    /// Add a class.
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Add a property.
    pub fn prop(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.properties.set(key, value);
        self
    }
}

/// An ordered collection of properties (key-value pairs).
///
/// Insertion order is kept so output attributes are deterministic. Setting an
/// existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties(Vec<(String, PropValue)>);

/// A property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    String(String),
    Int(i64),
    Bool(bool),
    List(Vec<PropValue>),
}

impl Properties {
    /// Create an empty property set.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Set a property.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<PropValue>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    /// Get a property.
    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut PropValue> {
        self.0.iter_mut().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Get a string property.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(PropValue::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Get a boolean property.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key) {
            Some(PropValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// Check if a property exists.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Remove a property and return its value.
    pub fn remove(&mut self, key: &str) -> Option<PropValue> {
        let idx = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.remove(idx).1)
    }

    /// Iterate over properties in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &PropValue)> {
        self.0.iter().map(|(k, v)| (k, v))
    }

    /// Check if the property set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the number of properties.
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

// Conversions
impl From<String> for PropValue {
    fn from(s: String) -> Self {
        PropValue::String(s)
    }
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        PropValue::String(s.to_string())
    }
}

impl From<i64> for PropValue {
    fn from(i: i64) -> Self {
        PropValue::Int(i)
    }
}

impl From<bool> for PropValue {
    fn from(b: bool) -> Self {
        PropValue::Bool(b)
    }
}

impl From<Vec<String>> for PropValue {
    fn from(items: Vec<String>) -> Self {
        PropValue::List(items.into_iter().map(PropValue::String).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_set_replaces_in_place() {
        let mut props = Properties::new();
        props.set("width", "10");
        props.set("height", "20");
        props.set("width", "30");

        let keys: Vec<_> = props.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["width", "height"]);
        assert_eq!(props.get_str("width"), Some("30"));
    }

    #[test]
    fn test_merge_concatenates_classes() {
        let mut data = Data::new().class("a").prop("height", "100");
        let other = Data::new()
            .h_name("video")
            .class("b")
            .prop("height", "200")
            .prop("controls", true);

        data.merge(&other);

        assert_eq!(data.h_name.as_deref(), Some("video"));
        assert_eq!(data.classes, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(data.properties.get_str("height"), Some("200"));
        assert_eq!(data.properties.get_bool("controls"), Some(true));
    }

    #[test]
    fn test_merge_keeps_existing_tag() {
        let mut data = Data::new().h_name("video");
        data.merge(&Data::new().class("wide"));
        assert_eq!(data.h_name.as_deref(), Some("video"));
    }

    #[test]
    fn test_remove() {
        let mut props = Properties::new();
        props.set("autoplay", true);
        assert_eq!(props.remove("autoplay"), Some(PropValue::Bool(true)));
        assert!(props.is_empty());
        assert_eq!(props.remove("autoplay"), None);
    }
}
