//! Definition registry for label-indirected references.

use std::collections::HashMap;

use crate::{Data, Node, NodeKind};

/// A resolved link reference definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pub url: String,
    pub title: Option<String>,
    /// Render hints attached to the definition node itself.
    pub data: Data,
}

/// Definitions keyed by uppercased identifier.
#[derive(Debug, Clone, Default)]
pub struct Definitions(HashMap<String, Definition>);

impl Definitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every definition node in the tree.
    pub fn from_tree(root: &Node) -> Self {
        let mut defs = Self::new();
        collect(root, &mut defs);
        defs
    }

    /// Register a definition. The first definition for an identifier wins.
    pub fn insert(&mut self, identifier: &str, definition: Definition) {
        self.0
            .entry(identifier.to_uppercase())
            .or_insert(definition);
    }

    /// Look up a definition, ignoring case.
    pub fn get(&self, identifier: &str) -> Option<&Definition> {
        self.0.get(&identifier.to_uppercase())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn collect(node: &Node, defs: &mut Definitions) {
    if let NodeKind::Definition {
        identifier,
        url,
        title,
        ..
    } = &node.kind
    {
        defs.insert(
            identifier,
            Definition {
                url: url.clone(),
                title: title.clone(),
                data: node.data.clone(),
            },
        );
    }
    for child in &node.children {
        collect(child, defs);
    }
}

/// Normalize a reference label into an identifier.
///
/// Runs of whitespace collapse to one space, the ends are trimmed, and the
/// result is lowercased.
pub fn normalize_identifier(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
