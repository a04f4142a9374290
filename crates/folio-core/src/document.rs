//! Document type - the root node plus per-document side-channel data.

use std::collections::BTreeMap;

use crate::{Definitions, Node, NodeKind};

/// Mapping from bare filename (e.g. `cat.png`) to a fully qualified URL.
pub type FilesMap = BTreeMap<String, String>;

/// A document tree and the data transforms publish about it.
#[derive(Debug, Clone)]
pub struct Document {
    /// Root content node.
    pub content: Node,
    /// Side-channel output of transforms.
    pub data: DocumentData,
}

/// Per-document output that is not attached to any node.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct DocumentData {
    /// Author-owned files referenced in the body, keyed by filename.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub body_files_map: Option<FilesMap>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self {
            content: Node::new(NodeKind::Root),
            data: DocumentData::default(),
        }
    }

    /// Set the root content node.
    pub fn with_content(mut self, content: Node) -> Self {
        self.content = content;
        self
    }

    /// Build the definition registry from the current tree.
    pub fn definitions(&self) -> Definitions {
        Definitions::from_tree(&self.content)
    }

    /// The published body references map, if a files pass has run.
    pub fn body_files_map(&self) -> Option<&FilesMap> {
        self.data.body_files_map.as_ref()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
