//! Node types for the document tree.

use crate::Data;

/// A node in the document tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Node variant and its variant-specific fields.
    pub kind: NodeKind,
    /// Child nodes (empty for literal and void nodes).
    pub children: Vec<Node>,
    /// Source location, present for every parsed node.
    pub position: Option<Position>,
    /// Render hints attached by transforms.
    pub data: Data,
}

/// Node variant.
///
/// Field names follow the markdown syntax tree vocabulary: `url` on media and
/// links, `identifier`/`label` on reference variants and definitions.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Root,
    Paragraph,
    Heading {
        depth: u8,
    },
    Blockquote,
    List {
        ordered: bool,
        start: Option<u64>,
    },
    ListItem,
    Table,
    TableRow,
    TableCell,
    Code {
        lang: Option<String>,
        value: String,
    },
    Html {
        value: String,
    },
    ThematicBreak,
    Text {
        value: String,
    },
    Emphasis,
    Strong,
    Delete,
    InlineCode {
        value: String,
    },
    Break,
    Image {
        url: String,
        alt: String,
        title: Option<String>,
    },
    Link {
        url: String,
        title: Option<String>,
    },
    /// An image that refers to a [`NodeKind::Definition`] by label.
    ImageReference {
        identifier: String,
        label: String,
        alt: String,
        reference_type: ReferenceType,
    },
    /// A link that refers to a [`NodeKind::Definition`] by label.
    LinkReference {
        identifier: String,
        label: String,
        reference_type: ReferenceType,
    },
    /// A link reference definition (`[label]: url "title"`).
    Definition {
        identifier: String,
        label: String,
        url: String,
        title: Option<String>,
    },
}

/// Fieldless discriminant of [`NodeKind`].
///
/// Used wherever behaviour is keyed on the variant alone, such as converter
/// handler tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeType {
    Root,
    Paragraph,
    Heading,
    Blockquote,
    List,
    ListItem,
    Table,
    TableRow,
    TableCell,
    Code,
    Html,
    ThematicBreak,
    Text,
    Emphasis,
    Strong,
    Delete,
    InlineCode,
    Break,
    Image,
    Link,
    ImageReference,
    LinkReference,
    Definition,
}

/// How a reference names its definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceType {
    /// `![alt]`
    Shortcut,
    /// `![alt][]`
    Collapsed,
    /// `![alt][label]`
    Full,
}

/// A place in the source text. Line and column are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub line: usize,
    pub column: usize,
    /// Byte offset into the source.
    pub offset: usize,
}

/// Source range covered by a node. `end` points just past the last character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub start: Point,
    pub end: Point,
}

impl Point {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }

    /// Whether two points name the same line and column.
    pub fn same_place(&self, other: &Point) -> bool {
        self.line == other.line && self.column == other.column
    }
}

impl Position {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }
}

impl Node {
    /// Create a new node with the given kind.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
            position: None,
            data: Data::default(),
        }
    }

    /// Add a child node.
    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Add multiple child nodes.
    pub fn children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    /// Set the source position.
    pub fn at(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    /// Set the render hints.
    pub fn with_data(mut self, data: Data) -> Self {
        self.data = data;
        self
    }

    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }

    /// The URL of a URL-bearing node (image, link or definition).
    pub fn url(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Image { url, .. }
            | NodeKind::Link { url, .. }
            | NodeKind::Definition { url, .. } => Some(url),
            _ => None,
        }
    }

    pub fn url_mut(&mut self) -> Option<&mut String> {
        match &mut self.kind {
            NodeKind::Image { url, .. }
            | NodeKind::Link { url, .. }
            | NodeKind::Definition { url, .. } => Some(url),
            _ => None,
        }
    }

    /// The value of a text node.
    pub fn text_value(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text { value } => Some(value),
            _ => None,
        }
    }

    pub fn text_value_mut(&mut self) -> Option<&mut String> {
        match &mut self.kind {
            NodeKind::Text { value } => Some(value),
            _ => None,
        }
    }

    /// Concatenated text content of this node and its descendants.
    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

fn collect_text(node: &Node, out: &mut String) {
    match &node.kind {
        NodeKind::Text { value } | NodeKind::InlineCode { value } => out.push_str(value),
        NodeKind::Image { alt, .. } | NodeKind::ImageReference { alt, .. } => out.push_str(alt),
        _ => {}
    }
    for child in &node.children {
        collect_text(child, out);
    }
}

impl NodeKind {
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeKind::Root => NodeType::Root,
            NodeKind::Paragraph => NodeType::Paragraph,
            NodeKind::Heading { .. } => NodeType::Heading,
            NodeKind::Blockquote => NodeType::Blockquote,
            NodeKind::List { .. } => NodeType::List,
            NodeKind::ListItem => NodeType::ListItem,
            NodeKind::Table => NodeType::Table,
            NodeKind::TableRow => NodeType::TableRow,
            NodeKind::TableCell => NodeType::TableCell,
            NodeKind::Code { .. } => NodeType::Code,
            NodeKind::Html { .. } => NodeType::Html,
            NodeKind::ThematicBreak => NodeType::ThematicBreak,
            NodeKind::Text { .. } => NodeType::Text,
            NodeKind::Emphasis => NodeType::Emphasis,
            NodeKind::Strong => NodeType::Strong,
            NodeKind::Delete => NodeType::Delete,
            NodeKind::InlineCode { .. } => NodeType::InlineCode,
            NodeKind::Break => NodeType::Break,
            NodeKind::Image { .. } => NodeType::Image,
            NodeKind::Link { .. } => NodeType::Link,
            NodeKind::ImageReference { .. } => NodeType::ImageReference,
            NodeKind::LinkReference { .. } => NodeType::LinkReference,
            NodeKind::Definition { .. } => NodeType::Definition,
        }
    }
}

impl NodeType {
    /// Every node type, in declaration order.
    pub const ALL: [NodeType; 23] = [
        NodeType::Root,
        NodeType::Paragraph,
        NodeType::Heading,
        NodeType::Blockquote,
        NodeType::List,
        NodeType::ListItem,
        NodeType::Table,
        NodeType::TableRow,
        NodeType::TableCell,
        NodeType::Code,
        NodeType::Html,
        NodeType::ThematicBreak,
        NodeType::Text,
        NodeType::Emphasis,
        NodeType::Strong,
        NodeType::Delete,
        NodeType::InlineCode,
        NodeType::Break,
        NodeType::Image,
        NodeType::Link,
        NodeType::ImageReference,
        NodeType::LinkReference,
        NodeType::Definition,
    ];

    /// Syntax-tree name of the node type (e.g. `imageReference`).
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Root => "root",
            NodeType::Paragraph => "paragraph",
            NodeType::Heading => "heading",
            NodeType::Blockquote => "blockquote",
            NodeType::List => "list",
            NodeType::ListItem => "listItem",
            NodeType::Table => "table",
            NodeType::TableRow => "tableRow",
            NodeType::TableCell => "tableCell",
            NodeType::Code => "code",
            NodeType::Html => "html",
            NodeType::ThematicBreak => "thematicBreak",
            NodeType::Text => "text",
            NodeType::Emphasis => "emphasis",
            NodeType::Strong => "strong",
            NodeType::Delete => "delete",
            NodeType::InlineCode => "inlineCode",
            NodeType::Break => "break",
            NodeType::Image => "image",
            NodeType::Link => "link",
            NodeType::ImageReference => "imageReference",
            NodeType::LinkReference => "linkReference",
            NodeType::Definition => "definition",
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
