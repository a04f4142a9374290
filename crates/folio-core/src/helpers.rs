//! Helper functions for creating common nodes.

use crate::{Node, NodeKind, Point, Position, ReferenceType, normalize_identifier};

/// Create a root node with children.
pub fn root(children: impl IntoIterator<Item = Node>) -> Node {
    Node::new(NodeKind::Root).children(children)
}

/// Create a paragraph with children.
pub fn paragraph(children: impl IntoIterator<Item = Node>) -> Node {
    Node::new(NodeKind::Paragraph).children(children)
}

/// Create a text node.
pub fn text(value: impl Into<String>) -> Node {
    Node::new(NodeKind::Text {
        value: value.into(),
    })
}

/// Create an image with URL and alt text.
pub fn image(url: impl Into<String>, alt: impl Into<String>) -> Node {
    Node::new(NodeKind::Image {
        url: url.into(),
        alt: alt.into(),
        title: None,
    })
}

/// Create a link with URL and children.
pub fn link(url: impl Into<String>, children: impl IntoIterator<Item = Node>) -> Node {
    Node::new(NodeKind::Link {
        url: url.into(),
        title: None,
    })
    .children(children)
}

/// Create an image reference. The identifier is derived from the label.
pub fn image_reference(
    label: impl Into<String>,
    alt: impl Into<String>,
    reference_type: ReferenceType,
) -> Node {
    let label = label.into();
    Node::new(NodeKind::ImageReference {
        identifier: normalize_identifier(&label),
        label,
        alt: alt.into(),
        reference_type,
    })
}

/// Create a link reference. The identifier is derived from the label.
pub fn link_reference(
    label: impl Into<String>,
    reference_type: ReferenceType,
    children: impl IntoIterator<Item = Node>,
) -> Node {
    let label = label.into();
    Node::new(NodeKind::LinkReference {
        identifier: normalize_identifier(&label),
        label,
        reference_type,
    })
    .children(children)
}

/// Create a definition. The identifier is derived from the label.
pub fn definition(label: impl Into<String>, url: impl Into<String>, title: Option<&str>) -> Node {
    let label = label.into();
    Node::new(NodeKind::Definition {
        identifier: normalize_identifier(&label),
        label,
        url: url.into(),
        title: title.map(str::to_string),
    })
}

/// A single-line position from `start` up to (not including) `end` column.
pub fn span(line: usize, start: usize, end: usize) -> Position {
    Position::new(
        Point::new(line, start, start.saturating_sub(1)),
        Point::new(line, end, end.saturating_sub(1)),
    )
}
