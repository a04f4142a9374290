//! Attribute shorthand for media and links.
//!
//! A `{...}` block written directly after an image, image reference, link or
//! link reference attaches classes, properties and flags to that element:
//!
//! ```text
//! ![](cat.png){.w-96 .rounded height=100 loading="lazy" autoplay}
//! ```
//!
//! The block is parsed into [`Attributes`], merged into the element's
//! [`Data`], and removed from the following text node.

use folio_core::{
    ConversionResult, Data, Document, Node, NodeType, Properties, TransformError, Transformer,
};
use once_cell::sync::Lazy;
use regex::Regex;

static BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\{(.*?)\}").unwrap());
static CLASS_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\.[A-Za-z0-9_./-]+").unwrap());
static PAIR_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^=]+=[^=]+$").unwrap());
static PAIR_PARTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(?P<key>[^=]+)=(?:['"]+)?(?P<val>[^=]+?)(?:['"]+)?$"#).unwrap()
});

/// Node types an attribute block may attach to.
const ACCEPTS_ATTRIBUTES: [NodeType; 4] = [
    NodeType::Image,
    NodeType::ImageReference,
    NodeType::Link,
    NodeType::LinkReference,
];

/// Parsed contents of one attribute block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    /// Class names without the leading dot, in source order.
    pub classes: Vec<String>,
    /// `key=value` pairs and bare flags (`true`).
    pub properties: Properties,
}

impl Attributes {
    /// Convert into render hints for merging into a node.
    pub fn into_data(self) -> Data {
        Data {
            h_name: None,
            classes: self.classes,
            properties: self.properties,
        }
    }
}

/// Parse the text inside an attribute block.
///
/// Returns `None` when the block holds no tokens at all.
pub fn parse_attributes(inner: &str) -> Option<Attributes> {
    let mut tokens = inner.split_whitespace().peekable();
    tokens.peek()?;

    let mut attrs = Attributes::default();
    for token in tokens {
        if CLASS_TOKEN.is_match(token) {
            attrs.classes.push(token[1..].to_string());
        } else if PAIR_TOKEN.is_match(token)
            && let Some(caps) = PAIR_PARTS.captures(token)
        {
            attrs.properties.set(&caps["key"], &caps["val"]);
        } else {
            attrs.properties.set(token, true);
        }
    }
    Some(attrs)
}

/// Split a leading `{...}` block off a text value.
///
/// Returns the text between the braces and the text after the closing brace.
/// The first `}` ends the block, and a block never spans a line break.
pub fn split_block(value: &str) -> Option<(&str, &str)> {
    let caps = BLOCK.captures(value)?;
    let whole = caps.get(0)?;
    let inner = caps.get(1)?;
    Some((inner.as_str(), &value[whole.end()..]))
}

/// Whether a text value looks like it starts with an attribute block.
fn is_candidate(value: &str) -> bool {
    value.starts_with('{') && value.contains('}')
}

/// Attach `{...}` attribute blocks to the element immediately before them.
///
/// The block must start exactly where the previous sibling ends: any
/// whitespace or line break in between leaves the text alone.
pub struct AttachAttributes;

#[derive(Debug, PartialEq, Eq)]
enum Step {
    Kept,
    Removed,
}

impl AttachAttributes {
    /// Run the pass over a tree in place.
    pub fn apply(root: &mut Node) {
        Self::visit(root);
    }

    fn visit(node: &mut Node) {
        let mut index = 0;
        while index < node.children.len() {
            if Self::attach_at(&mut node.children, index) == Step::Removed {
                // The next sibling moved into this slot.
                continue;
            }
            if let Some(child) = node.children.get_mut(index) {
                Self::visit(child);
            }
            index += 1;
        }
    }

    fn attach_at(children: &mut Vec<Node>, index: usize) -> Step {
        if index == 0 {
            return Step::Kept;
        }
        let (before, rest) = children.split_at_mut(index);
        let (Some(prev), Some(node)) = (before.last_mut(), rest.first_mut()) else {
            return Step::Kept;
        };
        let Some(value) = node.text_value() else {
            return Step::Kept;
        };
        if !is_candidate(value) {
            return Step::Kept;
        }

        let adjacent = match (&prev.position, &node.position) {
            (Some(p), Some(n)) => p.end.same_place(&n.start),
            _ => false,
        };
        if !adjacent {
            tracing::trace!(text = value, "attribute block not adjacent to previous sibling");
            return Step::Kept;
        }
        if !ACCEPTS_ATTRIBUTES.contains(&prev.node_type()) {
            tracing::trace!(prev = %prev.node_type(), "attribute block after ineligible node");
            return Step::Kept;
        }

        let Some((inner, remaining)) = split_block(value) else {
            return Step::Kept;
        };
        let Some(attrs) = parse_attributes(inner) else {
            return Step::Kept;
        };

        tracing::debug!(
            target_type = %prev.node_type(),
            classes = ?attrs.classes,
            "attaching attributes"
        );
        let consumed = &value[..value.len() - remaining.len()];
        let consumed_chars = consumed.chars().count();
        let consumed_bytes = consumed.len();
        let remaining = remaining.to_string();

        prev.data.merge(&attrs.into_data());

        if remaining.is_empty() {
            children.remove(index);
            return Step::Removed;
        }

        if let Some(text) = node.text_value_mut() {
            *text = remaining;
        }
        if let Some(pos) = node.position.as_mut() {
            pos.start.column += consumed_chars;
            pos.start.offset += consumed_bytes;
        }
        Step::Kept
    }
}

impl Transformer for AttachAttributes {
    fn name(&self) -> &str {
        "attach_attributes"
    }

    fn transform(&self, mut doc: Document) -> Result<ConversionResult<Document>, TransformError> {
        Self::apply(&mut doc.content);
        Ok(ConversionResult::ok(doc))
    }
}
