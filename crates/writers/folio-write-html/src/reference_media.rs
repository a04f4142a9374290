//! Image references that inherit render hints from their definition.
//!
//! Transforms can put render hints on a definition node, such as the video
//! tag chosen from the definition's URL. The baseline image reference
//! handler ignores them; this one applies them first and then lets the
//! occurrence override.

use folio_core::{Node, NodeKind};

use crate::handlers::{State, reference_image, revert};
use crate::hast::HtmlNode;

/// Convert an image reference using definition and occurrence render hints.
///
/// Scalar hints on the occurrence win over the definition; class lists from
/// both are kept, definition classes first. An unknown label reverts to the
/// literal markdown.
pub fn image_reference(state: &mut State<'_>, node: &Node) -> Vec<HtmlNode> {
    let NodeKind::ImageReference { identifier, alt, .. } = &node.kind else {
        return Vec::new();
    };
    let Some(def) = state.definitions.get(identifier) else {
        tracing::trace!(%identifier, "image reference without definition");
        return revert(state, node);
    };

    let img = reference_image(&def.url, alt, def.title.as_deref());
    let img = state.apply_data(&def.data, img);
    vec![state.apply_data(&node.data, img).into()]
}
