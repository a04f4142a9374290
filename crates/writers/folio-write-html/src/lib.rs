//! HTML writer for folio.
//!
//! Converts the document tree to an HTML tree through a [`Handlers`] table,
//! then serializes it as HTML5.

pub mod handlers;
pub mod hast;
pub mod reference_media;
pub mod sanitize;

pub use handlers::{Handler, Handlers, State, revert};
pub use hast::{Element, HtmlNode};
pub use sanitize::normalize_uri;

use std::io::Write;

use folio_core::{ConversionResult, Document, EmitError, PropValue};

use hast::CLASS_NAME;

/// Elements that never have a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Emit a document as HTML with the baseline handlers.
pub fn emit(doc: &Document) -> Result<ConversionResult<Vec<u8>>, EmitError> {
    emit_with_handlers(doc, &Handlers::default())
}

/// Emit a document as HTML with a custom handler table.
pub fn emit_with_handlers(
    doc: &Document,
    handlers: &Handlers,
) -> Result<ConversionResult<Vec<u8>>, EmitError> {
    let converted = to_html_tree(doc, handlers);
    let html = stringify(&converted.value);
    Ok(ConversionResult::with_warnings(
        html.into_bytes(),
        converted.warnings,
    ))
}

/// Emit a document as HTML into `writer`.
pub fn emit_to<W: Write>(
    doc: &Document,
    handlers: &Handlers,
    writer: &mut W,
) -> Result<ConversionResult<()>, EmitError> {
    let converted = to_html_tree(doc, handlers);
    writer.write_all(stringify(&converted.value).as_bytes())?;
    writer.flush()?;
    Ok(ConversionResult::with_warnings((), converted.warnings))
}

/// Convert a document to an HTML tree without serializing it.
pub fn to_html_tree(doc: &Document, handlers: &Handlers) -> ConversionResult<Vec<HtmlNode>> {
    let mut state = State::new(doc.definitions(), handlers);
    let nodes = state.one(&doc.content);
    tracing::trace!(
        definitions = state.definitions.len(),
        warnings = state.warnings.len(),
        "converted document"
    );
    ConversionResult::with_warnings(nodes, state.warnings)
}

/// Serialize HTML nodes.
pub fn stringify(nodes: &[HtmlNode]) -> String {
    let mut out = String::new();
    write_nodes(nodes, &mut out);
    out
}

fn write_nodes(nodes: &[HtmlNode], out: &mut String) {
    for node in nodes {
        match node {
            HtmlNode::Element(el) => write_element(el, out),
            HtmlNode::Text(text) => out.push_str(&escape_html(text)),
            HtmlNode::Raw(raw) => out.push_str(raw),
        }
    }
}

fn write_element(el: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&el.tag);

    for (key, value) in el.properties.iter() {
        let name = if key == CLASS_NAME { "class" } else { key.as_str() };
        if !is_attr_name(name) {
            tracing::warn!(tag = %el.tag, name, "dropping attribute with invalid name");
            continue;
        }
        match value {
            PropValue::Bool(false) => {}
            PropValue::Bool(true) => {
                out.push(' ');
                out.push_str(name);
            }
            PropValue::List(items) if items.is_empty() => {}
            _ => {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&escape_attr(&attr_value(value)));
                out.push('"');
            }
        }
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&el.tag.as_str()) {
        return;
    }

    write_nodes(&el.children, out);
    out.push_str("</");
    out.push_str(&el.tag);
    out.push('>');
}

/// Whether `name` can be written as an HTML attribute name.
///
/// Names that could end the tag or start another attribute are rejected.
fn is_attr_name(name: &str) -> bool {
    !name.is_empty()
        && !name.chars().any(|c| {
            c.is_whitespace()
                || c.is_control()
                || matches!(c, '"' | '\'' | '<' | '>' | '/' | '=' | '&')
        })
}

/// Attribute text for a property value. Lists are space-separated.
fn attr_value(value: &PropValue) -> String {
    match value {
        PropValue::String(s) => s.clone(),
        PropValue::Int(n) => n.to_string(),
        PropValue::Bool(b) => b.to_string(),
        PropValue::List(items) => items.iter().map(attr_value).collect::<Vec<_>>().join(" "),
    }
}

/// Escape HTML special characters.
fn escape_html(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape attribute values.
fn escape_attr(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    result
}
