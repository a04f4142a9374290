//! Node-to-HTML conversion driven by a handler table.
//!
//! Every [`NodeType`] maps to a [`Handler`]. Callers can replace any entry to
//! change how one kind of node renders without touching the rest.

use std::collections::HashMap;

use folio_core::{
    Data, Definitions, Diagnostic, DiagnosticKind, Node, NodeKind, NodeType, ReferenceType,
    Severity,
};

use crate::hast::{Element, HtmlNode};
use crate::reference_media;
use crate::sanitize::normalize_uri;

/// Converts one node into zero or more HTML nodes.
pub type Handler = fn(&mut State<'_>, &Node) -> Vec<HtmlNode>;

/// Handler table keyed by node type.
#[derive(Clone)]
pub struct Handlers(HashMap<NodeType, Handler>);

impl Handlers {
    /// The baseline handlers for every node type.
    pub fn new() -> Self {
        let mut table: HashMap<NodeType, Handler> = HashMap::new();
        for ty in NodeType::ALL {
            table.insert(ty, default_handler(ty));
        }
        Self(table)
    }

    /// Baseline handlers with image references that also carry the render
    /// hints of their definition.
    pub fn with_definition_data() -> Self {
        let mut handlers = Self::new();
        handlers.set(NodeType::ImageReference, reference_media::image_reference);
        handlers
    }

    /// Replace the handler for a node type, returning the previous one.
    pub fn set(&mut self, ty: NodeType, handler: Handler) -> Option<Handler> {
        self.0.insert(ty, handler)
    }

    /// Remove the handler for a node type.
    pub fn remove(&mut self, ty: NodeType) -> Option<Handler> {
        self.0.remove(&ty)
    }

    pub fn get(&self, ty: NodeType) -> Option<Handler> {
        self.0.get(&ty).copied()
    }
}

impl Default for Handlers {
    fn default() -> Self {
        Self::new()
    }
}

fn default_handler(ty: NodeType) -> Handler {
    match ty {
        NodeType::Root => root,
        NodeType::Paragraph => paragraph,
        NodeType::Heading => heading,
        NodeType::Blockquote => blockquote,
        NodeType::List => list,
        NodeType::ListItem => list_item,
        NodeType::Table => table,
        NodeType::TableRow => table_row,
        NodeType::TableCell => table_cell,
        NodeType::Code => code,
        NodeType::Html => html,
        NodeType::ThematicBreak => thematic_break,
        NodeType::Text => text,
        NodeType::Emphasis => emphasis,
        NodeType::Strong => strong,
        NodeType::Delete => delete,
        NodeType::InlineCode => inline_code,
        NodeType::Break => hard_break,
        NodeType::Image => image,
        NodeType::Link => link,
        NodeType::ImageReference => image_reference,
        NodeType::LinkReference => link_reference,
        NodeType::Definition => definition,
    }
}

/// Conversion state shared by all handlers for one document.
pub struct State<'a> {
    /// Definitions of the document being converted.
    pub definitions: Definitions,
    handlers: &'a Handlers,
    /// Non-fatal findings.
    pub warnings: Vec<Diagnostic>,
}

impl<'a> State<'a> {
    pub fn new(definitions: Definitions, handlers: &'a Handlers) -> Self {
        Self {
            definitions,
            handlers,
            warnings: Vec::new(),
        }
    }

    /// Convert one node.
    pub fn one(&mut self, node: &Node) -> Vec<HtmlNode> {
        let ty = node.node_type();
        match self.handlers.get(ty) {
            Some(handler) => handler(self, node),
            None => {
                tracing::debug!(node = %ty, "no handler, rendering children only");
                self.warnings.push(
                    Diagnostic::new(
                        Severity::Info,
                        DiagnosticKind::UnsupportedNode(ty.to_string()),
                        format!("no handler for node type: {ty}"),
                    )
                    .at(node.position),
                );
                self.all(node)
            }
        }
    }

    /// Convert all children of a node.
    pub fn all(&mut self, node: &Node) -> Vec<HtmlNode> {
        let mut out = Vec::new();
        for child in &node.children {
            out.extend(self.one(child));
        }
        out
    }

    /// Apply render hints to an element.
    ///
    /// The tag override replaces the tag, classes are appended and
    /// properties are set (replacing existing values).
    pub fn apply_data(&self, data: &Data, mut element: Element) -> Element {
        if let Some(tag) = &data.h_name {
            element.tag = tag.clone();
        }
        element.add_classes(&data.classes);
        for (key, value) in data.properties.iter() {
            element.properties.set(key.clone(), value.clone());
        }
        element
    }

    /// Build an element from a node's children and apply its render hints.
    fn wrap(&mut self, tag: &str, node: &Node) -> Vec<HtmlNode> {
        let children = self.all(node);
        let element = Element::new(tag).children(children);
        vec![self.apply_data(&node.data, element).into()]
    }
}

/// Literal text for a reference whose definition is missing.
///
/// Images become a single text node; links keep their converted children
/// between the brackets.
pub fn revert(state: &mut State<'_>, node: &Node) -> Vec<HtmlNode> {
    let (suffix, alt) = match &node.kind {
        NodeKind::ImageReference {
            identifier,
            label,
            alt,
            reference_type,
        } => (reference_suffix(*reference_type, label, identifier), Some(alt)),
        NodeKind::LinkReference {
            identifier,
            label,
            reference_type,
        } => (reference_suffix(*reference_type, label, identifier), None),
        _ => return state.all(node),
    };

    if let Some(alt) = alt {
        return vec![HtmlNode::Text(format!("![{alt}{suffix}"))];
    }

    let mut contents = state.all(node);
    match contents.first_mut() {
        Some(HtmlNode::Text(head)) => head.insert(0, '['),
        _ => contents.insert(0, HtmlNode::Text("[".to_string())),
    }
    match contents.last_mut() {
        Some(HtmlNode::Text(tail)) => tail.push_str(&suffix),
        _ => contents.push(HtmlNode::Text(suffix)),
    }
    contents
}

fn reference_suffix(reference_type: ReferenceType, label: &str, identifier: &str) -> String {
    match reference_type {
        ReferenceType::Shortcut => "]".to_string(),
        ReferenceType::Collapsed => "][]".to_string(),
        ReferenceType::Full => {
            let label = if label.is_empty() { identifier } else { label };
            format!("][{label}]")
        }
    }
}

/// `<img>` for a resolved image reference, before any render hints.
pub(crate) fn reference_image(url: &str, alt: &str, title: Option<&str>) -> Element {
    let mut img = Element::new("img")
        .prop("src", normalize_uri(url))
        .prop("alt", alt);
    if let Some(title) = title {
        img = img.prop("title", title);
    }
    img
}

// Default handlers

/// Top-level blocks are separated by newlines.
fn root(state: &mut State<'_>, node: &Node) -> Vec<HtmlNode> {
    let mut out = Vec::new();
    for child in &node.children {
        let converted = state.one(child);
        if converted.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(HtmlNode::Text("\n".to_string()));
        }
        out.extend(converted);
    }
    out
}

fn paragraph(state: &mut State<'_>, node: &Node) -> Vec<HtmlNode> {
    state.wrap("p", node)
}

fn heading(state: &mut State<'_>, node: &Node) -> Vec<HtmlNode> {
    let tag = match node.kind {
        NodeKind::Heading { depth } => match depth {
            1 => "h1",
            2 => "h2",
            3 => "h3",
            4 => "h4",
            5 => "h5",
            _ => "h6",
        },
        _ => "h1",
    };
    state.wrap(tag, node)
}

fn blockquote(state: &mut State<'_>, node: &Node) -> Vec<HtmlNode> {
    state.wrap("blockquote", node)
}

fn list(state: &mut State<'_>, node: &Node) -> Vec<HtmlNode> {
    let (ordered, start) = match node.kind {
        NodeKind::List { ordered, start } => (ordered, start),
        _ => (false, None),
    };
    let mut element = Element::new(if ordered { "ol" } else { "ul" });
    if ordered
        && let Some(start) = start
        && start != 1
    {
        element = element.prop("start", i64::try_from(start).unwrap_or(i64::MAX));
    }
    let element = element.children(state.all(node));
    vec![state.apply_data(&node.data, element).into()]
}

fn list_item(state: &mut State<'_>, node: &Node) -> Vec<HtmlNode> {
    state.wrap("li", node)
}

fn table(state: &mut State<'_>, node: &Node) -> Vec<HtmlNode> {
    state.wrap("table", node)
}

fn table_row(state: &mut State<'_>, node: &Node) -> Vec<HtmlNode> {
    state.wrap("tr", node)
}

fn table_cell(state: &mut State<'_>, node: &Node) -> Vec<HtmlNode> {
    state.wrap("td", node)
}

fn code(state: &mut State<'_>, node: &Node) -> Vec<HtmlNode> {
    let NodeKind::Code { lang, value } = &node.kind else {
        return Vec::new();
    };
    let mut code = Element::new("code").children([HtmlNode::Text(value.clone())]);
    if let Some(lang) = lang {
        code.add_classes(&[format!("language-{lang}")]);
    }
    let code = state.apply_data(&node.data, code);
    vec![Element::new("pre").children([code.into()]).into()]
}

fn html(_state: &mut State<'_>, node: &Node) -> Vec<HtmlNode> {
    match &node.kind {
        NodeKind::Html { value } => vec![HtmlNode::Raw(value.clone())],
        _ => Vec::new(),
    }
}

fn thematic_break(state: &mut State<'_>, node: &Node) -> Vec<HtmlNode> {
    vec![state.apply_data(&node.data, Element::new("hr")).into()]
}

fn text(_state: &mut State<'_>, node: &Node) -> Vec<HtmlNode> {
    match node.text_value() {
        Some(value) => vec![HtmlNode::Text(value.to_string())],
        None => Vec::new(),
    }
}

fn emphasis(state: &mut State<'_>, node: &Node) -> Vec<HtmlNode> {
    state.wrap("em", node)
}

fn strong(state: &mut State<'_>, node: &Node) -> Vec<HtmlNode> {
    state.wrap("strong", node)
}

fn delete(state: &mut State<'_>, node: &Node) -> Vec<HtmlNode> {
    state.wrap("del", node)
}

fn inline_code(state: &mut State<'_>, node: &Node) -> Vec<HtmlNode> {
    let NodeKind::InlineCode { value } = &node.kind else {
        return Vec::new();
    };
    let code = Element::new("code").children([HtmlNode::Text(value.clone())]);
    vec![state.apply_data(&node.data, code).into()]
}

fn hard_break(state: &mut State<'_>, node: &Node) -> Vec<HtmlNode> {
    vec![
        state.apply_data(&node.data, Element::new("br")).into(),
        HtmlNode::Text("\n".to_string()),
    ]
}

fn image(state: &mut State<'_>, node: &Node) -> Vec<HtmlNode> {
    let NodeKind::Image { url, alt, title } = &node.kind else {
        return Vec::new();
    };
    let img = reference_image(url, alt, title.as_deref());
    vec![state.apply_data(&node.data, img).into()]
}

fn link(state: &mut State<'_>, node: &Node) -> Vec<HtmlNode> {
    let NodeKind::Link { url, title } = &node.kind else {
        return Vec::new();
    };
    let mut a = Element::new("a").prop("href", normalize_uri(url));
    if let Some(title) = title {
        a = a.prop("title", title.as_str());
    }
    let a = a.children(state.all(node));
    vec![state.apply_data(&node.data, a).into()]
}

/// Image reference carrying only the occurrence's render hints.
fn image_reference(state: &mut State<'_>, node: &Node) -> Vec<HtmlNode> {
    let NodeKind::ImageReference { identifier, alt, .. } = &node.kind else {
        return Vec::new();
    };
    let Some(def) = state.definitions.get(identifier) else {
        return revert(state, node);
    };
    let img = reference_image(&def.url, alt, def.title.as_deref());
    vec![state.apply_data(&node.data, img).into()]
}

fn link_reference(state: &mut State<'_>, node: &Node) -> Vec<HtmlNode> {
    let NodeKind::LinkReference { identifier, .. } = &node.kind else {
        return Vec::new();
    };
    let Some(def) = state.definitions.get(identifier) else {
        return revert(state, node);
    };
    let mut a = Element::new("a").prop("href", normalize_uri(&def.url));
    if let Some(title) = &def.title {
        a = a.prop("title", title.as_str());
    }
    let a = a.children(state.all(node));
    vec![state.apply_data(&node.data, a).into()]
}

fn definition(_state: &mut State<'_>, _node: &Node) -> Vec<HtmlNode> {
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::helpers;
    use pretty_assertions::assert_eq;

    fn convert(root: &Node, handlers: &Handlers) -> (Vec<HtmlNode>, Vec<Diagnostic>) {
        let mut state = State::new(Definitions::from_tree(root), handlers);
        let out = state.one(root);
        (out, state.warnings)
    }

    fn element(nodes: &[HtmlNode]) -> &Element {
        match nodes.first() {
            Some(HtmlNode::Element(el)) => el,
            other => panic!("expected element, got {other:?}"),
        }
    }

    #[test]
    fn test_every_node_type_has_a_default() {
        let handlers = Handlers::new();
        for ty in NodeType::ALL {
            assert!(handlers.get(ty).is_some(), "missing handler for {ty}");
        }
    }

    #[test]
    fn test_apply_data() {
        let handlers = Handlers::new();
        let state = State::new(Definitions::new(), &handlers);
        let data = Data::new()
            .h_name("video")
            .class("wide")
            .prop("alt", "override")
            .prop("controls", true);
        let el = state.apply_data(&data, Element::new("img").prop("alt", "orig"));

        assert_eq!(el.tag, "video");
        assert_eq!(el.class_names(), vec!["wide"]);
        assert_eq!(el.properties.get_str("alt"), Some("override"));
        assert_eq!(el.properties.get_bool("controls"), Some(true));
    }

    #[test]
    fn test_image_applies_data() {
        let root = helpers::image("a b.png", "A")
            .with_data(Data::new().class("pic").prop("height", "100"));
        let (out, _) = convert(&root, &Handlers::new());
        let img = element(&out);
        assert_eq!(img.tag, "img");
        assert_eq!(img.properties.get_str("src"), Some("a%20b.png"));
        assert_eq!(img.properties.get_str("alt"), Some("A"));
        assert_eq!(img.properties.get_str("height"), Some("100"));
        assert_eq!(img.class_names(), vec!["pic"]);
    }

    #[test]
    fn test_baseline_image_reference_ignores_definition_data() {
        let root = helpers::root([
            helpers::image_reference("dog", "", ReferenceType::Full)
                .with_data(Data::new().prop("height", "100")),
            helpers::definition("dog", "foo.mp4", Some("Dog"))
                .with_data(Data::new().h_name("video").prop("controls", true)),
        ]);
        let (out, _) = convert(&root, &Handlers::new());
        let img = element(&out);
        assert_eq!(img.tag, "img");
        assert_eq!(img.properties.get_str("src"), Some("foo.mp4"));
        assert_eq!(img.properties.get_str("title"), Some("Dog"));
        assert_eq!(img.properties.get_str("height"), Some("100"));
        assert!(!img.properties.contains("controls"));
    }

    #[test]
    fn test_image_reference_reverts() {
        let cases = [
            (ReferenceType::Shortcut, "![cat]"),
            (ReferenceType::Collapsed, "![cat][]"),
            (ReferenceType::Full, "![cat][Kitty]"),
        ];
        for (reference_type, expected) in cases {
            let root = helpers::image_reference("Kitty", "cat", reference_type);
            let (out, _) = convert(&root, &Handlers::new());
            assert_eq!(out, vec![HtmlNode::Text(expected.to_string())]);
        }
    }

    #[test]
    fn test_full_reference_falls_back_to_identifier() {
        let root = Node::new(NodeKind::ImageReference {
            identifier: "kitty".to_string(),
            label: String::new(),
            alt: "cat".to_string(),
            reference_type: ReferenceType::Full,
        });
        let (out, _) = convert(&root, &Handlers::new());
        assert_eq!(out, vec![HtmlNode::Text("![cat][kitty]".to_string())]);
    }

    #[test]
    fn test_link_reference_reverts_around_children() {
        let root = helpers::link_reference(
            "x",
            ReferenceType::Full,
            [helpers::text("see "), Node::new(NodeKind::Emphasis).child(helpers::text("this"))],
        );
        let (out, _) = convert(&root, &Handlers::new());
        assert_eq!(out.len(), 3);
        assert_eq!(out[0], HtmlNode::Text("[see ".to_string()));
        assert_eq!(out[2], HtmlNode::Text("][x]".to_string()));
    }

    #[test]
    fn test_link_reference_revert_adds_bracket_nodes() {
        let root = helpers::link_reference(
            "x",
            ReferenceType::Shortcut,
            [Node::new(NodeKind::InlineCode {
                value: "x".to_string(),
            })],
        );
        let (out, _) = convert(&root, &Handlers::new());
        assert_eq!(out.len(), 3);
        assert_eq!(out[0], HtmlNode::Text("[".to_string()));
        assert_eq!(out[2], HtmlNode::Text("]".to_string()));
    }

    #[test]
    fn test_link_reference_resolves() {
        let root = helpers::root([
            helpers::link_reference("Home", ReferenceType::Collapsed, [helpers::text("Home")])
                .with_data(Data::new().prop("rel", "me")),
            helpers::definition("home", "/", None),
        ]);
        let (out, _) = convert(&root, &Handlers::new());
        let a = element(&out);
        assert_eq!(a.tag, "a");
        assert_eq!(a.properties.get_str("href"), Some("/"));
        assert_eq!(a.properties.get_str("rel"), Some("me"));
        assert_eq!(a.children, vec![HtmlNode::Text("Home".to_string())]);
    }

    #[test]
    fn test_definition_renders_nothing() {
        let root = helpers::root([helpers::definition("a", "/a", None)]);
        let (out, _) = convert(&root, &Handlers::new());
        assert!(out.is_empty());
    }

    #[test]
    fn test_missing_handler_renders_children() {
        let mut handlers = Handlers::new();
        handlers.remove(NodeType::Paragraph);
        let root = helpers::root([helpers::paragraph([helpers::text("hi")])]);
        let (out, warnings) = convert(&root, &handlers);

        assert_eq!(out, vec![HtmlNode::Text("hi".to_string())]);
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings[0].kind,
            DiagnosticKind::UnsupportedNode("paragraph".to_string())
        );
    }

    #[test]
    fn test_replaced_handler_is_used() {
        fn shout(_state: &mut State<'_>, node: &Node) -> Vec<HtmlNode> {
            vec![HtmlNode::Text(node.to_plain_text().to_uppercase())]
        }
        let mut handlers = Handlers::new();
        let previous = handlers.set(NodeType::Text, shout);
        assert!(previous.is_some());

        let root = helpers::paragraph([helpers::text("hi")]);
        let (out, _) = convert(&root, &handlers);
        assert_eq!(element(&out).children, vec![HtmlNode::Text("HI".to_string())]);
    }

    #[test]
    fn test_root_separates_blocks() {
        let root = helpers::root([
            helpers::paragraph([helpers::text("a")]),
            helpers::definition("x", "/x", None),
            helpers::paragraph([helpers::text("b")]),
        ]);
        let (out, _) = convert(&root, &Handlers::new());
        assert_eq!(out.len(), 3);
        assert_eq!(out[1], HtmlNode::Text("\n".to_string()));
    }
}
