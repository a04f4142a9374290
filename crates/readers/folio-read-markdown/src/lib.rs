//! Markdown reader for folio.
//!
//! Parses CommonMark (with optional GFM tables and strikethrough) into the
//! folio document tree. Every node carries a line/column position, reference
//! style links and images stay reference nodes, and link reference
//! definitions appear in the tree as definition nodes.

mod position;

use std::io::Read;
use std::ops::Range;

use folio_core::{
    ConversionResult, Diagnostic, DiagnosticKind, Document, Node, NodeKind, ParseError,
    ParseOptions, ReferenceType, Severity, normalize_identifier,
};
use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, LinkType, Options, Parser, Tag, TagEnd};

use position::LineIndex;

/// Parse markdown text into a folio Document.
pub fn parse(input: &str) -> Result<ConversionResult<Document>, ParseError> {
    parse_with_options(input, &ParseOptions::default())
}

/// Parse markdown from raw bytes, which must be UTF-8.
pub fn parse_bytes(
    input: &[u8],
    options: &ParseOptions,
) -> Result<ConversionResult<Document>, ParseError> {
    let text = std::str::from_utf8(input).map_err(|e| {
        ParseError::Invalid(format!(
            "not valid UTF-8 after byte {}",
            e.valid_up_to()
        ))
    })?;
    parse_with_options(text, options)
}

/// Read a whole markdown document from `reader` and parse it.
pub fn parse_reader<R: Read>(
    mut reader: R,
    options: &ParseOptions,
) -> Result<ConversionResult<Document>, ParseError> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    parse_bytes(&buf, options)
}

/// Parse markdown with custom options.
pub fn parse_with_options(
    input: &str,
    options: &ParseOptions,
) -> Result<ConversionResult<Document>, ParseError> {
    let mut opts = Options::empty();
    if options.gfm {
        opts.insert(Options::ENABLE_TABLES);
        opts.insert(Options::ENABLE_STRIKETHROUGH);
    }

    let index = LineIndex::new(input);
    let parser = Parser::new_ext(input, opts);

    // Definitions are consumed by the block pass and never show up as events.
    let definitions: Vec<Node> = parser
        .reference_definitions()
        .iter()
        .map(|(label, def)| {
            Node::new(NodeKind::Definition {
                identifier: normalize_identifier(label),
                label: label.to_string(),
                url: def.dest.to_string(),
                title: def.title.as_ref().map(|t| t.to_string()),
            })
            .at(index.position(&def.span))
        })
        .collect();

    // Collect events with source ranges for positions
    let events: Vec<_> = parser.into_offset_iter().collect();

    let mut reader = Reader {
        index,
        warnings: Vec::new(),
    };
    let mut children = reader.parse_events(&events);
    tracing::trace!(
        blocks = children.len(),
        definitions = definitions.len(),
        "parsed markdown"
    );

    children.extend(definitions);
    children.sort_by_key(|n| n.position.map_or(usize::MAX, |p| p.start.offset));

    let root = Node::new(NodeKind::Root)
        .children(children)
        .at(reader.index.position(&(0..input.len())));
    let doc = Document::new().with_content(root);
    Ok(ConversionResult::with_warnings(doc, reader.warnings))
}

struct Reader<'a> {
    index: LineIndex<'a>,
    warnings: Vec<Diagnostic>,
}

type OffsetEvent<'e> = (Event<'e>, Range<usize>);

impl Reader<'_> {
    /// Parse a slice of events into nodes, merging adjacent text.
    fn parse_events(&mut self, events: &[OffsetEvent<'_>]) -> Vec<Node> {
        let mut nodes = Vec::new();
        let mut idx = 0;

        while idx < events.len() {
            let (node, consumed) = self.parse_event(&events[idx..]);
            if let Some(n) = node {
                push_merged(&mut nodes, n);
            }
            idx += consumed.max(1);
        }

        nodes
    }

    fn node(&self, kind: NodeKind, range: &Range<usize>) -> Node {
        Node::new(kind).at(self.index.position(range))
    }

    /// Parse a single event or matched tag pair, returning the node and events consumed.
    fn parse_event(&mut self, events: &[OffsetEvent<'_>]) -> (Option<Node>, usize) {
        let (event, range) = &events[0];
        let node = match event {
            Event::Start(tag) => return self.parse_tag(tag.clone(), events),
            Event::End(_) => None, // Handled by parent
            Event::Text(text) => Some(self.node(
                NodeKind::Text {
                    value: text.to_string(),
                },
                range,
            )),
            // A soft break is part of the surrounding text.
            Event::SoftBreak => Some(self.node(
                NodeKind::Text {
                    value: "\n".to_string(),
                },
                range,
            )),
            Event::HardBreak => Some(self.node(NodeKind::Break, range)),
            Event::Rule => Some(self.node(NodeKind::ThematicBreak, range)),
            Event::Code(code) => Some(self.node(
                NodeKind::InlineCode {
                    value: code.to_string(),
                },
                range,
            )),
            Event::InlineMath(math) | Event::DisplayMath(math) => Some(self.node(
                NodeKind::InlineCode {
                    value: math.to_string(),
                },
                range,
            )),
            Event::Html(html) | Event::InlineHtml(html) => Some(self.node(
                NodeKind::Html {
                    value: html.to_string(),
                },
                range,
            )),
            Event::FootnoteReference(label) => Some(self.node(
                NodeKind::Text {
                    value: format!("[^{label}]"),
                },
                range,
            )),
            Event::TaskListMarker(_) => None,
        };
        (node, 1)
    }

    /// Parse a tag and its contents.
    fn parse_tag(&mut self, tag: Tag<'_>, events: &[OffsetEvent<'_>]) -> (Option<Node>, usize) {
        // Find the matching end tag
        let end_idx = find_matching_end(&events[1..], &tag);
        let inner_events = &events[1..=end_idx];
        let mut children = self.parse_events(inner_events);
        let consumed = end_idx + 2; // +1 for start, +1 for end

        // Head cells render as `th`.
        if matches!(tag, Tag::TableHead) {
            for cell in &mut children {
                cell.data.h_name = Some("th".to_string());
            }
        }

        let tag_range = {
            let start = events[0].1.start;
            let end = events.get(end_idx + 1).map_or(start, |(_, r)| r.end);
            start..end
        };

        let kind = match tag {
            Tag::Paragraph => NodeKind::Paragraph,
            Tag::Heading { level, .. } => NodeKind::Heading {
                depth: heading_depth(level),
            },
            Tag::BlockQuote(_) => NodeKind::Blockquote,
            Tag::CodeBlock(kind) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(str::to_string),
                    CodeBlockKind::Indented => None,
                };
                NodeKind::Code {
                    lang,
                    value: literal_text(&children),
                }
            }
            Tag::HtmlBlock => NodeKind::Html {
                value: literal_text(&children),
            },
            Tag::List(start) => NodeKind::List {
                ordered: start.is_some(),
                start,
            },
            Tag::Item => NodeKind::ListItem,
            Tag::Table(_) => NodeKind::Table,
            Tag::TableHead | Tag::TableRow => NodeKind::TableRow,
            Tag::TableCell => NodeKind::TableCell,
            Tag::Emphasis => NodeKind::Emphasis,
            Tag::Strong => NodeKind::Strong,
            Tag::Strikethrough => NodeKind::Delete,
            Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            } => match reference_type(link_type) {
                Some(reference_type) => {
                    let label = reference_label(&id, &children);
                    NodeKind::LinkReference {
                        identifier: normalize_identifier(&label),
                        label,
                        reference_type,
                    }
                }
                None => NodeKind::Link {
                    url: match link_type {
                        LinkType::Email => format!("mailto:{dest_url}"),
                        _ => dest_url.to_string(),
                    },
                    title: non_empty(&title),
                },
            },
            Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            } => {
                // For images, children are alt text
                let alt = plain_text(&children);
                let node = match reference_type(link_type) {
                    Some(reference_type) => {
                        let label = reference_label(&id, &children);
                        NodeKind::ImageReference {
                            identifier: normalize_identifier(&label),
                            label,
                            alt,
                            reference_type,
                        }
                    }
                    None => NodeKind::Image {
                        url: dest_url.to_string(),
                        alt,
                        title: non_empty(&title),
                    },
                };
                return (Some(self.node(node, &tag_range)), consumed);
            }
            Tag::FootnoteDefinition(_)
            | Tag::MetadataBlock(_)
            | Tag::DefinitionList
            | Tag::DefinitionListTitle
            | Tag::DefinitionListDefinition => {
                let name = format!("{tag:?}");
                tracing::debug!(tag = %name, "skipping unsupported markdown construct");
                self.warnings.push(
                    Diagnostic::new(
                        Severity::Info,
                        DiagnosticKind::UnsupportedNode(name),
                        "unsupported markdown construct dropped",
                    )
                    .at(Some(self.index.position(&tag_range))),
                );
                return (None, consumed);
            }
        };

        (
            Some(self.node(kind, &tag_range).children(children)),
            consumed,
        )
    }
}

/// Append a node, folding it into the previous one when both are text.
fn push_merged(nodes: &mut Vec<Node>, node: Node) {
    if let NodeKind::Text { value } = &node.kind
        && let Some(last) = nodes.last_mut()
        && let NodeKind::Text { value: prev } = &mut last.kind
    {
        prev.push_str(value);
        if let (Some(last_pos), Some(pos)) = (last.position.as_mut(), node.position) {
            last_pos.end = pos.end;
        }
        return;
    }
    nodes.push(node);
}

fn heading_depth(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn reference_type(link_type: LinkType) -> Option<ReferenceType> {
    match link_type {
        LinkType::Reference | LinkType::ReferenceUnknown => Some(ReferenceType::Full),
        LinkType::Collapsed | LinkType::CollapsedUnknown => Some(ReferenceType::Collapsed),
        LinkType::Shortcut | LinkType::ShortcutUnknown => Some(ReferenceType::Shortcut),
        _ => None,
    }
}

/// The label a reference was written with; falls back to the link text.
fn reference_label(id: &CowStr<'_>, children: &[Node]) -> String {
    if id.is_empty() {
        plain_text(children)
    } else {
        id.to_string()
    }
}

fn non_empty(s: &CowStr<'_>) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Plain text of inline children (alt text, labels).
fn plain_text(children: &[Node]) -> String {
    children.iter().map(Node::to_plain_text).collect()
}

/// Raw text of literal children (code and HTML blocks).
fn literal_text(children: &[Node]) -> String {
    children
        .iter()
        .filter_map(|n| match &n.kind {
            NodeKind::Text { value } | NodeKind::Html { value } => Some(value.as_str()),
            _ => None,
        })
        .collect()
}

/// Find the index of the matching end tag.
fn find_matching_end(events: &[OffsetEvent<'_>], start_tag: &Tag<'_>) -> usize {
    let mut depth = 1;
    for (i, (event, _)) in events.iter().enumerate() {
        match event {
            Event::Start(t) if tags_match(t, start_tag) => depth += 1,
            Event::End(t) if tag_end_matches(t, start_tag) => {
                depth -= 1;
                if depth == 0 {
                    return i;
                }
            }
            _ => {}
        }
    }
    events.len().saturating_sub(1)
}

/// Check if two start tags are the same type.
fn tags_match(a: &Tag<'_>, b: &Tag<'_>) -> bool {
    std::mem::discriminant(a) == std::mem::discriminant(b)
}

/// Check if an end tag matches a start tag.
fn tag_end_matches(end: &TagEnd, start: &Tag<'_>) -> bool {
    matches!(
        (end, start),
        (TagEnd::Paragraph, Tag::Paragraph)
            | (TagEnd::Heading(_), Tag::Heading { .. })
            | (TagEnd::BlockQuote(_), Tag::BlockQuote(_))
            | (TagEnd::CodeBlock, Tag::CodeBlock(_))
            | (TagEnd::List(_), Tag::List(_))
            | (TagEnd::Item, Tag::Item)
            | (TagEnd::FootnoteDefinition, Tag::FootnoteDefinition(_))
            | (TagEnd::Table, Tag::Table(_))
            | (TagEnd::TableHead, Tag::TableHead)
            | (TagEnd::TableRow, Tag::TableRow)
            | (TagEnd::TableCell, Tag::TableCell)
            | (TagEnd::Emphasis, Tag::Emphasis)
            | (TagEnd::Strong, Tag::Strong)
            | (TagEnd::Strikethrough, Tag::Strikethrough)
            | (TagEnd::Link, Tag::Link { .. })
            | (TagEnd::Image, Tag::Image { .. })
            | (TagEnd::HtmlBlock, Tag::HtmlBlock)
            | (TagEnd::MetadataBlock(_), Tag::MetadataBlock(_))
            | (TagEnd::DefinitionList, Tag::DefinitionList)
            | (TagEnd::DefinitionListTitle, Tag::DefinitionListTitle)
            | (
                TagEnd::DefinitionListDefinition,
                Tag::DefinitionListDefinition
            )
    )
}
