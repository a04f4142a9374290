//! Folio - markdown to HTML with attribute shorthand and author files.
//!
//! Two additions over plain CommonMark:
//! - `{.class key=value flag}` written right after an image or link attaches
//!   classes and attributes to it
//! - references to an author's uploaded files are resolved against a files
//!   map, and `.mp4`/`.mov` media render as `<video controls>`
//!
//! # Quick Start
//!
//! ```rust
//! use folio::{Processor, ProcessorOptions};
//!
//! let options = ProcessorOptions::new()
//!     .author_id("XYZ")
//!     .file("cat.png", "https://cdn.example.com/cat.png");
//! let processor = Processor::new(options).unwrap();
//!
//! let out = processor.process("![a cat](cat.png){.w-96}").unwrap();
//! assert_eq!(
//!     out.html,
//!     r#"<p><img src="https://cdn.example.com/cat.png" alt="a cat" class="w-96"></p>"#
//! );
//! assert_eq!(out.body_files_map().map(|m| m.len()), Some(1));
//! ```
//!
//! # Architecture
//!
//! The markdown reader builds a tree of [`Node`]s with source positions.
//! Transforms mutate the tree in place (attribute attachment, then file
//! resolution). The HTML writer converts the tree through a table of
//! per-node-type handlers and serializes the result.

mod processor;

pub use processor::{Error, Processed, Processor, ProcessorOptions};

// Re-export core types
pub use folio_core::*;

/// Markdown reading.
pub mod markdown {
    pub use folio_read_markdown::{parse, parse_bytes, parse_reader, parse_with_options};
}

/// HTML writing.
pub mod html {
    pub use folio_write_html::{
        Element, Handler, Handlers, HtmlNode, State, emit, emit_to, emit_with_handlers,
        normalize_uri, reference_media, revert, stringify, to_html_tree,
    };
}

/// Tree transforms.
pub mod transforms {
    pub use folio_transforms::*;
}

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        ConversionResult, Data, Document, FilesMap, Node, NodeKind, Processor, ProcessorOptions,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_to_html() {
        let doc = markdown::parse("# Hello\n\nWorld!").unwrap().value;
        let html = html::emit(&doc).unwrap();
        let html = String::from_utf8(html.value).unwrap();
        assert_eq!(html, "<h1>Hello</h1>\n<p>World!</p>");
    }
}
