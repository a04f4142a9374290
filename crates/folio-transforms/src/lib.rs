//! Document transforms for folio.
//!
//! This crate provides the passes that run between reading and writing:
//! - [`AttachAttributes`]: `{.class key=value flag}` shorthand after media and links
//! - [`ResolveFiles`]: author-owned file resolution and video detection
//! - [`Pipeline`]: run transforms in sequence, collecting diagnostics
//! - Visitor utilities for custom transforms

pub mod attributes;
pub mod files;

pub use attributes::{AttachAttributes, Attributes, parse_attributes};
pub use files::{ResolveFiles, is_video_url};

use folio_core::{ConversionResult, Document, Node, TransformError, Transformer};

/// A transform pipeline that applies multiple transforms in sequence.
pub struct Pipeline {
    transforms: Vec<Box<dyn Transformer>>,
}

impl Pipeline {
    /// Create a new empty pipeline.
    pub fn new() -> Self {
        Self {
            transforms: Vec::new(),
        }
    }

    /// Add a transform to the pipeline.
    pub fn then<T: Transformer + 'static>(mut self, transform: T) -> Self {
        self.transforms.push(Box::new(transform));
        self
    }

    /// Names of the transforms, in run order.
    pub fn names(&self) -> Vec<&str> {
        self.transforms.iter().map(|t| t.name()).collect()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Transformer for Pipeline {
    fn name(&self) -> &str {
        "pipeline"
    }

    fn transform(&self, mut doc: Document) -> Result<ConversionResult<Document>, TransformError> {
        let mut warnings = Vec::new();
        for transform in &self.transforms {
            tracing::debug!(transform = transform.name(), "running transform");
            let result = transform.transform(doc)?;
            warnings.extend(result.warnings);
            doc = result.value;
        }
        Ok(ConversionResult::with_warnings(doc, warnings))
    }
}

/// Walk a document tree, calling a function on each node.
pub fn walk<F>(node: &Node, f: &mut F)
where
    F: FnMut(&Node),
{
    f(node);
    for child in &node.children {
        walk(child, f);
    }
}

/// Walk a document tree mutably, calling a function on each node.
pub fn walk_mut<F>(node: &mut Node, f: &mut F)
where
    F: FnMut(&mut Node),
{
    f(node);
    for child in &mut node.children {
        walk_mut(child, f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::helpers;
    use folio_core::{FilesMap, NodeType};

    #[test]
    fn test_pipeline_runs_in_order() {
        let input = "![](clip.mp4){.wide}";
        let doc = folio_read_markdown::parse(input).unwrap().value;

        let mut files = FilesMap::new();
        files.insert("clip.mp4".to_string(), "http://host/clip.mp4".to_string());
        let pipeline = Pipeline::new()
            .then(AttachAttributes)
            .then(ResolveFiles::new("XYZ", files).unwrap());
        assert_eq!(pipeline.names(), vec!["attach_attributes", "resolve_files"]);

        let result = pipeline.transform(doc).unwrap();
        let image = &result.value.content.children[0].children[0];
        assert_eq!(image.url(), Some("http://host/clip.mp4"));
        assert_eq!(image.data.classes, vec!["wide".to_string()]);
        assert_eq!(image.data.h_name.as_deref(), Some("video"));
        assert_eq!(image.data.properties.get_bool("controls"), Some(true));
    }

    #[test]
    fn test_pipeline_collects_warnings() {
        let doc = folio_core::Document::new().with_content(helpers::root([helpers::image(
            "users/XYZ/files/a.png",
            "",
        )]));
        let pipeline = Pipeline::new()
            .then(AttachAttributes)
            .then(ResolveFiles::new("XYZ", FilesMap::new()).unwrap());
        let result = pipeline.transform(doc).unwrap();
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_walk() {
        let root = helpers::root([helpers::paragraph([
            helpers::text("Hello"),
            helpers::link("/", [helpers::text("World")]),
        ])]);

        let mut count = 0;
        walk(&root, &mut |_| count += 1);

        // root -> paragraph -> text, link -> text
        assert_eq!(count, 5);
    }

    #[test]
    fn test_walk_mut() {
        let mut root = helpers::root([helpers::paragraph([helpers::image("a.png", "")])]);
        walk_mut(&mut root, &mut |n| {
            if let Some(url) = n.url_mut() {
                url.insert_str(0, "/");
            }
        });

        let mut urls = Vec::new();
        walk(&root, &mut |n| {
            if n.node_type() == NodeType::Image {
                urls.extend(n.url().map(str::to_string));
            }
        });
        assert_eq!(urls, vec!["/a.png".to_string()]);
    }
}
