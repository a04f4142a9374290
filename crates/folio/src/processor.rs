//! End-to-end processing: read, transform, write.

use std::io::Read;

use folio_core::{
    ConversionResult, Diagnostic, Document, EmitError, FilesMap, ParseError, ParseOptions,
    TransformError, Transformer,
};
use folio_transforms::{AttachAttributes, Pipeline, ResolveFiles};
use folio_write_html::Handlers;

/// Error from any stage of processing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("transform error: {0}")]
    Transform(#[from] TransformError),
    #[error("emit error: {0}")]
    Emit(#[from] EmitError),
    #[error("output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Options for a [`Processor`].
#[derive(Debug, Clone)]
pub struct ProcessorOptions {
    /// Id of the author whose uploaded files the body may reference.
    pub author_id: String,
    /// Bare filename to URL.
    pub files_map: FilesMap,
    /// Apply render hints from definitions to image references.
    pub reference_definition_data: bool,
    pub parse: ParseOptions,
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        Self {
            author_id: String::new(),
            files_map: FilesMap::new(),
            reference_definition_data: true,
            parse: ParseOptions::default(),
        }
    }
}

impl ProcessorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn author_id(mut self, author_id: impl Into<String>) -> Self {
        self.author_id = author_id.into();
        self
    }

    pub fn files_map(mut self, files_map: FilesMap) -> Self {
        self.files_map = files_map;
        self
    }

    /// Add one entry to the files map.
    pub fn file(mut self, name: impl Into<String>, url: impl Into<String>) -> Self {
        self.files_map.insert(name.into(), url.into());
        self
    }

    pub fn reference_definition_data(mut self, enabled: bool) -> Self {
        self.reference_definition_data = enabled;
        self
    }

    /// Parse GFM tables and strikethrough.
    pub fn gfm(mut self, enabled: bool) -> Self {
        self.parse.gfm = enabled;
        self
    }
}

/// Result of processing one document.
#[derive(Debug, Clone)]
pub struct Processed {
    pub html: String,
    /// The transformed tree and its side-channel data.
    pub document: Document,
    /// Non-fatal findings from every stage.
    pub diagnostics: Vec<Diagnostic>,
}

impl Processed {
    /// Author files the body references, keyed by filename.
    pub fn body_files_map(&self) -> Option<&FilesMap> {
        self.document.body_files_map()
    }
}

/// Converts markdown to HTML, attaching attributes before resolving files.
pub struct Processor {
    options: ProcessorOptions,
    pipeline: Pipeline,
    handlers: Handlers,
}

impl Processor {
    pub fn new(options: ProcessorOptions) -> Result<Self, Error> {
        let pipeline = Pipeline::new().then(AttachAttributes).then(ResolveFiles::new(
            options.author_id.clone(),
            options.files_map.clone(),
        )?);
        let handlers = if options.reference_definition_data {
            Handlers::with_definition_data()
        } else {
            Handlers::new()
        };
        Ok(Self {
            options,
            pipeline,
            handlers,
        })
    }

    pub fn options(&self) -> &ProcessorOptions {
        &self.options
    }

    /// Process one markdown document.
    pub fn process(&self, input: &str) -> Result<Processed, Error> {
        self.finish(folio_read_markdown::parse_with_options(
            input,
            &self.options.parse,
        )?)
    }

    /// Read a whole markdown document from `reader` and process it.
    pub fn process_reader<R: Read>(&self, reader: R) -> Result<Processed, Error> {
        self.finish(folio_read_markdown::parse_reader(
            reader,
            &self.options.parse,
        )?)
    }

    fn finish(&self, parsed: ConversionResult<Document>) -> Result<Processed, Error> {
        let mut diagnostics = parsed.warnings;

        let transformed = self.pipeline.transform(parsed.value)?;
        diagnostics.extend(transformed.warnings);
        let document = transformed.value;

        let emitted = folio_write_html::emit_with_handlers(&document, &self.handlers)?;
        diagnostics.extend(emitted.warnings);
        let html = String::from_utf8(emitted.value)?;

        tracing::debug!(
            bytes = html.len(),
            diagnostics = diagnostics.len(),
            "processed document"
        );
        Ok(Processed {
            html,
            document,
            diagnostics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_processor_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Processor>();
    }

    #[test]
    fn test_defaults() {
        let options = ProcessorOptions::default();
        assert!(options.reference_definition_data);
        assert!(options.files_map.is_empty());
        assert!(!options.parse.gfm);
    }

    #[test]
    fn test_builder() {
        let options = ProcessorOptions::new()
            .author_id("XYZ")
            .file("a.png", "http://host/a.png")
            .reference_definition_data(false)
            .gfm(true);
        assert_eq!(options.author_id, "XYZ");
        assert_eq!(
            options.files_map.get("a.png").map(String::as_str),
            Some("http://host/a.png")
        );
        assert!(!options.reference_definition_data);
        assert!(options.parse.gfm);
    }

    #[test]
    fn test_process_simple() {
        let processor = Processor::new(ProcessorOptions::default()).unwrap();
        let out = processor.process("# Hi\n\n[a](/a){.x}").unwrap();
        assert_eq!(out.html, "<h1>Hi</h1>\n<p><a href=\"/a\" class=\"x\">a</a></p>");
        assert_eq!(out.body_files_map(), Some(&FilesMap::new()));
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn test_process_reader() {
        let processor = Processor::new(ProcessorOptions::default()).unwrap();
        let out = processor.process_reader("![](a.png){.x}".as_bytes()).unwrap();
        assert_eq!(out.html, "<p><img src=\"a.png\" alt=\"\" class=\"x\"></p>");
    }

    #[test]
    fn test_process_reader_rejects_invalid_utf8() {
        let processor = Processor::new(ProcessorOptions::default()).unwrap();
        let err = processor.process_reader(&b"\xfe\xff"[..]).unwrap_err();
        assert!(matches!(err, Error::Parse(ParseError::Invalid(_))));
    }
}
