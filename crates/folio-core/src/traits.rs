//! Transformer trait and error types.

use crate::{ConversionResult, Document};

/// Options for parsing. Plain CommonMark unless `gfm` is set.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Enable GFM extensions (tables, strikethrough).
    pub gfm: bool,
}

/// Error during parsing.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error during emitting.
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error during transformation.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),
}

/// Transform a document tree in place.
pub trait Transformer: Send + Sync {
    /// Name of this transformer.
    fn name(&self) -> &str;

    /// Transform a document, reporting non-fatal findings as warnings.
    fn transform(&self, doc: Document) -> Result<ConversionResult<Document>, TransformError>;
}
