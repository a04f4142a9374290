//! Diagnostics - non-fatal findings reported alongside a result.

use crate::Position;

/// Result of a conversion step, including diagnostics.
#[derive(Debug)]
pub struct ConversionResult<T> {
    /// The step output.
    pub value: T,
    /// Non-fatal issues found along the way.
    pub warnings: Vec<Diagnostic>,
}

impl<T> ConversionResult<T> {
    /// Create a successful result with no warnings.
    pub fn ok(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    /// Create a result with warnings.
    pub fn with_warnings(value: T, warnings: Vec<Diagnostic>) -> Self {
        Self { value, warnings }
    }

    /// Add a warning.
    pub fn warn(mut self, warning: Diagnostic) -> Self {
        self.warnings.push(warning);
        self
    }

    /// Check if there are any warnings.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Check if there are any error-level warnings.
    pub fn has_errors(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w.severity, Severity::Error))
    }
}

/// A non-fatal finding.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    /// Human-readable message.
    pub message: String,
    /// Where in the source this occurred.
    pub position: Option<Position>,
}

impl Diagnostic {
    /// Create a new diagnostic.
    pub fn new(severity: Severity, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity,
            kind,
            message: message.into(),
            position: None,
        }
    }

    /// Set the source position.
    pub fn at(mut self, position: Option<Position>) -> Self {
        self.position = position;
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.position {
            Some(pos) => write!(
                f,
                "{}:{}: {}",
                pos.start.line, pos.start.column, self.message
            ),
            None => f.write_str(&self.message),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Information only, output unaffected.
    Info,
    /// Output is produced but something was skipped.
    Warning,
    /// Output may be incorrect.
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticKind {
    /// An author-owned file is referenced but absent from the files map.
    MissingFile(String),
    /// The converter has no handler for a node type.
    UnsupportedNode(String),
}
