//! Diagnostic types
//!
//! A [`Diagnostic`] pairs a stable [`DiagCode`](super::DiagCode) with a
//! source range and a human message. The phase and step that produced a
//! diagnostic are recoverable from its code.

use crate::base::{FileId, Span};

use super::codes::DiagCode;

/// Severity level for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Severity {
    /// A violation that stops the pipeline at the current phase step
    #[default]
    Error,
    /// Reported and discarded; never affects the exit code
    Warning,
    /// Informational; reported and discarded
    Notice,
}

impl Severity {
    /// Check if this is an error
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Notice => "notice",
        }
    }
}

/// A single compiler diagnostic
///
/// `file` is `None` only for compilation-wide messages that have no usable
/// anchor (e.g. a missing top schema origin).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Stable categorized code; encodes phase and step
    pub code: DiagCode,
    /// Severity, always the one implied by `code`
    pub severity: Severity,
    /// Source the diagnostic points at
    pub file: Option<FileId>,
    /// Source range within `file`
    pub span: Span,
    /// Human-readable message
    pub message: String,
}

impl Diagnostic {
    pub fn new(code: DiagCode, file: FileId, span: Span, message: impl Into<String>) -> Self {
        Self {
            code,
            severity: code.severity(),
            file: Some(file),
            span,
            message: message.into(),
        }
    }

    /// A diagnostic with no source anchor.
    pub fn unanchored(code: DiagCode, message: impl Into<String>) -> Self {
        Self {
            code,
            severity: code.severity(),
            file: None,
            span: Span::empty(),
            message: message.into(),
        }
    }

    /// Format the diagnostic for display
    pub fn format(&self) -> String {
        match self.file {
            Some(file) => format!(
                "{}: {} [{}] at {}:{}:{}",
                self.severity.as_str(),
                self.message,
                self.code,
                file.index(),
                self.span.start.line,
                self.span.start.column
            ),
            None => format!("{}: {} [{}]", self.severity.as_str(), self.message, self.code),
        }
    }
}
