//! Diagnostic collection
//!
//! The pipeline pushes every diagnostic into a [`Diagnostics`] bag and
//! consults it at each phase-step boundary: one or more errors after a step
//! stops the compilation. Renderers drain the bag afterwards.

use super::codes::DiagCode;
use super::diagnostic::{Diagnostic, Severity};

/// Receiver of diagnostics, the interface consumed by renderers.
pub trait DiagnosticSink {
    fn report(&mut self, diag: Diagnostic);
}

/// Exit classification of a finished compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitClass {
    /// No errors (warnings and notices permitted)
    Success,
    /// At least one semantic error
    SemanticError,
    /// At least one I/O or syntax error
    IoOrSyntaxError,
    /// At least one internal invariant violation
    InternalError,
}

impl ExitClass {
    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::SemanticError => 1,
            Self::IoOrSyntaxError => 2,
            Self::InternalError => 3,
        }
    }
}

/// Collecting sink used by the pipeline.
#[derive(Debug, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
    errors: usize,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, code: DiagCode, file: crate::base::FileId, span: crate::base::Span, message: impl Into<String>) {
        debug_assert!(code.severity() == Severity::Error);
        self.report(Diagnostic::new(code, file, span, message));
    }

    pub fn warning(&mut self, code: DiagCode, file: crate::base::FileId, span: crate::base::Span, message: impl Into<String>) {
        debug_assert!(code.severity() == Severity::Warning);
        self.report(Diagnostic::new(code, file, span, message));
    }

    pub fn notice(&mut self, code: DiagCode, file: crate::base::FileId, span: crate::base::Span, message: impl Into<String>) {
        debug_assert!(code.severity() == Severity::Notice);
        self.report(Diagnostic::new(code, file, span, message));
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    pub fn error_count(&self) -> usize {
        self.errors
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// All diagnostics carrying the given code.
    pub fn with_code(&self, code: DiagCode) -> Vec<&Diagnostic> {
        self.items.iter().filter(|d| d.code == code).collect()
    }

    /// Exit classification per the compiler contract:
    /// internal > io/syntax > semantic > success.
    pub fn exit_class(&self) -> ExitClass {
        if self.items.iter().any(|d| d.code.is_internal()) {
            return ExitClass::InternalError;
        }
        if self.items.iter().any(|d| d.code.is_io_or_syntax()) {
            return ExitClass::IoOrSyntaxError;
        }
        if self.has_errors() {
            return ExitClass::SemanticError;
        }
        ExitClass::Success
    }

    /// Drain all collected diagnostics into another sink.
    pub fn drain_into(&mut self, sink: &mut dyn DiagnosticSink) {
        for diag in self.items.drain(..) {
            sink.report(diag);
        }
        self.errors = 0;
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

impl DiagnosticSink for Diagnostics {
    fn report(&mut self, diag: Diagnostic) {
        if diag.severity.is_error() {
            self.errors += 1;
        }
        self.items.push(diag);
    }
}
