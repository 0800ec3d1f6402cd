//! Append-only accumulator for diagnostics.
//!
//! Every check reports through a [`DiagnosticSink`] instead of failing on the
//! first finding, so a single run surfaces all defects of a source unit.
//! Diagnostics are kept in emission order.

use log::debug;

use crate::error::Diagnostic;

/// Ordered collection of the diagnostics emitted during one run.
///
/// # Example
///
/// ```
/// # use modelcheck_core::error::{CodeScheme, CodeTable, DiagnosticSink, ErrorCode};
/// # use modelcheck_core::span::Span;
/// let table = CodeTable::get(CodeScheme::Current);
/// let mut sink = DiagnosticSink::new();
///
/// sink.emit(table.diagnostic(ErrorCode::OpenRecord, &[]).with_label(Span::new(0..10), "here"));
/// sink.emit(table.diagnostic(ErrorCode::MissingIdentifier, &[&"Building"]));
///
/// assert_eq!(sink.len(), 2);
/// assert!(sink.has_errors());
/// ```
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a diagnostic.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        debug!(
            code = diagnostic.code().map(|code| code.as_str()).unwrap_or("-"),
            severity = diagnostic.severity().as_upper_str();
            "Diagnostic emitted"
        );
        if diagnostic.severity().is_error() {
            self.error_count += 1;
        }
        self.diagnostics.push(diagnostic);
    }

    /// Append every diagnostic of `diagnostics`, in order.
    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.emit(diagnostic);
        }
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
