//! The error returned when source text does not parse.
//!
//! [`ParseError`] wraps every syntax [`Diagnostic`] found in one pass over the
//! source. Syntax codes are identical under both code schemes.

use std::fmt::{self, Display};

use modelcheck_core::error::{CodeScheme, CodeTable, Diagnostic, ErrorCode};

/// Error type for the lexing and parsing phases.
#[derive(Debug)]
pub struct ParseError {
    diagnostics: Vec<Diagnostic>,
}

impl ParseError {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    /// All syntax diagnostics, in source order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(first) = self.diagnostics.first() {
            write!(f, "{first}")?;
            if self.diagnostics.len() > 1 {
                write!(f, " (+{} more)", self.diagnostics.len() - 1)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

impl From<Diagnostic> for ParseError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self {
            diagnostics: vec![diagnostic],
        }
    }
}

impl From<Vec<Diagnostic>> for ParseError {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }
}

/// Start a syntax diagnostic.
pub(crate) fn syntax_diagnostic(code: ErrorCode, args: &[&dyn Display]) -> Diagnostic {
    CodeTable::get(CodeScheme::Current).diagnostic(code, args)
}
