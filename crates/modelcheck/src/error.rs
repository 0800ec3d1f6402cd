//! Error types for modelcheck operations.
//!
//! Schema defects are never errors here: they are reported as diagnostics in
//! a [`Report`](crate::Report). The types in this module cover the cases where
//! a run cannot produce a report at all.

use std::io;

use thiserror::Error;

use modelcheck_core::span::Span;
use modelcheck_parser::ParseError;

/// A declaration snapshot that breaks the engine's input contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("malformed declaration: {reason}")]
    MalformedDeclaration { span: Span, reason: &'static str },
}

impl ModelError {
    pub(crate) fn malformed(span: Span, reason: &'static str) -> Self {
        Self::MalformedDeclaration { span, reason }
    }

    /// Source range of the offending declaration or member.
    pub fn span(&self) -> Span {
        match self {
            Self::MalformedDeclaration { span, .. } => *span,
        }
    }
}

/// The main error type for modelcheck operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant carries the syntax diagnostics together with the source
/// they point into, so front ends can render them with snippets.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CheckError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
