//! Diagnostic system shared by the parser and the validation engine.
//!
//! This module provides:
//! - Error codes identifying which check fired ([`ErrorCode`])
//! - Versioned code tables mapping checks to published codes, severities and
//!   message formats ([`CodeTable`], [`CodeScheme`])
//! - Multiple labeled spans per diagnostic ([`Label`])
//! - Severity levels ([`Severity`])
//! - An append-only sink for accumulating diagnostics ([`DiagnosticSink`])
//!
//! # Example
//!
//! ```
//! # use modelcheck_core::error::{CodeScheme, CodeTable, ErrorCode};
//! # use modelcheck_core::span::Span;
//!
//! let table = CodeTable::get(CodeScheme::Legacy);
//! let diag = table
//!     .diagnostic(ErrorCode::SelfReference, &[])
//!     .with_label(Span::new(100..120), "refers to its own entity");
//!
//! assert_eq!(diag.code().map(|code| code.as_str()), Some("PERSIST_121"));
//! assert!(diag.message().starts_with("an entity cannot reference itself"));
//! ```

mod code_table;
mod diagnostic;
mod error_code;
mod label;
mod severity;
mod sink;

pub use code_table::{Code, CodeEntry, CodeScheme, CodeTable, UnknownScheme};
pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use severity::Severity;
pub use sink::DiagnosticSink;
