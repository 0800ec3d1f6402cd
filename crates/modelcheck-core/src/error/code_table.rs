//! Versioned code tables.
//!
//! The same checks have been published under two numbering schemes. A
//! [`CodeTable`] maps every [`ErrorCode`] to the code, severity and message
//! format of one scheme, so a single rule implementation can report under
//! either numbering.
//!
//! Tables are process-wide, built on first use and never mutated afterwards.
//!
//! | check                             | legacy      | current     |
//! |-----------------------------------|-------------|-------------|
//! | non-model declaration             | PERSIST_101 | PERSIST_101 |
//! | open record                       | PERSIST_102 | PERSIST_201 |
//! | missing identifier                | PERSIST_103 | PERSIST_501 |
//! | rest descriptor                   | PERSIST_110 | PERSIST_304 |
//! | defaultable field                 | PERSIST_111 | PERSIST_301 |
//! | inherited field                   | PERSIST_112 | PERSIST_302 |
//! | optional field                    | PERSIST_113 | PERSIST_303 |
//! | unsupported type                  | PERSIST_114 | PERSIST_305 |
//! | unsupported array (named element) | PERSIST_115 | PERSIST_306 |
//! | unsupported array                 | PERSIST_115 | PERSIST_307 |
//! | self reference                    | PERSIST_121 | PERSIST_401 |
//! | missing relation field            | PERSIST_122 | PERSIST_402 |
//! | duplicated relation               | PERSIST_123 | PERSIST_403 |
//! | foreign key field                 | PERSIST_124 | PERSIST_422 |
//! | nillable association              | PERSIST_125 | PERSIST_404 |
//! | n:m association                   | PERSIST_129 | PERSIST_420 |

use std::{
    collections::HashMap,
    fmt::{self, Display, Write as _},
    str::FromStr,
    sync::OnceLock,
};

use serde::Deserialize;
use thiserror::Error;

use crate::error::{Diagnostic, ErrorCode, Severity};

/// Which numbering epoch diagnostics are reported under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeScheme {
    /// The original `PERSIST_1xx` numbering.
    Legacy,
    /// The renumbered scheme grouped by check family.
    #[default]
    Current,
}

/// Returned when a scheme name is not recognized.
#[derive(Debug, Error)]
#[error("unknown code scheme `{0}` (expected `legacy` or `current`)")]
pub struct UnknownScheme(String);

impl FromStr for CodeScheme {
    type Err = UnknownScheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "legacy" => Ok(CodeScheme::Legacy),
            "current" => Ok(CodeScheme::Current),
            other => Err(UnknownScheme(other.to_string())),
        }
    }
}

impl fmt::Display for CodeScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeScheme::Legacy => write!(f, "legacy"),
            CodeScheme::Current => write!(f, "current"),
        }
    }
}

/// A published code attached to a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code {
    error_code: ErrorCode,
    id: &'static str,
}

impl Code {
    /// The check that produced the diagnostic.
    pub fn error_code(&self) -> ErrorCode {
        self.error_code
    }

    /// The published code string, e.g. `PERSIST_102`.
    pub fn as_str(&self) -> &'static str {
        self.id
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Code, severity and message format of one check under one scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeEntry {
    pub code: &'static str,
    pub severity: Severity,
    /// Message with positional `{0}`, `{1}` placeholders.
    pub format: &'static str,
}

impl CodeEntry {
    const fn error(code: &'static str, format: &'static str) -> Self {
        Self {
            code,
            severity: Severity::Error,
            format,
        }
    }

    /// Substitute positional placeholders. Placeholders without an argument are
    /// left as written; unused arguments are ignored.
    ///
    /// ```
    /// # use modelcheck_core::error::{CodeScheme, CodeTable, ErrorCode};
    /// let entry = CodeTable::get(CodeScheme::Current).lookup(ErrorCode::ForeignKeyField);
    /// assert_eq!(
    ///     entry.render(&[&"locationBuildingCode", &"Building"]),
    ///     "entity should not contain foreign key field `locationBuildingCode` for relation `Building`"
    /// );
    /// ```
    pub fn render(&self, args: &[&dyn Display]) -> String {
        let mut out = String::with_capacity(self.format.len());
        let mut rest = self.format;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let placeholder = after
                .find('}')
                .and_then(|close| after[..close].parse::<usize>().ok().map(|idx| (idx, close)));

            match placeholder {
                Some((idx, close)) if idx < args.len() => {
                    let _ = write!(out, "{}", args[idx]);
                    rest = &after[close + 1..];
                }
                _ => {
                    out.push('{');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }
}

// Syntax codes are the same under both schemes.
const UNTERMINATED_STRING: CodeEntry = CodeEntry::error("E001", "unterminated string literal");
const UNEXPECTED_CHARACTER: CodeEntry = CodeEntry::error("E002", "unexpected character");
const UNEXPECTED_TOKEN: CodeEntry = CodeEntry::error("E100", "unexpected token: expected {0}");
const UNEXPECTED_END_OF_INPUT: CodeEntry =
    CodeEntry::error("E101", "unexpected end of input: expected {0}");

fn legacy_entry(code: ErrorCode) -> CodeEntry {
    match code {
        ErrorCode::UnterminatedString => UNTERMINATED_STRING,
        ErrorCode::UnexpectedCharacter => UNEXPECTED_CHARACTER,
        ErrorCode::UnexpectedToken => UNEXPECTED_TOKEN,
        ErrorCode::UnexpectedEndOfInput => UNEXPECTED_END_OF_INPUT,
        ErrorCode::NonModelDeclaration => CodeEntry::error(
            "PERSIST_101",
            "persist model definition only supports enum and record declarations",
        ),
        ErrorCode::OpenRecord => {
            CodeEntry::error("PERSIST_102", "an entity should be a closed record")
        }
        ErrorCode::MissingIdentifier => CodeEntry::error(
            "PERSIST_103",
            "entity '{0}' must have an identifier readonly field",
        ),
        ErrorCode::RestDescriptorField => CodeEntry::error(
            "PERSIST_110",
            "an entity does not support rest descriptor field",
        ),
        ErrorCode::DefaultableField => {
            CodeEntry::error("PERSIST_111", "an entity does not support defaultable field")
        }
        ErrorCode::InheritedField => {
            CodeEntry::error("PERSIST_112", "an entity does not support inherited field")
        }
        ErrorCode::OptionalField => {
            CodeEntry::error("PERSIST_113", "an entity does not support optional field")
        }
        ErrorCode::UnsupportedType => {
            CodeEntry::error("PERSIST_114", "an entity field of '{0}' type is not supported")
        }
        ErrorCode::UnsupportedArrayElement | ErrorCode::UnsupportedArray => {
            CodeEntry::error("PERSIST_115", "an entity field of array type is not supported")
        }
        ErrorCode::SelfReference => CodeEntry::error(
            "PERSIST_121",
            "an entity cannot reference itself in association",
        ),
        ErrorCode::MissingRelationField => CodeEntry::error(
            "PERSIST_122",
            "the associated entity '{0}' does not have the field with the relationship type",
        ),
        ErrorCode::DuplicatedRelation => CodeEntry::error(
            "PERSIST_123",
            "entity does not support duplicated relations to an associated entity",
        ),
        ErrorCode::ForeignKeyField => CodeEntry::error(
            "PERSIST_124",
            "entity should not contain foreign key field for relation '{1}'",
        ),
        ErrorCode::NillableAssociation => CodeEntry::error(
            "PERSIST_125",
            "an entity does not support nillable associations",
        ),
        ErrorCode::ManyToMany => {
            CodeEntry::error("PERSIST_129", "n:m association is not supported yet")
        }
    }
}

fn current_entry(code: ErrorCode) -> CodeEntry {
    match code {
        ErrorCode::UnterminatedString => UNTERMINATED_STRING,
        ErrorCode::UnexpectedCharacter => UNEXPECTED_CHARACTER,
        ErrorCode::UnexpectedToken => UNEXPECTED_TOKEN,
        ErrorCode::UnexpectedEndOfInput => UNEXPECTED_END_OF_INPUT,
        ErrorCode::NonModelDeclaration => CodeEntry::error(
            "PERSIST_101",
            "persist model definition only supports record definitions and enum declarations",
        ),
        ErrorCode::OpenRecord => CodeEntry::error("PERSIST_201", "entity should be a closed record"),
        ErrorCode::MissingIdentifier => CodeEntry::error(
            "PERSIST_501",
            "entity must have at least one identifier readonly field",
        ),
        ErrorCode::DefaultableField => {
            CodeEntry::error("PERSIST_301", "entity does not support defaultable field")
        }
        ErrorCode::InheritedField => {
            CodeEntry::error("PERSIST_302", "entity does not support inherited field")
        }
        ErrorCode::OptionalField => {
            CodeEntry::error("PERSIST_303", "entity does not support optional field")
        }
        ErrorCode::RestDescriptorField => {
            CodeEntry::error("PERSIST_304", "entity does not support rest descriptor field")
        }
        ErrorCode::UnsupportedType => {
            CodeEntry::error("PERSIST_305", "`{0}`-typed field is not supported")
        }
        ErrorCode::UnsupportedArrayElement => {
            CodeEntry::error("PERSIST_306", "array of `{0}`-typed field is not supported")
        }
        ErrorCode::UnsupportedArray => {
            CodeEntry::error("PERSIST_307", "array-typed field is not supported")
        }
        ErrorCode::SelfReference => CodeEntry::error(
            "PERSIST_401",
            "an entity cannot reference itself in association",
        ),
        ErrorCode::MissingRelationField => CodeEntry::error(
            "PERSIST_402",
            "the associated entity `{0}` does not have the associated `{1}`-typed field",
        ),
        ErrorCode::DuplicatedRelation => CodeEntry::error(
            "PERSIST_403",
            "entity does not support duplicated relations to an associated entity",
        ),
        ErrorCode::NillableAssociation => {
            CodeEntry::error("PERSIST_404", "entity does not support nillable associations")
        }
        ErrorCode::ManyToMany => {
            CodeEntry::error("PERSIST_420", "n:m association is not supported yet")
        }
        ErrorCode::ForeignKeyField => CodeEntry::error(
            "PERSIST_422",
            "entity should not contain foreign key field `{0}` for relation `{1}`",
        ),
    }
}

static LEGACY: OnceLock<CodeTable> = OnceLock::new();
static CURRENT: OnceLock<CodeTable> = OnceLock::new();

/// Read-only lookup from check to published code, severity and message.
#[derive(Debug)]
pub struct CodeTable {
    scheme: CodeScheme,
    entries: HashMap<ErrorCode, CodeEntry>,
}

impl CodeTable {
    fn build(scheme: CodeScheme) -> Self {
        let entry_for = match scheme {
            CodeScheme::Legacy => legacy_entry,
            CodeScheme::Current => current_entry,
        };
        let entries = ErrorCode::ALL
            .iter()
            .map(|&code| (code, entry_for(code)))
            .collect();
        Self { scheme, entries }
    }

    /// The shared table for `scheme`.
    pub fn get(scheme: CodeScheme) -> &'static CodeTable {
        let cell = match scheme {
            CodeScheme::Legacy => &LEGACY,
            CodeScheme::Current => &CURRENT,
        };
        cell.get_or_init(|| Self::build(scheme))
    }

    pub fn scheme(&self) -> CodeScheme {
        self.scheme
    }

    /// Entry for `code`. Tables are built from [`ErrorCode::ALL`], so every
    /// code is present.
    pub fn lookup(&self, code: ErrorCode) -> CodeEntry {
        self.entries[&code]
    }

    /// Start a diagnostic for `code`: severity, published code, rendered message
    /// and the check's help text. Callers attach labels.
    pub fn diagnostic(&self, code: ErrorCode, args: &[&dyn Display]) -> Diagnostic {
        let entry = self.lookup(code);
        let diagnostic = Diagnostic::new(entry.severity, entry.render(args)).with_code(Code {
            error_code: code,
            id: entry.code,
        });
        match code.help() {
            Some(help) => diagnostic.with_help(help),
            None => diagnostic,
        }
    }
}
