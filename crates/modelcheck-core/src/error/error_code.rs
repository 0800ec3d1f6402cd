//! Check identities for the modelcheck diagnostic system.
//!
//! An [`ErrorCode`] names *which check fired*. The code users see (for example
//! `PERSIST_102`) is looked up in a [`CodeTable`](super::CodeTable), because
//! the same check has been published under different numbers over time.
//!
//! Checks are organized by phase:
//! - Lexer and parser errors
//! - Model extraction
//! - Entity shape and field checks
//! - Relationship checks

use std::fmt;

/// Identity of a check that can produce a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Lexer and parser errors
    // =========================================================================
    /// A string literal was opened but never closed.
    UnterminatedString,

    /// A character that cannot start any token.
    UnexpectedCharacter,

    /// The parser found a token it did not expect at this position.
    UnexpectedToken,

    /// The input ended before a complete declaration was parsed.
    UnexpectedEndOfInput,

    // =========================================================================
    // Model extraction
    // =========================================================================
    /// A model file contains something other than records and enums.
    NonModelDeclaration,

    // =========================================================================
    // Entity shape
    // =========================================================================
    /// The entity record is open (`record { }` instead of `record {| |}`).
    OpenRecord,

    /// The entity has no `readonly` field to act as its identifier.
    MissingIdentifier,

    /// A member has a default value.
    DefaultableField,

    /// A member is a type inclusion (`*Base;`).
    InheritedField,

    /// A member is optional (`name?`).
    OptionalField,

    /// A rest descriptor (`T...;`).
    RestDescriptorField,

    /// A field type the persistence layer cannot store.
    UnsupportedType,

    /// An array of a nameable scalar or enum element type.
    UnsupportedArrayElement,

    /// An array whose element type cannot be named as a single type.
    UnsupportedArray,

    // =========================================================================
    // Relationships
    // =========================================================================
    /// An association field whose type is its own entity.
    SelfReference,

    /// The associated entity has no field pointing back.
    MissingRelationField,

    /// A second association field to the same associated entity.
    DuplicatedRelation,

    /// A hand-declared field that collides with a synthesized foreign key.
    ForeignKeyField,

    /// An association field typed `Entity?`.
    NillableAssociation,

    /// Both sides of a relationship are arrays.
    ManyToMany,
}

impl ErrorCode {
    /// Every check, in table order.
    pub const ALL: [ErrorCode; 20] = [
        ErrorCode::UnterminatedString,
        ErrorCode::UnexpectedCharacter,
        ErrorCode::UnexpectedToken,
        ErrorCode::UnexpectedEndOfInput,
        ErrorCode::NonModelDeclaration,
        ErrorCode::OpenRecord,
        ErrorCode::MissingIdentifier,
        ErrorCode::DefaultableField,
        ErrorCode::InheritedField,
        ErrorCode::OptionalField,
        ErrorCode::RestDescriptorField,
        ErrorCode::UnsupportedType,
        ErrorCode::UnsupportedArrayElement,
        ErrorCode::UnsupportedArray,
        ErrorCode::SelfReference,
        ErrorCode::MissingRelationField,
        ErrorCode::DuplicatedRelation,
        ErrorCode::ForeignKeyField,
        ErrorCode::NillableAssociation,
        ErrorCode::ManyToMany,
    ];

    /// Returns a short description of what this check means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::UnterminatedString => "unterminated string literal",
            ErrorCode::UnexpectedCharacter => "unexpected character",
            ErrorCode::UnexpectedToken => "unexpected token",
            ErrorCode::UnexpectedEndOfInput => "unexpected end of input",
            ErrorCode::NonModelDeclaration => "not a record or enum declaration",
            ErrorCode::OpenRecord => "open record",
            ErrorCode::MissingIdentifier => "missing identifier field",
            ErrorCode::DefaultableField => "defaultable field",
            ErrorCode::InheritedField => "inherited field",
            ErrorCode::OptionalField => "optional field",
            ErrorCode::RestDescriptorField => "rest descriptor",
            ErrorCode::UnsupportedType => "unsupported field type",
            ErrorCode::UnsupportedArrayElement => "unsupported array field",
            ErrorCode::UnsupportedArray => "unsupported array field",
            ErrorCode::SelfReference => "self-referencing association",
            ErrorCode::MissingRelationField => "missing relation field",
            ErrorCode::DuplicatedRelation => "duplicated relation",
            ErrorCode::ForeignKeyField => "declared foreign key",
            ErrorCode::NillableAssociation => "nillable association",
            ErrorCode::ManyToMany => "many-to-many association",
        }
    }

    /// Suggested fix, where one applies independently of the input.
    pub fn help(&self) -> Option<&'static str> {
        match self {
            ErrorCode::UnterminatedString => Some("add closing `\"`"),
            ErrorCode::OpenRecord => Some("close the record with `record {| ... |}`"),
            ErrorCode::MissingIdentifier => {
                Some("mark the primary key field(s) with `readonly`")
            }
            ErrorCode::OptionalField => {
                Some("use a nillable type (`T?`) instead of an optional field")
            }
            ErrorCode::InheritedField => Some("declare the fields directly in the entity"),
            ErrorCode::MissingRelationField => {
                Some("add a field of the referencing entity's type to the associated entity")
            }
            ErrorCode::ForeignKeyField => {
                Some("remove the field; the foreign key is generated from the association")
            }
            ErrorCode::ManyToMany => {
                Some("introduce a joining entity with two one-to-many associations")
            }
            _ => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_unique() {
        for (idx, code) in ErrorCode::ALL.iter().enumerate() {
            assert!(
                !ErrorCode::ALL[idx + 1..].contains(code),
                "{code:?} listed twice"
            );
        }
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::OpenRecord.description(), "open record");
        assert_eq!(ErrorCode::ManyToMany.to_string(), "many-to-many association");
    }

    #[test]
    fn test_error_code_help() {
        assert!(ErrorCode::OpenRecord.help().is_some());
        assert!(ErrorCode::DuplicatedRelation.help().is_none());
    }
}
