//! The declaration snapshot handed to the validation engine.
//!
//! A source unit is an ordered list of [`Declaration`]s. Records and enums are
//! the only shapes the persist model accepts; anything else the host found at
//! the top level is carried as [`DeclarationKind::Other`] so the engine can
//! report it when the unit is a model file.
//!
//! Types are kept syntactic ([`TypeDescriptor`]). Whether `Building` names an
//! entity, an enum or nothing at all is decided later, once every declaration
//! of the unit is known.
//!
//! # Example
//!
//! ```
//! use modelcheck_core::declaration::{Declaration, Field, TypeDescriptor};
//! use modelcheck_core::span::Span;
//!
//! let building = Declaration::record("Building", Span::default(), true)
//!     .with_member(Field::named("buildingCode", TypeDescriptor::named("string"), Span::default()).readonly())
//!     .with_member(Field::named("city", TypeDescriptor::named("string"), Span::default()));
//!
//! assert!(building.as_record().is_some());
//! assert_eq!(building.as_record().unwrap().members().len(), 2);
//! ```

use std::fmt;

use crate::{
    identifier::Id,
    span::{Span, Spanned},
};

/// One top-level declaration of a source unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    name: Option<Spanned<Id>>,
    span: Span,
    kind: DeclarationKind,
}

/// What a top-level declaration is.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclarationKind {
    /// `type Name record {| ... |};`
    Record(RecordDeclaration),
    /// `enum Name { A, B }`
    Enum(EnumDeclaration),
    /// Anything else: functions, constants, classes, non-record type definitions.
    Other(OtherDeclaration),
}

impl Declaration {
    pub fn new(name: Option<Spanned<Id>>, span: Span, kind: DeclarationKind) -> Self {
        Self { name, span, kind }
    }

    /// Shorthand for a record declaration whose name and record descriptor share `span`.
    pub fn record(name: &str, span: Span, closed: bool) -> Self {
        Self::new(
            Some(Spanned::new(Id::new(name), span)),
            span,
            DeclarationKind::Record(RecordDeclaration::new(closed, span, Vec::new())),
        )
    }

    /// Shorthand for an enum declaration.
    pub fn enumeration(name: &str, span: Span, members: &[&str]) -> Self {
        let members = members
            .iter()
            .map(|member| Spanned::new(Id::new(member), span))
            .collect();
        Self::new(
            Some(Spanned::new(Id::new(name), span)),
            span,
            DeclarationKind::Enum(EnumDeclaration::new(members)),
        )
    }

    /// Shorthand for a declaration the persist model does not accept.
    pub fn other(description: &str, name: Option<&str>, span: Span) -> Self {
        Self::new(
            name.map(|name| Spanned::new(Id::new(name), span)),
            span,
            DeclarationKind::Other(OtherDeclaration::new(description)),
        )
    }

    /// Append a member to a record declaration. Non-records are returned unchanged.
    pub fn with_member(mut self, field: Field) -> Self {
        if let DeclarationKind::Record(record) = &mut self.kind {
            record.members.push(field);
        }
        self
    }

    pub fn name(&self) -> Option<Spanned<Id>> {
        self.name
    }

    /// Range of the whole declaration, modifiers and trailing `;` included.
    pub fn span(&self) -> Span {
        self.span
    }

    pub fn kind(&self) -> &DeclarationKind {
        &self.kind
    }

    pub fn as_record(&self) -> Option<&RecordDeclaration> {
        match &self.kind {
            DeclarationKind::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumDeclaration> {
        match &self.kind {
            DeclarationKind::Enum(enumeration) => Some(enumeration),
            _ => None,
        }
    }
}

/// A record type definition.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDeclaration {
    closed: bool,
    descriptor_span: Span,
    members: Vec<Field>,
}

impl RecordDeclaration {
    pub fn new(closed: bool, descriptor_span: Span, members: Vec<Field>) -> Self {
        Self {
            closed,
            descriptor_span,
            members,
        }
    }

    /// `true` for `record {| ... |}`, `false` for `record { ... }`.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Range from the `record` keyword to the closing brace.
    pub fn descriptor_span(&self) -> Span {
        self.descriptor_span
    }

    pub fn members(&self) -> &[Field] {
        &self.members
    }
}

/// An enum declaration. Members only matter as proof the name is an enum.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDeclaration {
    members: Vec<Spanned<Id>>,
}

impl EnumDeclaration {
    pub fn new(members: Vec<Spanned<Id>>) -> Self {
        Self { members }
    }

    pub fn members(&self) -> &[Spanned<Id>] {
        &self.members
    }
}

/// A top-level item that is neither a record nor an enum.
#[derive(Debug, Clone, PartialEq)]
pub struct OtherDeclaration {
    description: String,
}

impl OtherDeclaration {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }

    /// Short description of the item, e.g. `function` or `type alias`.
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// How a record member was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// `Type name;`
    Named,
    /// `*Base;`
    Inclusion,
    /// `Type...;`
    Rest,
}

/// Modifiers written on a named member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Qualifiers {
    pub readonly: bool,
    pub optional: bool,
    pub defaultable: bool,
}

/// One member of a record body.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    kind: MemberKind,
    name: Option<Spanned<Id>>,
    ty: Spanned<TypeDescriptor>,
    qualifiers: Qualifiers,
    span: Span,
}

impl Field {
    pub fn new(
        kind: MemberKind,
        name: Option<Spanned<Id>>,
        ty: Spanned<TypeDescriptor>,
        qualifiers: Qualifiers,
        span: Span,
    ) -> Self {
        Self {
            kind,
            name,
            ty,
            qualifiers,
            span,
        }
    }

    /// `Type name;` with name and type anchored at the member span.
    pub fn named(name: &str, ty: TypeDescriptor, span: Span) -> Self {
        Self::new(
            MemberKind::Named,
            Some(Spanned::new(Id::new(name), span)),
            Spanned::new(ty, span),
            Qualifiers::default(),
            span,
        )
    }

    /// `*Base;`
    pub fn inclusion(base: &str, span: Span) -> Self {
        Self::new(
            MemberKind::Inclusion,
            None,
            Spanned::new(TypeDescriptor::named(base), span),
            Qualifiers::default(),
            span,
        )
    }

    /// `Type...;`
    pub fn rest(ty: TypeDescriptor, span: Span) -> Self {
        Self::new(
            MemberKind::Rest,
            None,
            Spanned::new(ty, span),
            Qualifiers::default(),
            span,
        )
    }

    pub fn readonly(mut self) -> Self {
        self.qualifiers.readonly = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.qualifiers.optional = true;
        self
    }

    pub fn defaultable(mut self) -> Self {
        self.qualifiers.defaultable = true;
        self
    }

    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    pub fn name(&self) -> Option<Spanned<Id>> {
        self.name
    }

    pub fn ty(&self) -> &Spanned<TypeDescriptor> {
        &self.ty
    }

    pub fn qualifiers(&self) -> Qualifiers {
        self.qualifiers
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn is_inherited(&self) -> bool {
        self.kind == MemberKind::Inclusion
    }

    pub fn is_rest(&self) -> bool {
        self.kind == MemberKind::Rest
    }
}

/// A type as written in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    /// `int`, `Building`
    Named(Id),
    /// `time:Date`
    Qualified { module: Id, name: Id },
    /// `T[]`
    Array(Box<TypeDescriptor>),
    /// `T?`
    Optional(Box<TypeDescriptor>),
    /// `A|B`
    Union(Vec<TypeDescriptor>),
    /// An inline `record { ... }` type.
    AnonymousRecord,
}

impl TypeDescriptor {
    pub fn named(name: &str) -> Self {
        Self::Named(Id::new(name))
    }

    pub fn qualified(module: &str, name: &str) -> Self {
        Self::Qualified {
            module: Id::new(module),
            name: Id::new(name),
        }
    }

    pub fn array_of(element: TypeDescriptor) -> Self {
        Self::Array(Box::new(element))
    }

    pub fn optional_of(inner: TypeDescriptor) -> Self {
        Self::Optional(Box::new(inner))
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Union(_) => write!(f, "({self})"),
            _ => write!(f, "{self}"),
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "{name}"),
            Self::Qualified { module, name } => write!(f, "{module}:{name}"),
            Self::Array(element) => {
                element.fmt_operand(f)?;
                write!(f, "[]")
            }
            Self::Optional(inner) => {
                inner.fmt_operand(f)?;
                write!(f, "?")
            }
            Self::Union(members) => {
                for (idx, member) in members.iter().enumerate() {
                    if idx > 0 {
                        write!(f, "|")?;
                    }
                    write!(f, "{member}")?;
                }
                Ok(())
            }
            Self::AnonymousRecord => write!(f, "record"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_descriptor_display() {
        assert_eq!(TypeDescriptor::named("int").to_string(), "int");
        assert_eq!(TypeDescriptor::qualified("time", "Date").to_string(), "time:Date");
        assert_eq!(
            TypeDescriptor::array_of(TypeDescriptor::named("boolean")).to_string(),
            "boolean[]"
        );
        assert_eq!(
            TypeDescriptor::optional_of(TypeDescriptor::named("Building")).to_string(),
            "Building?"
        );
    }

    #[test]
    fn test_union_operand_is_parenthesized() {
        let union = TypeDescriptor::Union(vec![
            TypeDescriptor::named("int"),
            TypeDescriptor::named("string"),
        ]);

        assert_eq!(union.to_string(), "int|string");
        assert_eq!(TypeDescriptor::array_of(union).to_string(), "(int|string)[]");
    }

    #[test]
    fn test_field_builders() {
        let field = Field::named("id", TypeDescriptor::named("int"), Span::new(4..11))
            .readonly()
            .defaultable();

        assert_eq!(field.kind(), MemberKind::Named);
        assert!(field.qualifiers().readonly);
        assert!(field.qualifiers().defaultable);
        assert!(!field.qualifiers().optional);
        assert_eq!(field.name().map(|name| *name.inner()), Some(Id::new("id")));

        let base = Field::inclusion("Base", Span::new(0..6));
        assert!(base.is_inherited());
        assert!(base.name().is_none());

        let rest = Field::rest(TypeDescriptor::named("string"), Span::new(0..10));
        assert!(rest.is_rest());
    }

    #[test]
    fn test_with_member_ignores_non_records() {
        let gender = Declaration::enumeration("Gender", Span::default(), &["MALE", "FEMALE"])
            .with_member(Field::named("x", TypeDescriptor::named("int"), Span::default()));

        assert!(gender.as_record().is_none());
        assert_eq!(gender.as_enum().map(|e| e.members().len()), Some(2));
    }
}
