//! Entities and the builder that derives them from record declarations.

use log::trace;

use modelcheck_core::{
    declaration::{Declaration, Field, MemberKind, TypeDescriptor},
    error::{CodeTable, DiagnosticSink, ErrorCode},
    identifier::Id,
    span::{Span, Spanned},
};

use crate::{
    error::ModelError,
    model::field_type::{Association, FieldType, TypeScope},
};

/// A named field of an entity with its classified type.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityField {
    name: Spanned<Id>,
    ty: Spanned<FieldType>,
    readonly: bool,
    span: Span,
}

impl EntityField {
    pub fn name(&self) -> Id {
        *self.name.inner()
    }

    pub fn ty(&self) -> &FieldType {
        self.ty.inner()
    }

    /// Range of the type as written.
    pub fn type_span(&self) -> Span {
        self.ty.span()
    }

    /// `true` for identifier fields.
    pub fn is_readonly(&self) -> bool {
        self.readonly
    }

    /// Range of the whole member, trailing `;` included.
    pub fn span(&self) -> Span {
        self.span
    }

    pub fn association(&self) -> Option<Association> {
        self.ty.inner().association()
    }
}

/// A record declaration accepted as a persistable entity.
///
/// Entities are built even when their declaration has shape defects, so every
/// independent defect of a unit is reported in one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    name: Spanned<Id>,
    span: Span,
    closed: bool,
    fields: Vec<EntityField>,
}

impl Entity {
    pub fn name(&self) -> Id {
        *self.name.inner()
    }

    pub fn name_span(&self) -> Span {
        self.name.span()
    }

    /// Range of the whole declaration.
    pub fn span(&self) -> Span {
        self.span
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Named fields in declaration order. Inclusions and rest descriptors are
    /// reported by the builder and not kept.
    pub fn fields(&self) -> &[EntityField] {
        &self.fields
    }

    pub fn field(&self, name: Id) -> Option<&EntityField> {
        self.fields.iter().find(|field| field.name() == name)
    }

    /// The `readonly` fields that make up the primary key.
    pub fn identifier_fields(&self) -> impl Iterator<Item = &EntityField> {
        self.fields.iter().filter(|field| field.is_readonly())
    }

    /// Fields referring to an entity, with the association they declare.
    pub fn association_fields(&self) -> impl Iterator<Item = (&EntityField, Association)> {
        self.fields
            .iter()
            .filter_map(|field| field.association().map(|association| (field, association)))
    }
}

/// Builds [`Entity`] values from record declarations, reporting shape and
/// field-type defects as it goes.
pub(crate) struct EntityBuilder<'a> {
    scope: TypeScope<'a>,
    table: &'static CodeTable,
}

impl<'a> EntityBuilder<'a> {
    pub(crate) fn new(scope: TypeScope<'a>, table: &'static CodeTable) -> Self {
        Self { scope, table }
    }

    /// Build the entity for one record declaration.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::MalformedDeclaration`] when the declaration is not
    /// a named record, a named member has no name, or a type inclusion does not
    /// name a type.
    pub(crate) fn build(
        &self,
        declaration: &Declaration,
        sink: &mut DiagnosticSink,
    ) -> Result<Entity, ModelError> {
        let (Some(name), Some(record)) = (declaration.name(), declaration.as_record()) else {
            return Err(ModelError::malformed(
                declaration.span(),
                "entity candidate is not a named record",
            ));
        };

        if !record.is_closed() {
            sink.emit(
                self.table
                    .diagnostic(ErrorCode::OpenRecord, &[])
                    .with_label(record.descriptor_span(), "open record type"),
            );
        }

        let mut fields = Vec::with_capacity(record.members().len());
        for member in record.members() {
            self.check_qualifiers(member, sink);

            match member.kind() {
                MemberKind::Named => fields.push(self.build_field(member, sink)?),
                MemberKind::Inclusion => {
                    if !matches!(member.ty().inner(), TypeDescriptor::Named(_)) {
                        return Err(ModelError::malformed(
                            member.span(),
                            "type inclusion without a type name",
                        ));
                    }
                }
                MemberKind::Rest => {}
            }
        }

        let entity = Entity {
            name,
            span: declaration.span(),
            closed: record.is_closed(),
            fields,
        };

        if entity.identifier_fields().next().is_none() {
            sink.emit(
                self.table
                    .diagnostic(ErrorCode::MissingIdentifier, &[name.inner()])
                    .with_label(name.span(), "no `readonly` field"),
            );
        }

        trace!(entity:? = entity; "Built entity");
        Ok(entity)
    }

    fn check_qualifiers(&self, member: &Field, sink: &mut DiagnosticSink) {
        let qualifiers = member.qualifiers();
        let checks = [
            (qualifiers.defaultable, ErrorCode::DefaultableField),
            (member.is_inherited(), ErrorCode::InheritedField),
            (qualifiers.optional, ErrorCode::OptionalField),
            (member.is_rest(), ErrorCode::RestDescriptorField),
        ];

        for (fired, code) in checks {
            if fired {
                sink.emit(
                    self.table
                        .diagnostic(code, &[])
                        .with_label(member.span(), "not allowed in an entity"),
                );
            }
        }
    }

    fn build_field(&self, member: &Field, sink: &mut DiagnosticSink) -> Result<EntityField, ModelError> {
        let name = member
            .name()
            .ok_or_else(|| ModelError::malformed(member.span(), "record field without a name"))?;
        let ty = self.scope.classify(member.ty().inner());

        if let FieldType::Unsupported(reason) = &ty {
            let diagnostic = match reason.named_type() {
                Some(named) => self.table.diagnostic(reason.error_code(), &[named]),
                None => self.table.diagnostic(reason.error_code(), &[]),
            };
            sink.emit(diagnostic.with_label(member.ty().span(), "unsupported type"));
        }

        Ok(EntityField {
            name,
            ty: Spanned::new(ty, member.ty().span()),
            readonly: member.qualifiers().readonly,
            span: member.span(),
        })
    }
}
