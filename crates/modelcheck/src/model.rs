//! The in-memory entity model of one validation run.
//!
//! Building the model is two steps:
//!
//! 1. [`extract`] splits the unit's declarations into records, enums and
//!    rejected declarations.
//! 2. [`Model::build`] turns every record into an [`Entity`], classifying
//!    each field type against the entity and enum names of the unit.
//!
//! Both steps report what they find to a
//! [`DiagnosticSink`](modelcheck_core::error::DiagnosticSink) and only fail on
//! declarations that break the input contract.

mod entity;
mod extract;
mod field_type;

pub use entity::{Entity, EntityField};
pub use extract::{Extracted, extract};
pub use field_type::{Association, FieldType, Scalar, UnsupportedType};

use indexmap::{IndexMap, IndexSet};
use log::debug;

use modelcheck_core::{
    error::{CodeTable, DiagnosticSink},
    identifier::Id,
};

use crate::error::ModelError;

use entity::EntityBuilder;
use field_type::TypeScope;

/// Entities and enums of one unit, in declaration order.
#[derive(Debug, Default)]
pub struct Model {
    entities: IndexMap<Id, Entity>,
    enums: IndexSet<Id>,
}

impl Model {
    /// Build the entities of `extracted`, reporting shape and field-type
    /// defects to `sink`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::MalformedDeclaration`] for declarations missing
    /// required structure.
    pub fn build(
        extracted: &Extracted<'_>,
        table: &'static CodeTable,
        sink: &mut DiagnosticSink,
    ) -> Result<Self, ModelError> {
        let entity_names: IndexSet<Id> = extracted
            .records()
            .iter()
            .filter_map(|declaration| declaration.name())
            .map(|name| *name.inner())
            .collect();
        let enums: IndexSet<Id> = extracted
            .enums()
            .iter()
            .filter_map(|declaration| declaration.name())
            .map(|name| *name.inner())
            .collect();

        let builder = EntityBuilder::new(TypeScope::new(&entity_names, &enums), table);
        let mut entities = IndexMap::with_capacity(entity_names.len());
        for declaration in extracted.records() {
            let entity = builder.build(declaration, sink)?;
            debug!(
                entity = entity.name().to_name(),
                fields = entity.fields().len();
                "Entity built"
            );
            entities.insert(entity.name(), entity);
        }

        Ok(Self { entities, enums })
    }

    /// Entities in declaration order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn entity(&self, name: Id) -> Option<&Entity> {
        self.entities.get(&name)
    }

    /// Enum names in declaration order.
    pub fn enums(&self) -> impl Iterator<Item = Id> + '_ {
        self.enums.iter().copied()
    }

    pub fn is_enum(&self, name: Id) -> bool {
        self.enums.contains(&name)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use modelcheck_core::{
        declaration::{Declaration, Field, TypeDescriptor},
        error::CodeScheme,
        span::Span,
    };

    use super::*;

    #[test]
    fn test_build_resolves_forward_references() {
        let declarations = vec![
            Declaration::record("Workspace", Span::new(0..10), true)
                .with_member(Field::named("id", TypeDescriptor::named("string"), Span::new(1..2)).readonly())
                .with_member(Field::named("location", TypeDescriptor::named("Building"), Span::new(2..3))),
            Declaration::enumeration("Gender", Span::new(10..20), &["MALE", "FEMALE"]),
            Declaration::record("Building", Span::new(20..30), true)
                .with_member(Field::named("code", TypeDescriptor::named("string"), Span::new(21..22)).readonly())
                .with_member(Field::named("owner", TypeDescriptor::named("Gender"), Span::new(22..23))),
        ];
        let extracted = extract(&declarations).unwrap();

        let mut sink = DiagnosticSink::new();
        let model = Model::build(&extracted, CodeTable::get(CodeScheme::Current), &mut sink).unwrap();

        assert!(sink.is_empty());
        assert_eq!(model.len(), 2);
        assert!(model.is_enum(Id::new("Gender")));

        let names: Vec<Id> = model.entities().map(Entity::name).collect();
        assert_eq!(names, [Id::new("Workspace"), Id::new("Building")]);

        let workspace = model.entity(Id::new("Workspace")).unwrap();
        let location = workspace.field(Id::new("location")).unwrap();
        assert_eq!(*location.ty(), FieldType::EntityRef(Id::new("Building")));

        let building = model.entity(Id::new("Building")).unwrap();
        let owner = building.field(Id::new("owner")).unwrap();
        assert_eq!(*owner.ty(), FieldType::EnumRef(Id::new("Gender")));
    }

    #[test]
    fn test_only_enums_build_an_empty_model() {
        let declarations = vec![Declaration::enumeration("Gender", Span::new(0..10), &["MALE"])];
        let extracted = extract(&declarations).unwrap();

        let mut sink = DiagnosticSink::new();
        let model = Model::build(&extracted, CodeTable::get(CodeScheme::Legacy), &mut sink).unwrap();

        assert!(model.is_empty());
        assert_eq!(model.enums().count(), 1);
        assert!(sink.is_empty());
    }
}
