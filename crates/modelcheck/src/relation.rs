//! Relationship resolution between entities.
//!
//! Every association field of every entity is walked in declaration order.
//! Each field either becomes one side of a [`Relationship`], is reported
//! (self reference, duplicated relation), or is left to the rules (nillable
//! associations). A relationship is recorded once, at the first of its two
//! fields in walk order.
//!
//! # Foreign-key ownership
//!
//! | shape | owner |
//! |---|---|
//! | one-to-many | the entity holding the single reference |
//! | one-to-one, one side nillable | the other side |
//! | one-to-one, otherwise | the entity whose name sorts first |
//! | one-directional single reference | the declaring entity |
//! | many-to-many | none |

use std::{cmp::Ordering, collections::HashSet};

use log::debug;

use modelcheck_core::{
    error::{CodeTable, DiagnosticSink, ErrorCode},
    identifier::Id,
    span::Span,
};

use crate::model::{Association, Entity, EntityField, Model};

/// Shape of a relationship between two entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    OneToOne,
    OneToMany,
    ManyToMany,
}

/// One side of a relationship: an association field of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationEnd {
    entity: Id,
    field: Id,
    span: Span,
    association: Association,
}

impl RelationEnd {
    fn new(entity: &Entity, field: &EntityField, association: Association) -> Self {
        Self {
            entity: entity.name(),
            field: field.name(),
            span: field.span(),
            association,
        }
    }

    /// The entity declaring the field.
    pub fn entity(&self) -> Id {
        self.entity
    }

    pub fn field(&self) -> Id {
        self.field
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn association(&self) -> Association {
        self.association
    }

    fn key(&self) -> (Id, Id) {
        (self.entity, self.field)
    }
}

/// A resolved association between two distinct entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    source: RelationEnd,
    counterpart: Option<RelationEnd>,
    cardinality: Cardinality,
    owner: Option<Id>,
}

impl Relationship {
    /// The field the relationship was discovered from.
    pub fn source(&self) -> &RelationEnd {
        &self.source
    }

    /// The entity referenced by the source field.
    pub fn target(&self) -> Id {
        self.source.association.target
    }

    /// The field on the target pointing back, if any.
    pub fn counterpart(&self) -> Option<&RelationEnd> {
        self.counterpart.as_ref()
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    /// The entity holding the foreign key.
    pub fn owner(&self) -> Option<Id> {
        self.owner
    }

    /// The owner's field for this relationship, when the owner declares one.
    pub fn owner_end(&self) -> Option<&RelationEnd> {
        let owner = self.owner?;
        if self.source.entity == owner {
            Some(&self.source)
        } else {
            self.counterpart.as_ref().filter(|end| end.entity == owner)
        }
    }

    /// The entity the owner's foreign key points at.
    pub fn referenced(&self) -> Option<Id> {
        let owner = self.owner?;
        if self.source.entity == owner {
            Some(self.target())
        } else {
            Some(self.source.entity)
        }
    }
}

/// All relationships of one model, in discovery order.
#[derive(Debug, Default)]
pub struct RelationGraph {
    relationships: Vec<Relationship>,
}

impl RelationGraph {
    /// Resolve the relationships of `model`, reporting self references,
    /// duplicated relations and many-to-many associations to `sink`.
    pub fn resolve(model: &Model, table: &CodeTable, sink: &mut DiagnosticSink) -> Self {
        let mut relationships = Vec::new();
        let mut paired: HashSet<(Id, Id)> = HashSet::new();

        for entity in model.entities() {
            let mut targets: HashSet<Id> = HashSet::new();

            for (field, association) in entity.association_fields() {
                if association.target == entity.name() {
                    sink.emit(
                        table
                            .diagnostic(ErrorCode::SelfReference, &[])
                            .with_label(field.span(), "refers to its own entity"),
                    );
                    continue;
                }
                if association.nillable {
                    continue;
                }
                if !targets.insert(association.target) {
                    sink.emit(
                        table
                            .diagnostic(ErrorCode::DuplicatedRelation, &[])
                            .with_label(field.span(), "second association to the same entity"),
                    );
                    continue;
                }

                let source = RelationEnd::new(entity, field, association);
                if paired.contains(&source.key()) {
                    continue;
                }
                let Some(target) = model.entity(association.target) else {
                    continue;
                };

                let counterpart = find_counterpart(target, entity.name());
                let relationship = relate(source, counterpart);

                if let (Cardinality::ManyToMany, Some(counterpart)) =
                    (relationship.cardinality, &relationship.counterpart)
                {
                    sink.emit(
                        table
                            .diagnostic(ErrorCode::ManyToMany, &[])
                            .with_label(counterpart.span, "second array side")
                            .with_secondary_label(source.span, "first array side"),
                    );
                }

                debug!(
                    source = entity.name().to_name(),
                    field = field.name().to_name(),
                    target = target.name().to_name(),
                    cardinality:? = relationship.cardinality,
                    bidirectional = relationship.counterpart.is_some();
                    "Relationship resolved"
                );

                paired.insert(source.key());
                if let Some(counterpart) = &relationship.counterpart {
                    paired.insert(counterpart.key());
                }
                relationships.push(relationship);
            }
        }

        Self { relationships }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.relationships.iter()
    }

    pub fn len(&self) -> usize {
        self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }
}

/// The field on `target` pointing back at `source`: the first non-nillable
/// one, else the first nillable one.
fn find_counterpart(target: &Entity, source: Id) -> Option<RelationEnd> {
    let mut nillable = None;
    for (field, association) in target.association_fields() {
        if association.target != source {
            continue;
        }
        if !association.nillable {
            return Some(RelationEnd::new(target, field, association));
        }
        if nillable.is_none() {
            nillable = Some(RelationEnd::new(target, field, association));
        }
    }
    nillable
}

fn relate(source: RelationEnd, counterpart: Option<RelationEnd>) -> Relationship {
    let target = source.association.target;

    let (cardinality, owner) = match &counterpart {
        None if source.association.many => (Cardinality::OneToMany, Some(target)),
        None => (Cardinality::OneToOne, Some(source.entity)),
        Some(other) => match (source.association.many, other.association.many) {
            (true, true) => (Cardinality::ManyToMany, None),
            (true, false) => (Cardinality::OneToMany, Some(target)),
            (false, true) => (Cardinality::OneToMany, Some(source.entity)),
            (false, false) => {
                let owner = match (source.association.nillable, other.association.nillable) {
                    (false, true) => source.entity,
                    (true, false) => target,
                    _ => match source.entity.cmp_lexical(target) {
                        Ordering::Greater => target,
                        Ordering::Less | Ordering::Equal => source.entity,
                    },
                };
                (Cardinality::OneToOne, Some(owner))
            }
        },
    };

    Relationship {
        source,
        counterpart,
        cardinality,
        owner,
    }
}

#[cfg(test)]
mod tests {
    use modelcheck_core::{
        declaration::{Declaration, Field, TypeDescriptor},
        error::CodeScheme,
    };

    use super::*;
    use crate::model::extract;

    struct Fixture {
        declarations: Vec<Declaration>,
        offset: usize,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                declarations: Vec::new(),
                offset: 0,
            }
        }

        fn span(&mut self) -> Span {
            self.offset += 10;
            Span::new(self.offset..self.offset + 5)
        }

        fn entity(mut self, name: &str, fields: &[(&str, TypeDescriptor)]) -> Self {
            let span = self.span();
            let id_span = self.span();
            let mut declaration = Declaration::record(name, span, true)
                .with_member(Field::named("id", TypeDescriptor::named("int"), id_span).readonly());
            for (field, ty) in fields {
                let span = self.span();
                declaration = declaration.with_member(Field::named(field, ty.clone(), span));
            }
            self.declarations.push(declaration);
            self
        }

        fn resolve(&self) -> (Model, RelationGraph, DiagnosticSink) {
            let table = CodeTable::get(CodeScheme::Current);
            let extracted = extract(&self.declarations).unwrap();
            let mut sink = DiagnosticSink::new();
            let model = Model::build(&extracted, table, &mut sink).unwrap();
            let graph = RelationGraph::resolve(&model, table, &mut sink);
            (model, graph, sink)
        }
    }

    fn one(name: &str) -> TypeDescriptor {
        TypeDescriptor::named(name)
    }

    fn many(name: &str) -> TypeDescriptor {
        TypeDescriptor::array_of(TypeDescriptor::named(name))
    }

    fn nillable(name: &str) -> TypeDescriptor {
        TypeDescriptor::optional_of(TypeDescriptor::named(name))
    }

    fn codes(sink: &DiagnosticSink) -> Vec<&'static str> {
        sink.diagnostics()
            .iter()
            .filter_map(|diag| diag.code().map(|code| code.as_str()))
            .collect()
    }

    #[test]
    fn test_one_to_many() {
        let (_, graph, sink) = Fixture::new()
            .entity("Workspace", &[("location", one("Building"))])
            .entity("Building", &[("workspaces", many("Workspace"))])
            .resolve();

        assert!(sink.is_empty());
        assert_eq!(graph.len(), 1);

        let relationship = graph.iter().next().unwrap();
        assert_eq!(relationship.cardinality(), Cardinality::OneToMany);
        assert_eq!(relationship.owner(), Some(Id::new("Workspace")));
        assert_eq!(relationship.referenced(), Some(Id::new("Building")));
        assert_eq!(
            relationship.owner_end().map(RelationEnd::field),
            Some(Id::new("location"))
        );
        assert_eq!(
            relationship.counterpart().map(RelationEnd::field),
            Some(Id::new("workspaces"))
        );
    }

    #[test]
    fn test_one_to_many_discovered_from_array_side() {
        let (_, graph, _) = Fixture::new()
            .entity("Building", &[("workspaces", many("Workspace"))])
            .entity("Workspace", &[("location", one("Building"))])
            .resolve();

        let relationship = graph.iter().next().unwrap();
        assert_eq!(relationship.source().field(), Id::new("workspaces"));
        assert_eq!(relationship.owner(), Some(Id::new("Workspace")));
        assert_eq!(
            relationship.owner_end().map(RelationEnd::field),
            Some(Id::new("location"))
        );
    }

    #[test]
    fn test_one_to_one_lexical_owner() {
        let (_, graph, _) = Fixture::new()
            .entity("User", &[("profile", one("Profile"))])
            .entity("Profile", &[("user", one("User"))])
            .resolve();

        let relationship = graph.iter().next().unwrap();
        assert_eq!(relationship.cardinality(), Cardinality::OneToOne);
        assert_eq!(relationship.owner(), Some(Id::new("Profile")));
        assert_eq!(relationship.referenced(), Some(Id::new("User")));
    }

    #[test]
    fn test_one_to_one_nillable_side_does_not_own() {
        let (_, graph, _) = Fixture::new()
            .entity("Car", &[("driver", one("Person"))])
            .entity("Person", &[("car", nillable("Car"))])
            .resolve();

        assert_eq!(graph.len(), 1);
        let relationship = graph.iter().next().unwrap();
        assert_eq!(relationship.owner(), Some(Id::new("Car")));
    }

    #[test]
    fn test_nillable_source_is_matched_from_the_other_side() {
        let (_, graph, _) = Fixture::new()
            .entity("Person", &[("car", nillable("Car"))])
            .entity("Car", &[("driver", one("Person"))])
            .resolve();

        assert_eq!(graph.len(), 1);
        let relationship = graph.iter().next().unwrap();
        assert_eq!(relationship.source().entity(), Id::new("Car"));
        assert_eq!(relationship.owner(), Some(Id::new("Car")));
    }

    #[test]
    fn test_one_directional() {
        let (_, graph, sink) = Fixture::new()
            .entity("Workspace", &[("location", one("Building"))])
            .entity("Building", &[])
            .resolve();

        assert!(sink.is_empty());
        let relationship = graph.iter().next().unwrap();
        assert!(relationship.counterpart().is_none());
        assert_eq!(relationship.owner(), Some(Id::new("Workspace")));
    }

    #[test]
    fn test_self_reference_is_not_resolved() {
        let (_, graph, sink) = Fixture::new()
            .entity("Employee", &[("manager", one("Employee"))])
            .resolve();

        assert!(graph.is_empty());
        assert_eq!(codes(&sink), ["PERSIST_401"]);
    }

    #[test]
    fn test_duplicates_on_both_sides() {
        let (_, graph, sink) = Fixture::new()
            .entity("Workspace", &[("a", one("Building")), ("b", one("Building"))])
            .entity("Building", &[("x", many("Workspace")), ("y", many("Workspace"))])
            .resolve();

        assert_eq!(codes(&sink), ["PERSIST_403", "PERSIST_403"]);
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_many_to_many_reported_at_counterpart() {
        let (model, graph, sink) = Fixture::new()
            .entity("Student", &[("courses", many("Course"))])
            .entity("Course", &[("students", many("Student"))])
            .resolve();

        assert_eq!(codes(&sink), ["PERSIST_420"]);
        let course = model.entity(Id::new("Course")).unwrap();
        let students = course.field(Id::new("students")).unwrap();
        assert_eq!(sink.diagnostics()[0].primary_span(), Some(students.span()));

        let relationship = graph.iter().next().unwrap();
        assert_eq!(relationship.cardinality(), Cardinality::ManyToMany);
        assert!(relationship.owner().is_none());
        assert!(relationship.owner_end().is_none());
    }
}
