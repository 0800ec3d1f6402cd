//! Relationship-level rules run over the built model.
//!
//! Rules need the resolved [`RelationGraph`], so they run after entity building
//! and relationship resolution. Each rule is independent: every rule runs on
//! every model, whatever earlier rules found.

use log::trace;

use modelcheck_core::{
    error::{CodeTable, DiagnosticSink, ErrorCode},
    identifier::Id,
    span::Span,
};

use crate::{
    model::{Entity, Model},
    relation::RelationGraph,
};

/// What a rule can see.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    model: &'a Model,
    graph: &'a RelationGraph,
    table: &'static CodeTable,
}

impl<'a> RuleContext<'a> {
    pub fn new(model: &'a Model, graph: &'a RelationGraph, table: &'static CodeTable) -> Self {
        Self {
            model,
            graph,
            table,
        }
    }

    pub fn model(&self) -> &'a Model {
        self.model
    }

    pub fn graph(&self) -> &'a RelationGraph {
        self.graph
    }

    /// The code table diagnostics are published under.
    pub fn table(&self) -> &'static CodeTable {
        self.table
    }
}

/// Trait defining the interface for model rules.
pub trait Rule {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Report every violation found in `context` to `sink`, in declaration
    /// order.
    fn check(&self, context: &RuleContext<'_>, sink: &mut DiagnosticSink);
}

/// The built-in rules, in execution order.
pub fn default_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(MandatoryRelationField),
        Box::new(ForeignKeyField),
        Box::new(NillableAssociation),
    ]
}

/// Every association needs a field pointing back from the associated entity.
#[derive(Debug, Clone, Copy, Default)]
pub struct MandatoryRelationField;

impl Rule for MandatoryRelationField {
    fn name(&self) -> &'static str {
        "mandatory-relation-field"
    }

    fn check(&self, context: &RuleContext<'_>, sink: &mut DiagnosticSink) {
        for relationship in context.graph().iter() {
            if relationship.counterpart().is_some() {
                continue;
            }
            let source = relationship.source();
            sink.emit(
                context
                    .table()
                    .diagnostic(
                        ErrorCode::MissingRelationField,
                        &[&relationship.target(), &source.entity()],
                    )
                    .with_label(source.span(), "no field points back to this entity"),
            );
        }
    }
}

/// Entities must not declare the foreign-key fields the generator synthesizes.
///
/// For an owner field `location` referring to an entity with identifier
/// `buildingCode`, the synthesized field is `locationBuildingCode`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForeignKeyField;

impl Rule for ForeignKeyField {
    fn name(&self) -> &'static str {
        "foreign-key-field"
    }

    fn check(&self, context: &RuleContext<'_>, sink: &mut DiagnosticSink) {
        let model = context.model();

        for owner in model.entities() {
            let keys = synthesized_keys(context, owner);
            if keys.is_empty() {
                continue;
            }

            for field in owner.fields() {
                if field.association().is_some() {
                    continue;
                }
                for key in keys.iter().filter(|key| field.name() == key.name.as_str()) {
                    sink.emit(
                        context
                            .table()
                            .diagnostic(ErrorCode::ForeignKeyField, &[&key.name, &key.referenced])
                            .with_label(field.span(), "synthesized from the association")
                            .with_secondary_label(key.association, "association declared here"),
                    );
                }
            }
        }
    }
}

/// A foreign-key field the generator adds to its owner.
struct SynthesizedKey {
    name: String,
    referenced: Id,
    association: Span,
}

/// Keys synthesized on `owner`, one per identifier field of each entity it
/// references, in relationship order.
fn synthesized_keys(context: &RuleContext<'_>, owner: &Entity) -> Vec<SynthesizedKey> {
    let mut keys = Vec::new();
    for relationship in context.graph().iter() {
        let (Some(owner_end), Some(referenced)) =
            (relationship.owner_end(), relationship.referenced())
        else {
            continue;
        };
        if owner_end.entity() != owner.name() {
            continue;
        }
        let Some(referenced_entity) = context.model().entity(referenced) else {
            continue;
        };

        for identifier in referenced_entity.identifier_fields() {
            let name = foreign_key_name(owner_end.field(), identifier.name());
            trace!(owner = owner.name().to_name(), key = name.as_str(); "Checking foreign key");
            keys.push(SynthesizedKey {
                name,
                referenced,
                association: owner_end.span(),
            });
        }
    }
    keys
}

/// Associations cannot be nillable.
#[derive(Debug, Clone, Copy, Default)]
pub struct NillableAssociation;

impl Rule for NillableAssociation {
    fn name(&self) -> &'static str {
        "nillable-association"
    }

    fn check(&self, context: &RuleContext<'_>, sink: &mut DiagnosticSink) {
        for entity in context.model().entities() {
            for (field, association) in entity.association_fields() {
                if association.nillable && association.target != entity.name() {
                    sink.emit(
                        context
                            .table()
                            .diagnostic(ErrorCode::NillableAssociation, &[])
                            .with_label(field.span(), "nillable association"),
                    );
                }
            }
        }
    }
}

/// `location` + `buildingCode` → `locationBuildingCode`.
fn foreign_key_name(field: Id, identifier: Id) -> String {
    let mut key = field.to_name();
    let identifier = identifier.to_name();
    let mut chars = identifier.chars();
    if let Some(first) = chars.next() {
        key.extend(first.to_uppercase());
        key.push_str(chars.as_str());
    }
    key
}
