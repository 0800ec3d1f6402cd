//! Property tests for validation runs.

use proptest::prelude::*;

use modelcheck::{
    Validator,
    config::{AppConfig, ReportConfig, ValidationConfig},
    declaration::{Declaration, Field, TypeDescriptor},
    diagnostics::CodeScheme,
    span::Span,
};

const FIELD_TYPES: &[&str] = &[
    "int", "string", "boolean", "json", "Gender", "E0", "E1", "E2", "E3",
];

/// A field type, by index into the entity names or `FIELD_TYPES`.
#[derive(Debug, Clone)]
enum FieldShape {
    Named(usize),
    Entity(usize),
    Entities(usize),
    Nillable(usize),
}

fn field_shape() -> impl Strategy<Value = FieldShape> {
    prop_oneof![
        (0..FIELD_TYPES.len()).prop_map(FieldShape::Named),
        (0..4usize).prop_map(FieldShape::Entity),
        (0..4usize).prop_map(FieldShape::Entities),
        (0..4usize).prop_map(FieldShape::Nillable),
    ]
}

#[derive(Debug, Clone)]
struct EntityShape {
    closed: bool,
    identifier: bool,
    fields: Vec<FieldShape>,
}

fn entity_shape() -> impl Strategy<Value = EntityShape> {
    (
        any::<bool>(),
        any::<bool>(),
        prop::collection::vec(field_shape(), 0..5),
    )
        .prop_map(|(closed, identifier, fields)| EntityShape {
            closed,
            identifier,
            fields,
        })
}

fn declarations(entities: &[EntityShape]) -> Vec<Declaration> {
    let mut offset = 0;
    let mut next_span = || {
        offset += 8;
        Span::new(offset..offset + 4)
    };

    let mut declarations = vec![Declaration::enumeration(
        "Gender",
        next_span(),
        &["MALE", "FEMALE"],
    )];
    for (idx, shape) in entities.iter().enumerate() {
        let mut declaration = Declaration::record(&format!("E{idx}"), next_span(), shape.closed);
        if shape.identifier {
            declaration = declaration
                .with_member(Field::named("id", TypeDescriptor::named("int"), next_span()).readonly());
        }
        for (field_idx, field) in shape.fields.iter().enumerate() {
            let ty = match field {
                FieldShape::Named(ty) => TypeDescriptor::named(FIELD_TYPES[*ty]),
                FieldShape::Entity(target) => TypeDescriptor::named(&format!("E{target}")),
                FieldShape::Entities(target) => {
                    TypeDescriptor::array_of(TypeDescriptor::named(&format!("E{target}")))
                }
                FieldShape::Nillable(target) => {
                    TypeDescriptor::optional_of(TypeDescriptor::named(&format!("E{target}")))
                }
            };
            declaration =
                declaration.with_member(Field::named(&format!("f{field_idx}"), ty, next_span()));
        }
        declarations.push(declaration);
    }
    declarations
}

fn validator(scheme: CodeScheme, model_file: bool) -> Validator {
    Validator::new(AppConfig::new(
        ValidationConfig::new(scheme, model_file),
        ReportConfig::default(),
    ))
}

proptest! {
    #[test]
    fn runs_are_deterministic(entities in prop::collection::vec(entity_shape(), 0..4)) {
        let declarations = declarations(&entities);
        let validator = validator(CodeScheme::Current, true);

        let first = validator.validate(&declarations).unwrap();
        let second = validator.validate(&declarations).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn schemes_report_the_same_checks(entities in prop::collection::vec(entity_shape(), 0..4)) {
        let declarations = declarations(&entities);

        let legacy = validator(CodeScheme::Legacy, true).validate(&declarations).unwrap();
        let current = validator(CodeScheme::Current, true).validate(&declarations).unwrap();

        let checks = |diagnostics: &[modelcheck::diagnostics::Diagnostic]| {
            diagnostics
                .iter()
                .map(|diagnostic| (diagnostic.code().map(|code| code.error_code()), diagnostic.primary_span()))
                .collect::<Vec<_>>()
        };
        prop_assert_eq!(checks(&legacy), checks(&current));
    }

    #[test]
    fn every_diagnostic_has_a_range(entities in prop::collection::vec(entity_shape(), 0..4)) {
        let declarations = declarations(&entities);
        let diagnostics = validator(CodeScheme::Current, true).validate(&declarations).unwrap();

        for diagnostic in &diagnostics {
            prop_assert!(diagnostic.primary_span().is_some());
            prop_assert!(diagnostic.code().is_some());
        }
    }

    #[test]
    fn units_without_entities_are_clean(
        names in prop::collection::vec("[a-z]{1,8}", 0..6),
        model_file in any::<bool>(),
    ) {
        let mut offset = 0;
        let declarations: Vec<Declaration> = names
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                offset += 10;
                let span = Span::new(offset..offset + 5);
                if idx % 2 == 0 || model_file {
                    Declaration::enumeration(&name.to_uppercase(), span, &["A"])
                } else {
                    Declaration::other("function", Some(name), span)
                }
            })
            .collect();

        let diagnostics = validator(CodeScheme::Current, model_file).validate(&declarations).unwrap();
        prop_assert!(diagnostics.is_empty());
    }
}
