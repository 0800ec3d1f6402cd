//! Partitioning of a unit's declarations into entities, enums and the rest.

use log::trace;

use modelcheck_core::{
    declaration::{Declaration, DeclarationKind},
    error::{CodeTable, DiagnosticSink, ErrorCode},
};

use crate::error::ModelError;

/// Declarations of one unit, split by what the persist model does with them.
///
/// Each list keeps the input order.
#[derive(Debug, Default)]
pub struct Extracted<'a> {
    records: Vec<&'a Declaration>,
    enums: Vec<&'a Declaration>,
    rejected: Vec<&'a Declaration>,
}

impl<'a> Extracted<'a> {
    /// Record declarations, the entity candidates.
    pub fn records(&self) -> &[&'a Declaration] {
        &self.records
    }

    pub fn enums(&self) -> &[&'a Declaration] {
        &self.enums
    }

    /// Declarations that are neither records nor enums.
    pub fn rejected(&self) -> &[&'a Declaration] {
        &self.rejected
    }

    /// Report every rejected declaration. Only meaningful for model files.
    pub fn report_rejected(&self, table: &CodeTable, sink: &mut DiagnosticSink) {
        for declaration in &self.rejected {
            let label = match declaration.kind() {
                DeclarationKind::Other(other) => {
                    format!("{} is not allowed in a model file", other.description())
                }
                _ => "not allowed in a model file".to_string(),
            };
            sink.emit(
                table
                    .diagnostic(ErrorCode::NonModelDeclaration, &[])
                    .with_label(declaration.span(), label),
            );
        }
    }
}

/// Split `declarations` into records, enums and rejected declarations.
///
/// # Errors
///
/// Returns [`ModelError::MalformedDeclaration`] for a record or enum without a
/// name.
pub fn extract(declarations: &[Declaration]) -> Result<Extracted<'_>, ModelError> {
    let mut extracted = Extracted::default();

    for declaration in declarations {
        match declaration.kind() {
            DeclarationKind::Record(_) | DeclarationKind::Enum(_)
                if declaration.name().is_none() =>
            {
                return Err(ModelError::malformed(
                    declaration.span(),
                    "record or enum declaration without a name",
                ));
            }
            DeclarationKind::Record(_) => extracted.records.push(declaration),
            DeclarationKind::Enum(_) => extracted.enums.push(declaration),
            DeclarationKind::Other(other) => {
                trace!(description = other.description(); "Rejected declaration");
                extracted.rejected.push(declaration);
            }
        }
    }

    Ok(extracted)
}
