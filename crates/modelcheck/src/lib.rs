//! modelcheck - Static validation of persist entity models.
//!
//! A persist model is a set of closed record types (entities) and enums. Before
//! a persistence layer is generated from it, the model must be structurally
//! sound: entities need identifier fields, field types must be storable, and
//! every association needs a well-formed counterpart. This crate runs those
//! checks and reports every violation with a stable code and a source range.
//!
//! A run goes through four stages:
//!
//! 1. **Extract**: split declarations into records, enums and rejected items ([`model::extract`])
//! 2. **Build**: turn records into entities with classified field types ([`model::Model`])
//! 3. **Resolve**: match association fields into relationships ([`relation::RelationGraph`])
//! 4. **Rules**: run the relationship rules ([`rules::Rule`])

pub mod config;
pub mod model;
pub mod relation;
pub mod rules;

mod error;

pub use modelcheck_core::{declaration, error as diagnostics, identifier, span};

pub use error::{CheckError, ModelError};

use std::fmt::Write;

use log::{debug, info, trace};

use modelcheck_core::{
    declaration::Declaration,
    error::{CodeTable, Diagnostic, DiagnosticSink},
    span::{LineIndex, LineRange},
};

use config::AppConfig;
use model::Model;
use relation::RelationGraph;
use rules::{Rule, RuleContext};

/// Validator for persist model declarations and source files.
///
/// # Examples
///
/// ```rust
/// use modelcheck::{Validator, config::AppConfig};
///
/// let source = r#"
///     type Building record {|
///         readonly string buildingCode;
///         string city;
///     |};
/// "#;
///
/// let validator = Validator::new(AppConfig::default());
/// let report = validator.check_source(source).expect("Failed to check");
/// assert!(report.is_clean());
/// ```
pub struct Validator {
    config: AppConfig,
    rules: Vec<Box<dyn Rule>>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl Validator {
    /// Create a new validator running the built-in rules.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration including the code scheme
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            rules: rules::default_rules(),
        }
    }

    /// Add a rule that runs after the rules already registered.
    pub fn with_rule(mut self, rule: impl Rule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Validate one unit of already-parsed declarations.
    ///
    /// Diagnostics come out in stage order: rejected declarations, entity
    /// shape and field-type defects, relationship defects, then each rule in
    /// registration order.
    ///
    /// # Errors
    ///
    /// Returns `ModelError` when a declaration is missing structure the
    /// engine relies on.
    pub fn validate(&self, declarations: &[Declaration]) -> Result<Vec<Diagnostic>, ModelError> {
        let validation = self.config.validation();
        let table = CodeTable::get(validation.code_scheme());
        let mut sink = DiagnosticSink::new();

        let extracted = model::extract(declarations)?;
        info!(
            records = extracted.records().len(),
            enums = extracted.enums().len(),
            rejected = extracted.rejected().len();
            "Declarations extracted"
        );
        if validation.model_file() {
            extracted.report_rejected(table, &mut sink);
        }

        let model = Model::build(&extracted, table, &mut sink)?;
        trace!(model:?; "Built model");

        let graph = RelationGraph::resolve(&model, table, &mut sink);
        info!(relationships = graph.len(); "Relationships resolved");

        let context = RuleContext::new(&model, &graph, table);
        for rule in &self.rules {
            let before = sink.len();
            rule.check(&context, &mut sink);
            debug!(rule = rule.name(), diagnostics = sink.len() - before; "Rule finished");
        }

        info!(
            diagnostics = sink.len(),
            errors = sink.error_count();
            "Validation finished"
        );
        Ok(sink.into_diagnostics())
    }

    /// Parse and validate model source text.
    ///
    /// # Errors
    ///
    /// Returns `CheckError::Parse` for syntax errors and `CheckError::Model`
    /// for malformed declarations.
    pub fn check_source(&self, source: &str) -> Result<Report, CheckError> {
        info!("Parsing model source");
        let declarations = modelcheck_parser::parse(source)
            .map_err(|err| CheckError::new_parse_error(err, source))?;
        debug!(declarations = declarations.len(); "Model source parsed");

        let diagnostics = self.validate(&declarations)?;
        Ok(Report::new(source, diagnostics))
    }
}

/// Diagnostics of one checked source text.
#[derive(Debug, Clone)]
pub struct Report {
    source: String,
    diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn new(source: impl Into<String>, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            source: source.into(),
            diagnostics,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// `true` when nothing was reported.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diagnostic| diagnostic.severity().is_error())
    }

    /// Line/column range of every diagnostic's primary label.
    pub fn ranges(&self) -> Vec<Option<LineRange>> {
        let index = LineIndex::new(&self.source);
        self.diagnostics
            .iter()
            .map(|diagnostic| diagnostic.primary_span().map(|span| index.range(span)))
            .collect()
    }

    /// One `CODE SEVERITY (l:c,l:c): message` line per diagnostic.
    pub fn to_plain(&self) -> String {
        let mut out = String::new();
        for (diagnostic, range) in self.diagnostics.iter().zip(self.ranges()) {
            let code = diagnostic.code().map_or("-", |code| code.as_str());
            let severity = diagnostic.severity().as_upper_str();
            let _ = match range {
                Some(range) => writeln!(out, "{code} {severity} {range}: {}", diagnostic.message()),
                None => writeln!(out, "{code} {severity}: {}", diagnostic.message()),
            };
        }
        out
    }
}
