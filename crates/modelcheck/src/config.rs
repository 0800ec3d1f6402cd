//! Configuration types for modelcheck validation runs.
//!
//! This module provides configuration structures that control which code
//! scheme diagnostics are published under and how the host wants them
//! reported. All types implement [`serde::Deserialize`] for loading from
//! external sources.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining validation and report settings.
//! - [`ValidationConfig`] - Controls the [`CodeScheme`] and whether the unit is a model file.
//! - [`ReportConfig`] - Controls the [`ReportFormat`] used by front ends.
//!
//! # Example
//!
//! ```
//! # use modelcheck::config::{AppConfig, ReportFormat};
//! # use modelcheck_core::error::CodeScheme;
//! let config = AppConfig::default();
//! assert_eq!(config.validation().code_scheme(), CodeScheme::Current);
//! assert!(config.validation().model_file());
//! assert_eq!(config.report().format(), ReportFormat::Pretty);
//! ```

use serde::Deserialize;

use modelcheck_core::error::CodeScheme;

/// Top-level application configuration combining validation and report settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Validation configuration section.
    #[serde(default)]
    validation: ValidationConfig,

    /// Report configuration section.
    #[serde(default)]
    report: ReportConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified validation and report configurations.
    ///
    /// # Arguments
    ///
    /// * `validation` - Code scheme and model file settings.
    /// * `report` - Output settings for front ends.
    pub fn new(validation: ValidationConfig, report: ReportConfig) -> Self {
        Self { validation, report }
    }

    /// Returns the validation configuration.
    pub fn validation(&self) -> &ValidationConfig {
        &self.validation
    }

    /// Returns the report configuration.
    pub fn report(&self) -> &ReportConfig {
        &self.report
    }

    /// Returns a copy with the code scheme replaced.
    pub fn with_code_scheme(mut self, code_scheme: CodeScheme) -> Self {
        self.validation.code_scheme = code_scheme;
        self
    }

    /// Returns a copy with the report format replaced.
    pub fn with_report_format(mut self, format: ReportFormat) -> Self {
        self.report.format = format;
        self
    }
}

/// Settings that change what a validation run reports.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ValidationConfig {
    /// [`CodeScheme`] diagnostics are published under.
    #[serde(default)]
    code_scheme: CodeScheme,

    /// Whether the validated unit is a model file. Declarations other than
    /// records and enums are only reported for model files.
    #[serde(default = "default_model_file")]
    model_file: bool,
}

fn default_model_file() -> bool {
    true
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            code_scheme: CodeScheme::default(),
            model_file: default_model_file(),
        }
    }
}

impl ValidationConfig {
    /// Creates a new [`ValidationConfig`].
    pub fn new(code_scheme: CodeScheme, model_file: bool) -> Self {
        Self {
            code_scheme,
            model_file,
        }
    }

    /// Returns the [`CodeScheme`] diagnostics are published under.
    pub fn code_scheme(&self) -> CodeScheme {
        self.code_scheme
    }

    /// Returns `true` when the unit must contain only records and enums.
    pub fn model_file(&self) -> bool {
        self.model_file
    }
}

/// How front ends render diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Graphical output with source snippets.
    #[default]
    Pretty,
    /// One `CODE severity (l:c,l:c): message` line per diagnostic.
    Plain,
}

/// Report configuration for front ends.
#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    format: ReportFormat,
}

impl ReportConfig {
    /// Creates a new [`ReportConfig`].
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Returns the [`ReportFormat`].
    pub fn format(&self) -> ReportFormat {
        self.format
    }
}
