//! CLI logic for the modelcheck persist model validator.
//!
//! Every input file is validated as an independent unit. Diagnostics are
//! written to standard output in the configured [`ReportFormat`].

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::{fmt::Write, fs, path::Path};

use log::{error, info, warn};
use miette::GraphicalReportHandler;

use modelcheck::{
    CheckError, Report, Validator,
    config::{AppConfig, ReportFormat},
};

use error_adapter::{report_reportables, to_reportables};

/// Outcome of one CLI run over all inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Inputs that were read, parsed and validated.
    pub checked: usize,
    /// Inputs that failed before a report was produced.
    pub failed: usize,
    /// Checked inputs with at least one error-severity diagnostic.
    pub with_errors: usize,
}

impl RunSummary {
    /// Whether every input was checked and none had errors.
    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.with_errors == 0
    }
}

/// Run the modelcheck CLI application
///
/// Validates every input and prints its diagnostics. An input that cannot be
/// read or parsed is reported on standard error and counted as failed; the
/// remaining inputs are still checked.
///
/// # Errors
///
/// Returns `CheckError` only when the configuration cannot be loaded.
pub fn run(args: &Args) -> Result<RunSummary, CheckError> {
    let app_config = apply_overrides(config::load_config(args.config.as_ref())?, args);
    let format = app_config.report().format();
    let validator = Validator::new(app_config);

    let mut summary = RunSummary::default();
    for input in &args.inputs {
        info!(input_path = input.as_str(); "Checking model");

        let report = match check_file(&validator, input) {
            Ok(report) => report,
            Err(err) => {
                error!(input_path = input.as_str(), err:%; "Failed to check model");
                eprint!("{}", render_error(Path::new(input), &err));
                summary.failed += 1;
                continue;
            }
        };

        if report.is_clean() {
            info!(input_path = input.as_str(); "Model is valid");
        } else {
            warn!(input_path = input.as_str(), diagnostics = report.diagnostics().len(); "Model has defects");
        }
        summary.checked += 1;
        if report.has_errors() {
            summary.with_errors += 1;
        }

        print!("{}", render(Path::new(input), &report, format));
    }

    Ok(summary)
}

fn check_file(validator: &Validator, input: &str) -> Result<Report, CheckError> {
    let source = fs::read_to_string(input)?;
    validator.check_source(&source)
}

/// Apply command-line overrides on top of the loaded configuration.
fn apply_overrides(mut config: AppConfig, args: &Args) -> AppConfig {
    if let Some(scheme) = args.scheme {
        config = config.with_code_scheme(scheme);
    }
    match args.format.as_deref() {
        Some("plain") => config = config.with_report_format(ReportFormat::Plain),
        Some("pretty") => config = config.with_report_format(ReportFormat::Pretty),
        _ => {}
    }
    config
}

/// Render the diagnostics of one input.
///
/// Plain output prefixes every line with the input path. Pretty output uses
/// miette's graphical handler with source snippets.
pub fn render(path: &Path, report: &Report, format: ReportFormat) -> String {
    let mut out = String::new();
    match format {
        ReportFormat::Plain => {
            for line in report.to_plain().lines() {
                let _ = writeln!(out, "{}: {line}", path.display());
            }
        }
        ReportFormat::Pretty => {
            let reporter = GraphicalReportHandler::new();
            for reportable in report_reportables(report) {
                if reporter.render_report(&mut out, reportable.as_ref()).is_err() {
                    warn!(input_path = path.display().to_string(); "Failed to render diagnostic");
                }
            }
        }
    }
    out
}

/// Render an input that could not be checked, with source snippets for
/// syntax errors.
pub fn render_error(path: &Path, err: &CheckError) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}:", path.display());
    let reporter = GraphicalReportHandler::new();
    for reportable in to_reportables(err) {
        if reporter.render_report(&mut out, reportable.as_ref()).is_err() {
            warn!(input_path = path.display().to_string(); "Failed to render error");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use modelcheck::diagnostics::CodeScheme;

    use super::*;

    #[test]
    fn test_overrides_win_over_config() {
        let args = Args::parse_from(["modelcheck", "--scheme", "legacy", "--format", "plain", "a.bal"]);

        let config = apply_overrides(AppConfig::default(), &args);

        assert_eq!(config.validation().code_scheme(), CodeScheme::Legacy);
        assert_eq!(config.report().format(), ReportFormat::Plain);
    }

    #[test]
    fn test_no_overrides_keep_config() {
        let args = Args::parse_from(["modelcheck", "a.bal", "b.bal"]);
        let loaded = AppConfig::default().with_report_format(ReportFormat::Plain);

        let config = apply_overrides(loaded, &args);

        assert_eq!(args.inputs, ["a.bal", "b.bal"]);
        assert_eq!(config.validation().code_scheme(), CodeScheme::Current);
        assert_eq!(config.report().format(), ReportFormat::Plain);
    }

    #[test]
    fn test_unknown_scheme_is_rejected() {
        assert!(Args::try_parse_from(["modelcheck", "--scheme", "v3", "a.bal"]).is_err());
    }

    #[test]
    fn test_plain_render_prefixes_path() {
        let report = Validator::default()
            .check_source("type A record {| int x; |};")
            .unwrap();

        let out = render(Path::new("model.bal"), &report, ReportFormat::Plain);
        assert_eq!(
            out,
            "model.bal: PERSIST_501 ERROR (0:5,0:6): entity must have at least one identifier readonly field\n"
        );
    }

    #[test]
    fn test_pretty_render_mentions_code() {
        let report = Validator::default()
            .check_source("type A record {| int x; |};")
            .unwrap();

        let out = render(Path::new("model.bal"), &report, ReportFormat::Pretty);
        assert!(out.contains("PERSIST_501"));
    }

    #[test]
    fn test_render_error_shows_syntax_code() {
        let err = Validator::default()
            .check_source("type A record {| int |};")
            .unwrap_err();

        let out = render_error(Path::new("broken.bal"), &err);
        assert!(out.starts_with("broken.bal:\n"));
        assert!(out.contains("unexpected token"));
    }

    #[test]
    fn test_summary_success() {
        assert!(RunSummary::default().is_success());
        assert!(!RunSummary { checked: 1, failed: 1, with_errors: 0 }.is_success());
        assert!(!RunSummary { checked: 1, failed: 0, with_errors: 1 }.is_success());
    }
}
