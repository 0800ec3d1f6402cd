//! Adapters from modelcheck diagnostics and errors to miette reports.
//!
//! Validation and syntax diagnostics share one [`Diagnostic`] type and are
//! rendered with source snippets through [`DiagnosticAdapter`]. Errors without
//! a source location go through [`ErrorAdapter`].

use std::{error::Error, fmt};

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceCode, SourceSpan};

use modelcheck::{
    CheckError, Report,
    diagnostics::{Diagnostic, Severity},
};

/// Anything the CLI can hand to a miette report handler.
pub type Reportable<'a> = Box<dyn MietteDiagnostic + 'a>;

/// A modelcheck [`Diagnostic`] paired with the source it points into.
#[derive(Debug)]
pub struct DiagnosticAdapter<'a> {
    diag: &'a Diagnostic,
    src: &'a str,
}

impl<'a> DiagnosticAdapter<'a> {
    pub fn new(diag: &'a Diagnostic, src: &'a str) -> Self {
        Self { diag, src }
    }
}

impl fmt::Display for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.diag.message())
    }
}

impl Error for DiagnosticAdapter<'_> {}

impl MietteDiagnostic for DiagnosticAdapter<'_> {
    fn code<'b>(&'b self) -> Option<Box<dyn fmt::Display + 'b>> {
        let code = self.diag.code()?;
        Some(Box::new(code.as_str()))
    }

    fn severity(&self) -> Option<miette::Severity> {
        let severity = match self.diag.severity() {
            Severity::Error => miette::Severity::Error,
            Severity::Warning => miette::Severity::Warning,
            Severity::Info => miette::Severity::Advice,
        };
        Some(severity)
    }

    fn help<'b>(&'b self) -> Option<Box<dyn fmt::Display + 'b>> {
        let help = self.diag.help()?;
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        Some(&self.src as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        if self.diag.labels().is_empty() {
            return None;
        }

        let labels = self.diag.labels().iter().map(|label| {
            let span = SourceSpan::new(label.span().start().into(), label.span().len());
            let text = Some(label.message().to_string());
            if label.is_primary() {
                LabeledSpan::new_primary_with_span(text, span)
            } else {
                LabeledSpan::new_with_span(text, span)
            }
        });
        Some(Box::new(labels))
    }
}

/// A [`CheckError`] that carries no source location.
#[derive(Debug)]
pub struct ErrorAdapter<'a>(pub &'a CheckError);

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.0, f)
    }
}

impl Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'b>(&'b self) -> Option<Box<dyn fmt::Display + 'b>> {
        let code = match self.0 {
            CheckError::Io(_) => "modelcheck::io",
            CheckError::Parse { .. } => return None,
            CheckError::Model(_) => "modelcheck::model",
            CheckError::Config(_) => "modelcheck::config",
        };
        Some(Box::new(code))
    }
}

/// Split a [`CheckError`] into reportables.
///
/// A [`CheckError::Parse`] yields one reportable per syntax diagnostic of the
/// wrapped parse error. Every other variant yields one.
pub fn to_reportables(err: &CheckError) -> Vec<Reportable<'_>> {
    match err {
        CheckError::Parse { err: parse_err, src } => parse_err
            .diagnostics()
            .iter()
            .map(|diag| Box::new(DiagnosticAdapter::new(diag, src)) as Reportable<'_>)
            .collect(),
        _ => vec![Box::new(ErrorAdapter(err)) as Reportable<'_>],
    }
}

/// One reportable per diagnostic of a validation [`Report`].
pub fn report_reportables(report: &Report) -> Vec<Reportable<'_>> {
    report
        .diagnostics()
        .iter()
        .map(|diag| Box::new(DiagnosticAdapter::new(diag, report.source())) as Reportable<'_>)
        .collect()
}

#[cfg(test)]
mod tests {
    use modelcheck::{ModelError, Validator, span::Span};
    use modelcheck_parser::ParseError;

    use super::*;

    fn code_of(reportable: &Reportable<'_>) -> Option<String> {
        reportable.code().map(|code| code.to_string())
    }

    #[test]
    fn test_parse_error_yields_one_reportable_per_diagnostic() {
        let diags = vec![
            Diagnostic::error("first error").with_label(Span::new(0..5), "first"),
            Diagnostic::error("second error")
                .with_label(Span::new(10..15), "second")
                .with_help("help for second"),
        ];
        let err = CheckError::new_parse_error(ParseError::new(diags), "source code here...");

        let reportables = to_reportables(&err);

        assert_eq!(reportables.len(), 2);
        assert_eq!(reportables[0].to_string(), "first error");
        assert_eq!(reportables[1].to_string(), "second error");
        assert_eq!(
            reportables[1].help().map(|help| help.to_string()),
            Some("help for second".to_string())
        );
    }

    #[test]
    fn test_errors_without_location() {
        let config = CheckError::Config("bad".to_string());
        let model = CheckError::from(ModelError::MalformedDeclaration {
            span: Span::new(0..1),
            reason: "record without a name",
        });

        let config = to_reportables(&config);
        assert_eq!(config.len(), 1);
        assert_eq!(config[0].to_string(), "Configuration error: bad");
        assert_eq!(code_of(&config[0]).as_deref(), Some("modelcheck::config"));
        assert!(config[0].labels().is_none());

        let model = to_reportables(&model);
        assert_eq!(code_of(&model[0]).as_deref(), Some("modelcheck::model"));
    }

    #[test]
    fn test_report_diagnostics_carry_codes_and_labels() {
        let report = Validator::default()
            .check_source("type A record {| int x; |};")
            .unwrap();

        let reportables = report_reportables(&report);
        assert_eq!(reportables.len(), 1);

        let reportable = &reportables[0];
        assert_eq!(code_of(reportable).as_deref(), Some("PERSIST_501"));
        assert_eq!(reportable.severity(), Some(miette::Severity::Error));

        let labels: Vec<_> = reportable.labels().unwrap().collect();
        assert_eq!(labels.len(), 1);
        assert!(labels[0].primary());
        assert_eq!(labels[0].offset(), 5);
    }

    #[test]
    fn test_secondary_labels_are_not_primary() {
        let diag = Diagnostic::error("error with labels")
            .with_label(Span::new(0..5), "primary")
            .with_secondary_label(Span::new(10..15), "secondary");

        let adapter = DiagnosticAdapter::new(&diag, "some source code");

        let labels: Vec<_> = adapter.labels().unwrap().collect();
        assert_eq!(labels.len(), 2);
        assert!(labels[0].primary());
        assert!(!labels[1].primary());
        assert_eq!(labels[1].label(), Some("secondary"));
    }
}
