//! Severity levels for diagnostics.

use std::fmt;

use serde::Deserialize;

/// The severity level of a diagnostic.
///
/// - [`Severity::Error`] marks a schema defect that blocks generation
/// - [`Severity::Warning`] and [`Severity::Info`] are advisory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Advisory note.
    Info,

    /// A non-fatal issue that should be addressed.
    Warning,

    /// A defect that must be fixed before the model can be used.
    Error,
}

impl Severity {
    /// Returns `true` if this is an error severity.
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }

    /// Returns `true` if this is a warning severity.
    pub fn is_warning(&self) -> bool {
        matches!(self, Severity::Warning)
    }

    /// Upper-case name as used in reports, e.g. `ERROR`.
    pub fn as_upper_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_predicates() {
        assert!(Severity::Error.is_error());
        assert!(!Severity::Warning.is_error());
        assert!(Severity::Warning.is_warning());
        assert!(!Severity::Info.is_warning());
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(Severity::Error.to_string(), "error");
        assert_eq!(Severity::Info.as_upper_str(), "INFO");
        assert!(Severity::Error > Severity::Warning);
    }
}
