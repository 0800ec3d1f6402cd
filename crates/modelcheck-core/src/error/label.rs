//! Source spans attached to a model diagnostic.

use crate::span::Span;

/// A message pinned to a span of the model source.
///
/// A diagnostic has one primary label on the declaration at fault; its span
/// becomes the diagnostic's reported range. Secondary labels point at the
/// other side of the problem, e.g. the association field on the related
/// entity:
///
/// ```text
/// PERSIST_420: n:m association is not supported yet
///    |
///  3 |     Employee[] members;
///    |     ------------------ other side of the association
///    |
///  9 |     Team[] teams;
///    |     ^^^^^^^^^^^^^ many-to-many association
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    span: Span,
    message: String,
    is_primary: bool,
}

impl Label {
    /// Label the field or entity the diagnostic is reported on.
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: false,
        }
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    pub fn is_secondary(&self) -> bool {
        !self.is_primary
    }
}
