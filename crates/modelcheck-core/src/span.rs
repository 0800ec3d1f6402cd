//! Source locations.
//!
//! Every declaration, member and modifier handed to the engine carries a
//! [`Span`]: a half-open byte range into the model source. Diagnostics are
//! anchored at spans, and a [`LineIndex`] built once per source turns them into
//! the `(startLine:startCol,endLine:endCol)` form users see.

use std::{fmt, ops::Range};

/// A half-open byte range into a source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    start: usize,
    end: usize,
}

impl Span {
    /// Create a new span from a byte range.
    pub fn new(range: Range<usize>) -> Self {
        Self {
            start: range.start,
            end: range.end,
        }
    }

    /// Get the start offset of the span
    pub fn start(&self) -> usize {
        self.start
    }

    /// Get the end offset of the span
    pub fn end(&self) -> usize {
        self.end
    }

    /// Get the length of the span
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if the span is empty
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Create a union of two spans (encompassing both)
    pub fn union(&self, other: Span) -> Span {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self::new(range)
    }
}

/// A value paired with the span it was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spanned<T> {
    value: T,
    span: Span,
}

impl<T> Spanned<T> {
    /// Create a new spanned value from a value and span information
    pub fn new(value: T, span: Span) -> Self {
        Self { value, span }
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// Get a reference to the underlying value
    pub fn inner(&self) -> &T {
        &self.value
    }

    /// Consume the Spanned wrapper and return just the inner value
    pub fn into_inner(self) -> T {
        self.value
    }

    /// Convert from one spanned type to another, keeping the span.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Spanned<U> {
        Spanned {
            value: f(self.value),
            span: self.span,
        }
    }
}

/// A 0-based line/column position.
///
/// Columns count characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// A line/column range, end exclusive.
///
/// Displays as `(startLine:startCol,endLine:endCol)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: Position,
    pub end: Position,
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}:{},{}:{})",
            self.start.line, self.start.column, self.end.line, self.end.column
        )
    }
}

/// Maps byte offsets of one source text to line/column positions.
///
/// # Example
///
/// ```
/// use modelcheck_core::span::{LineIndex, Span};
///
/// let source = "type A record {|\n    int id;\n|};";
/// let index = LineIndex::new(source);
/// let range = index.range(Span::new(21..28));
/// assert_eq!(range.to_string(), "(1:4,1:11)");
/// ```
#[derive(Debug, Clone)]
pub struct LineIndex<'src> {
    source: &'src str,
    line_starts: Vec<usize>,
}

impl<'src> LineIndex<'src> {
    /// Index the line starts of `source`.
    pub fn new(source: &'src str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(idx, _)| idx + 1))
            .collect();
        Self {
            source,
            line_starts,
        }
    }

    /// Position of a byte offset. Offsets past the end clamp to the end.
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.source.len());
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let line_start = self.line_starts[line];
        let column = self
            .source
            .get(line_start..offset)
            .map_or(offset - line_start, |text| text.chars().count());
        Position { line, column }
    }

    /// Line/column range of a span.
    pub fn range(&self, span: Span) -> LineRange {
        LineRange {
            start: self.position(span.start()),
            end: self.position(span.end()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_union() {
        let a = Span::new(4..10);
        let b = Span::new(8..20);

        assert_eq!(a.union(b), Span::new(4..20));
        assert_eq!(b.union(a), Span::new(4..20));
        assert_eq!(a.len(), 6);
        assert!(!a.is_empty());
        assert!(Span::default().is_empty());
    }

    #[test]
    fn test_spanned_map_keeps_span() {
        let spanned = Spanned::new(3, Span::new(1..2));
        let mapped = spanned.map(|value| value * 2);

        assert_eq!(*mapped.inner(), 6);
        assert_eq!(mapped.span(), Span::new(1..2));
    }

    #[test]
    fn test_line_index_first_line() {
        let index = LineIndex::new("enum Gender { MALE }");
        assert_eq!(index.position(0), Position { line: 0, column: 0 });
        assert_eq!(index.position(5), Position { line: 0, column: 5 });
    }

    #[test]
    fn test_line_index_range_display() {
        let source = "import persist;\n\ntype Building record {|\n    string city;\n|};\n";
        let index = LineIndex::new(source);
        let start = source.find("string city;").unwrap();
        let span = Span::new(start..start + "string city;".len());

        assert_eq!(index.range(span).to_string(), "(3:4,3:16)");
    }

    #[test]
    fn test_line_index_end_of_line_and_clamp() {
        let source = "ab\ncd";
        let index = LineIndex::new(source);

        // The newline byte still belongs to line 0.
        assert_eq!(index.position(2), Position { line: 0, column: 2 });
        assert_eq!(index.position(3), Position { line: 1, column: 0 });
        assert_eq!(index.position(99), Position { line: 1, column: 2 });
    }

    #[test]
    fn test_line_index_counts_characters() {
        let source = "// é\nx";
        let index = LineIndex::new(source);
        assert_eq!(index.position(source.len() - 2), Position { line: 0, column: 4 });
    }

    mod properties {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            #[test]
            fn position_is_monotonic(source in "[a-z \n]{0,64}", a in 0usize..80, b in 0usize..80) {
                let index = LineIndex::new(&source);
                let (low, high) = if a <= b { (a, b) } else { (b, a) };
                prop_assert!(index.position(low) <= index.position(high));
            }

            #[test]
            fn line_matches_newline_count(source in "[a-z\n]{0,64}", offset in 0usize..64) {
                let index = LineIndex::new(&source);
                let offset = offset.min(source.len());
                let newlines = source[..offset].matches('\n').count();
                prop_assert_eq!(index.position(offset).line, newlines);
            }
        }
    }
}
