//! Lexical analyzer for persist model source text.
//!
//! The public entry point is [`tokenize`], which recovers from errors and
//! collects all lexical diagnostics in a single pass.

use winnow::{
    Parser as _,
    ascii::digit1,
    combinator::{alt, cut_err, delimited, not, opt, peek, preceded, repeat, terminated},
    error::{ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{any, literal, none_of, one_of, take_while},
};

use modelcheck_core::{
    error::{Diagnostic, DiagnosticSink, ErrorCode},
    span::Span,
};

use crate::{
    error::{ParseError, syntax_diagnostic},
    tokens::{PositionedToken, Token},
};

/// Error information attached to winnow errors via `.context()`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexerDiagnostic {
    code: ErrorCode,
    /// The error span covers from `start` to the error position.
    start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<'a, O> = ModalResult<O, ContextError<LexerDiagnostic>>;

/// Escape after a backslash. Unknown escapes stand for the escaped character.
fn string_escape<'a>(input: &mut Input<'a>) -> IResult<'a, char> {
    preceded(
        '\\',
        alt((
            delimited("u{", take_while(1..=6, |c: char| c.is_ascii_hexdigit()), '}').verify_map(
                |hex: &str| u32::from_str_radix(hex, 16).ok().and_then(char::from_u32),
            ),
            one_of(['n', 'r', 't']).map(|c| match c {
                'n' => '\n',
                'r' => '\r',
                _ => '\t',
            }),
            any,
        )),
    )
    .parse_next(input)
}

/// `"..."` on a single line.
fn string_literal<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    let string_content = repeat(0.., alt((string_escape, none_of(['"', '\\', '\n']))))
        .fold(String::new, |mut acc, ch| {
            acc.push(ch);
            acc
        });

    let start_pos = input.current_token_start();

    // Commit after the opening quote so the error spans from it.
    preceded(
        '"',
        cut_err(terminated(string_content, '"')).context(LexerDiagnostic {
            code: ErrorCode::UnterminatedString,
            start: start_pos,
        }),
    )
    .map(Token::StringLiteral)
    .parse_next(input)
}

/// Integer or decimal literal with an optional exponent and type suffix.
fn number_literal<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    (
        digit1,
        opt(('.', digit1)),
        opt((one_of(['e', 'E']), opt(one_of(['+', '-'])), digit1)),
        opt(one_of(['d', 'D', 'f', 'F'])),
    )
        .take()
        .map(Token::NumberLiteral)
        .parse_next(input)
}

/// `// ...` and `# ...` run to the end of the line.
fn line_comment<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    preceded(alt(("//", "#")), take_while(0.., |c| c != '\n'))
        .map(Token::LineComment)
        .parse_next(input)
}

fn keyword<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    terminated(
        alt((
            literal("import"),
            literal("public"),
            literal("type"),
            literal("record"),
            literal("enum"),
            literal("readonly"),
        )),
        peek(not(one_of(is_identifier_char))),
    )
    .map(|keyword: &str| match keyword {
        "import" => Token::Import,
        "public" => Token::Public,
        "type" => Token::Type,
        "record" => Token::Record,
        "enum" => Token::Enum,
        _ => Token::Readonly,
    })
    .parse_next(input)
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Identifier, optionally quoted with a leading `'` to escape a keyword.
///
/// Letters and digits from any script are accepted; the first character must
/// be a letter or `_`.
fn identifier<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    preceded(
        opt('\''),
        take_while(1.., is_identifier_char).verify(|s: &str| {
            s.chars()
                .next()
                .is_some_and(|c| c.is_alphabetic() || c == '_')
        }),
    )
    .map(Token::Identifier)
    .parse_next(input)
}

/// Multi-character punctuation, longest first.
fn multi_char_token<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    alt((
        literal("{|").value(Token::LeftClosedBrace),
        literal("|}").value(Token::RightClosedBrace),
        literal("...").value(Token::Ellipsis),
    ))
    .parse_next(input)
}

fn single_char_token<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    alt((
        '{'.value(Token::LeftBrace),
        '}'.value(Token::RightBrace),
        '('.value(Token::LeftParen),
        ')'.value(Token::RightParen),
        '['.value(Token::LeftBracket),
        ']'.value(Token::RightBracket),
        ';'.value(Token::Semicolon),
        ':'.value(Token::Colon),
        ','.value(Token::Comma),
        '?'.value(Token::Question),
        '='.value(Token::Equals),
        '*'.value(Token::Star),
        '|'.value(Token::Pipe),
        one_of([
            '+', '-', '/', '%', '<', '>', '!', '&', '^', '~', '@', '.', '$', '`',
        ])
        .map(Token::Symbol),
    ))
    .parse_next(input)
}

/// Spaces, tabs and carriage returns.
fn whitespace<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    take_while(1.., |c: char| c.is_whitespace() && c != '\n')
        .value(Token::Whitespace)
        .parse_next(input)
}

fn newline<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    '\n'.value(Token::Newline).parse_next(input)
}

fn positioned_token<'a>(input: &mut Input<'a>) -> IResult<'a, PositionedToken<'a>> {
    let start_pos = input.current_token_start();

    let token = alt((
        line_comment,      // Before `/` and `#`
        string_literal,    // Before any single char
        multi_char_token,  // Before `{`, `|` and `.`
        keyword,           // Before identifier
        number_literal,    // Before `.`
        identifier,        // Before single chars
        single_char_token, // Punctuation
        newline,           // Before whitespace
        whitespace,
    ))
    .parse_next(input)?;

    let end_pos = input.current_token_start();
    Ok(PositionedToken::new(token, Span::new(start_pos..end_pos)))
}

/// Lexer that accumulates tokens and diagnostics during tokenization.
struct Lexer<'a> {
    source: &'a str,
    tokens: Vec<PositionedToken<'a>>,
    diagnostics: DiagnosticSink,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: Vec::new(),
            diagnostics: DiagnosticSink::new(),
        }
    }

    fn tokenize(&mut self) {
        let mut input = LocatingSlice::new(self.source);
        while !input.is_empty() {
            match positioned_token(&mut input) {
                Ok(token) => self.tokens.push(token),
                Err(e) => {
                    let error_pos = input.current_token_start();
                    let diagnostic = self.convert_err_mode(e, error_pos);
                    self.diagnostics.emit(diagnostic);

                    if !input.is_empty() {
                        input.next_token();
                    }
                }
            }
        }
    }

    fn finish(self) -> Result<Vec<PositionedToken<'a>>, ParseError> {
        if self.diagnostics.has_errors() {
            Err(ParseError::new(self.diagnostics.into_diagnostics()))
        } else {
            Ok(self.tokens)
        }
    }

    /// Falls back to an unexpected-character diagnostic when the error
    /// carries no context.
    fn convert_err_mode(
        &self,
        err: ErrMode<ContextError<LexerDiagnostic>>,
        error_pos: usize,
    ) -> Diagnostic {
        let context_error = match err {
            ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
            ErrMode::Incomplete(_) => ContextError::new(),
        };

        if let Some(LexerDiagnostic { code, start }) = context_error.context().next() {
            return syntax_diagnostic(*code, &[])
                .with_label(Span::new(*start..error_pos), code.description());
        }

        let width = self.source[error_pos..]
            .chars()
            .next()
            .map_or(1, char::len_utf8);
        let span = Span::new(error_pos..error_pos + width);
        syntax_diagnostic(ErrorCode::UnexpectedCharacter, &[])
            .with_label(span, ErrorCode::UnexpectedCharacter.description())
    }
}

/// Tokenize `source`, trivia included.
///
/// # Returns
///
/// - `Ok(tokens)` if every character was recognized
/// - `Err(ParseError)` with one diagnostic per lexical error otherwise
pub fn tokenize(source: &str) -> Result<Vec<PositionedToken<'_>>, ParseError> {
    let mut lexer = Lexer::new(source);
    lexer.tokenize();
    lexer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_single_token(input: &str, expected: Token<'_>) {
        let mut located_input = LocatingSlice::new(input);
        let result = positioned_token(&mut located_input);
        assert!(result.is_ok(), "Failed to parse: {input}");
        assert_eq!(result.unwrap().token, expected);
    }

    fn significant(source: &str) -> Vec<Token<'_>> {
        tokenize(source)
            .expect("source should tokenize")
            .into_iter()
            .map(|positioned| positioned.token)
            .filter(|token| !token.is_trivia())
            .collect()
    }

    #[test]
    fn test_keywords() {
        test_single_token("import", Token::Import);
        test_single_token("public", Token::Public);
        test_single_token("type", Token::Type);
        test_single_token("record", Token::Record);
        test_single_token("enum", Token::Enum);
        test_single_token("readonly", Token::Readonly);
    }

    #[test]
    fn test_keyword_word_boundaries() {
        test_single_token("types", Token::Identifier("types"));
        test_single_token("recordId", Token::Identifier("recordId"));
        test_single_token("enum_value", Token::Identifier("enum_value"));
    }

    #[test]
    fn test_unicode_identifiers() {
        test_single_token("Émploye", Token::Identifier("Émploye"));
        test_single_token("número_2", Token::Identifier("número_2"));
        test_single_token("recordÉtat", Token::Identifier("recordÉtat"));
        test_single_token("'été", Token::Identifier("été"));
    }

    #[test]
    fn test_unicode_identifier_spans() {
        let tokens = tokenize("type Émploye").unwrap();
        assert_eq!(tokens[2].token, Token::Identifier("Émploye"));
        assert_eq!(tokens[2].span, Span::new(5..13));
    }

    #[test]
    fn test_quoted_identifier() {
        test_single_token("'type", Token::Identifier("type"));
        test_single_token("'record", Token::Identifier("record"));
    }

    #[test]
    fn test_closed_record_braces() {
        assert_eq!(
            significant("record {| int id; |}"),
            vec![
                Token::Record,
                Token::LeftClosedBrace,
                Token::Identifier("int"),
                Token::Identifier("id"),
                Token::Semicolon,
                Token::RightClosedBrace,
            ]
        );
    }

    #[test]
    fn test_union_pipe_is_not_closing_brace() {
        assert_eq!(
            significant("int|string x;"),
            vec![
                Token::Identifier("int"),
                Token::Pipe,
                Token::Identifier("string"),
                Token::Identifier("x"),
                Token::Semicolon,
            ]
        );
    }

    #[test]
    fn test_rest_and_qualified_types() {
        assert_eq!(
            significant("time:Date d; string...;"),
            vec![
                Token::Identifier("time"),
                Token::Colon,
                Token::Identifier("Date"),
                Token::Identifier("d"),
                Token::Semicolon,
                Token::Identifier("string"),
                Token::Ellipsis,
                Token::Semicolon,
            ]
        );
    }

    #[test]
    fn test_number_literals() {
        test_single_token("42", Token::NumberLiteral("42"));
        test_single_token("3.14", Token::NumberLiteral("3.14"));
        test_single_token("1e10", Token::NumberLiteral("1e10"));
        test_single_token("2.5d", Token::NumberLiteral("2.5d"));
    }

    #[test]
    fn test_string_literals() {
        test_single_token("\"hello\"", Token::StringLiteral("hello".to_string()));
        test_single_token("\"a\\nb\"", Token::StringLiteral("a\nb".to_string()));
        test_single_token("\"\\u{41}\"", Token::StringLiteral("A".to_string()));
        test_single_token("\"\"", Token::StringLiteral(String::new()));
    }

    #[test]
    fn test_comments_are_trivia() {
        let tokens = tokenize("// note\n# doc line\nenum").unwrap();
        assert!(matches!(tokens[0].token, Token::LineComment(" note")));
        assert_eq!(significant("// note\n# doc line\nenum"), vec![Token::Enum]);
    }

    #[test]
    fn test_token_spans() {
        let tokens = tokenize("type A").unwrap();
        assert_eq!(tokens[0].span, Span::new(0..4));
        assert_eq!(tokens[2].span, Span::new(5..6));
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("string name = \"abc\n;").unwrap_err();
        let diag = &err.diagnostics()[0];

        assert_eq!(err.diagnostics().len(), 1);
        assert_eq!(diag.code().map(|code| code.as_str()), Some("E001"));
        assert_eq!(diag.primary_span(), Some(Span::new(14..18)));
    }

    #[test]
    fn test_unexpected_character_recovers() {
        let err = tokenize("int a; \u{00a7} int b; \u{00b6}").unwrap_err();

        assert_eq!(err.diagnostics().len(), 2);
        for diag in err.diagnostics() {
            assert_eq!(diag.code().map(|code| code.as_str()), Some("E002"));
            assert_eq!(diag.primary_span().map(|span| span.len()), Some(2));
        }
    }
}
