//! Token definitions for persist model source.

use std::fmt;

use modelcheck_core::span::Span;

/// A lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    // Trivia
    Whitespace,
    Newline,
    /// `// ...` or a `# ...` documentation line.
    LineComment(&'a str),

    // Keywords
    Import,
    Public,
    Type,
    Record,
    Enum,
    Readonly,

    /// Plain or quoted (`'type`) identifier, without the quote.
    Identifier(&'a str),
    StringLiteral(String),
    NumberLiteral(&'a str),

    LeftBrace,
    RightBrace,
    /// `{|`
    LeftClosedBrace,
    /// `|}`
    RightClosedBrace,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    Semicolon,
    Colon,
    Comma,
    Question,
    Equals,
    Star,
    Pipe,
    /// `...`
    Ellipsis,
    /// Any other punctuation; only meaningful inside skipped expressions.
    Symbol(char),
}

impl Token<'_> {
    /// Whitespace, newlines and comments.
    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            Token::Whitespace | Token::Newline | Token::LineComment(_)
        )
    }

    pub fn is_opener(&self) -> bool {
        matches!(
            self,
            Token::LeftBrace | Token::LeftClosedBrace | Token::LeftParen | Token::LeftBracket
        )
    }

    pub fn is_closer(&self) -> bool {
        matches!(
            self,
            Token::RightBrace | Token::RightClosedBrace | Token::RightParen | Token::RightBracket
        )
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Whitespace => write!(f, "whitespace"),
            Token::Newline => write!(f, "newline"),
            Token::LineComment(_) => write!(f, "comment"),
            Token::Import => write!(f, "import"),
            Token::Public => write!(f, "public"),
            Token::Type => write!(f, "type"),
            Token::Record => write!(f, "record"),
            Token::Enum => write!(f, "enum"),
            Token::Readonly => write!(f, "readonly"),
            Token::Identifier(name) => write!(f, "{name}"),
            Token::StringLiteral(value) => write!(f, "\"{value}\""),
            Token::NumberLiteral(value) => write!(f, "{value}"),
            Token::LeftBrace => write!(f, "{{"),
            Token::RightBrace => write!(f, "}}"),
            Token::LeftClosedBrace => write!(f, "{{|"),
            Token::RightClosedBrace => write!(f, "|}}"),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::LeftBracket => write!(f, "["),
            Token::RightBracket => write!(f, "]"),
            Token::Semicolon => write!(f, ";"),
            Token::Colon => write!(f, ":"),
            Token::Comma => write!(f, ","),
            Token::Question => write!(f, "?"),
            Token::Equals => write!(f, "="),
            Token::Star => write!(f, "*"),
            Token::Pipe => write!(f, "|"),
            Token::Ellipsis => write!(f, "..."),
            Token::Symbol(c) => write!(f, "{c}"),
        }
    }
}

/// A token with its byte range in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedToken<'a> {
    pub token: Token<'a>,
    pub span: Span,
}

impl<'a> PositionedToken<'a> {
    pub fn new(token: Token<'a>, span: Span) -> Self {
        Self { token, span }
    }
}
