//! Parser for persist model tokens.
//!
//! Transforms the significant tokens produced by the [`lexer`](super::lexer)
//! into the [`Declaration`] snapshot consumed by the validation engine. The
//! public entry point is [`parse_declarations`], which parses one top-level
//! item at a time and resynchronizes at the end of a broken item so that every
//! syntax error of the unit is reported in one pass.

use log::{debug, trace};
use winnow::{
    Parser as _,
    combinator::{opt, peek},
    error::{AddContext, ContextError, ErrMode},
    stream::{Stream, TokenSlice},
    token::any,
};

use modelcheck_core::{
    declaration::{
        Declaration, DeclarationKind, EnumDeclaration, Field, MemberKind, OtherDeclaration,
        Qualifiers, RecordDeclaration, TypeDescriptor,
    },
    error::{Diagnostic, DiagnosticSink, ErrorCode},
    identifier::Id,
    span::{Span, Spanned},
};

use crate::{
    error::{ParseError, syntax_diagnostic},
    tokens::{PositionedToken, Token},
};

/// What the parser expected when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Expected(&'static str);

type Input<'t> = TokenSlice<'t, PositionedToken<'t>>;
type Error = ErrMode<ContextError<Expected>>;
type IResult<O> = std::result::Result<O, Error>;

/// A parsed top-level item.
enum Item {
    Declaration(Declaration),
    Import,
}

/// A `type` definition. Only records are parsed past the name.
enum TypeDefinition {
    Record {
        keyword: Span,
        name: Spanned<Id>,
        record: Spanned<RecordDeclaration>,
        end: Span,
    },
    Other {
        name: Spanned<Id>,
    },
}

/// Peek at the next token without consuming it.
fn peek_token<'t>(input: &mut Input<'t>) -> Option<&'t Token<'t>> {
    peek(any::<_, Error>)
        .parse_next(input)
        .ok()
        .map(|positioned: &'t PositionedToken<'t>| &positioned.token)
}

fn next_is(input: &mut Input<'_>, expected: &Token<'_>) -> bool {
    peek_token(input).is_some_and(|token| token == expected)
}

/// Consume the `expected` token and return its span.
fn punct<'t>(input: &mut Input<'t>, expected: Token<'static>, label: &'static str) -> IResult<Span> {
    any.verify_map(|positioned: &'t PositionedToken<'t>| {
        (positioned.token == expected).then_some(positioned.span)
    })
    .context(Expected(label))
    .parse_next(input)
}

/// Consume the `expected` token if it is next.
fn opt_punct<'t>(input: &mut Input<'t>, expected: Token<'static>) -> IResult<Option<Span>> {
    opt(any.verify_map(|positioned: &'t PositionedToken<'t>| {
        (positioned.token == expected).then_some(positioned.span)
    }))
    .parse_next(input)
}

/// Error at the current position, expecting `label`.
fn expected_error(input: &mut Input<'_>, label: &'static str) -> Error {
    let e = ContextError::new().add_context(input, &input.checkpoint(), Expected(label));
    ErrMode::Backtrack(e)
}

fn identifier<'t>(input: &mut Input<'t>, label: &'static str) -> IResult<Spanned<Id>> {
    any.verify_map(|positioned: &'t PositionedToken<'t>| match &positioned.token {
        Token::Identifier(name) => Some(Spanned::new(Id::new(name), positioned.span)),
        _ => None,
    })
    .context(Expected(label))
    .parse_next(input)
}

/// Skip an expression up to (not including) a token accepted by `stop` at
/// nesting depth zero, or an unbalanced closing delimiter.
///
/// Fails if the expression is empty.
fn skip_expression<'t>(input: &mut Input<'t>, stop: fn(&Token<'_>) -> bool) -> IResult<Span> {
    let mut depth = 0usize;
    let mut span: Option<Span> = None;

    loop {
        let Some(token) = peek_token(input) else {
            break;
        };
        if depth == 0 && (stop(token) || token.is_closer()) {
            break;
        }
        let positioned = any::<_, Error>.parse_next(input)?;
        if positioned.token.is_opener() {
            depth += 1;
        } else if positioned.token.is_closer() {
            depth = depth.saturating_sub(1);
        }
        span = Some(span.map_or(positioned.span, |span| span.union(positioned.span)));
    }

    span.ok_or_else(|| expected_error(input, "expression"))
}

/// Skip a whole item: up to a `;` at depth zero, or up to the closing brace
/// that returns to depth zero (plus an optional `;`). A stray closing
/// delimiter is consumed on its own.
///
/// Always consumes at least one token unless the input is empty.
fn skip_item<'t>(input: &mut Input<'t>) -> Option<Span> {
    let mut depth = 0usize;
    let mut span: Option<Span> = None;

    while let Ok(positioned) = any::<_, Error>.parse_next(input) {
        span = Some(span.map_or(positioned.span, |span| span.union(positioned.span)));
        let token = &positioned.token;
        if *token == Token::Semicolon && depth == 0 {
            break;
        }
        if token.is_opener() {
            depth += 1;
        } else if token.is_closer() {
            let is_brace = matches!(token, Token::RightBrace | Token::RightClosedBrace);
            if depth == 0 || (depth == 1 && is_brace) {
                if let Ok(Some(semi)) = opt_punct(input, Token::Semicolon) {
                    span = span.map(|span| span.union(semi));
                }
                break;
            }
            depth -= 1;
        }
    }

    span
}

/// Parse a type: `primary ("|" primary)*`.
fn type_descriptor<'t>(input: &mut Input<'t>) -> IResult<Spanned<TypeDescriptor>> {
    let first = primary_type(input)?;
    if !next_is(input, &Token::Pipe) {
        return Ok(first);
    }

    let mut span = first.span();
    let mut members = vec![first.into_inner()];
    while opt_punct(input, Token::Pipe)?.is_some() {
        let next = primary_type(input)?;
        span = span.union(next.span());
        members.push(next.into_inner());
    }

    Ok(Spanned::new(TypeDescriptor::Union(members), span))
}

/// Parse a non-union type with its `[]` and `?` suffixes.
///
/// Examples:
/// - `int`, `Building`
/// - `time:Date`
/// - `byte[]`, `string?`, `(int|string)[]`
/// - `record {| int a; |}`
fn primary_type<'t>(input: &mut Input<'t>) -> IResult<Spanned<TypeDescriptor>> {
    let mut ty = match peek_token(input) {
        Some(Token::Record) => record_descriptor(input)?.map(|_| TypeDescriptor::AnonymousRecord),
        Some(Token::LeftParen) => {
            let open = punct(input, Token::LeftParen, "`(`")?;
            let inner = type_descriptor(input)?;
            let close = punct(input, Token::RightParen, "`)`")?;
            Spanned::new(inner.into_inner(), open.union(close))
        }
        _ => {
            let name = identifier(input, "type")?;
            if opt_punct(input, Token::Colon)?.is_some() {
                let member = identifier(input, "type name after `:`")?;
                Spanned::new(
                    TypeDescriptor::Qualified {
                        module: *name.inner(),
                        name: *member.inner(),
                    },
                    name.span().union(member.span()),
                )
            } else {
                name.map(TypeDescriptor::Named)
            }
        }
    };

    loop {
        if opt_punct(input, Token::LeftBracket)?.is_some() {
            // Fixed-length arrays carry a size or `*`; the size does not matter here.
            let _ = opt(any::<_, Error>.verify(|positioned: &PositionedToken<'_>| {
                matches!(positioned.token, Token::NumberLiteral(_) | Token::Star)
            }))
            .parse_next(input)?;
            let close = punct(input, Token::RightBracket, "`]`")?;
            let span = ty.span().union(close);
            ty = Spanned::new(TypeDescriptor::array_of(ty.into_inner()), span);
        } else if let Some(question) = opt_punct(input, Token::Question)? {
            let span = ty.span().union(question);
            ty = Spanned::new(TypeDescriptor::optional_of(ty.into_inner()), span);
        } else {
            break;
        }
    }

    Ok(ty)
}

/// Parse a record type descriptor: `record {| member* |}` or `record { member* }`.
///
/// The span runs from the `record` keyword to the closing brace.
fn record_descriptor<'t>(input: &mut Input<'t>) -> IResult<Spanned<RecordDeclaration>> {
    let keyword = punct(input, Token::Record, "`record`")?;

    let (closed, closer, closer_label) = if opt_punct(input, Token::LeftClosedBrace)?.is_some() {
        (true, Token::RightClosedBrace, "`|}`")
    } else {
        punct(input, Token::LeftBrace, "`{` or `{|`")?;
        (false, Token::RightBrace, "`}`")
    };

    let mut members = Vec::new();
    let end = loop {
        match peek_token(input) {
            Some(token) if *token == closer => break punct(input, closer.clone(), closer_label)?,
            // A mismatched closing brace is reported as the missing closer.
            Some(token) if token.is_closer() => return Err(expected_error(input, closer_label)),
            _ => members.push(member(input)?),
        }
    };

    Ok(Spanned::new(
        RecordDeclaration::new(closed, keyword.union(end), members),
        keyword.union(end),
    ))
}

/// Parse one record member.
///
/// - `*Base;` (type inclusion)
/// - `readonly? T...;` (rest descriptor)
/// - `readonly? T name?? (= expr)?;`
fn member<'t>(input: &mut Input<'t>) -> IResult<Field> {
    if let Some(star) = opt_punct(input, Token::Star)? {
        let ty = type_descriptor(input)?;
        let semi = punct(input, Token::Semicolon, "`;`")?;
        return Ok(Field::new(
            MemberKind::Inclusion,
            None,
            ty,
            Qualifiers::default(),
            star.union(semi),
        ));
    }

    let readonly = opt_punct(input, Token::Readonly)?;
    let ty = type_descriptor(input)?;
    let start = readonly.unwrap_or(ty.span());
    let mut qualifiers = Qualifiers {
        readonly: readonly.is_some(),
        ..Qualifiers::default()
    };

    if opt_punct(input, Token::Ellipsis)?.is_some() {
        let semi = punct(input, Token::Semicolon, "`;`")?;
        return Ok(Field::new(
            MemberKind::Rest,
            None,
            ty,
            qualifiers,
            start.union(semi),
        ));
    }

    let name = identifier(input, "field name")?;
    qualifiers.optional = opt_punct(input, Token::Question)?.is_some();
    if opt_punct(input, Token::Equals)?.is_some() {
        skip_expression(input, |token| matches!(token, Token::Semicolon))?;
        qualifiers.defaultable = true;
    }
    let semi = punct(input, Token::Semicolon, "`;`")?;

    Ok(Field::new(
        MemberKind::Named,
        Some(name),
        ty,
        qualifiers,
        start.union(semi),
    ))
}

/// Parse `type Name ...`. Only record definitions are parsed further.
fn type_definition<'t>(input: &mut Input<'t>) -> IResult<TypeDefinition> {
    let keyword = punct(input, Token::Type, "`type`")?;
    let name = identifier(input, "type name")?;

    if !next_is(input, &Token::Record) {
        return Ok(TypeDefinition::Other { name });
    }

    let record = record_descriptor(input)?;
    let end = punct(input, Token::Semicolon, "`;`")?;
    Ok(TypeDefinition::Record {
        keyword,
        name,
        record,
        end,
    })
}

/// Parse `enum Name { A, B = "b" }`. Returns the span of the whole definition.
fn enum_definition<'t>(input: &mut Input<'t>) -> IResult<(Spanned<Id>, EnumDeclaration, Span)> {
    let keyword = punct(input, Token::Enum, "`enum`")?;
    let name = identifier(input, "enum name")?;
    punct(input, Token::LeftBrace, "`{`")?;

    let mut members = Vec::new();
    loop {
        members.push(identifier(input, "enum member")?);
        if opt_punct(input, Token::Equals)?.is_some() {
            skip_expression(input, |token| matches!(token, Token::Comma))?;
        }
        if opt_punct(input, Token::Comma)?.is_none() || next_is(input, &Token::RightBrace) {
            break;
        }
    }

    let close = punct(input, Token::RightBrace, "`}`")?;
    let end = opt_punct(input, Token::Semicolon)?.unwrap_or(close);
    Ok((name, EnumDeclaration::new(members), keyword.union(end)))
}

/// Name of an item the model does not accept: the last identifier before its
/// body, parameter list or initializer.
fn other_item_name(tokens: &[PositionedToken<'_>]) -> Option<Spanned<Id>> {
    tokens
        .iter()
        .take_while(|positioned| {
            !matches!(
                positioned.token,
                Token::LeftParen
                    | Token::LeftBrace
                    | Token::LeftClosedBrace
                    | Token::Equals
                    | Token::Semicolon
            )
        })
        .filter_map(|positioned| match &positioned.token {
            Token::Identifier(name) => Some(Spanned::new(Id::new(name), positioned.span)),
            _ => None,
        })
        .last()
}

/// Parse one top-level item.
fn item<'t>(input: &mut Input<'t>, tokens: &'t [PositionedToken<'t>]) -> IResult<Item> {
    let public = opt_punct(input, Token::Public)?;

    match peek_token(input) {
        Some(Token::Import) if public.is_none() => {
            punct(input, Token::Import, "`import`")?;
            skip_expression(input, |token| matches!(token, Token::Semicolon))?;
            punct(input, Token::Semicolon, "`;`")?;
            Ok(Item::Import)
        }
        Some(Token::Type) => {
            let checkpoint = input.checkpoint();
            match type_definition(input)? {
                TypeDefinition::Record {
                    keyword,
                    name,
                    record,
                    end,
                } => {
                    let span = public.unwrap_or(keyword).union(end);
                    Ok(Item::Declaration(Declaration::new(
                        Some(name),
                        span,
                        DeclarationKind::Record(record.into_inner()),
                    )))
                }
                TypeDefinition::Other { name } => {
                    input.reset(&checkpoint);
                    let span = skip_item(input).unwrap_or(name.span());
                    let span = public.map_or(span, |public| public.union(span));
                    Ok(Item::Declaration(Declaration::new(
                        Some(name),
                        span,
                        DeclarationKind::Other(OtherDeclaration::new("type definition")),
                    )))
                }
            }
        }
        Some(Token::Enum) => {
            let (name, enumeration, span) = enum_definition(input)?;
            Ok(Item::Declaration(Declaration::new(
                Some(name),
                public.map_or(span, |public| public.union(span)),
                DeclarationKind::Enum(enumeration),
            )))
        }
        Some(token) if *token == Token::Semicolon || token.is_closer() => {
            Err(expected_error(input, "declaration"))
        }
        Some(token) => {
            let description = token.to_string();
            let start = tokens.len() - input.eof_offset();
            let Some(span) = skip_item(input) else {
                return Err(expected_error(input, "declaration"));
            };
            let end = tokens.len() - input.eof_offset();
            let span = public.map_or(span, |public| public.union(span));
            Ok(Item::Declaration(Declaration::new(
                other_item_name(&tokens[start..end]),
                span,
                DeclarationKind::Other(OtherDeclaration::new(description)),
            )))
        }
        None => Err(expected_error(input, "declaration")),
    }
}

/// Convert a failed item into a diagnostic.
///
/// The error is anchored at the token the parser stopped on, or at the last
/// token when the input ended early.
fn convert_error(
    error: Error,
    tokens: &[PositionedToken<'_>],
    position: usize,
) -> Diagnostic {
    let expected = match &error {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => e.context().next().copied(),
        ErrMode::Incomplete(_) => None,
    }
    .unwrap_or(Expected("declaration"));

    match tokens.get(position) {
        Some(found) => syntax_diagnostic(ErrorCode::UnexpectedToken, &[&expected.0])
            .with_label(found.span, format!("found `{}`", found.token)),
        None => {
            let span = tokens
                .last()
                .map(|last| Span::new(last.span.end()..last.span.end()))
                .unwrap_or_default();
            syntax_diagnostic(ErrorCode::UnexpectedEndOfInput, &[&expected.0])
                .with_label(span, "input ends here")
        }
    }
}

/// Parse every top-level item of a unit.
///
/// Trivia tokens are ignored. On a syntax error the rest of the broken item is
/// skipped and parsing resumes at the next item.
pub fn parse_declarations(tokens: &[PositionedToken<'_>]) -> Result<Vec<Declaration>, ParseError> {
    let tokens: Vec<PositionedToken<'_>> = tokens
        .iter()
        .filter(|positioned| !positioned.token.is_trivia())
        .cloned()
        .collect();

    let mut declarations = Vec::new();
    let mut diagnostics = DiagnosticSink::new();
    let mut pos = 0;

    while pos < tokens.len() {
        let mut input = TokenSlice::new(&tokens[pos..]);
        match item(&mut input, &tokens[pos..]) {
            Ok(Item::Declaration(declaration)) => {
                trace!(declaration:?; "Parsed declaration");
                declarations.push(declaration);
            }
            Ok(Item::Import) => {}
            Err(e) => {
                let failed_at = tokens.len() - input.eof_offset();
                diagnostics.emit(convert_error(e, &tokens, failed_at));

                // Resynchronize from the start of the broken item.
                let mut recovery = TokenSlice::new(&tokens[pos..]);
                skip_item(&mut recovery);
                pos = tokens.len() - recovery.eof_offset();
                continue;
            }
        }
        pos = tokens.len() - input.eof_offset();
    }

    debug!(
        declarations = declarations.len(),
        syntax_errors = diagnostics.error_count();
        "Parsed unit"
    );

    if diagnostics.has_errors() {
        Err(ParseError::new(diagnostics.into_diagnostics()))
    } else {
        Ok(declarations)
    }
}
