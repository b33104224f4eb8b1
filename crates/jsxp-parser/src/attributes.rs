//! Attribute assembly for tag headers.
//!
//! Between the tag name and `>` / `/>` the header holds, in any order:
//! - `name="text"` / `name='text'` (quotes are not escape-processed)
//! - `name={expr}`, where an empty `{}` is the host's `null`
//! - bare `name`, whose value is the host's `true`
//! - `{...expr}` spreads
//!
//! Attribute names are identifier characters plus `-`, and must not start
//! with a digit.

use jsxp_lexer::{is_ident_char, is_whitespace, Cursor};

use crate::ast::{Attribute, AttributeItem, SpreadAttribute};
use crate::delegate::{ExpressionDelegate, HostExpression, MarkupState};
use crate::markup;
use crate::ParseError;

/// How a tag header ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HeaderEnd {
    /// `>`: content follows.
    Open,
    /// `/>`
    SelfClose,
}

type Attributes<E> = Vec<AttributeItem<E>>;

/// Parse attributes up to and including the header's closing `>` or `/>`.
pub(crate) fn parse_attributes<'src, D: ExpressionDelegate>(
    state: &mut MarkupState,
    cursor: Cursor<'src>,
    delegate: &mut D,
    tag: &str,
    open_at: &Cursor<'src>,
) -> Result<(Attributes<D::Expr>, HeaderEnd, Cursor<'src>), ParseError> {
    let mut attributes = Vec::new();
    let mut cursor = cursor;

    loop {
        cursor.skip_whitespace();
        match cursor.peek() {
            None => {
                return Err(ParseError::structural(
                    open_at,
                    format!("Unterminated JSX element '<{tag}>'"),
                ));
            }
            Some('>') => {
                cursor.advance();
                return Ok((attributes, HeaderEnd::Open, cursor));
            }
            Some('/') => {
                if cursor.eat_str("/>") {
                    return Ok((attributes, HeaderEnd::SelfClose, cursor));
                }
                return Err(ParseError::structural(&cursor, "Expected '>' after '/' in JSX tag"));
            }
            Some('{') => {
                let start = cursor;
                cursor.advance();
                let (expression, after) = markup::parse_spread(state, cursor, delegate)?;
                cursor = after;
                attributes.push(AttributeItem::Spread(SpreadAttribute {
                    expression,
                    span: cursor.span_from(&start),
                }));
            }
            Some(_) => {
                let (attribute, after) = parse_attribute(state, cursor, delegate, tag)?;
                cursor = after;
                attributes.push(AttributeItem::Attribute(attribute));
            }
        }
    }
}

fn parse_attribute<'src, D: ExpressionDelegate>(
    state: &mut MarkupState,
    cursor: Cursor<'src>,
    delegate: &mut D,
    tag: &str,
) -> Result<(Attribute<D::Expr>, Cursor<'src>), ParseError> {
    let start = cursor;
    let mut cursor = cursor;

    let raw = cursor.advance_while(|c| !is_name_delimiter(c));
    if raw.is_empty() {
        let found = cursor.peek().unwrap_or(' ');
        return Err(ParseError::structural(
            &cursor,
            format!("Unexpected character '{found}' in JSX tag '<{tag}>'"),
        ));
    }
    validate_attribute_name(raw, &start)?;
    let name = raw.to_string();

    // Bare attribute: leave whatever follows for the header loop
    let mut probe = cursor;
    probe.skip_whitespace();
    if !probe.eat('=') {
        let span = cursor.span_from(&start);
        let value = D::Expr::true_constant(span);
        return Ok((Attribute { name, value, span }, cursor));
    }
    probe.skip_whitespace();
    cursor = probe;

    let value = match cursor.peek() {
        Some(quote @ ('"' | '\'')) => {
            let value_start = cursor;
            cursor.advance();
            let text = cursor.advance_while(|c| c != quote);
            if !cursor.eat(quote) {
                return Err(ParseError::structural(&value_start, "Unterminated attribute string"));
            }
            D::Expr::string_literal(text.to_string(), cursor.span_from(&value_start))
        }
        Some('{') => {
            let hole_start = cursor;
            cursor.advance();
            let (expression, after) = markup::parse_hole(state, cursor, delegate)?;
            cursor = after;
            expression.unwrap_or_else(|| markup::null_for(&hole_start, &cursor))
        }
        _ => {
            return Err(ParseError::structural(
                &cursor,
                format!("Expected attribute value after '=' for '{name}'"),
            ));
        }
    };

    let span = cursor.span_from(&start);
    Ok((Attribute { name, value, span }, cursor))
}

/// Characters that end an attribute-name token.
fn is_name_delimiter(c: char) -> bool {
    is_whitespace(c) || matches!(c, '=' | '/' | '>' | '{' | '}' | '"' | '\'')
}

fn validate_attribute_name(name: &str, at: &Cursor<'_>) -> Result<(), ParseError> {
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(ParseError::validation(
            at,
            format!("Invalid attribute name '{name}': attribute names cannot start with a number"),
        ));
    }
    if name.starts_with('-') || !name.chars().all(|c| is_ident_char(c) || c == '-') {
        return Err(ParseError::validation(
            at,
            format!("Invalid attribute name '{name}'"),
        ));
    }
    Ok(())
}
