//! Element assembly.
//!
//! [`parse_element`] is the single entry point into the markup core, used
//! both by [`Document`](crate::Document) for top-level markup and by host
//! delegates that meet a markup literal inside an expression. It reads the
//! tag header, hands attributes to [`attributes`](crate::attributes) and
//! content to [`content`](crate::content), and finalizes the element once
//! the [`tag_matcher`](crate::tag_matcher) accepts the closing tag.

use jsxp_lexer::Cursor;

use crate::ast::Element;
use crate::attributes::{self, HeaderEnd};
use crate::content;
use crate::delegate::{ExpressionDelegate, HostExpression, MarkupState};
use crate::tag_matcher;
use crate::ParseError;

/// Parse one element or fragment starting at the `<` under `cursor`.
///
/// Returns the element and the cursor just past its final `>`. The mode
/// stack is left exactly as it was found.
pub fn parse_element<'src, D: ExpressionDelegate>(
    state: &mut MarkupState,
    cursor: Cursor<'src>,
    delegate: &mut D,
) -> Result<(Element<D::Expr>, Cursor<'src>), ParseError> {
    let start = cursor;
    let mut cursor = cursor;
    if !cursor.eat('<') {
        return Err(ParseError::structural(&cursor, "Expected '<' to start JSX element"));
    }
    let depth = state.modes_mut().open_tag(&start)?;
    cursor.skip_whitespace();

    // `<>` fragment: no name, no attributes
    let (name, attributes, end) = if cursor.eat('>') {
        (String::new(), Vec::new(), HeaderEnd::Open)
    } else {
        let name = tag_matcher::read_tag_name(&mut cursor)?;
        let (attributes, end, after) =
            attributes::parse_attributes(state, cursor, delegate, &name, &start)?;
        cursor = after;
        (name, attributes, end)
    };

    let element = match end {
        HeaderEnd::SelfClose => {
            state.modes_mut().self_close(&cursor)?;
            Element::self_closing(name, attributes, cursor.span_from(&start))
        }
        HeaderEnd::Open => {
            state.modes_mut().enter_content(&cursor)?;
            let (children, closing_name, after) =
                content::parse_children(state, cursor, delegate, &name, &start)?;
            cursor = after;
            state.modes_mut().close_tag(&cursor)?;
            Element::new(name, attributes, children, closing_name, cursor.span_from(&start))
                .map_err(|e| ParseError::validation(&start, e.to_string()))?
        }
    };

    tracing::trace!(
        target: "jsxp::markup",
        name = %element.name,
        depth,
        attributes = element.attributes.len(),
        children = element.children.len(),
        "element finalized"
    );
    Ok((element, cursor))
}

/// Parse the body of an expression hole. `cursor` is just past the opening
/// `{`. Returns `None` for an empty hole, otherwise the delegate's
/// expression; either way the cursor is just past the balancing `}`.
pub(crate) fn parse_hole<'src, D: ExpressionDelegate>(
    state: &mut MarkupState,
    cursor: Cursor<'src>,
    delegate: &mut D,
) -> Result<(Option<D::Expr>, Cursor<'src>), ParseError> {
    let open = cursor;
    let mut cursor = cursor;
    state.modes_mut().enter_hole(&open)?;
    cursor.skip_whitespace();

    let expression = if cursor.peek() == Some('}') {
        None
    } else {
        tracing::trace!(
            target: "jsxp::host",
            line = cursor.line(),
            column = cursor.column(),
            "delegate expression"
        );
        let (expr, after) = delegate.parse_expression(state, cursor)?;
        cursor = after;
        cursor.skip_whitespace();
        Some(expr)
    };

    close_hole(&mut cursor)?;
    state.modes_mut().exit_hole(&cursor)?;
    Ok((expression, cursor))
}

/// Parse `...expr}` with `cursor` just past the opening `{` of a spread.
pub(crate) fn parse_spread<'src, D: ExpressionDelegate>(
    state: &mut MarkupState,
    cursor: Cursor<'src>,
    delegate: &mut D,
) -> Result<(D::Expr, Cursor<'src>), ParseError> {
    let mut cursor = cursor;
    state.modes_mut().enter_hole(&cursor)?;
    cursor.skip_whitespace();
    if !cursor.eat_str("...") {
        return Err(ParseError::structural(&cursor, "Expected '...' in JSX spread"));
    }
    cursor.skip_whitespace();

    let (expr, after) = delegate.parse_expression(state, cursor)?;
    cursor = after;
    cursor.skip_whitespace();
    close_hole(&mut cursor)?;
    state.modes_mut().exit_hole(&cursor)?;
    Ok((expr, cursor))
}

/// Does `{` under `cursor` open a spread (`{...`)?
pub(crate) fn is_spread(cursor: &Cursor<'_>) -> bool {
    let mut probe = *cursor;
    probe.eat('{');
    probe.skip_whitespace();
    probe.starts_with("...")
}

/// The null constant for an empty hole spanning `start..end`.
pub(crate) fn null_for<E: HostExpression>(start: &Cursor<'_>, end: &Cursor<'_>) -> E {
    E::null_constant(end.span_from(start))
}

fn close_hole(cursor: &mut Cursor<'_>) -> Result<(), ParseError> {
    match cursor.peek() {
        Some('}') => {
            cursor.advance();
            Ok(())
        }
        None => Err(ParseError::structural(cursor, "Unterminated JSX expression")),
        Some(_) => Err(ParseError::structural(
            cursor,
            "Expected '}' to close JSX expression",
        )),
    }
}
