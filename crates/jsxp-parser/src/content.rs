//! Content assembly between an opening tag and its closing tag.
//!
//! Only `<` and `{` are structural in content. Everything else, including
//! `;`, `(`, `)`, `}` and `>`, is literal text. Text runs are normalized
//! when they are flushed:
//! - whitespace runs collapse to a single space
//! - whitespace touching a tag boundary is dropped
//! - a single space touching an expression hole is kept
//! - whitespace-only runs produce no node

use jsxp_lexer::{is_markup_start, is_whitespace, Cursor};

use crate::ast::{Child, Comment, ExpressionContainer, Text};
use crate::delegate::{ExpressionDelegate, MarkupState};
use crate::markup;
use crate::tag_matcher;
use crate::ParseError;

/// What sits on one side of a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boundary {
    /// An opening, closing, or child tag.
    Tag,
    /// An expression hole or comment.
    Hole,
}

/// A pending run of literal text.
struct TextRun<'src> {
    start: Cursor<'src>,
    left: Boundary,
}

impl<'src> TextRun<'src> {
    fn new(start: Cursor<'src>, left: Boundary) -> Self {
        Self { start, left }
    }

    fn flush<E>(&self, end: &Cursor<'src>, right: Boundary, children: &mut Vec<Child<E>>) {
        let raw = end.slice_from(&self.start);
        if let Some(value) = normalize_text(raw, self.left == Boundary::Tag, right == Boundary::Tag) {
            children.push(Child::Text(Text {
                value,
                span: end.span_from(&self.start),
            }));
        }
    }
}

/// Normalize a raw text run. Returns `None` when nothing but whitespace
/// remains. Normalizing an already-normalized value is a no-op.
pub fn normalize_text(raw: &str, trim_start: bool, trim_end: bool) -> Option<String> {
    if raw.chars().all(is_whitespace) {
        return None;
    }

    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;
    for c in raw.chars() {
        if is_whitespace(c) {
            pending_space = true;
            continue;
        }
        if pending_space && !(out.is_empty() && trim_start) {
            out.push(' ');
        }
        pending_space = false;
        out.push(c);
    }
    if pending_space && !trim_end {
        out.push(' ');
    }
    Some(out)
}

type Children<E> = Vec<Child<E>>;

/// Parse children up to and including the closing tag for `opening`.
///
/// Returns the children, the matched closing name, and the cursor past the
/// closing `>`.
pub(crate) fn parse_children<'src, D: ExpressionDelegate>(
    state: &mut MarkupState,
    cursor: Cursor<'src>,
    delegate: &mut D,
    opening: &str,
    open_at: &Cursor<'src>,
) -> Result<(Children<D::Expr>, String, Cursor<'src>), ParseError> {
    let mut children = Vec::new();
    let mut cursor = cursor;
    let mut text = TextRun::new(cursor, Boundary::Tag);

    loop {
        match cursor.peek() {
            None => {
                return Err(ParseError::structural(
                    open_at,
                    format!("Unterminated JSX element '<{opening}>'"),
                ));
            }
            Some('<') if cursor.starts_with("</") => {
                text.flush(&cursor, Boundary::Tag, &mut children);
                let (closing, after) = tag_matcher::match_closing_tag(cursor, opening)?;
                return Ok((children, closing, after));
            }
            Some('<') if is_markup_start(&cursor) => {
                text.flush(&cursor, Boundary::Tag, &mut children);
                let (element, after) = markup::parse_element(state, cursor, delegate)?;
                cursor = after;
                children.push(Child::Element(element));
                text = TextRun::new(cursor, Boundary::Tag);
            }
            Some('{') => {
                text.flush(&cursor, Boundary::Hole, &mut children);
                let (child, after) = parse_brace(state, cursor, delegate)?;
                cursor = after;
                children.push(child);
                text = TextRun::new(cursor, Boundary::Hole);
            }
            Some(_) => {
                cursor.advance();
            }
        }
    }
}

/// `{/* comment */}`, `{}` or `{expr}` at `cursor`.
fn parse_brace<'src, D: ExpressionDelegate>(
    state: &mut MarkupState,
    cursor: Cursor<'src>,
    delegate: &mut D,
) -> Result<(Child<D::Expr>, Cursor<'src>), ParseError> {
    let start = cursor;
    if let Some((comment, after)) = parse_comment(cursor)? {
        return Ok((Child::Comment(comment), after));
    }
    if markup::is_spread(&start) {
        return Err(ParseError::structural(
            &start,
            "Spread children are not supported in JSX content",
        ));
    }

    let mut cursor = cursor;
    cursor.advance();
    let (expression, after) = markup::parse_hole(state, cursor, delegate)?;
    let expression = expression.unwrap_or_else(|| markup::null_for(&start, &after));
    Ok((
        Child::Expression(ExpressionContainer {
            expression,
            span: after.span_from(&start),
        }),
        after,
    ))
}

/// A brace holding nothing but one block comment. Anything else after the
/// comment makes this an ordinary hole.
fn parse_comment(cursor: Cursor<'_>) -> Result<Option<(Comment, Cursor<'_>)>, ParseError> {
    let start = cursor;
    let mut probe = cursor;
    probe.eat('{');
    probe.skip_whitespace();
    if !probe.starts_with("/*") {
        return Ok(None);
    }

    let comment_start = probe;
    probe.eat_str("/*");
    while !probe.eat_str("*/") {
        if probe.advance().is_none() {
            return Err(ParseError::structural(&comment_start, "Unterminated JSX comment"));
        }
    }
    let text = probe.slice_from(&comment_start).to_string();

    probe.skip_whitespace();
    if !probe.eat('}') {
        return Ok(None);
    }
    Ok(Some((
        Comment {
            text,
            span: probe.span_from(&start),
        },
        probe,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Expr, ExprKind};
    use crate::expr_parser::HostParser;
    use crate::{ParseErrorKind, ParseOptions};
    use pretty_assertions::assert_eq;

    /// Helper: parse the content of `<div>` given everything after its `>`.
    fn children(source: &str) -> Result<Children<Expr>, ParseError> {
        let mut state = MarkupState::new(&ParseOptions::default());
        let at = Cursor::new(source);
        state.modes_mut().open_tag(&at)?;
        state.modes_mut().enter_content(&at)?;
        let (children, closing, _) = parse_children(&mut state, at, &mut HostParser, "div", &at)?;
        assert_eq!(closing, "div");
        Ok(children)
    }

    fn texts(children: &[Child<Expr>]) -> Vec<Option<&str>> {
        children
            .iter()
            .map(|c| match c {
                Child::Text(t) => Some(t.value.as_str()),
                _ => None,
            })
            .collect()
    }

    // =========================================================================
    // Normalization
    // =========================================================================

    #[test]
    fn test_normalize_collapses_and_trims() {
        assert_eq!(normalize_text("  a \n\t b  ", true, true).as_deref(), Some("a b"));
        assert_eq!(normalize_text("Text ", true, false).as_deref(), Some("Text "));
        assert_eq!(normalize_text("\n  More", false, true).as_deref(), Some(" More"));
        assert_eq!(normalize_text(" \n ", false, false), None);
        assert_eq!(normalize_text("", true, true), None);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for (raw, s, e) in [("  a   b ", false, false), ("x\n\ny", true, true), (" ( ", false, false)] {
            let once = normalize_text(raw, s, e).unwrap();
            assert_eq!(normalize_text(&once, s, e).unwrap(), once);
        }
    }

    // =========================================================================
    // Children
    // =========================================================================

    #[test]
    fn test_plain_text() {
        let c = children("Hello World</div>").unwrap();
        assert_eq!(texts(&c), vec![Some("Hello World")]);
    }

    #[test]
    fn test_text_around_empty_hole() {
        let c = children("Text {} More</div>").unwrap();
        assert_eq!(c.len(), 3);
        assert_eq!(texts(&c), vec![Some("Text "), None, Some(" More")]);
        match &c[1] {
            Child::Expression(e) => assert!(e.expression.is_const("null")),
            other => panic!("expected expression container, got {other:?}"),
        }
    }

    #[test]
    fn test_interleaved_holes_and_punctuation() {
        let c = children("{$name} ({$count})</div>").unwrap();
        assert_eq!(c.len(), 4);
        assert_eq!(texts(&c), vec![None, Some(" ("), None, Some(")")]);
    }

    #[test]
    fn test_adjacent_empty_holes() {
        let c = children("{}{}</div>").unwrap();
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn test_whitespace_between_tags_dropped() {
        let c = children("\n    <span>a</span>\n    <span>b</span>\n</div>").unwrap();
        assert_eq!(c.len(), 2);
        assert!(c.iter().all(|c| matches!(c, Child::Element(_))));
    }

    #[test]
    fn test_semicolons_are_text() {
        let c = children("a; b; (c)</div>").unwrap();
        assert_eq!(texts(&c), vec![Some("a; b; (c)")]);
    }

    #[test]
    fn test_less_than_not_followed_by_name_is_text() {
        let c = children("1 < 2</div>").unwrap();
        assert_eq!(texts(&c), vec![Some("1 < 2")]);
    }

    #[test]
    fn test_comment_child() {
        let c = children("\n{/* This is a comment */}\n<span>Visible</span>\n</div>").unwrap();
        assert_eq!(c.len(), 2);
        match &c[0] {
            Child::Comment(comment) => assert_eq!(comment.text, "/* This is a comment */"),
            other => panic!("expected comment, got {other:?}"),
        }
    }

    #[test]
    fn test_expression_child() {
        let c = children("Hi {$user->name}!</div>").unwrap();
        assert_eq!(c.len(), 3);
        match &c[1] {
            Child::Expression(e) => assert!(matches!(e.expression.kind, ExprKind::PropertyFetch { .. })),
            other => panic!("expected expression container, got {other:?}"),
        }
        assert_eq!(texts(&c)[2], Some("!"));
    }

    // =========================================================================
    // Errors
    // =========================================================================

    #[test]
    fn test_unterminated_content() {
        let err = children("Hello").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Structural);
        assert_eq!(err.message, "Unterminated JSX element '<div>'");
    }

    #[test]
    fn test_unterminated_hole() {
        let err = children("{$x").unwrap_err();
        assert_eq!(err.message, "Unterminated JSX expression");
    }

    #[test]
    fn test_unclosed_hole() {
        let err = children("{$x $y}</div>").unwrap_err();
        assert_eq!(err.message, "Expected '}' to close JSX expression");
    }

    #[test]
    fn test_unterminated_comment() {
        let err = children("{/* oops </div>").unwrap_err();
        assert_eq!(err.message, "Unterminated JSX comment");
    }

    #[test]
    fn test_spread_child_rejected() {
        let err = children("{...$items}</div>").unwrap_err();
        assert_eq!(err.message, "Spread children are not supported in JSX content");
    }
}
