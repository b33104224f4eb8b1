//! Tag names and closing-tag matching.
//!
//! A tag name is one or more segments joined by `.` (`Foo.Bar`), with no
//! whitespace around the dots. Each segment starts with an identifier-start
//! character and continues with identifier characters or `-` (`my-widget`).
//! The closing tag must repeat the opening name exactly; fragments close
//! with `</>`.

use jsxp_lexer::{is_ident_char, is_ident_start, Cursor};

use crate::ast::TagMismatch;
use crate::ParseError;

/// Read the (non-empty) name of an opening tag.
pub(crate) fn read_tag_name(cursor: &mut Cursor<'_>) -> Result<String, ParseError> {
    match cursor.peek() {
        Some(c) if is_ident_start(c) => read_dotted_name(cursor),
        Some(c) => Err(ParseError::structural(
            cursor,
            format!("Expected JSX tag name, found '{c}'"),
        )),
        None => Err(ParseError::structural(cursor, "Expected JSX tag name")),
    }
}

/// Consume `</name>` at `cursor` and check it against `opening`.
///
/// Returns the closing name (equal to `opening`) and the cursor past `>`.
pub(crate) fn match_closing_tag<'src>(
    cursor: Cursor<'src>,
    opening: &str,
) -> Result<(String, Cursor<'src>), ParseError> {
    let at = cursor;
    let mut cursor = cursor;
    cursor.eat_str("</");
    cursor.skip_whitespace();

    let closing = match cursor.peek() {
        Some(c) if is_ident_start(c) => read_dotted_name(&mut cursor)?,
        _ => String::new(),
    };

    if closing != opening {
        let mismatch = TagMismatch {
            opening: opening.to_string(),
            closing,
        };
        return Err(ParseError::validation(&at, mismatch.to_string()));
    }

    cursor.skip_whitespace();
    match cursor.peek() {
        Some('>') => {
            cursor.advance();
            Ok((closing, cursor))
        }
        None => Err(ParseError::structural(
            &at,
            format!("Unterminated JSX element '<{opening}>'"),
        )),
        Some(_) => Err(ParseError::structural(
            &cursor,
            "Expected '>' after closing tag name",
        )),
    }
}

fn read_dotted_name(cursor: &mut Cursor<'_>) -> Result<String, ParseError> {
    let mut name = String::from(read_segment(cursor));
    while cursor.peek() == Some('.') {
        cursor.advance();
        if !cursor.peek().is_some_and(is_ident_start) {
            return Err(ParseError::structural(
                cursor,
                format!("Invalid JSX tag name '{name}.': expected identifier after '.'"),
            ));
        }
        name.push('.');
        name.push_str(read_segment(cursor));
    }
    Ok(name)
}

fn read_segment<'src>(cursor: &mut Cursor<'src>) -> &'src str {
    cursor.advance_while(|c| is_ident_char(c) || c == '-')
}
