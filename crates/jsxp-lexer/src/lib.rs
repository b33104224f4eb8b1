//! jsxp Lexer
//!
//! Low-level scanning support for JSX markup embedded in host-language
//! source: a copyable [`Cursor`] over the raw buffer, the scanning-mode
//! state machine that tracks `HostCode` / `TagHeader` / `TagContent` /
//! `ExpressionHole`, and the host-code [`Scanner`] that decides where markup
//! may begin.
//!
//! # Example
//!
//! ```
//! use jsxp_lexer::Scanner;
//!
//! let mut scanner = Scanner::new("<?php $a = $b < $c; $d = <div/>;");
//! let start = scanner.next_markup_start().unwrap().unwrap();
//! assert_eq!(start.rest(), "<div/>;");
//! ```

pub mod cursor;
pub mod mode;
pub mod scanner;

pub use cursor::{Cursor, Span};
pub use mode::{Mode, ModeMachine, ReturnMode, DEFAULT_MAX_DEPTH};
pub use scanner::{is_markup_start, Scanner};

/// Lexer error with position information.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Lexer error at line {line}, column {column}: {message}")]
pub struct LexerError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl LexerError {
    /// Error positioned at `cursor`.
    pub fn at(cursor: &Cursor<'_>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: cursor.line(),
            column: cursor.column(),
        }
    }
}

/// First character of a tag name, attribute name or host identifier.
pub fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Continuation character of an identifier.
pub fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Markup whitespace: space, tab, newline, carriage return, form feed.
pub fn is_whitespace(c: char) -> bool {
    c.is_ascii_whitespace()
}
