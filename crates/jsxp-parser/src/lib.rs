//! jsxp Parser
//!
//! Turns JSX-style markup embedded in host-language source into a typed
//! syntax tree. The markup core (tag headers, attributes, content, tag
//! matching) is host-agnostic: wherever host code appears inside markup it
//! calls an [`ExpressionDelegate`]. A PHP-flavoured expression grammar
//! ([`HostParser`]) ships as the default delegate and re-enters the markup
//! core whenever it meets a markup literal.
//!
//! ```
//! use jsxp_parser::{ast::Child, Document};
//!
//! let doc = Document::parse("<?php $el = <div>Hello World</div>;").unwrap();
//! let div = &doc.elements[0];
//! assert_eq!(div.name, "div");
//! assert_eq!(div.closing_name.as_deref(), Some("div"));
//! assert!(matches!(&div.children[0], Child::Text(t) if t.value == "Hello World"));
//! ```

pub mod ast;
pub mod attributes;
pub mod content;
pub mod delegate;
pub mod document;
pub mod dump;
pub mod expr_lexer;
pub mod expr_parser;
pub mod lower;
pub mod markup;
pub mod tag_matcher;

pub use ast::{Child, Element, Expr, ExprKind};
pub use delegate::{ExpressionDelegate, HostExpression, MarkupState};
pub use document::Document;
pub use dump::NodeDumper;
pub use expr_parser::{ExprParser, HostParser};

use jsxp_lexer::{Cursor, LexerError, DEFAULT_MAX_DEPTH};
use serde::Serialize;

/// Which stage rejected the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParseErrorKind {
    /// Unterminated tag or hole, unbalanced braces, EOF mid-markup.
    Structural,
    /// Invalid attribute name, mismatched opening and closing tags.
    Validation,
    /// Raised by the host expression grammar.
    Delegated,
}

/// Parser error with position information.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Parse error at line {line}, column {column}: {message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            message: message.into(),
            line,
            column,
        }
    }

    pub fn structural(at: &Cursor<'_>, message: impl Into<String>) -> Self {
        Self::new(ParseErrorKind::Structural, message, at.line(), at.column())
    }

    pub fn validation(at: &Cursor<'_>, message: impl Into<String>) -> Self {
        Self::new(ParseErrorKind::Validation, message, at.line(), at.column())
    }

    pub fn delegated(at: &Cursor<'_>, message: impl Into<String>) -> Self {
        Self::new(ParseErrorKind::Delegated, message, at.line(), at.column())
    }
}

impl From<LexerError> for ParseError {
    fn from(e: LexerError) -> Self {
        Self::new(ParseErrorKind::Structural, e.message, e.line, e.column)
    }
}

/// Parser configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum open tags plus nested host expressions before parsing fails.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
