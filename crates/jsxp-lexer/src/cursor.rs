use serde::Serialize;

use crate::is_whitespace;

/// A range in source text, tracking line and column for error reporting.
///
/// `line`/`column` locate the start; `end_line` is the line of the last
/// consumed character. Positions are diagnostics only and never steer parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
    pub end_line: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize, column: usize, end_line: usize) -> Self {
        Self {
            start,
            end,
            line,
            column,
            end_line,
        }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        let (first, last) = if self.start <= other.start {
            (self, other)
        } else {
            (other, self)
        };
        Span {
            start: first.start,
            end: last.end.max(first.end),
            line: first.line,
            column: first.column,
            end_line: last.end_line.max(first.end_line),
        }
    }
}

/// A position-addressable view over the source buffer.
///
/// Cursors are `Copy`. Assemblers take one by value, advance their own copy
/// and hand the advanced cursor back alongside the node they built, so
/// lookahead is just "copy, probe, discard".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor<'src> {
    source: &'src str,
    offset: usize,
    line: usize,
    column: usize,
}

impl<'src> Cursor<'src> {
    /// Create a cursor at the start of `source`.
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Byte offset into the source.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    /// Unconsumed remainder of the source.
    pub fn rest(&self) -> &'src str {
        &self.source[self.offset..]
    }

    pub fn is_at_end(&self) -> bool {
        self.offset >= self.source.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.rest().starts_with(prefix)
    }

    /// Consume one character, keeping line/column current.
    /// `\r\n` counts as a single line break.
    pub fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.offset += ch.len_utf8();
        match ch {
            '\n' => {
                self.line += 1;
                self.column = 1;
            }
            '\r' if self.peek() == Some('\n') => {}
            '\r' => {
                self.line += 1;
                self.column = 1;
            }
            _ => self.column += 1,
        }
        Some(ch)
    }

    /// Consume `expected` if it is the next character.
    pub fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume `expected` if the remainder starts with it.
    pub fn eat_str(&mut self, expected: &str) -> bool {
        if !self.starts_with(expected) {
            return false;
        }
        for _ in expected.chars() {
            self.advance();
        }
        true
    }

    /// Consume characters while `pred` holds and return the consumed slice.
    pub fn advance_while(&mut self, pred: impl Fn(char) -> bool) -> &'src str {
        let start = self.offset;
        while let Some(ch) = self.peek() {
            if !pred(ch) {
                break;
            }
            self.advance();
        }
        &self.source[start..self.offset]
    }

    /// Skip whitespace (including newlines). Returns true if anything was skipped.
    pub fn skip_whitespace(&mut self) -> bool {
        !self.advance_while(is_whitespace).is_empty()
    }

    /// Source text between an earlier cursor and this one.
    pub fn slice_from(&self, start: &Cursor<'src>) -> &'src str {
        &self.source[start.offset..self.offset]
    }

    /// Span from an earlier cursor up to this one.
    pub fn span_from(&self, start: &Cursor<'src>) -> Span {
        let end_line = if self.offset > start.offset && self.column == 1 {
            // A trailing newline belongs to the line it ends.
            self.line.saturating_sub(1).max(start.line)
        } else {
            self.line
        };
        Span::new(start.offset, self.offset, start.line, start.column, end_line)
    }

    /// Zero-width span at this position.
    pub fn point(&self) -> Span {
        Span::new(self.offset, self.offset, self.line, self.column, self.line)
    }
}
