use crate::cursor::Cursor;
use crate::{is_ident_char, is_ident_start, LexerError};

/// Keywords after which an expression (and therefore markup) may start.
/// Host keywords are case-insensitive.
const EXPRESSION_KEYWORDS: &[&str] = &[
    "return", "echo", "print", "yield", "case", "else", "and", "or", "xor", "throw",
];

/// Cast types. `(type)` is a prefix operator, so an operand may follow it.
const CAST_TYPES: &[&str] = &[
    "int", "integer", "bool", "boolean", "float", "double", "real", "string", "binary", "array",
    "object", "unset",
];

/// Does a markup tag start at `cursor`?
///
/// `<`, optional whitespace, then an identifier-start character or `>`
/// (fragment). Callers must additionally be in expression-start position;
/// otherwise `<` is the host's less-than operator.
pub fn is_markup_start(cursor: &Cursor<'_>) -> bool {
    let mut probe = *cursor;
    if !probe.eat('<') {
        return false;
    }
    probe.skip_whitespace();
    matches!(probe.peek(), Some(c) if is_ident_start(c) || c == '>')
}

/// Host-code scanner.
///
/// Walks host source in `HostCode` mode looking for the places where markup
/// begins. It does not tokenize the host language; it only tracks enough to
/// know whether the previous significant token leaves it in
/// expression-start position, and skips strings, comments and heredocs
/// whose contents must never be mistaken for markup.
pub struct Scanner<'src> {
    cursor: Cursor<'src>,
    expression_start: bool,
}

impl<'src> Scanner<'src> {
    /// Create a scanner at the start of `source`. Start-of-file is an
    /// expression-start position.
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
            expression_start: true,
        }
    }

    pub fn cursor(&self) -> Cursor<'src> {
        self.cursor
    }

    /// Find the next top-level markup start. The returned cursor points at
    /// the `<`; the scanner itself does not move past it until
    /// [`resume_after_markup`](Self::resume_after_markup) is called.
    pub fn next_markup_start(&mut self) -> Result<Option<Cursor<'src>>, LexerError> {
        loop {
            self.cursor.skip_whitespace();
            let Some(ch) = self.cursor.peek() else {
                return Ok(None);
            };

            match ch {
                // Open tags and heredocs start with `<` but are never markup
                '<' if self.cursor.starts_with("<?php") || self.cursor.starts_with("<?=") => {
                    self.cursor.eat_str("<?php");
                    self.cursor.eat_str("<?=");
                    self.expression_start = true;
                }
                '<' if self.cursor.starts_with("<<<") => self.scan_heredoc()?,

                '<' if self.expression_start && is_markup_start(&self.cursor) => {
                    tracing::trace!(
                        target: "jsxp::mode",
                        line = self.cursor.line(),
                        column = self.cursor.column(),
                        "markup start"
                    );
                    return Ok(Some(self.cursor));
                }

                // Inline HTML after a close tag runs until the next open tag
                '?' if self.cursor.starts_with("?>") => self.scan_inline_html(),

                // Comments
                '/' if self.cursor.peek_nth(1) == Some('/') => self.scan_line_comment(),
                '#' => self.scan_line_comment(),
                '/' if self.cursor.peek_nth(1) == Some('*') => self.scan_block_comment()?,

                // Operands
                '\'' | '"' | '`' => {
                    self.scan_string(ch)?;
                    self.expression_start = false;
                }
                '$' => {
                    self.cursor.advance();
                    self.cursor.advance_while(is_ident_char);
                    self.expression_start = false;
                }
                '0'..='9' => {
                    self.cursor
                        .advance_while(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_');
                    self.expression_start = false;
                }
                c if is_ident_start(c) || c == '\\' || !c.is_ascii() => self.scan_word(),
                // `(string)` and friends are prefix operators, not operands
                '(' if self.expression_start && self.eat_cast() => self.expression_start = true,
                ')' | ']' => {
                    self.cursor.advance();
                    self.expression_start = false;
                }

                // Postfix increments end an operand
                '+' | '-' if self.cursor.peek_nth(1) == Some(ch) => {
                    self.cursor.advance();
                    self.cursor.advance();
                    self.expression_start = false;
                }

                // Any other punctuation or operator leaves us where an expression may start
                _ => {
                    self.cursor.advance();
                    self.expression_start = true;
                }
            }
        }
    }

    /// Continue scanning after a markup region that ended at `cursor`.
    /// A finished element is an operand.
    pub fn resume_after_markup(&mut self, cursor: Cursor<'src>) {
        self.cursor = cursor;
        self.expression_start = false;
    }

    // --- Scanners ---

    /// Identifier, keyword, or namespaced name.
    fn scan_word(&mut self) {
        let word = self
            .cursor
            .advance_while(|c| is_ident_char(c) || c == '\\' || !c.is_ascii());
        self.expression_start = EXPRESSION_KEYWORDS
            .iter()
            .any(|kw| kw.eq_ignore_ascii_case(word));
    }

    /// Consume a `(type)` cast if one starts here.
    fn eat_cast(&mut self) -> bool {
        let mut ahead = self.cursor;
        ahead.eat('(');
        ahead.advance_while(|c| c == ' ' || c == '\t');
        let word = ahead.advance_while(is_ident_char);
        ahead.advance_while(|c| c == ' ' || c == '\t');
        if !ahead.eat(')') || !CAST_TYPES.iter().any(|t| t.eq_ignore_ascii_case(word)) {
            return false;
        }
        self.cursor = ahead;
        true
    }

    /// Skip a quoted string, honouring backslash escapes.
    fn scan_string(&mut self, quote: char) -> Result<(), LexerError> {
        let start = self.cursor;
        self.cursor.advance(); // opening quote

        loop {
            match self.cursor.advance() {
                None => return Err(LexerError::at(&start, "Unterminated string")),
                Some('\\') => {
                    self.cursor.advance();
                }
                Some(c) if c == quote => return Ok(()),
                Some(_) => {}
            }
        }
    }

    fn scan_line_comment(&mut self) {
        while let Some(c) = self.cursor.peek() {
            if c == '\n' || c == '\r' || self.cursor.starts_with("?>") {
                break;
            }
            self.cursor.advance();
        }
    }

    fn scan_block_comment(&mut self) -> Result<(), LexerError> {
        let start = self.cursor;
        self.cursor.eat_str("/*");
        while !self.cursor.eat_str("*/") {
            if self.cursor.advance().is_none() {
                return Err(LexerError::at(&start, "Unterminated comment"));
            }
        }
        Ok(())
    }

    /// `<<<ID` / `<<<"ID"` / `<<<'ID'` up to a line whose content starts with `ID`.
    fn scan_heredoc(&mut self) -> Result<(), LexerError> {
        let start = self.cursor;
        self.cursor.eat_str("<<<");
        self.cursor.advance_while(|c| c == ' ' || c == '\t');
        let quote = self.cursor.peek().filter(|c| *c == '"' || *c == '\'');
        if let Some(q) = quote {
            self.cursor.eat(q);
        }
        let label = self.cursor.advance_while(is_ident_char);
        if label.is_empty() {
            // Not a heredoc after all: a `<<` shift followed by `<`
            self.expression_start = true;
            return Ok(());
        }
        if let Some(q) = quote {
            self.cursor.eat(q);
        }

        loop {
            // Move to the start of the next line
            loop {
                match self.cursor.advance() {
                    None => return Err(LexerError::at(&start, "Unterminated heredoc")),
                    Some('\n') => break,
                    Some(_) => {}
                }
            }
            self.cursor.advance_while(|c| c == ' ' || c == '\t');
            let mut probe = self.cursor;
            if probe.eat_str(label) && !probe.peek().is_some_and(is_ident_char) {
                self.cursor = probe;
                self.expression_start = false;
                return Ok(());
            }
        }
    }

    fn scan_inline_html(&mut self) {
        self.cursor.eat_str("?>");
        while !self.cursor.is_at_end()
            && !self.cursor.starts_with("<?php")
            && !self.cursor.starts_with("<?=")
        {
            self.cursor.advance();
        }
        self.expression_start = true;
    }
}
