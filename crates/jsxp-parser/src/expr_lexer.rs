//! Lexer for host expressions.
//!
//! Tokenizes the PHP-flavoured expression language used inside expression
//! holes and around markup literals. The lexer works directly on a
//! [`Cursor`] into the full source rather than on an extracted substring, so
//! the expression parser can stop at any token, hand the cursor back to the
//! markup core, or hand it to the markup core to parse an embedded element.
//!
//! # Examples
//!
//! ```
//! use jsxp_parser::expr_lexer::{ExprLexer, TokenKind};
//!
//! let tokens = ExprLexer::tokenize("$count + 1").unwrap();
//! assert_eq!(tokens[0].kind, TokenKind::Variable);
//! assert_eq!(tokens[1].kind, TokenKind::Plus);
//! assert_eq!(tokens[2].kind, TokenKind::Int);
//! ```

use jsxp_lexer::{is_ident_char, is_ident_start, Cursor, Span};

/// A token produced by the expression lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub value: TokenValue,
}

/// Token classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Literals
    Int,
    Float,
    String,
    Variable,

    // Names & keywords
    Identifier,
    Fn,
    LogicalAnd,
    LogicalOr,
    LogicalXor,

    // Arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Dot,

    // Comparison
    EqEq,
    NotEq,
    StrictEq,
    StrictNotEq,
    Lt,
    Gt,
    Lte,
    Gte,

    // Logical
    And,
    Or,
    Not,
    QuestionQuestion,

    // Assignment
    Eq,

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,

    // Punctuation
    Comma,
    Colon,
    DoubleColon,
    Semicolon,
    Question,
    DoubleArrow,
    Arrow,
    NullsafeArrow,
    Ellipsis,

    // End of input
    Eof,
}

impl TokenKind {
    /// How the token reads in an error message.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Int => "integer",
            TokenKind::Float => "float",
            TokenKind::String => "string",
            TokenKind::Variable => "variable",
            TokenKind::Identifier => "identifier",
            TokenKind::Fn => "'fn'",
            TokenKind::LogicalAnd => "'and'",
            TokenKind::LogicalOr => "'or'",
            TokenKind::LogicalXor => "'xor'",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::Dot => "'.'",
            TokenKind::EqEq => "'=='",
            TokenKind::NotEq => "'!='",
            TokenKind::StrictEq => "'==='",
            TokenKind::StrictNotEq => "'!=='",
            TokenKind::Lt => "'<'",
            TokenKind::Gt => "'>'",
            TokenKind::Lte => "'<='",
            TokenKind::Gte => "'>='",
            TokenKind::And => "'&&'",
            TokenKind::Or => "'||'",
            TokenKind::Not => "'!'",
            TokenKind::QuestionQuestion => "'??'",
            TokenKind::Eq => "'='",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::Comma => "','",
            TokenKind::Colon => "':'",
            TokenKind::DoubleColon => "'::'",
            TokenKind::Semicolon => "';'",
            TokenKind::Question => "'?'",
            TokenKind::DoubleArrow => "'=>'",
            TokenKind::Arrow => "'->'",
            TokenKind::NullsafeArrow => "'?->'",
            TokenKind::Ellipsis => "'...'",
            TokenKind::Eof => "end of file",
        }
    }
}

/// The value carried by a token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    None,
    Int(i64),
    Float(f64),
    String(String),
    Name(String),
}

/// Expression lexer error.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprLexerError {
    pub message: String,
    pub span: Span,
}

impl std::fmt::Display for ExprLexerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Expression lexer error at line {}, column {}: {}",
            self.span.line, self.span.column, self.message
        )
    }
}

impl std::error::Error for ExprLexerError {}

impl From<ExprLexerError> for crate::ParseError {
    fn from(e: ExprLexerError) -> Self {
        crate::ParseError::new(
            crate::ParseErrorKind::Delegated,
            e.message,
            e.span.line,
            e.span.column,
        )
    }
}

/// Host expression lexer.
#[derive(Debug, Clone, Copy)]
pub struct ExprLexer<'src> {
    cursor: Cursor<'src>,
}

impl<'src> ExprLexer<'src> {
    /// Create a lexer positioned at `cursor`.
    pub fn new(cursor: Cursor<'src>) -> Self {
        Self { cursor }
    }

    /// Position just past the last consumed token (or trivia).
    pub fn cursor(&self) -> Cursor<'src> {
        self.cursor
    }

    /// Tokenize the entire source into a vector of tokens.
    pub fn tokenize(source: &str) -> Result<Vec<Token>, ExprLexerError> {
        let mut lexer = ExprLexer::new(Cursor::new(source));
        let mut tokens = Vec::new();

        loop {
            let token = lexer.next_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        Ok(tokens)
    }

    /// Skip whitespace and `//`, `#` and `/* */` comments.
    pub fn skip_trivia(&mut self) -> Result<(), ExprLexerError> {
        loop {
            self.cursor.skip_whitespace();
            if self.cursor.starts_with("//")
                || (self.cursor.starts_with("#") && !self.cursor.starts_with("#["))
            {
                self.cursor.advance_while(|c| c != '\n' && c != '\r');
            } else if self.cursor.starts_with("/*") {
                let start = self.cursor;
                self.cursor.eat_str("/*");
                while !self.cursor.eat_str("*/") {
                    if self.cursor.advance().is_none() {
                        return Err(ExprLexerError {
                            message: "Unterminated comment".into(),
                            span: self.cursor.span_from(&start),
                        });
                    }
                }
            } else {
                return Ok(());
            }
        }
    }

    /// Read the next token from the source.
    pub fn next_token(&mut self) -> Result<Token, ExprLexerError> {
        self.skip_trivia()?;

        let start = self.cursor;
        let Some(ch) = self.cursor.peek() else {
            return Ok(self.token(TokenKind::Eof, &start, TokenValue::None));
        };

        match ch {
            // Numbers
            '0'..='9' => self.read_number(start),
            '.' if self.cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.read_number(start)
            }

            // Strings
            '\'' | '"' => self.read_string(start),

            // Variables
            '$' => self.read_variable(start),

            // Names and keywords
            c if is_ident_start(c) || c == '\\' => Ok(self.read_name(start)),

            // Multi-character operators (longest match first)
            _ => {
                let (kind, len) = match self.cursor.rest().as_bytes() {
                    [b'=', b'=', b'=', ..] => (TokenKind::StrictEq, 3),
                    [b'!', b'=', b'=', ..] => (TokenKind::StrictNotEq, 3),
                    [b'?', b'-', b'>', ..] => (TokenKind::NullsafeArrow, 3),
                    [b'.', b'.', b'.', ..] => (TokenKind::Ellipsis, 3),
                    [b'=', b'=', ..] => (TokenKind::EqEq, 2),
                    [b'!', b'=', ..] | [b'<', b'>', ..] => (TokenKind::NotEq, 2),
                    [b'<', b'=', ..] => (TokenKind::Lte, 2),
                    [b'>', b'=', ..] => (TokenKind::Gte, 2),
                    [b'&', b'&', ..] => (TokenKind::And, 2),
                    [b'|', b'|', ..] => (TokenKind::Or, 2),
                    [b'?', b'?', ..] => (TokenKind::QuestionQuestion, 2),
                    [b'=', b'>', ..] => (TokenKind::DoubleArrow, 2),
                    [b'-', b'>', ..] => (TokenKind::Arrow, 2),
                    [b':', b':', ..] => (TokenKind::DoubleColon, 2),
                    [b'+', ..] => (TokenKind::Plus, 1),
                    [b'-', ..] => (TokenKind::Minus, 1),
                    [b'*', ..] => (TokenKind::Star, 1),
                    [b'/', ..] => (TokenKind::Slash, 1),
                    [b'%', ..] => (TokenKind::Percent, 1),
                    [b'.', ..] => (TokenKind::Dot, 1),
                    [b'<', ..] => (TokenKind::Lt, 1),
                    [b'>', ..] => (TokenKind::Gt, 1),
                    [b'!', ..] => (TokenKind::Not, 1),
                    [b'=', ..] => (TokenKind::Eq, 1),
                    [b'(', ..] => (TokenKind::LParen, 1),
                    [b')', ..] => (TokenKind::RParen, 1),
                    [b'[', ..] => (TokenKind::LBracket, 1),
                    [b']', ..] => (TokenKind::RBracket, 1),
                    [b'{', ..] => (TokenKind::LBrace, 1),
                    [b'}', ..] => (TokenKind::RBrace, 1),
                    [b',', ..] => (TokenKind::Comma, 1),
                    [b':', ..] => (TokenKind::Colon, 1),
                    [b';', ..] => (TokenKind::Semicolon, 1),
                    [b'?', ..] => (TokenKind::Question, 1),
                    _ => {
                        return Err(ExprLexerError {
                            message: format!("Unexpected character: '{ch}'"),
                            span: start.point(),
                        });
                    }
                };
                for _ in 0..len {
                    self.cursor.advance();
                }
                Ok(self.token(kind, &start, TokenValue::None))
            }
        }
    }

    // --- Private helpers ---

    fn read_number(&mut self, start: Cursor<'src>) -> Result<Token, ExprLexerError> {
        if self.cursor.starts_with("0x") || self.cursor.starts_with("0X") {
            self.cursor.advance();
            self.cursor.advance();
            let digits = self.cursor.advance_while(|c| c.is_ascii_hexdigit() || c == '_');
            let digits = digits.replace('_', "");
            return match i64::from_str_radix(&digits, 16) {
                Ok(n) => Ok(self.token(TokenKind::Int, &start, TokenValue::Int(n))),
                Err(_) => Err(ExprLexerError {
                    message: format!("Invalid number: '{}'", self.cursor.slice_from(&start)),
                    span: self.cursor.span_from(&start),
                }),
            };
        }

        let mut is_float = false;
        self.cursor.advance_while(|c| c.is_ascii_digit() || c == '_');
        if self.cursor.peek() == Some('.') && self.cursor.peek_nth(1) != Some('.') {
            is_float = true;
            self.cursor.advance();
            self.cursor.advance_while(|c| c.is_ascii_digit() || c == '_');
        }
        if matches!(self.cursor.peek(), Some('e' | 'E')) {
            let mut probe = self.cursor;
            probe.advance();
            if matches!(probe.peek(), Some('+' | '-')) {
                probe.advance();
            }
            if probe.peek().is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                probe.advance_while(|c| c.is_ascii_digit());
                self.cursor = probe;
            }
        }

        let text = self.cursor.slice_from(&start).replace('_', "");
        let invalid = || ExprLexerError {
            message: format!("Invalid number: '{text}'"),
            span: self.cursor.span_from(&start),
        };

        // Integers that overflow become floats
        let value = match (is_float, text.parse::<i64>()) {
            (false, Ok(n)) => TokenValue::Int(n),
            _ => TokenValue::Float(text.parse::<f64>().map_err(|_| invalid())?),
        };
        let kind = match value {
            TokenValue::Int(_) => TokenKind::Int,
            _ => TokenKind::Float,
        };
        Ok(self.token(kind, &start, value))
    }

    fn read_string(&mut self, start: Cursor<'src>) -> Result<Token, ExprLexerError> {
        let Some(quote) = self.cursor.advance() else {
            return Ok(self.token(TokenKind::Eof, &start, TokenValue::None));
        };
        let mut value = String::new();

        loop {
            match self.cursor.advance() {
                None => {
                    return Err(ExprLexerError {
                        message: "Unterminated string".into(),
                        span: self.cursor.span_from(&start),
                    });
                }
                Some(c) if c == quote => break,
                Some('\\') => match (quote, self.cursor.peek()) {
                    (_, None) => continue,
                    (_, Some('\\')) => {
                        self.cursor.advance();
                        value.push('\\');
                    }
                    (_, Some(c)) if c == quote => {
                        self.cursor.advance();
                        value.push(c);
                    }
                    ('"', Some(c @ ('n' | 't' | 'r' | 'v' | 'e' | 'f' | '$' | '0'))) => {
                        self.cursor.advance();
                        value.push(match c {
                            'n' => '\n',
                            't' => '\t',
                            'r' => '\r',
                            'v' => '\x0B',
                            'e' => '\x1B',
                            'f' => '\x0C',
                            '0' => '\0',
                            other => other,
                        });
                    }
                    _ => value.push('\\'),
                },
                Some(c) => value.push(c),
            }
        }

        Ok(self.token(TokenKind::String, &start, TokenValue::String(value)))
    }

    fn read_variable(&mut self, start: Cursor<'src>) -> Result<Token, ExprLexerError> {
        self.cursor.advance(); // `$`
        if !self.cursor.peek().is_some_and(is_ident_start) {
            return Err(ExprLexerError {
                message: "Expected variable name after '$'".into(),
                span: self.cursor.span_from(&start),
            });
        }
        let name = self.cursor.advance_while(is_ident_char).to_string();
        Ok(self.token(TokenKind::Variable, &start, TokenValue::Name(name)))
    }

    /// Identifier, keyword, or namespaced name (`\Foo\bar`).
    fn read_name(&mut self, start: Cursor<'src>) -> Token {
        let text = self.cursor.advance_while(|c| is_ident_char(c) || c == '\\');

        let kind = match text.to_ascii_lowercase().as_str() {
            "fn" => TokenKind::Fn,
            "and" => TokenKind::LogicalAnd,
            "or" => TokenKind::LogicalOr,
            "xor" => TokenKind::LogicalXor,
            _ => TokenKind::Identifier,
        };
        self.token(kind, &start, TokenValue::Name(text.to_string()))
    }

    fn token(&self, kind: TokenKind, start: &Cursor<'src>, value: TokenValue) -> Token {
        Token {
            kind,
            span: self.cursor.span_from(start),
            value,
        }
    }
}
