//! Expression parser for the PHP-flavoured host grammar.
//!
//! Parses one expression at a time straight off the source cursor, using
//! recursive descent with Pratt parsing for operator precedence. When a
//! markup start appears in operand position the parser hands the same
//! [`MarkupState`] to [`markup::parse_element`], so markup may nest inside
//! expressions inside markup to any depth the options allow.
//!
//! [`HostParser`] wraps this as the default [`ExpressionDelegate`].

use jsxp_lexer::{is_markup_start, Cursor, Span};

use crate::ast::{Arg, ArrayItem, BinaryOp, Expr, ExprKind, Param};
use crate::delegate::{ExpressionDelegate, HostExpression, MarkupState};
use crate::expr_lexer::{ExprLexer, Token, TokenKind, TokenValue};
use crate::markup;
use crate::{ParseError, ParseErrorKind, ParseOptions};

// Binding powers, loosest first.
const PREFIX_BP: u8 = 28;
const TERNARY_ELSE_BP: u8 = 11;

/// What an infix token builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Infix {
    Binary(BinaryOp),
    Assign,
    Ternary,
}

/// `(operator, left bp, right bp)`. Right-associative operators have
/// `left > right`.
fn infix(kind: TokenKind) -> Option<(Infix, u8, u8)> {
    use BinaryOp::*;
    let entry = match kind {
        TokenKind::LogicalOr => (Infix::Binary(LogicalOr), 1, 2),
        TokenKind::LogicalXor => (Infix::Binary(LogicalXor), 3, 4),
        TokenKind::LogicalAnd => (Infix::Binary(LogicalAnd), 5, 6),
        TokenKind::Eq => (Infix::Assign, 8, 7),
        TokenKind::Question => (Infix::Ternary, 10, TERNARY_ELSE_BP),
        TokenKind::QuestionQuestion => (Infix::Binary(Coalesce), 13, 12),
        TokenKind::Or => (Infix::Binary(BooleanOr), 14, 15),
        TokenKind::And => (Infix::Binary(BooleanAnd), 16, 17),
        TokenKind::EqEq => (Infix::Binary(Equal), 18, 19),
        TokenKind::NotEq => (Infix::Binary(NotEqual), 18, 19),
        TokenKind::StrictEq => (Infix::Binary(Identical), 18, 19),
        TokenKind::StrictNotEq => (Infix::Binary(NotIdentical), 18, 19),
        TokenKind::Lt => (Infix::Binary(Smaller), 20, 21),
        TokenKind::Lte => (Infix::Binary(SmallerOrEqual), 20, 21),
        TokenKind::Gt => (Infix::Binary(Greater), 20, 21),
        TokenKind::Gte => (Infix::Binary(GreaterOrEqual), 20, 21),
        TokenKind::Dot => (Infix::Binary(Concat), 22, 23),
        TokenKind::Plus => (Infix::Binary(Plus), 24, 25),
        TokenKind::Minus => (Infix::Binary(Minus), 24, 25),
        TokenKind::Star => (Infix::Binary(Mul), 26, 27),
        TokenKind::Slash => (Infix::Binary(Div), 26, 27),
        TokenKind::Percent => (Infix::Binary(Mod), 26, 27),
        _ => return None,
    };
    Some(entry)
}

impl HostExpression for Expr {
    fn true_constant(span: Span) -> Self {
        Expr::new(ExprKind::ConstFetch("true".into()), span)
    }

    fn null_constant(span: Span) -> Self {
        Expr::new(ExprKind::ConstFetch("null".into()), span)
    }

    fn string_literal(value: String, span: Span) -> Self {
        Expr::new(ExprKind::String(value), span)
    }
}

/// The bundled host delegate.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostParser;

impl ExpressionDelegate for HostParser {
    type Expr = Expr;

    fn parse_expression<'src>(
        &mut self,
        state: &mut MarkupState,
        cursor: Cursor<'src>,
    ) -> Result<(Expr, Cursor<'src>), ParseError> {
        let mut parser = ExprParser::new(state, cursor);
        let expr = parser.parse_expression()?;
        Ok((expr, parser.cursor()))
    }
}

/// Host expression parser over a shared markup state.
pub struct ExprParser<'a, 'src> {
    state: &'a mut MarkupState,
    cursor: Cursor<'src>,
    lookahead: Option<(Token, Cursor<'src>)>,
}

impl<'a, 'src> ExprParser<'a, 'src> {
    pub fn new(state: &'a mut MarkupState, cursor: Cursor<'src>) -> Self {
        Self {
            state,
            cursor,
            lookahead: None,
        }
    }

    /// Parse a complete expression from a source string.
    pub fn parse(source: &str) -> Result<Expr, ParseError> {
        Self::parse_with(source, &ParseOptions::default())
    }

    pub fn parse_with(source: &str, options: &ParseOptions) -> Result<Expr, ParseError> {
        let mut state = MarkupState::new(options);
        let mut parser = ExprParser::new(&mut state, Cursor::new(source));
        let expr = parser.parse_expression()?;

        let next = parser.peek()?;
        if next.kind != TokenKind::Eof {
            return Err(unexpected(&next));
        }
        Ok(expr)
    }

    /// Position just past the last consumed token.
    pub fn cursor(&self) -> Cursor<'src> {
        self.cursor
    }

    /// Parse one expression, stopping before the first token that cannot
    /// continue it.
    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_bp(0)
    }

    // --- Precedence climbing ---

    fn parse_bp(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let start = self.peek_start()?;
        self.state.enter_expression(&start)?;
        let result = self.climb(start, min_bp);
        self.state.exit_expression();
        result
    }

    fn climb(&mut self, start: Cursor<'src>, min_bp: u8) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;

        loop {
            let token = self.peek()?;
            let Some((op, l_bp, r_bp)) = infix(token.kind) else {
                break;
            };
            if l_bp < min_bp {
                break;
            }
            self.bump()?;

            let kind = match op {
                Infix::Binary(op) => {
                    let right = self.parse_bp(r_bp)?;
                    ExprKind::BinaryOp {
                        op,
                        left: Box::new(left),
                        right: Box::new(right),
                    }
                }
                Infix::Assign => {
                    if !is_assignable(&left) {
                        return Err(delegated(left.span, "Cannot assign to this expression"));
                    }
                    let value = self.parse_bp(r_bp)?;
                    ExprKind::Assign {
                        var: Box::new(left),
                        expr: Box::new(value),
                    }
                }
                Infix::Ternary => {
                    let if_true = if self.peek()?.kind == TokenKind::Colon {
                        None
                    } else {
                        Some(Box::new(self.parse_expression()?))
                    };
                    self.expect(TokenKind::Colon)?;
                    let if_false = self.parse_bp(r_bp)?;
                    ExprKind::Ternary {
                        cond: Box::new(left),
                        if_true,
                        if_false: Box::new(if_false),
                    }
                }
            };
            left = Expr::new(kind, self.span_from(&start));
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let start = self.peek_start()?;
        if is_markup_start(&start) {
            return self.parse_markup(start);
        }

        let kind = match self.peek()?.kind {
            TokenKind::Not => {
                self.bump()?;
                ExprKind::BooleanNot(Box::new(self.parse_bp(PREFIX_BP)?))
            }
            TokenKind::Minus => {
                self.bump()?;
                ExprKind::UnaryMinus(Box::new(self.parse_bp(PREFIX_BP)?))
            }
            _ => {
                let primary = self.parse_primary()?;
                return self.parse_postfix(primary, start);
            }
        };
        Ok(Expr::new(kind, self.span_from(&start)))
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let start = self.peek_start()?;
        let token = self.bump()?;

        let kind = match (token.kind, token.value) {
            (TokenKind::Variable, TokenValue::Name(name)) => ExprKind::Variable(name),
            (TokenKind::Int, TokenValue::Int(n)) => ExprKind::Int(n),
            (TokenKind::Float, TokenValue::Float(n)) => ExprKind::Float(n),
            (TokenKind::String, TokenValue::String(s)) => ExprKind::String(s),
            (TokenKind::Identifier, TokenValue::Name(name)) => {
                if name.eq_ignore_ascii_case("array") && self.peek()?.kind == TokenKind::LParen {
                    self.bump()?;
                    ExprKind::Array(self.parse_array_items(TokenKind::RParen)?)
                } else {
                    // Becomes a ConstFetch unless a call or `::` follows
                    ExprKind::Name(name)
                }
            }
            (TokenKind::LBracket, _) => ExprKind::Array(self.parse_array_items(TokenKind::RBracket)?),
            (TokenKind::Fn, _) => self.parse_arrow_function()?,
            (TokenKind::LParen, _) => {
                let inner = self.parse_expression()?;
                self.expect(TokenKind::RParen)?;
                return Ok(inner);
            }
            (kind, value) => {
                return Err(unexpected(&Token {
                    kind,
                    span: token.span,
                    value,
                }));
            }
        };

        Ok(Expr::new(kind, self.span_from(&start)))
    }

    /// Property and method access, calls, dim fetches and `::` on a primary.
    fn parse_postfix(&mut self, primary: Expr, start: Cursor<'src>) -> Result<Expr, ParseError> {
        let mut expr = primary;

        loop {
            let token = self.peek()?;
            let kind = match token.kind {
                TokenKind::Arrow | TokenKind::NullsafeArrow => {
                    self.bump()?;
                    let nullsafe = token.kind == TokenKind::NullsafeArrow;
                    let name = self.expect_member_name()?;
                    if self.peek()?.kind == TokenKind::LParen {
                        self.bump()?;
                        ExprKind::MethodCall {
                            var: Box::new(expr),
                            name,
                            args: self.parse_args()?,
                            nullsafe,
                        }
                    } else {
                        ExprKind::PropertyFetch {
                            var: Box::new(expr),
                            name,
                            nullsafe,
                        }
                    }
                }
                TokenKind::LBracket => {
                    self.bump()?;
                    let dim = if self.peek()?.kind == TokenKind::RBracket {
                        None
                    } else {
                        Some(Box::new(self.parse_expression()?))
                    };
                    self.expect(TokenKind::RBracket)?;
                    ExprKind::ArrayDimFetch {
                        var: Box::new(expr),
                        dim,
                    }
                }
                TokenKind::LParen if is_callable(&expr) => {
                    self.bump()?;
                    ExprKind::FuncCall {
                        callee: Box::new(expr),
                        args: self.parse_args()?,
                    }
                }
                TokenKind::DoubleColon if matches!(expr.kind, ExprKind::Name(_)) => {
                    self.bump()?;
                    let name = self.expect_member_name()?;
                    if self.peek()?.kind == TokenKind::LParen {
                        self.bump()?;
                        ExprKind::StaticCall {
                            class: Box::new(expr),
                            name,
                            args: self.parse_args()?,
                        }
                    } else {
                        ExprKind::ClassConstFetch {
                            class: Box::new(expr),
                            name,
                        }
                    }
                }
                _ => break,
            };
            expr = Expr::new(kind, self.span_from(&start));
        }

        if let ExprKind::Name(name) = &mut expr.kind {
            let name = std::mem::take(name);
            expr.kind = ExprKind::ConstFetch(name);
        }
        Ok(expr)
    }

    /// Markup literal in operand position: re-enter the markup core.
    fn parse_markup(&mut self, start: Cursor<'src>) -> Result<Expr, ParseError> {
        tracing::trace!(
            target: "jsxp::host",
            line = start.line(),
            column = start.column(),
            depth = self.state.modes().depth(),
            "re-entering markup"
        );
        self.lookahead = None;
        let (element, end) = markup::parse_element(self.state, start, &mut HostParser)?;
        self.cursor = end;
        Ok(Expr::new(
            ExprKind::Markup(Box::new(element)),
            end.span_from(&start),
        ))
    }

    // --- Compound forms ---

    /// Items up to and including `close`. Trailing commas are allowed.
    fn parse_array_items(&mut self, close: TokenKind) -> Result<Vec<ArrayItem>, ParseError> {
        let mut items = Vec::new();

        while self.peek()?.kind != close {
            let start = self.peek_start()?;
            let unpack = self.eat(TokenKind::Ellipsis)?;
            let first = self.parse_expression()?;

            let (key, value) = if !unpack && self.eat(TokenKind::DoubleArrow)? {
                (Some(first), self.parse_expression()?)
            } else {
                (None, first)
            };
            items.push(ArrayItem {
                key,
                value,
                unpack,
                span: self.span_from(&start),
            });

            if !self.eat(TokenKind::Comma)? {
                break;
            }
        }

        self.expect(close)?;
        Ok(items)
    }

    /// Call arguments after `(`, up to and including `)`.
    fn parse_args(&mut self) -> Result<Vec<Arg>, ParseError> {
        let mut args = Vec::new();

        while self.peek()?.kind != TokenKind::RParen {
            let start = self.peek_start()?;
            let unpack = self.eat(TokenKind::Ellipsis)?;
            let value = self.parse_expression()?;
            args.push(Arg {
                value,
                unpack,
                span: self.span_from(&start),
            });

            if !self.eat(TokenKind::Comma)? {
                break;
            }
        }

        self.expect(TokenKind::RParen)?;
        Ok(args)
    }

    /// `fn(params) => expr`, after the `fn` keyword.
    fn parse_arrow_function(&mut self) -> Result<ExprKind, ParseError> {
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();

        while self.peek()?.kind != TokenKind::RParen {
            // Optional (nullable) type hint
            self.eat(TokenKind::Question)?;
            self.eat(TokenKind::Identifier)?;

            let token = self.expect(TokenKind::Variable)?;
            if let TokenValue::Name(name) = token.value {
                params.push(Param {
                    name,
                    span: token.span,
                });
            }
            if !self.eat(TokenKind::Comma)? {
                break;
            }
        }

        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::DoubleArrow)?;
        let body = self.parse_expression()?;
        Ok(ExprKind::ArrowFunction {
            params,
            body: Box::new(body),
        })
    }

    // --- Token helpers ---

    fn peek(&mut self) -> Result<Token, ParseError> {
        if let Some((token, _)) = &self.lookahead {
            return Ok(token.clone());
        }
        let mut lexer = ExprLexer::new(self.cursor);
        let token = lexer.next_token()?;
        self.lookahead = Some((token.clone(), lexer.cursor()));
        Ok(token)
    }

    fn bump(&mut self) -> Result<Token, ParseError> {
        let token = self.peek()?;
        if let Some((_, end)) = self.lookahead.take() {
            self.cursor = end;
        }
        Ok(token)
    }

    fn eat(&mut self, kind: TokenKind) -> Result<bool, ParseError> {
        if self.peek()?.kind == kind {
            self.bump()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        let token = self.peek()?;
        if token.kind != kind {
            return Err(delegated(
                token.span,
                format!(
                    "Syntax error, unexpected {}, expecting {}",
                    token.kind.describe(),
                    kind.describe()
                ),
            ));
        }
        self.bump()
    }

    /// Identifier after `->`, `?->` or `::`. Keywords are valid member names.
    fn expect_member_name(&mut self) -> Result<String, ParseError> {
        let token = self.bump()?;
        match (token.kind, token.value) {
            (
                TokenKind::Identifier
                | TokenKind::Fn
                | TokenKind::LogicalAnd
                | TokenKind::LogicalOr
                | TokenKind::LogicalXor,
                TokenValue::Name(name),
            ) => Ok(name),
            (kind, _) => Err(delegated(
                token.span,
                format!("Syntax error, unexpected {}, expecting identifier", kind.describe()),
            )),
        }
    }

    /// Position of the next token, after trivia.
    fn peek_start(&self) -> Result<Cursor<'src>, ParseError> {
        let mut lexer = ExprLexer::new(self.cursor);
        lexer.skip_trivia()?;
        Ok(lexer.cursor())
    }

    fn span_from(&self, start: &Cursor<'src>) -> Span {
        self.cursor.span_from(start)
    }
}

fn is_assignable(expr: &Expr) -> bool {
    matches!(
        expr.kind,
        ExprKind::Variable(_)
            | ExprKind::PropertyFetch { .. }
            | ExprKind::ArrayDimFetch { .. }
            | ExprKind::Array(_)
    )
}

fn is_callable(expr: &Expr) -> bool {
    !matches!(
        expr.kind,
        ExprKind::Int(_) | ExprKind::Float(_) | ExprKind::Markup(_) | ExprKind::Array(_)
    )
}

fn delegated(span: Span, message: impl Into<String>) -> ParseError {
    ParseError::new(ParseErrorKind::Delegated, message, span.line, span.column)
}

fn unexpected(token: &Token) -> ParseError {
    let found = match &token.value {
        TokenValue::Name(name) if token.kind == TokenKind::Variable => format!("'${name}'"),
        TokenValue::Name(name) => format!("'{name}'"),
        _ => token.kind.describe().to_string(),
    };
    delegated(token.span, format!("Syntax error, unexpected {found}"))
}
