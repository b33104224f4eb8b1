//! Seam between the markup core and the host expression grammar.
//!
//! The core never parses host code itself. Whenever it reaches an
//! expression hole or a spread it hands the cursor to an
//! [`ExpressionDelegate`], which parses exactly one expression and hands the
//! cursor back. The delegate receives the shared [`MarkupState`] so that a
//! markup literal inside the expression can re-enter
//! [`markup::parse_element`](crate::markup::parse_element) with the same mode
//! stack.

use jsxp_lexer::{Cursor, ModeMachine, Span};

use crate::{ParseError, ParseOptions};

/// Constructors the markup core needs from the host's expression type.
pub trait HostExpression: Sized {
    /// The host's boolean `true`, used for bare attributes.
    fn true_constant(span: Span) -> Self;

    /// The host's `null`, used for an empty `{}` hole.
    fn null_constant(span: Span) -> Self;

    /// A string literal, used for quoted attribute values (no escapes applied).
    fn string_literal(value: String, span: Span) -> Self;
}

/// A parser for one host expression.
pub trait ExpressionDelegate {
    type Expr: HostExpression;

    /// Parse one expression starting at `cursor`, stopping before the first
    /// token that cannot continue it (typically `}`). Returns the node and
    /// the cursor just past its last consumed character.
    ///
    /// Errors are returned unchanged to the caller of the markup core.
    fn parse_expression<'src>(
        &mut self,
        state: &mut MarkupState,
        cursor: Cursor<'src>,
    ) -> Result<(Self::Expr, Cursor<'src>), ParseError>;
}

/// State shared by the markup core and the delegate for one parse.
#[derive(Debug, Clone, Default)]
pub struct MarkupState {
    modes: ModeMachine,
}

impl MarkupState {
    pub fn new(options: &ParseOptions) -> Self {
        Self {
            modes: ModeMachine::new(options.max_depth),
        }
    }

    pub fn modes(&self) -> &ModeMachine {
        &self.modes
    }

    pub(crate) fn modes_mut(&mut self) -> &mut ModeMachine {
        &mut self.modes
    }

    /// Charge one level of host-expression recursion against the nesting
    /// budget. Delegates call this on every recursive descent and pair it
    /// with [`exit_expression`](Self::exit_expression).
    pub fn enter_expression(&mut self, at: &Cursor<'_>) -> Result<(), ParseError> {
        self.modes.enter_expression(at)?;
        Ok(())
    }

    pub fn exit_expression(&mut self) {
        self.modes.exit_expression();
    }
}
