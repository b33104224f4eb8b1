//! Scanning-mode state machine.
//!
//! Markup switches tokenization rules mid-stream. The machine keeps a stack
//! of [`Mode`] frames with `HostCode` at the bottom: opening a tag pushes a
//! `TagHeader`, `>` turns it into `TagContent`, `{` pushes an
//! `ExpressionHole`. A host expression inside a hole may itself contain
//! markup, in which case a fresh `TagHeader` is pushed above the hole and
//! control returns to the hole once that element closes.
//!
//! Host expressions parsed inside holes recurse as well, so the delegate
//! charges each nested expression level against the same budget as open
//! tags. One `max_depth` therefore bounds the whole recursion, whichever way
//! it nests.
//!
//! Every transition is traced under the `jsxp::mode` target. The trace is
//! observational only.

use serde::Serialize;

use crate::cursor::Cursor;
use crate::LexerError;

/// Default bound on open tags plus nested host expressions. Markup nested
/// through expression holes charges about two units per level.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// The mode an expression hole hands control back to when its `}` is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReturnMode {
    TagHeader,
    TagContent,
}

/// Current scanning mode. `depth` counts unmatched open tags since the
/// outermost markup start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mode {
    HostCode,
    TagHeader { depth: usize },
    TagContent { depth: usize },
    ExpressionHole { depth: usize, return_to: ReturnMode },
}

impl Mode {
    pub fn depth(&self) -> usize {
        match *self {
            Mode::HostCode => 0,
            Mode::TagHeader { depth }
            | Mode::TagContent { depth }
            | Mode::ExpressionHole { depth, .. } => depth,
        }
    }
}

/// Mode stack threaded by exclusive reference through every assembler call.
#[derive(Debug, Clone)]
pub struct ModeMachine {
    stack: Vec<Mode>,
    expressions: usize,
    max_depth: usize,
}

impl Default for ModeMachine {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl ModeMachine {
    pub fn new(max_depth: usize) -> Self {
        Self {
            stack: vec![Mode::HostCode],
            expressions: 0,
            max_depth,
        }
    }

    /// The innermost active mode.
    pub fn mode(&self) -> Mode {
        self.stack.last().copied().unwrap_or(Mode::HostCode)
    }

    /// Number of currently open tags, across re-entered expression holes.
    pub fn depth(&self) -> usize {
        self.mode().depth()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Open tags plus nested host expressions: the amount charged against
    /// `max_depth`.
    pub fn nesting(&self) -> usize {
        self.depth() + self.expressions
    }

    /// Number of stacked frames above `HostCode`.
    pub fn frames(&self) -> usize {
        self.stack.len() - 1
    }

    /// `HostCode | TagContent | ExpressionHole → TagHeader`, depth + 1.
    pub fn open_tag(&mut self, at: &Cursor<'_>) -> Result<usize, LexerError> {
        let current = self.mode();
        if matches!(current, Mode::TagHeader { .. }) {
            return Err(self.invalid("open a tag", at));
        }

        let depth = current.depth() + 1;
        if depth + self.expressions > self.max_depth {
            return Err(LexerError::at(
                at,
                format!(
                    "Maximum markup nesting depth of {} exceeded",
                    self.max_depth
                ),
            ));
        }

        self.push(Mode::TagHeader { depth });
        Ok(depth)
    }

    /// `TagHeader → TagContent` on a plain `>`.
    pub fn enter_content(&mut self, at: &Cursor<'_>) -> Result<(), LexerError> {
        match self.mode() {
            Mode::TagHeader { depth } => {
                self.replace(Mode::TagContent { depth });
                Ok(())
            }
            _ => Err(self.invalid("enter tag content", at)),
        }
    }

    /// `TagHeader → enclosing mode` on `/>`.
    pub fn self_close(&mut self, at: &Cursor<'_>) -> Result<Mode, LexerError> {
        match self.mode() {
            Mode::TagHeader { .. } => Ok(self.pop()),
            _ => Err(self.invalid("self-close a tag", at)),
        }
    }

    /// `TagContent → enclosing mode` once a closing tag has matched.
    pub fn close_tag(&mut self, at: &Cursor<'_>) -> Result<Mode, LexerError> {
        match self.mode() {
            Mode::TagContent { .. } => Ok(self.pop()),
            _ => Err(self.invalid("close a tag", at)),
        }
    }

    /// `TagHeader | TagContent → ExpressionHole` on `{`.
    pub fn enter_hole(&mut self, at: &Cursor<'_>) -> Result<(), LexerError> {
        let (depth, return_to) = match self.mode() {
            Mode::TagHeader { depth } => (depth, ReturnMode::TagHeader),
            Mode::TagContent { depth } => (depth, ReturnMode::TagContent),
            _ => return Err(self.invalid("open an expression hole", at)),
        };
        self.push(Mode::ExpressionHole { depth, return_to });
        Ok(())
    }

    /// `ExpressionHole → returnMode` on the hole's balancing `}`.
    pub fn exit_hole(&mut self, at: &Cursor<'_>) -> Result<Mode, LexerError> {
        let Mode::ExpressionHole { return_to, .. } = self.mode() else {
            return Err(self.invalid("close an expression hole", at));
        };

        let restored = self.pop();
        let consistent = matches!(
            (return_to, restored),
            (ReturnMode::TagHeader, Mode::TagHeader { .. })
                | (ReturnMode::TagContent, Mode::TagContent { .. })
        );
        if !consistent {
            return Err(self.invalid("return from an expression hole", at));
        }
        Ok(restored)
    }

    /// Charge one nested host expression level.
    pub fn enter_expression(&mut self, at: &Cursor<'_>) -> Result<(), LexerError> {
        if self.nesting() + 1 > self.max_depth {
            return Err(LexerError::at(
                at,
                format!(
                    "Maximum expression nesting depth of {} exceeded",
                    self.max_depth
                ),
            ));
        }
        self.expressions += 1;
        Ok(())
    }

    /// Release the level taken by [`enter_expression`](Self::enter_expression).
    pub fn exit_expression(&mut self) {
        self.expressions = self.expressions.saturating_sub(1);
    }

    fn push(&mut self, next: Mode) {
        tracing::trace!(target: "jsxp::mode", from = ?self.mode(), to = ?next, "push");
        self.stack.push(next);
    }

    fn replace(&mut self, next: Mode) {
        tracing::trace!(target: "jsxp::mode", from = ?self.mode(), to = ?next, "replace");
        if let Some(top) = self.stack.last_mut() {
            *top = next;
        }
    }

    fn pop(&mut self) -> Mode {
        // HostCode is never popped; callers check the top frame first.
        if self.stack.len() > 1 {
            let from = self.stack.pop();
            tracing::trace!(target: "jsxp::mode", from = ?from, to = ?self.mode(), "pop");
        }
        self.mode()
    }

    fn invalid(&self, action: &str, at: &Cursor<'_>) -> LexerError {
        LexerError::at(
            at,
            format!("Cannot {action} while in {:?} mode", self.mode()),
        )
    }
}
