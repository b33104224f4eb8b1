//! Abstract Syntax Tree for embedded markup.
//!
//! Markup nodes are generic over the host expression type `E` so the markup
//! core never depends on a particular host grammar. Expression-level nodes
//! for the bundled PHP-flavoured grammar live in the second half of this
//! file; [`ExprKind::Markup`] closes the loop so markup can appear anywhere
//! an expression can.

use jsxp_lexer::Span;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Markup-level AST
// ---------------------------------------------------------------------------

/// An element or fragment.
///
/// Fragments have an empty `name`. `closing_name` is `None` for
/// self-closing elements and otherwise equals `name`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element<E> {
    pub name: String,
    pub attributes: Vec<AttributeItem<E>>,
    pub children: Vec<Child<E>>,
    pub closing_name: Option<String>,
    pub span: Span,
}

/// Opening and closing tag names differ.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("JSX element has mismatched opening and closing tags: '<{opening}>' and '</{closing}>'")]
pub struct TagMismatch {
    pub opening: String,
    pub closing: String,
}

impl<E> Element<E> {
    /// Build an element that has a closing tag (or a fragment).
    pub fn new(
        name: impl Into<String>,
        attributes: Vec<AttributeItem<E>>,
        children: Vec<Child<E>>,
        closing_name: impl Into<String>,
        span: Span,
    ) -> Result<Self, TagMismatch> {
        let name = name.into();
        let closing_name = closing_name.into();
        if closing_name != name {
            return Err(TagMismatch {
                opening: name,
                closing: closing_name,
            });
        }

        Ok(Self {
            name,
            attributes,
            children,
            closing_name: Some(closing_name),
            span,
        })
    }

    /// Build a `<name ... />` element. Self-closing elements have no children.
    pub fn self_closing(name: impl Into<String>, attributes: Vec<AttributeItem<E>>, span: Span) -> Self {
        Self {
            name: name.into(),
            attributes,
            children: Vec::new(),
            closing_name: None,
            span,
        }
    }

    pub fn is_fragment(&self) -> bool {
        self.name.is_empty()
    }

    pub fn is_self_closing(&self) -> bool {
        self.closing_name.is_none()
    }

    /// Look up a plain (non-spread) attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute<E>> {
        self.attributes.iter().find_map(|item| match item {
            AttributeItem::Attribute(attr) if attr.name == name => Some(attr),
            _ => None,
        })
    }
}

/// One entry of an element's attribute list, in source order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AttributeItem<E> {
    Attribute(Attribute<E>),
    Spread(SpreadAttribute<E>),
}

/// `name="value"`, `name={expr}` or bare `name` (value is the host's `true`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute<E> {
    pub name: String,
    pub value: E,
    pub span: Span,
}

/// `{...expr}` in a tag header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpreadAttribute<E> {
    pub expression: E,
    pub span: Span,
}

/// Element content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Child<E> {
    Element(Element<E>),
    Text(Text),
    Expression(ExpressionContainer<E>),
    Comment(Comment),
}

/// Normalized literal text. Never empty, never whitespace-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Text {
    pub value: String,
    pub span: Span,
}

/// `{expr}` in content. An empty `{}` holds the host's `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpressionContainer<E> {
    pub expression: E,
    pub span: Span,
}

/// `{/* ... */}` in content, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub text: String,
    pub span: Span,
}

// ---------------------------------------------------------------------------
// Expression-level AST (PHP-flavoured host grammar)
// ---------------------------------------------------------------------------

/// A host expression node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Is this a fetch of the named constant (case-insensitive)?
    pub fn is_const(&self, name: &str) -> bool {
        matches!(&self.kind, ExprKind::ConstFetch(n) if n.eq_ignore_ascii_case(name))
    }
}

/// Expression variants.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ExprKind {
    /// `$name` (stored without the `$`)
    Variable(String),

    /// Bare name used as a value: `true`, `null`, `PHP_EOL`
    ConstFetch(String),

    /// Bare name in callee or class position: `strtoupper(...)`, `Foo::bar()`
    Name(String),

    /// `'text'`, `"text"`
    String(String),

    Int(i64),

    Float(f64),

    /// `[1, 'k' => $v, ...$rest]`, `array(...)`
    Array(Vec<ArrayItem>),

    /// `$user->name`, `$user?->name`
    PropertyFetch {
        var: Box<Expr>,
        name: String,
        nullsafe: bool,
    },

    /// `$user->greet($x)`, `$user?->greet()`
    MethodCall {
        var: Box<Expr>,
        name: String,
        args: Vec<Arg>,
        nullsafe: bool,
    },

    /// `Foo::bar($x)`
    StaticCall {
        class: Box<Expr>,
        name: String,
        args: Vec<Arg>,
    },

    /// `Foo::BAR`, `Foo::class`
    ClassConstFetch { class: Box<Expr>, name: String },

    /// `count($xs)`, `$callback()`
    FuncCall { callee: Box<Expr>, args: Vec<Arg> },

    /// `$items[0]`, `$items[]`
    ArrayDimFetch {
        var: Box<Expr>,
        dim: Option<Box<Expr>>,
    },

    BinaryOp {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// `!$flag`
    BooleanNot(Box<Expr>),

    /// `-$n`
    UnaryMinus(Box<Expr>),

    /// `$a ? $b : $c`; `if_true` is `None` for the short form `$a ?: $c`
    Ternary {
        cond: Box<Expr>,
        if_true: Option<Box<Expr>>,
        if_false: Box<Expr>,
    },

    /// `$var = expr`
    Assign { var: Box<Expr>, expr: Box<Expr> },

    /// `fn($x) => expr`
    ArrowFunction { params: Vec<Param>, body: Box<Expr> },

    /// A markup literal in expression position.
    Markup(Box<Element<Expr>>),
}

/// An item of an array literal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrayItem {
    pub key: Option<Expr>,
    pub value: Expr,
    pub unpack: bool,
    pub span: Span,
}

/// A call argument.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Arg {
    pub value: Expr,
    pub unpack: bool,
    pub span: Span,
}

/// An arrow-function parameter (`$x`, stored without the `$`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Param {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    Concat,
    Plus,
    Minus,
    Mul,
    Div,
    Mod,
    Equal,
    NotEqual,
    Identical,
    NotIdentical,
    Smaller,
    SmallerOrEqual,
    Greater,
    GreaterOrEqual,
    BooleanAnd,
    BooleanOr,
    LogicalAnd,
    LogicalOr,
    LogicalXor,
    Coalesce,
}

impl BinaryOp {
    /// Node-type suffix used by the dumper: `Expr_BinaryOp_{name}`.
    pub fn name(self) -> &'static str {
        match self {
            BinaryOp::Concat => "Concat",
            BinaryOp::Plus => "Plus",
            BinaryOp::Minus => "Minus",
            BinaryOp::Mul => "Mul",
            BinaryOp::Div => "Div",
            BinaryOp::Mod => "Mod",
            BinaryOp::Equal => "Equal",
            BinaryOp::NotEqual => "NotEqual",
            BinaryOp::Identical => "Identical",
            BinaryOp::NotIdentical => "NotIdentical",
            BinaryOp::Smaller => "Smaller",
            BinaryOp::SmallerOrEqual => "SmallerOrEqual",
            BinaryOp::Greater => "Greater",
            BinaryOp::GreaterOrEqual => "GreaterOrEqual",
            BinaryOp::BooleanAnd => "BooleanAnd",
            BinaryOp::BooleanOr => "BooleanOr",
            BinaryOp::LogicalAnd => "LogicalAnd",
            BinaryOp::LogicalOr => "LogicalOr",
            BinaryOp::LogicalXor => "LogicalXor",
            BinaryOp::Coalesce => "Coalesce",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_element_new_accepts_matching_names() {
        let el: Element<Expr> = Element::new("div", vec![], vec![], "div", Span::default()).unwrap();
        assert_eq!(el.closing_name.as_deref(), Some("div"));
        assert!(!el.is_fragment());
        assert!(!el.is_self_closing());
    }

    #[test]
    fn test_element_new_rejects_mismatch() {
        let err = Element::<Expr>::new("div", vec![], vec![], "span", Span::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "JSX element has mismatched opening and closing tags: '<div>' and '</span>'"
        );
    }

    #[test]
    fn test_fragment() {
        let el: Element<Expr> = Element::new("", vec![], vec![], "", Span::default()).unwrap();
        assert!(el.is_fragment());
        assert_eq!(el.closing_name.as_deref(), Some(""));
    }

    #[test]
    fn test_self_closing_has_no_closing_name() {
        let el: Element<Expr> = Element::self_closing("br", vec![], Span::default());
        assert!(el.is_self_closing());
        assert!(el.children.is_empty());
    }

    #[test]
    fn test_is_const_case_insensitive() {
        let e = Expr::new(ExprKind::ConstFetch("TRUE".into()), Span::default());
        assert!(e.is_const("true"));
        assert!(!e.is_const("null"));
    }
}
