//! Human-readable tree dumps.
//!
//! Each node prints as `Type(` followed by one `key: value` line per field
//! and a closing `)`, nested values indented by four spaces. Lists print as
//! `array(` with `index: value` lines. With positions enabled every node
//! type is suffixed with `[startLine - endLine]`.
//!
//! ```
//! use jsxp_parser::{Document, NodeDumper};
//!
//! let doc = Document::parse("<br />").unwrap();
//! let dump = NodeDumper::new().dump(&doc.elements[0]);
//! assert!(dump.starts_with("JSX_Element(\n    name: br"));
//! assert!(dump.ends_with("closingName: null\n)"));
//! ```

use jsxp_lexer::Span;

use crate::ast::{Arg, ArrayItem, AttributeItem, Child, Element, Expr, ExprKind, Param};
use crate::Document;

/// Something the dumper can print.
pub trait Dump {
    fn dump_with(&self, dumper: &NodeDumper) -> String;
}

/// Tree printer.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeDumper {
    dump_positions: bool,
}

impl NodeDumper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Include `[startLine - endLine]` after each node type.
    pub fn with_positions(mut self, dump_positions: bool) -> Self {
        self.dump_positions = dump_positions;
        self
    }

    pub fn dump<N: Dump + ?Sized>(&self, node: &N) -> String {
        node.dump_with(self)
    }

    // --- Layout ---

    fn node(&self, kind: &str, span: Span, fields: &[(&str, String)]) -> String {
        let mut out = String::from(kind);
        if self.dump_positions {
            out.push_str(&format!("[{} - {}]", span.line, span.end_line));
        }
        out.push('(');
        for (key, value) in fields {
            out.push_str(&format!("\n    {key}: {}", indent(value)));
        }
        out.push_str("\n)");
        out
    }

    fn list<I>(&self, items: I) -> String
    where
        I: IntoIterator<Item = String>,
    {
        let mut out = String::from("array(");
        for (i, item) in items.into_iter().enumerate() {
            out.push_str(&format!("\n    {i}: {}", indent(&item)));
        }
        out.push_str("\n)");
        out
    }

    fn optional<N: Dump>(&self, node: Option<&N>) -> String {
        node.map_or_else(|| "null".to_string(), |n| n.dump_with(self))
    }

    /// A `Name` or `Identifier` wrapper around a bare string.
    fn named(&self, kind: &str, name: &str, span: Span) -> String {
        self.node(kind, span, &[("name", name.to_string())])
    }

    fn args(&self, args: &[Arg]) -> String {
        self.list(args.iter().map(|a| a.dump_with(self)))
    }
}

fn indent(value: &str) -> String {
    value.replace('\n', "\n    ")
}

fn flag(value: bool) -> String {
    value.to_string()
}

// ---------------------------------------------------------------------------
// Markup nodes
// ---------------------------------------------------------------------------

impl<E: Dump> Dump for Element<E> {
    fn dump_with(&self, d: &NodeDumper) -> String {
        d.node(
            "JSX_Element",
            self.span,
            &[
                ("name", self.name.clone()),
                ("jsxAttributes", d.list(self.attributes.iter().map(|a| a.dump_with(d)))),
                ("children", d.list(self.children.iter().map(|c| c.dump_with(d)))),
                (
                    "closingName",
                    self.closing_name.clone().unwrap_or_else(|| "null".to_string()),
                ),
            ],
        )
    }
}

impl<E: Dump> Dump for AttributeItem<E> {
    fn dump_with(&self, d: &NodeDumper) -> String {
        match self {
            AttributeItem::Attribute(attr) => d.node(
                "JSX_Attribute",
                attr.span,
                &[
                    ("name", attr.name.clone()),
                    ("value", attr.value.dump_with(d)),
                ],
            ),
            AttributeItem::Spread(spread) => d.node(
                "JSX_SpreadAttribute",
                spread.span,
                &[("expression", spread.expression.dump_with(d))],
            ),
        }
    }
}

impl<E: Dump> Dump for Child<E> {
    fn dump_with(&self, d: &NodeDumper) -> String {
        match self {
            Child::Element(el) => el.dump_with(d),
            Child::Text(text) => d.node("JSX_Text", text.span, &[("value", text.value.clone())]),
            Child::Expression(container) => d.node(
                "JSX_ExpressionContainer",
                container.span,
                &[("expression", container.expression.dump_with(d))],
            ),
            Child::Comment(comment) => {
                d.node("JSX_Comment", comment.span, &[("text", comment.text.clone())])
            }
        }
    }
}

impl Dump for Document {
    fn dump_with(&self, d: &NodeDumper) -> String {
        d.list(self.elements.iter().map(|e| e.dump_with(d)))
    }
}

// ---------------------------------------------------------------------------
// Host expressions
// ---------------------------------------------------------------------------

impl Dump for Expr {
    fn dump_with(&self, d: &NodeDumper) -> String {
        let span = self.span;
        match &self.kind {
            ExprKind::Variable(name) => d.node("Expr_Variable", span, &[("name", name.clone())]),
            ExprKind::ConstFetch(name) => d.node(
                "Expr_ConstFetch",
                span,
                &[("name", d.named("Name", name, span))],
            ),
            ExprKind::Name(name) => d.named("Name", name, span),
            ExprKind::String(value) => d.node("Scalar_String", span, &[("value", value.clone())]),
            ExprKind::Int(value) => d.node("Scalar_Int", span, &[("value", value.to_string())]),
            ExprKind::Float(value) => {
                d.node("Scalar_Float", span, &[("value", value.to_string())])
            }
            ExprKind::Array(items) => d.node(
                "Expr_Array",
                span,
                &[("items", d.list(items.iter().map(|i| i.dump_with(d))))],
            ),
            ExprKind::PropertyFetch {
                var,
                name,
                nullsafe,
            } => d.node(
                if *nullsafe {
                    "Expr_NullsafePropertyFetch"
                } else {
                    "Expr_PropertyFetch"
                },
                span,
                &[
                    ("var", var.dump_with(d)),
                    ("name", d.named("Identifier", name, span)),
                ],
            ),
            ExprKind::MethodCall {
                var,
                name,
                args,
                nullsafe,
            } => d.node(
                if *nullsafe {
                    "Expr_NullsafeMethodCall"
                } else {
                    "Expr_MethodCall"
                },
                span,
                &[
                    ("var", var.dump_with(d)),
                    ("name", d.named("Identifier", name, span)),
                    ("args", d.args(args)),
                ],
            ),
            ExprKind::StaticCall { class, name, args } => d.node(
                "Expr_StaticCall",
                span,
                &[
                    ("class", class.dump_with(d)),
                    ("name", d.named("Identifier", name, span)),
                    ("args", d.args(args)),
                ],
            ),
            ExprKind::ClassConstFetch { class, name } => d.node(
                "Expr_ClassConstFetch",
                span,
                &[
                    ("class", class.dump_with(d)),
                    ("name", d.named("Identifier", name, span)),
                ],
            ),
            ExprKind::FuncCall { callee, args } => d.node(
                "Expr_FuncCall",
                span,
                &[("name", callee.dump_with(d)), ("args", d.args(args))],
            ),
            ExprKind::ArrayDimFetch { var, dim } => d.node(
                "Expr_ArrayDimFetch",
                span,
                &[
                    ("var", var.dump_with(d)),
                    ("dim", d.optional(dim.as_deref())),
                ],
            ),
            ExprKind::BinaryOp { op, left, right } => d.node(
                &format!("Expr_BinaryOp_{}", op.name()),
                span,
                &[("left", left.dump_with(d)), ("right", right.dump_with(d))],
            ),
            ExprKind::BooleanNot(inner) => {
                d.node("Expr_BooleanNot", span, &[("expr", inner.dump_with(d))])
            }
            ExprKind::UnaryMinus(inner) => {
                d.node("Expr_UnaryMinus", span, &[("expr", inner.dump_with(d))])
            }
            ExprKind::Ternary {
                cond,
                if_true,
                if_false,
            } => d.node(
                "Expr_Ternary",
                span,
                &[
                    ("cond", cond.dump_with(d)),
                    ("if", d.optional(if_true.as_deref())),
                    ("else", if_false.dump_with(d)),
                ],
            ),
            ExprKind::Assign { var, expr } => d.node(
                "Expr_Assign",
                span,
                &[("var", var.dump_with(d)), ("expr", expr.dump_with(d))],
            ),
            ExprKind::ArrowFunction { params, body } => d.node(
                "Expr_ArrowFunction",
                span,
                &[
                    ("params", d.list(params.iter().map(|p| p.dump_with(d)))),
                    ("expr", body.dump_with(d)),
                ],
            ),
            ExprKind::Markup(element) => element.dump_with(d),
        }
    }
}

impl Dump for ArrayItem {
    fn dump_with(&self, d: &NodeDumper) -> String {
        d.node(
            "ArrayItem",
            self.span,
            &[
                ("key", d.optional(self.key.as_ref())),
                ("value", self.value.dump_with(d)),
                ("byRef", flag(false)),
                ("unpack", flag(self.unpack)),
            ],
        )
    }
}

impl Dump for Arg {
    fn dump_with(&self, d: &NodeDumper) -> String {
        d.node(
            "Arg",
            self.span,
            &[
                ("name", "null".to_string()),
                ("value", self.value.dump_with(d)),
                ("byRef", flag(false)),
                ("unpack", flag(self.unpack)),
            ],
        )
    }
}

impl Dump for Param {
    fn dump_with(&self, d: &NodeDumper) -> String {
        let var = d.node("Expr_Variable", self.span, &[("name", self.name.clone())]);
        d.node("Param", self.span, &[("var", var)])
    }
}
