//! Array-to-markup lowering.
//!
//! Rewrites host array literals of the shape
//! `['tag', ['attr' => value, ...$spread], child, child, ...]` into markup
//! elements. The first item must be a string (the tag name); the second, if
//! present, must be an array whose keyed items become attributes and whose
//! unkeyed items become spreads. Remaining items are children: strings
//! become text, lowerable arrays become nested elements, anything else
//! becomes an expression container.
//!
//! The pass is opt-in and runs over already-parsed expressions.

use jsxp_lexer::Span;

use crate::ast::{
    Arg, ArrayItem, Attribute, AttributeItem, Child, Element, Expr, ExprKind, ExpressionContainer,
    SpreadAttribute, Text,
};

/// Lower every markup-shaped array in `expr`, recursively.
pub fn lower_arrays(expr: Expr) -> Expr {
    let span = expr.span;
    let kind = match expr.kind {
        ExprKind::Array(items) => lower_array(items, span),
        ExprKind::PropertyFetch { var, name, nullsafe } => ExprKind::PropertyFetch {
            var: lower_box(var),
            name,
            nullsafe,
        },
        ExprKind::MethodCall {
            var,
            name,
            args,
            nullsafe,
        } => ExprKind::MethodCall {
            var: lower_box(var),
            name,
            args: lower_args(args),
            nullsafe,
        },
        ExprKind::StaticCall { class, name, args } => ExprKind::StaticCall {
            class,
            name,
            args: lower_args(args),
        },
        ExprKind::FuncCall { callee, args } => ExprKind::FuncCall {
            callee: lower_box(callee),
            args: lower_args(args),
        },
        ExprKind::ArrayDimFetch { var, dim } => ExprKind::ArrayDimFetch {
            var: lower_box(var),
            dim: dim.map(lower_box),
        },
        ExprKind::BinaryOp { op, left, right } => ExprKind::BinaryOp {
            op,
            left: lower_box(left),
            right: lower_box(right),
        },
        ExprKind::BooleanNot(inner) => ExprKind::BooleanNot(lower_box(inner)),
        ExprKind::UnaryMinus(inner) => ExprKind::UnaryMinus(lower_box(inner)),
        ExprKind::Ternary {
            cond,
            if_true,
            if_false,
        } => ExprKind::Ternary {
            cond: lower_box(cond),
            if_true: if_true.map(lower_box),
            if_false: lower_box(if_false),
        },
        ExprKind::Assign { var, expr } => ExprKind::Assign {
            var: lower_box(var),
            expr: lower_box(expr),
        },
        ExprKind::ArrowFunction { params, body } => ExprKind::ArrowFunction {
            params,
            body: lower_box(body),
        },
        ExprKind::Markup(element) => ExprKind::Markup(Box::new(lower_element(*element))),
        leaf => leaf,
    };
    Expr::new(kind, span)
}

/// Lower the host expressions held by an existing element.
pub fn lower_element(element: Element<Expr>) -> Element<Expr> {
    let attributes = element
        .attributes
        .into_iter()
        .map(|item| match item {
            AttributeItem::Attribute(attr) => AttributeItem::Attribute(Attribute {
                value: lower_arrays(attr.value),
                ..attr
            }),
            AttributeItem::Spread(spread) => AttributeItem::Spread(SpreadAttribute {
                expression: lower_arrays(spread.expression),
                ..spread
            }),
        })
        .collect();

    let children = element
        .children
        .into_iter()
        .map(|child| match child {
            Child::Element(el) => Child::Element(lower_element(el)),
            Child::Expression(container) => Child::Expression(ExpressionContainer {
                expression: lower_arrays(container.expression),
                ..container
            }),
            other => other,
        })
        .collect();

    Element {
        attributes,
        children,
        ..element
    }
}

/// Does this array literal have the `['tag', [attrs], ...children]` shape?
pub fn is_markup_array(items: &[ArrayItem]) -> bool {
    markup_shape(items).is_some()
}

/// Tag name and attribute keys of a markup-shaped array.
struct MarkupShape {
    name: String,
    /// One entry per attribute item: the key, or `None` for a spread.
    keys: Vec<Option<String>>,
}

fn markup_shape(items: &[ArrayItem]) -> Option<MarkupShape> {
    let first = items.first()?;
    let ExprKind::String(name) = &first.value.kind else {
        return None;
    };
    if first.unpack {
        return None;
    }

    let keys = match items.get(1) {
        None => Vec::new(),
        Some(second) => {
            let ExprKind::Array(attrs) = &second.value.kind else {
                return None;
            };
            attrs
                .iter()
                .map(|attr| match &attr.key {
                    None => Some(None),
                    Some(Expr {
                        kind: ExprKind::String(key),
                        ..
                    }) => Some(Some(key.clone())),
                    Some(_) => None,
                })
                .collect::<Option<Vec<_>>>()?
        }
    };

    Some(MarkupShape {
        name: name.clone(),
        keys,
    })
}

fn lower_array(items: Vec<ArrayItem>, span: Span) -> ExprKind {
    let Some(MarkupShape { name, keys }) = markup_shape(&items) else {
        return ExprKind::Array(items.into_iter().map(lower_item).collect());
    };

    // The tag name is already in `name`; the attribute array, if any, follows.
    let mut items = items.into_iter().skip(1);
    let mut attributes = Vec::new();
    if let Some(ExprKind::Array(attrs)) = items.next().map(|item| item.value.kind) {
        for (attr, key) in attrs.into_iter().zip(keys) {
            let value = lower_arrays(attr.value);
            attributes.push(match key {
                Some(name) => AttributeItem::Attribute(Attribute {
                    name,
                    value,
                    span: attr.span,
                }),
                None => AttributeItem::Spread(SpreadAttribute {
                    expression: value,
                    span: attr.span,
                }),
            });
        }
    }

    let children = items.filter_map(|item| lower_child(item.value)).collect();

    tracing::trace!(target: "jsxp::markup", name = %name, "lowered array to element");
    ExprKind::Markup(Box::new(Element {
        closing_name: Some(name.clone()),
        name,
        attributes,
        children,
        span,
    }))
}

fn lower_child(value: Expr) -> Option<Child<Expr>> {
    let span = value.span;
    match value.kind {
        ExprKind::String(text) if text.is_empty() => None,
        ExprKind::String(text) => Some(Child::Text(Text { value: text, span })),
        _ => match lower_arrays(value) {
            Expr {
                kind: ExprKind::Markup(element),
                ..
            } => Some(Child::Element(*element)),
            expression => Some(Child::Expression(ExpressionContainer { expression, span })),
        },
    }
}

fn lower_item(item: ArrayItem) -> ArrayItem {
    ArrayItem {
        key: item.key.map(lower_arrays),
        value: lower_arrays(item.value),
        ..item
    }
}

fn lower_args(args: Vec<Arg>) -> Vec<Arg> {
    args.into_iter()
        .map(|arg| Arg {
            value: lower_arrays(arg.value),
            ..arg
        })
        .collect()
}

fn lower_box(expr: Box<Expr>) -> Box<Expr> {
    Box::new(lower_arrays(*expr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExprParser;
    use pretty_assertions::assert_eq;

    fn lower(source: &str) -> Expr {
        lower_arrays(ExprParser::parse(source).unwrap())
    }

    fn element(expr: &Expr) -> &Element<Expr> {
        match &expr.kind {
            ExprKind::Markup(el) => el,
            other => panic!("expected markup, got {other:?}"),
        }
    }

    #[test]
    fn test_tag_only() {
        let e = lower("['br']");
        let el = element(&e);
        assert_eq!(el.name, "br");
        assert_eq!(el.closing_name.as_deref(), Some("br"));
        assert!(el.attributes.is_empty());
    }

    #[test]
    fn test_attributes_and_spreads() {
        let e = lower("['div', ['class' => 'box', $props, 'id' => $id]]");
        let el = element(&e);
        assert_eq!(el.attributes.len(), 3);
        assert!(matches!(&el.attributes[0], AttributeItem::Attribute(a) if a.name == "class"));
        assert!(matches!(&el.attributes[1], AttributeItem::Spread(_)));
        assert_eq!(
            el.attribute("id").map(|a| &a.value.kind),
            Some(&ExprKind::Variable("id".into()))
        );
    }

    #[test]
    fn test_children() {
        let e = lower("['ul', [], ['li', [], 'One'], 'text', $x]");
        let el = element(&e);
        assert_eq!(el.children.len(), 3);
        match &el.children[0] {
            Child::Element(li) => {
                assert_eq!(li.name, "li");
                assert!(matches!(&li.children[0], Child::Text(t) if t.value == "One"));
            }
            other => panic!("expected element, got {other:?}"),
        }
        assert!(matches!(&el.children[1], Child::Text(t) if t.value == "text"));
        assert!(matches!(&el.children[2], Child::Expression(_)));
    }

    #[test]
    fn test_non_markup_arrays_untouched() {
        assert!(matches!(lower("[1, 2]").kind, ExprKind::Array(_)));
        assert!(matches!(lower("['a', 'b']").kind, ExprKind::Array(_)));
        assert!(matches!(lower("[]").kind, ExprKind::Array(_)));
        assert!(matches!(lower("['a', [1 => 'x']]").kind, ExprKind::Array(_)));
    }

    #[test]
    fn test_mixed_key_types_left_untouched() {
        let e = lower("['div', ['class' => 'box', 2 => 'x', $rest]]");
        let ExprKind::Array(items) = &e.kind else {
            panic!("expected array, got {:?}", e.kind);
        };
        let ExprKind::Array(attrs) = &items[1].value.kind else {
            panic!("expected attribute array");
        };
        assert_eq!(attrs.len(), 3);
        assert_eq!(attrs[1].key.as_ref().map(|k| &k.kind), Some(&ExprKind::Int(2)));
    }

    #[test]
    fn test_every_attribute_item_kept() {
        let e = lower("['a', [$first, 'href' => '/', ...$more, 'id' => 'x']]");
        let el = element(&e);
        assert_eq!(el.attributes.len(), 4);
        assert!(matches!(&el.attributes[0], AttributeItem::Spread(_)));
        assert!(matches!(&el.attributes[1], AttributeItem::Attribute(a) if a.name == "href"));
        assert!(matches!(&el.attributes[2], AttributeItem::Spread(_)));
        assert!(matches!(&el.attributes[3], AttributeItem::Attribute(a) if a.name == "id"));
    }

    #[test]
    fn test_nested_inside_call() {
        let e = lower("render(['p', [], 'hi'])");
        let ExprKind::FuncCall { args, .. } = &e.kind else {
            panic!("expected call");
        };
        assert_eq!(element(&args[0].value).name, "p");
    }

    #[test]
    fn test_non_lowerable_child_array_kept_as_expression() {
        let e = lower("['div', [], [1, 2]]");
        let el = element(&e);
        assert!(matches!(
            &el.children[0],
            Child::Expression(c) if matches!(c.expression.kind, ExprKind::Array(_))
        ));
    }

    #[test]
    fn test_lowering_inside_markup_holes() {
        let e = lower("<div>{['b', [], 'bold']}</div>");
        let el = element(&e);
        let Child::Expression(container) = &el.children[0] else {
            panic!("expected expression container");
        };
        assert_eq!(element(&container.expression).name, "b");
    }
}
