//! Whole-source entry point.

use jsxp_lexer::Scanner;
use serde::Serialize;

use crate::ast::{Element, Expr};
use crate::delegate::MarkupState;
use crate::expr_parser::HostParser;
use crate::markup;
use crate::{ParseError, ParseOptions};

/// Every top-level markup region of a host source file, in source order.
///
/// Markup nested inside another region's expression holes is reachable
/// through that region's tree and is not listed separately.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub elements: Vec<Element<Expr>>,
}

impl Document {
    /// Parse source code with default options.
    pub fn parse(source: &str) -> Result<Document, ParseError> {
        Self::parse_with(source, &ParseOptions::default())
    }

    /// Parse source code. The first error aborts the whole parse.
    pub fn parse_with(source: &str, options: &ParseOptions) -> Result<Document, ParseError> {
        let mut scanner = Scanner::new(source);
        let mut state = MarkupState::new(options);
        let mut elements = Vec::new();

        while let Some(start) = scanner.next_markup_start()? {
            let (element, end) = markup::parse_element(&mut state, start, &mut HostParser)?;
            elements.push(element);
            scanner.resume_after_markup(end);
        }

        tracing::debug!(target: "jsxp::markup", regions = elements.len(), "document parsed");
        Ok(Document { elements })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AttributeItem, BinaryOp, Child, ExprKind};
    use crate::ParseErrorKind;
    use jsxp_lexer::{Cursor, DEFAULT_MAX_DEPTH};
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> Document {
        Document::parse(source).unwrap()
    }

    fn first(doc: &Document) -> &Element<Expr> {
        &doc.elements[0]
    }

    /// Parse one element directly, returning the state it leaves behind.
    fn parse_tracked(source: &str) -> (Element<Expr>, MarkupState) {
        let mut state = MarkupState::new(&ParseOptions::default());
        let (element, end) =
            markup::parse_element(&mut state, Cursor::new(source), &mut HostParser).unwrap();
        assert!(end.is_at_end());
        (element, state)
    }

    fn assert_settled(state: &MarkupState) {
        assert_eq!(state.modes().frames(), 0);
        assert_eq!(state.modes().nesting(), 0);
    }

    fn markup(expr: &Expr) -> &Element<Expr> {
        match &expr.kind {
            ExprKind::Markup(el) => el,
            other => panic!("expected markup, got {other:?}"),
        }
    }

    fn nested_holes(levels: usize) -> String {
        format!("{}{}", "<a>{".repeat(levels), "}</a>".repeat(levels))
    }

    fn text(child: &Child<Expr>) -> &str {
        match child {
            Child::Text(t) => &t.value,
            other => panic!("expected text, got {other:?}"),
        }
    }

    // =========================================================================
    // Basic elements
    // =========================================================================

    #[test]
    fn test_empty_document() {
        assert!(parse("<?php echo 1 < 2;").elements.is_empty());
    }

    #[test]
    fn test_simple_element() {
        let doc = parse("<?php $el = <div>Hello World</div>;");
        let div = first(&doc);
        assert_eq!(div.name, "div");
        assert!(div.attributes.is_empty());
        assert_eq!(div.children.len(), 1);
        assert_eq!(text(&div.children[0]), "Hello World");
        assert_eq!(div.closing_name.as_deref(), Some("div"));
    }

    #[test]
    fn test_attributes_in_order() {
        let doc = parse(r#"<?php $el = <div class="container" id={$id}>Content</div>;"#);
        let div = first(&doc);
        let names: Vec<_> = div
            .attributes
            .iter()
            .map(|a| match a {
                AttributeItem::Attribute(a) => a.name.as_str(),
                AttributeItem::Spread(_) => "...",
            })
            .collect();
        assert_eq!(names, vec!["class", "id"]);
        assert_eq!(
            div.attribute("id").map(|a| &a.value.kind),
            Some(&ExprKind::Variable("id".into()))
        );
    }

    #[test]
    fn test_self_closing_with_boolean() {
        let doc = parse(r#"<?php $el = <input type="text" value={$value} disabled />;"#);
        let input = first(&doc);
        assert!(input.is_self_closing());
        assert!(input.children.is_empty());
        assert_eq!(input.attributes.len(), 3);
        assert!(input.attribute("disabled").unwrap().value.is_const("true"));
    }

    #[test]
    fn test_self_closing_br() {
        let doc = parse("<?php $x = <br />;");
        assert_eq!(first(&doc).name, "br");
        assert_eq!(first(&doc).closing_name, None);
    }

    #[test]
    fn test_fragment() {
        let doc = parse("<?php $x = <><div>A</div><div>B</div></>;");
        let fragment = first(&doc);
        assert!(fragment.is_fragment());
        assert_eq!(fragment.closing_name.as_deref(), Some(""));
        assert_eq!(fragment.children.len(), 2);
    }

    #[test]
    fn test_dotted_names() {
        let doc = parse("<?php $x = <Foo.Bar.Baz>Content</Foo.Bar.Baz>;");
        assert_eq!(first(&doc).name, "Foo.Bar.Baz");
        assert_eq!(first(&doc).closing_name.as_deref(), Some("Foo.Bar.Baz"));
    }

    #[test]
    fn test_nested_markup_in_hole() {
        let doc = parse("<?php $x = <div>{$show ? <span>Visible</span> : null}</div>;");
        let div = first(&doc);
        let Child::Expression(container) = &div.children[0] else {
            panic!("expected expression container");
        };
        let ExprKind::Ternary { if_true: Some(if_true), .. } = &container.expression.kind else {
            panic!("expected ternary");
        };
        assert!(matches!(&if_true.kind, ExprKind::Markup(el) if el.name == "span"));
    }

    #[test]
    fn test_markup_returned_from_function() {
        let src = "<?php\nfunction render($items) {\n    return <ul>{array_map(fn($i) => <li>{$i}</li>, $items)}</ul>;\n}\n";
        let doc = parse(src);
        assert_eq!(doc.elements.len(), 1);
        assert_eq!(first(&doc).name, "ul");
    }

    #[test]
    fn test_multiple_regions_in_order() {
        let doc = parse("<?php\n$a = <div>First</div>;\n$b = $c ? <span/> : <em/>;");
        let names: Vec<_> = doc.elements.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["div", "span", "em"]);
    }

    #[test]
    fn test_markup_in_string_ignored() {
        let doc = parse("<?php\nclass App {\n    private $foo = '<div>Hi</div>';\n    public function render() {\n        return (\n            <div>{$this->foo}</div>\n        );\n    }\n}");
        assert_eq!(doc.elements.len(), 1);
        let div = first(&doc);
        assert_eq!((div.span.line, div.span.end_line), (6, 6));
        assert!(matches!(
            &div.children[0],
            Child::Expression(c) if matches!(c.expression.kind, ExprKind::PropertyFetch { .. })
        ));
    }

    #[test]
    fn test_parentheses_in_text() {
        let doc = parse("<?php $x = <p>Hello (world); and (more)</p>;");
        assert_eq!(text(&first(&doc).children[0]), "Hello (world); and (more)");
    }

    #[test]
    fn test_multiline_markup_positions() {
        let doc = parse("<?php\n$x = (\n    <div>\n        <span>Hi</span>\n    </div>\n);");
        let div = first(&doc);
        assert_eq!((div.span.line, div.span.end_line), (3, 5));
        assert_eq!(div.children.len(), 1);
    }

    // =========================================================================
    // Markup at start of file
    // =========================================================================

    #[test]
    fn test_plain_element_at_start_of_file() {
        let doc = parse("<div>Hello World</div>");
        let div = first(&doc);
        assert_eq!(div.name, "div");
        assert_eq!(text(&div.children[0]), "Hello World");
        assert_eq!(div.closing_name.as_deref(), Some("div"));
    }

    #[test]
    fn test_input_with_required() {
        let doc = parse(r#"<input type="email" required/>"#);
        let input = first(&doc);
        assert_eq!(input.closing_name, None);
        assert_eq!(
            input.attribute("type").map(|a| &a.value.kind),
            Some(&ExprKind::String("email".into()))
        );
        assert!(input.attribute("required").unwrap().value.is_const("true"));
    }

    #[test]
    fn test_dotted_self_closing() {
        let doc = parse(r#"<Form.Input type="text" />"#);
        assert_eq!(first(&doc).name, "Form.Input");
        assert_eq!(first(&doc).closing_name, None);
    }

    #[test]
    fn test_empty_hole_is_null() {
        let doc = parse("<div>{}</div>");
        let div = first(&doc);
        assert_eq!(div.children.len(), 1);
        assert!(matches!(&div.children[0], Child::Expression(c) if c.expression.is_const("null")));
    }

    #[test]
    fn test_whitespace_only_hole_is_null() {
        let doc = parse("<div>{  \n }</div>");
        assert!(matches!(
            &first(&doc).children[0],
            Child::Expression(c) if c.expression.is_const("null")
        ));
    }

    #[test]
    fn test_empty_attribute_value_is_null() {
        let doc = parse("<?php $x = <div title={}>Content</div>;");
        let div = first(&doc);
        assert!(div.attribute("title").unwrap().value.is_const("null"));
        assert_eq!(text(&div.children[0]), "Content");

        let doc = parse("<input value={  } />");
        assert!(first(&doc).attribute("value").unwrap().value.is_const("null"));
    }

    // =========================================================================
    // Markup inside tag-header holes
    // =========================================================================

    #[test]
    fn test_markup_as_attribute_value() {
        let (a, state) = parse_tracked(r#"<a b={<c x="1"/>} d="1"/>"#);
        assert_settled(&state);
        assert!(a.is_self_closing());
        assert_eq!(a.attributes.len(), 2);

        let c = markup(&a.attribute("b").unwrap().value);
        assert_eq!(c.name, "c");
        assert!(c.is_self_closing());
        assert_eq!(
            c.attribute("x").map(|x| &x.value.kind),
            Some(&ExprKind::String("1".into()))
        );
        assert_eq!(
            a.attribute("d").map(|d| &d.value.kind),
            Some(&ExprKind::String("1".into()))
        );
    }

    #[test]
    fn test_markup_inside_spread_operand() {
        let (a, state) = parse_tracked("<a {...[$x ? <i/> : null]}>t</a>");
        assert_settled(&state);

        let AttributeItem::Spread(spread) = &a.attributes[0] else {
            panic!("expected spread");
        };
        let ExprKind::Array(items) = &spread.expression.kind else {
            panic!("expected array");
        };
        assert_eq!(items.len(), 1);
        let ExprKind::Ternary { if_true: Some(if_true), if_false, .. } = &items[0].value.kind
        else {
            panic!("expected ternary");
        };
        assert_eq!(markup(if_true).name, "i");
        assert!(if_false.is_const("null"));

        assert_eq!(a.children.len(), 1);
        assert_eq!(text(&a.children[0]), "t");
        assert_eq!(a.closing_name.as_deref(), Some("a"));
    }

    #[test]
    fn test_markup_in_logical_and_arm() {
        let (div, state) = parse_tracked("<div>{$ok && <span>Hi</span>}</div>");
        assert_settled(&state);

        let Child::Expression(container) = &div.children[0] else {
            panic!("expected expression container");
        };
        let ExprKind::BinaryOp { op, left, right } = &container.expression.kind else {
            panic!("expected binary op");
        };
        assert_eq!(*op, BinaryOp::BooleanAnd);
        assert_eq!(left.kind, ExprKind::Variable("ok".into()));
        let span = markup(right);
        assert_eq!(span.name, "span");
        assert_eq!(text(&span.children[0]), "Hi");
    }

    // =========================================================================
    // Nesting budget
    // =========================================================================

    #[test]
    fn test_hole_nesting_at_default_limit() {
        // Each level charges one tag and one hole expression.
        let levels = DEFAULT_MAX_DEPTH / 2;
        let doc = parse(&nested_holes(levels));

        let mut el = first(&doc);
        let mut depth = 1;
        while let Some(Child::Expression(c)) = el.children.first() {
            let ExprKind::Markup(inner) = &c.expression.kind else {
                break;
            };
            el = &**inner;
            depth += 1;
        }
        assert_eq!(depth, levels);

        let err = Document::parse(&nested_holes(levels + 1)).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Structural);
        assert_eq!(
            err.message,
            format!("Maximum markup nesting depth of {DEFAULT_MAX_DEPTH} exceeded")
        );
    }

    #[test]
    fn test_deep_hole_nesting_fails_cleanly() {
        let err = Document::parse(&nested_holes(250)).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Structural);
        assert!(err.message.starts_with("Maximum markup nesting depth"));
    }

    #[test]
    fn test_deep_parentheses_in_hole_fail_cleanly() {
        let src = format!("<div>{{{}$x{}}}</div>", "(".repeat(100_000), ")".repeat(100_000));
        let err = Document::parse(&src).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Structural);
        assert_eq!(
            err.message,
            format!("Maximum expression nesting depth of {DEFAULT_MAX_DEPTH} exceeded")
        );
    }

    #[test]
    fn test_plain_nesting_at_default_limit() {
        let src = format!("{}{}", "<a>".repeat(DEFAULT_MAX_DEPTH), "</a>".repeat(DEFAULT_MAX_DEPTH));
        assert!(Document::parse(&src).is_ok());
    }

    // =========================================================================
    // Errors
    // =========================================================================

    #[test]
    fn test_mismatch_at_start_of_file() {
        let err = Document::parse("<div>Content</span>").unwrap_err();
        assert_eq!(
            err.message,
            "JSX element has mismatched opening and closing tags: '<div>' and '</span>'"
        );
    }

    #[test]
    fn test_tag_matching_is_case_sensitive() {
        let err = Document::parse("<div>x</DIV>").unwrap_err();
        assert_eq!(
            err.message,
            "JSX element has mismatched opening and closing tags: '<div>' and '</DIV>'"
        );
    }

    #[test]
    fn test_invalid_attribute_on_self_closing() {
        let err = Document::parse(r#"<div 123attr="value" />"#).unwrap_err();
        assert_eq!(
            err.message,
            "Invalid attribute name '123attr': attribute names cannot start with a number"
        );
    }

    #[test]
    fn test_invalid_attribute_deep_in_content() {
        let err = Document::parse(r#"<a><b>{$x ? <c><d 9x="1"/></c> : null}</b></a>"#).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Validation);
        assert!(err.message.starts_with("Invalid attribute name '9x'"));
    }

    #[test]
    fn test_mismatched_tags() {
        let err = Document::parse("<?php $x = <div>Content</span>;").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Validation);
        assert_eq!(
            err.message,
            "JSX element has mismatched opening and closing tags: '<div>' and '</span>'"
        );
    }

    #[test]
    fn test_nested_mismatch_reports_innermost() {
        let err = Document::parse("<?php $x = <div><span>Hello</p></div>;").unwrap_err();
        assert_eq!(
            err.message,
            "JSX element has mismatched opening and closing tags: '<span>' and '</p>'"
        );
    }

    #[test]
    fn test_invalid_attribute_name() {
        let err = Document::parse(r#"<?php $x = <div 123attr="value">Content</div>;"#).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Validation);
        assert_eq!(
            err.message,
            "Invalid attribute name '123attr': attribute names cannot start with a number"
        );
    }

    #[test]
    fn test_unterminated_element() {
        let err = Document::parse("<?php $x = <div>Hello").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Structural);
        assert_eq!(err.message, "Unterminated JSX element '<div>'");
        assert_eq!((err.line, err.column), (1, 12));
    }

    #[test]
    fn test_delegate_error_surfaces() {
        let err = Document::parse("<?php $x = <div>{$a +}</div>;").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Delegated);
    }

    #[test]
    fn test_max_depth_option() {
        let options = ParseOptions { max_depth: 3 };
        assert!(Document::parse_with("<a><b><c/></b></a>", &options).is_ok());
        let err = Document::parse_with("<a><b><c><d/></c></b></a>", &options).unwrap_err();
        assert_eq!(err.message, "Maximum markup nesting depth of 3 exceeded");
    }

    #[test]
    fn test_scanner_error_is_structural() {
        let err = Document::parse("<?php $x = 'unterminated").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Structural);
    }
}
