//! Tests for [`LineCol`] and [`Span`].

use rstest::rstest;
use trawl_syntax::{Parser, SupportedLanguage};

use crate::{LineCol, Span};

#[test]
fn linecol_displays_one_based() {
    assert_eq!(LineCol::new(0, 0).to_string(), "1:1");
    assert_eq!(LineCol::new(4, 9).to_string(), "5:10");
}

#[test]
fn span_json_contains_expected_fields() {
    let span = Span::new(12, 42, LineCol::new(2, 0), LineCol::new(4, 0));
    let json = serde_json::to_string(&span).expect("serialize");
    assert!(json.contains("\"start_byte\":12"));
    assert!(json.contains("\"end_byte\":42"));
}

#[test]
fn span_of_node_uses_tree_positions() {
    let mut parser = Parser::new(SupportedLanguage::Python).expect("parser");
    let parsed = parser.parse("x = 1\ny = 2\n").expect("parse");
    let second = parsed.root_node().named_child(1).expect("second statement");

    let span = Span::of(second);
    assert_eq!(span.start_byte(), 6);
    assert_eq!(span.end_byte(), 11);
    assert_eq!(span.start(), &LineCol::new(1, 0));
    assert_eq!(span.end(), &LineCol::new(1, 5));
}

#[rstest]
#[case((0, 5), (10, 15), (0, 15))]
#[case((10, 15), (0, 5), (0, 15))]
#[case((0, 20), (5, 10), (0, 20))]
fn cover_spans_both_inputs(
    #[case] left: (u32, u32),
    #[case] right: (u32, u32),
    #[case] expected: (u32, u32),
) {
    let span = |(start, end): (u32, u32)| Span::new(start, end, LineCol::new(0, start), LineCol::new(0, end));
    let covered = span(left).cover(&span(right));
    assert_eq!((covered.start_byte(), covered.end_byte()), expected);
    assert_eq!(covered.start().column(), expected.0);
    assert_eq!(covered.end().column(), expected.1);
}
