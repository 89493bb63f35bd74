//! Tests for node alignment and the matching precheck.

use rstest::rstest;
use trawl_core::{MatchOptions, VariableConstraint};
use trawl_syntax::{ArrayBackedNodeIterator, NodeIterator, SupportedLanguage};

use super::support::{all_nodes, binding_texts, find_node, memory_workspace, parse};
use crate::{Matcher, PatternCompiler};

#[rstest]
#[case::operators_must_agree(SupportedLanguage::Python, "$a + $b", "x - y\nx + y\n", 1)]
#[case::repeated_variable_binds_equal_text(
    SupportedLanguage::Python,
    "$a == $a",
    "x == x\nx == y\n",
    1
)]
#[case::calls_by_name(SupportedLanguage::TypeScript, "foo($x)", "foo(1);\nfoo(2);\nbar(3);\n", 2)]
#[case::wrapped_rust_statement(
    SupportedLanguage::Rust,
    "let $name = $value;",
    "fn main() { let a = 1; let b = 2; }",
    2
)]
#[case::wildcard_never_binds(SupportedLanguage::Python, "$_ == $_", "x == y\n", 1)]
fn counts_matches(
    #[case] language: SupportedLanguage,
    #[case] pattern: &str,
    #[case] source: &str,
    #[case] expected: usize,
) {
    let workspace = memory_workspace();
    let results = Matcher::new(&workspace)
        .find_matches_in_source(source, &MatchOptions::new(pattern, language))
        .expect("search");
    assert_eq!(results.len(), expected);
}

#[test]
fn run_variable_backtracks_to_let_the_tail_match() {
    let workspace = memory_workspace();
    let options = MatchOptions::new("print($$$args, last)", SupportedLanguage::Python);
    let results = Matcher::new(&workspace)
        .find_matches_in_source("print(a, b, last)\nprint(last)\nprint(a, b)\n", &options)
        .expect("search");

    assert_eq!(binding_texts(&results, "args"), vec!["a, b"]);
    assert_eq!(results.first().map(|r| r.text()), Some("print(a, b, last)"));
}

#[test]
fn multi_statement_pattern_matches_consecutive_siblings() {
    let workspace = memory_workspace();
    let options = MatchOptions::new("a = $x\nb = $y", SupportedLanguage::Python);
    let results = Matcher::new(&workspace)
        .find_matches_in_source("a = 1\nb = 2\nc = 3\na = 4\n", &options)
        .expect("search");

    assert_eq!(results.len(), 1);
    let found = results.first().expect("one match");
    assert_eq!(found.roots().len(), 2);
    assert_eq!(found.text(), "a = 1\nb = 2");
}

#[rstest]
#[case::kinds(VariableConstraint::default().with_kinds(["integer"]), vec!["1"])]
#[case::regex(VariableConstraint::default().with_regex("^[a-z]+$"), vec!["a"])]
#[case::inline_reference(
    VariableConstraint::default().with_reference("\"bar($y)\""),
    vec!["bar(1)"]
)]
fn constraints_filter_bound_nodes(
    #[case] constraint: VariableConstraint,
    #[case] expected: Vec<&str>,
) {
    let workspace = memory_workspace();
    let options =
        MatchOptions::new("foo($x)", SupportedLanguage::Python).with_constraint("x", constraint);
    let results = Matcher::new(&workspace)
        .find_matches_in_source("foo(1)\nfoo(a)\nfoo(bar(1))\nfoo(baz(1))\n", &options)
        .expect("search");
    assert_eq!(binding_texts(&results, "x"), expected);
}

#[rstest]
#[case(SupportedLanguage::Python, "foo($x)", "foo(1)\nbar(foo(2))\nfoo()\n")]
#[case(SupportedLanguage::Python, "print($$$args, last)", "print(a, last)\nprint(last)\n")]
#[case(SupportedLanguage::TypeScript, "$a + $b", "let z = 1 + 2 - 3;\n")]
#[case(SupportedLanguage::Rust, "let $name = $value;", "fn f() { let a = 1; a + 1; }")]
fn precheck_never_rejects_a_real_match(
    #[case] language: SupportedLanguage,
    #[case] pattern: &str,
    #[case] source: &str,
) {
    let workspace = memory_workspace();
    let options = MatchOptions::new(pattern, language);
    let compiled = PatternCompiler::new(workspace.registry())
        .compile(&options)
        .expect("compile");
    let matcher = Matcher::with_options(&workspace, options);
    let tree = parse(language, source);

    let mut matched = 0;
    for node in all_nodes(tree.root_node()) {
        let mut candidates = ArrayBackedNodeIterator::single(node);
        let attempt = Matcher::check_if_should_attempt_to_match(&compiled, &tree, &mut candidates);
        assert_eq!(candidates.current(), Some(node), "cursor must be restored");
        if matcher.match_node(&tree, node).expect("match") {
            matched += 1;
            assert!(attempt, "precheck rejected a match at {}", node.kind());
        }
    }
    assert!(matched > 0);
}

#[test]
fn precheck_rejects_a_different_kind() {
    let workspace = memory_workspace();
    let compiled = PatternCompiler::new(workspace.registry())
        .compile(&MatchOptions::new("foo($x)", SupportedLanguage::Python))
        .expect("compile");
    let tree = parse(SupportedLanguage::Python, "x = 1\n");
    let assignment = find_node(&tree, "assignment", "x = 1");

    let mut candidates = ArrayBackedNodeIterator::single(assignment);
    assert!(!Matcher::check_if_should_attempt_to_match(
        &compiled,
        &tree,
        &mut candidates
    ));
}

#[test]
fn language_mismatch_yields_nothing() {
    let workspace = memory_workspace();
    let matcher = Matcher::with_options(
        &workspace,
        MatchOptions::new("foo($x)", SupportedLanguage::TypeScript),
    );
    let tree = parse(SupportedLanguage::Python, "foo(1)\n");
    let call = find_node(&tree, "call", "foo(1)");
    assert!(!matcher.match_node(&tree, call).expect("match"));
}
