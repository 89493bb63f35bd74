//! Tests for scheduled and single-element searches.

use std::io;
use std::sync::Arc;

use mockall::mock;
use rstest::{fixture, rstest};
use tempfile::TempDir;
use trawl_core::{Configuration, ConfigurationRegistry, MatchOptions, MatchResult};
use trawl_syntax::{ParseResult, SupportedLanguage};

use super::support::{
    PausingSink, ProgressSink, RecordingProgress, file_names, find_node, memory_workspace, parse,
    write_files,
};
use crate::{
    CancellationToken, CollectingMatchResultSink, ContextState, IndexedFile, MatchError,
    MatchResultSink, Matcher, MatchingProcess, PatternScope, ProgressIndicator, ScopeElement,
    SchedulerState, SearchScope, TaskError, TreeProvider, WalkdirIndex, Workspace,
};

mock! {
    Trees {}
    impl TreeProvider for Trees {
        fn trees_for(
            &self,
            file: &IndexedFile,
            scope: &PatternScope,
            cancellation: &CancellationToken,
        ) -> Result<Vec<ParseResult>, TaskError>;
        fn start_batch_processing(&self);
        fn finish_batch_processing(&self);
    }
}

mock! {
    Sink {}
    impl MatchResultSink for Sink {
        fn new_match(&mut self, result: MatchResult);
        fn process_file(&mut self, file: &IndexedFile);
        fn matching_finished(&mut self);
        fn set_matching_process(&mut self, process: MatchingProcess);
        fn progress_indicator(&self) -> Option<Arc<dyn ProgressIndicator>>;
    }
}

/// Sink that cancels the search on its first match.
struct CancellingSink {
    token: CancellationToken,
    matches: usize,
    finished: usize,
}

impl MatchResultSink for CancellingSink {
    fn new_match(&mut self, _result: MatchResult) {
        self.matches += 1;
        self.token.cancel();
    }

    fn matching_finished(&mut self) {
        self.finished += 1;
    }
}

fn calls() -> MatchOptions {
    MatchOptions::new("foo($x)", SupportedLanguage::Python)
}

#[fixture]
fn project() -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    write_files(
        dir.path(),
        &[
            ("a.py", "foo(1)\n"),
            ("b.py", "foo(2)\n"),
            ("c.py", "foo(3)\n"),
            ("lib.rs", "fn foo() {}\n"),
            ("notes.txt", "foo(4)\n"),
        ],
    );
    dir
}

#[rstest]
fn workspace_files_are_processed_last_in_first_out(project: TempDir) {
    let workspace = Workspace::for_directory(project.path());
    let mut sink = CollectingMatchResultSink::new();
    {
        let mut matcher = Matcher::new(&workspace);
        matcher
            .find_matches(Box::new(&mut sink), &calls(), SearchScope::Workspace)
            .expect("search");
        assert_eq!(matcher.state(), SchedulerState::Ended);
    }

    assert_eq!(
        file_names(sink.files().iter().map(IndexedFile::path)),
        vec!["c.py", "b.py", "a.py"]
    );
    let found: Vec<_> = sink.matches().iter().map(MatchResult::text).collect();
    assert_eq!(found, vec!["foo(3)", "foo(2)", "foo(1)"]);
    assert_eq!(sink.finished_count(), 1);
}

#[test]
fn files_without_the_literal_words_are_announced_but_not_matched() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_files(dir.path(), &[("a.py", "bar(1)\n"), ("b.py", "foo(1)\n")]);
    let workspace = Workspace::for_directory(dir.path());
    let mut sink = CollectingMatchResultSink::new();
    {
        let mut matcher = Matcher::new(&workspace);
        matcher
            .find_matches(Box::new(&mut sink), &calls(), SearchScope::Workspace)
            .expect("search");
    }

    assert_eq!(sink.files().len(), 2);
    assert_eq!(sink.matches().len(), 1);
}

#[rstest]
fn unreadable_files_do_not_stop_the_search(project: TempDir) {
    let mut trees = MockTrees::new();
    trees.expect_start_batch_processing().times(1).return_const(());
    trees.expect_finish_batch_processing().times(1).return_const(());
    trees.expect_trees_for().times(3).returning(|file, _, _| {
        if file.path().ends_with("b.py") {
            return Err(TaskError::Io {
                path: file.path().to_path_buf(),
                source: io::Error::other("permission denied"),
            });
        }
        Ok(vec![
            parse(SupportedLanguage::Python, "foo(1)\n").with_path(file.path()),
        ])
    });
    let workspace = Workspace::new(WalkdirIndex::new(project.path()), trees);
    let mut sink = CollectingMatchResultSink::new();
    {
        let mut matcher = Matcher::new(&workspace);
        matcher
            .find_matches(Box::new(&mut sink), &calls(), SearchScope::Workspace)
            .expect("recoverable failure");
    }

    assert_eq!(sink.matches().len(), 2);
    assert_eq!(sink.finished_count(), 1);
}

#[test]
fn sink_hears_every_lifecycle_event_once() {
    let mut sink = MockSink::new();
    sink.expect_set_matching_process().times(1).return_const(());
    sink.expect_progress_indicator().times(1).returning(|| None);
    sink.expect_process_file().times(1).return_const(());
    sink.expect_new_match().times(3).return_const(());
    sink.expect_matching_finished().times(1).return_const(());

    let workspace = memory_workspace();
    let tree = parse(SupportedLanguage::Python, "foo(1)\nfoo(2)\nfoo(3)\n");
    let mut matcher = Matcher::new(&workspace);
    matcher
        .find_matches(
            Box::new(sink),
            &calls(),
            SearchScope::Elements(vec![ScopeElement::root(&tree)]),
        )
        .expect("search");
    assert_eq!(matcher.state(), SchedulerState::Ended);
}

#[test]
fn malformed_pattern_never_reaches_the_sink() {
    let mut sink = MockSink::new();
    sink.expect_matching_finished().never();
    sink.expect_new_match().never();

    let workspace = memory_workspace();
    let mut matcher = Matcher::new(&workspace);
    let options = MatchOptions::new("foo($$x)", SupportedLanguage::Python);
    let error = matcher
        .find_matches(Box::new(sink), &options, SearchScope::Workspace)
        .expect_err("malformed");
    assert!(matches!(error, MatchError::MalformedPattern { .. }));
}

#[rstest]
fn cancellation_ends_the_search_before_the_next_file(project: TempDir) {
    let token = CancellationToken::new();
    let workspace = Workspace::for_directory(project.path());
    let mut sink = CancellingSink {
        token: token.clone(),
        matches: 0,
        finished: 0,
    };
    {
        let mut matcher = Matcher::new(&workspace).with_cancellation(token);
        let error = matcher
            .find_matches(Box::new(&mut sink), &calls(), SearchScope::Workspace)
            .expect_err("cancelled");
        assert_eq!(error, MatchError::Cancelled);
        assert_eq!(matcher.state(), SchedulerState::Ended);
    }

    assert_eq!(sink.matches, 1);
    assert_eq!(sink.finished, 1);
}

#[test]
fn paused_search_resumes_where_it_stopped() {
    let workspace = memory_workspace();
    let first = parse(SupportedLanguage::Python, "foo(1)\n");
    let second = parse(SupportedLanguage::Python, "foo(2)\n");
    let third = parse(SupportedLanguage::Python, "foo(3)\n");
    let mut sink = PausingSink::default();
    {
        let mut matcher = Matcher::new(&workspace);
        let scope = SearchScope::Elements(vec![
            ScopeElement::root(&first),
            ScopeElement::root(&second),
            ScopeElement::root(&third),
        ]);
        matcher
            .find_matches(Box::new(&mut sink), &calls(), scope)
            .expect("search");
        assert_eq!(matcher.state(), SchedulerState::Suspended);

        matcher.resume().expect("resume");
        assert_eq!(matcher.state(), SchedulerState::Ended);
    }

    let found: Vec<_> = sink.matches.iter().map(MatchResult::text).collect();
    assert_eq!(found, vec!["foo(3)", "foo(2)", "foo(1)"]);
    assert_eq!(sink.finished, 1);
}

#[test]
fn separate_in_memory_trees_are_not_duplicates() {
    let workspace = memory_workspace();
    let first = parse(SupportedLanguage::Python, "foo(1)\n");
    let second = parse(SupportedLanguage::Python, "foo(1)\n");
    let mut sink = CollectingMatchResultSink::new();
    {
        let mut matcher = Matcher::new(&workspace);
        let scope =
            SearchScope::Elements(vec![ScopeElement::root(&first), ScopeElement::root(&second)]);
        matcher
            .find_matches(Box::new(&mut sink), &calls(), scope)
            .expect("search");
    }

    let trees: Vec<_> = sink.matches().iter().map(|found| found.tree_id).collect();
    assert_eq!(trees, vec![second.id(), first.id()]);
}

#[test]
fn scheduled_elements_drain_last_in_first_out() {
    let workspace = memory_workspace();
    let tree = parse(SupportedLanguage::Python, "foo(1)\nfoo(2)\nbar(3)\n");
    let lines: Vec<_> = (0..2)
        .filter_map(|index| tree.root_node().named_child(index))
        .map(|line| ScopeElement::new(&tree, line))
        .collect();
    let mut sink = CollectingMatchResultSink::new();
    {
        let mut matcher = Matcher::new(&workspace);
        matcher
            .find_matches(Box::new(&mut sink), &calls(), SearchScope::Elements(lines))
            .expect("search");
    }

    let found: Vec<_> = sink.matches().iter().map(MatchResult::text).collect();
    assert_eq!(found, vec!["foo(2)", "foo(1)"]);
}

#[test]
fn explicit_lines_match_in_source_order() {
    let workspace = memory_workspace();
    let tree = parse(SupportedLanguage::Python, "foo(1)\nfoo(2)\nbar(3)\n");
    let lines: Vec<_> = (0..2)
        .filter_map(|index| tree.root_node().named_child(index))
        .map(|line| ScopeElement::new(&tree, line))
        .collect();
    assert_eq!(lines.len(), 2);

    let results = Matcher::new(&workspace)
        .find_matches_in_elements(&lines, &calls())
        .expect("search");

    let bound: Vec<_> = results
        .iter()
        .filter_map(|found| found.binding("x"))
        .map(|binding| binding.text())
        .collect();
    assert_eq!(bound, vec!["1", "2"]);
}

#[test]
fn source_search_reports_lines_in_order() {
    let workspace = memory_workspace();
    let results = Matcher::new(&workspace)
        .find_matches_in_source("foo(1)\nfoo(2)\nbar(3)\n", &calls())
        .expect("search");

    let found: Vec<_> = results.iter().map(MatchResult::text).collect();
    assert_eq!(found, vec!["foo(1)", "foo(2)"]);
}

#[test]
fn stopping_a_paused_search_finishes_it_once() {
    let workspace = memory_workspace();
    let first = parse(SupportedLanguage::Python, "foo(1)\n");
    let second = parse(SupportedLanguage::Python, "foo(2)\n");
    let mut sink = PausingSink::default();
    {
        let mut matcher = Matcher::new(&workspace);
        let scope = SearchScope::Elements(vec![ScopeElement::root(&first), ScopeElement::root(&second)]);
        matcher
            .find_matches(Box::new(&mut sink), &calls(), scope)
            .expect("search");
        matcher.stop();
        matcher.stop();
        matcher.resume().expect("resume after stop");
    }

    assert_eq!(sink.matches.len(), 1);
    assert_eq!(sink.finished, 1);
}

#[test]
fn overlapping_elements_report_each_match_once() {
    let workspace = memory_workspace();
    let tree = parse(SupportedLanguage::Python, "foo(1)\n");
    let call = find_node(&tree, "call", "foo(1)");
    let mut sink = CollectingMatchResultSink::new();
    {
        let mut matcher = Matcher::new(&workspace);
        let scope = SearchScope::Elements(vec![ScopeElement::root(&tree), ScopeElement::new(&tree, call)]);
        matcher
            .find_matches(Box::new(&mut sink), &calls(), scope)
            .expect("search");
    }

    assert_eq!(sink.matches().len(), 1);
    assert_eq!(sink.files().len(), 1);
}

#[rstest]
fn progress_counts_every_queued_file(project: TempDir) {
    let progress = Arc::new(RecordingProgress::default());
    let workspace = Workspace::for_directory(project.path());
    let mut matcher = Matcher::new(&workspace);
    let sink = ProgressSink {
        progress: Arc::clone(&progress),
    };
    matcher
        .find_matches(Box::new(sink), &calls(), SearchScope::Workspace)
        .expect("search");

    let updates = progress.updates.lock().expect("progress lock").clone();
    assert_eq!(updates, vec![(1, 3), (2, 3), (3, 3)]);
}

#[rstest]
fn a_matcher_runs_searches_back_to_back(project: TempDir) {
    let workspace = Workspace::for_directory(project.path());
    let mut first = CollectingMatchResultSink::new();
    let mut second = CollectingMatchResultSink::new();
    {
        let mut matcher = Matcher::new(&workspace);
        matcher
            .find_matches(Box::new(&mut first), &calls(), SearchScope::Workspace)
            .expect("first search");
        let narrower = MatchOptions::new("foo(2)", SupportedLanguage::Python);
        matcher
            .find_matches(Box::new(&mut second), &narrower, SearchScope::Workspace)
            .expect("second search");
        assert_eq!(matcher.options().pattern(), "foo(2)");
    }

    assert_eq!(first.matches().len(), 3);
    assert_eq!(second.matches().len(), 1);
    assert_eq!((first.finished_count(), second.finished_count()), (1, 1));
}

#[test]
fn clear_context_returns_to_fresh() {
    let workspace = memory_workspace();
    let tree = parse(SupportedLanguage::Python, "foo(1)\n");
    let mut matcher = Matcher::new(&workspace);
    matcher
        .find_matches(
            Box::new(CollectingMatchResultSink::new()),
            &calls(),
            SearchScope::Elements(vec![ScopeElement::root(&tree)]),
        )
        .expect("search");
    assert_eq!(matcher.context().state(), ContextState::Finished);

    matcher.clear_context();
    assert_eq!(matcher.context().state(), ContextState::Fresh);
    assert!(matcher.context().pattern().is_none());
}

#[test]
fn match_node_does_not_descend() {
    let workspace = memory_workspace();
    let matcher = Matcher::with_options(&workspace, calls());
    let tree = parse(SupportedLanguage::Python, "foo(1)\n");
    let call = find_node(&tree, "call", "foo(1)");

    assert!(matcher.match_node(&tree, call).expect("call"));
    assert!(!matcher.match_node(&tree, tree.root_node()).expect("root"));
}

#[test]
fn element_matches_carry_their_configuration() {
    let workspace = memory_workspace();
    let matcher = Matcher::new(&workspace);
    let configuration = Configuration::new("calls", calls());
    let compiled = matcher.precompile_options(std::slice::from_ref(&configuration));
    let pattern = compiled
        .get("calls")
        .and_then(Option::as_ref)
        .expect("compiled");
    let tree = parse(SupportedLanguage::Python, "foo(1)\n");
    let call = find_node(&tree, "call", "foo(1)");

    let mut seen = Vec::new();
    matcher.process_matches_in_element(&configuration, pattern, &tree, tree.root_node(), |_, _| {
        seen.push(String::from("root"));
    });
    assert!(seen.is_empty());

    matcher.process_matches_in_element(&configuration, pattern, &tree, call, |result, origin| {
        seen.push(format!("{}:{}", origin.name(), result.text()));
    });
    assert_eq!(seen, vec!["calls:foo(1)"]);
}

#[test]
fn precompile_maps_failures_to_none() {
    let workspace = memory_workspace();
    let matcher = Matcher::new(&workspace);
    let compiled = matcher.precompile_options(&[
        Configuration::new("good", calls()),
        Configuration::new("bad", MatchOptions::new("foo($$x)", SupportedLanguage::Python)),
    ]);

    assert!(compiled.get("good").is_some_and(Option::is_some));
    assert!(compiled.get("bad").is_some_and(Option::is_none));
}

#[test]
fn validate_reports_compilation_errors() {
    let workspace = memory_workspace();
    let matcher = Matcher::new(&workspace);

    assert!(matcher.validate(&calls()).is_ok());
    assert!(matcher
        .validate(&MatchOptions::new("foo($$x)", SupportedLanguage::Python))
        .is_err());
}

#[rstest]
#[case::inline("\"bar($y)\"", true)]
#[case::registered("inner", true)]
#[case::missing("Missing", false)]
fn build_matcher_resolves_constraints(#[case] constraint: &str, #[case] compiles: bool) {
    let mut registry = ConfigurationRegistry::new();
    registry
        .insert(Configuration::new("inner", MatchOptions::new("baz($z)", SupportedLanguage::Python)))
        .expect("insert");
    let workspace = memory_workspace().with_registry(registry);
    let matcher = Matcher::with_options(&workspace, calls());

    assert_eq!(matcher.build_matcher(constraint).is_ok(), compiles);
}
