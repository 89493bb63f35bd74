//! Consumers of match results.
//!
//! A search streams every [`MatchResult`] into a [`MatchResultSink`]. The
//! sink also hears about each file before it is searched and is told exactly
//! once when the search is over.

use std::collections::HashSet;
use std::sync::Arc;

use trawl_core::{MatchIdentity, MatchResult};

use crate::scheduler::MatchingProcess;
use crate::workspace::IndexedFile;

/// Receives progress updates while files are scanned.
pub trait ProgressIndicator {
    /// Reports that `scanned` of `total` queued units have been processed.
    fn set_progress(&self, scanned: usize, total: usize);

    /// Describes the unit currently being processed.
    fn set_text(&self, text: &str);
}

/// Consumer of search output.
pub trait MatchResultSink {
    /// Accepts one match.
    fn new_match(&mut self, result: MatchResult);

    /// Announces the file about to be searched.
    fn process_file(&mut self, _file: &IndexedFile) {}

    /// Signals that the search is over. Called exactly once per search.
    fn matching_finished(&mut self) {}

    /// Hands the sink a handle it may use to pause or stop the search.
    fn set_matching_process(&mut self, _process: MatchingProcess) {}

    /// Returns a progress indicator, if the sink wants progress reports.
    fn progress_indicator(&self) -> Option<Arc<dyn ProgressIndicator>> {
        None
    }
}

impl<S: MatchResultSink + ?Sized> MatchResultSink for &mut S {
    fn new_match(&mut self, result: MatchResult) {
        (**self).new_match(result);
    }

    fn process_file(&mut self, file: &IndexedFile) {
        (**self).process_file(file);
    }

    fn matching_finished(&mut self) {
        (**self).matching_finished();
    }

    fn set_matching_process(&mut self, process: MatchingProcess) {
        (**self).set_matching_process(process);
    }

    fn progress_indicator(&self) -> Option<Arc<dyn ProgressIndicator>> {
        (**self).progress_indicator()
    }
}

impl<S: MatchResultSink + ?Sized> MatchResultSink for Box<S> {
    fn new_match(&mut self, result: MatchResult) {
        (**self).new_match(result);
    }

    fn process_file(&mut self, file: &IndexedFile) {
        (**self).process_file(file);
    }

    fn matching_finished(&mut self) {
        (**self).matching_finished();
    }

    fn set_matching_process(&mut self, process: MatchingProcess) {
        (**self).set_matching_process(process);
    }

    fn progress_indicator(&self) -> Option<Arc<dyn ProgressIndicator>> {
        (**self).progress_indicator()
    }
}

/// Sink that keeps every match in arrival order.
#[derive(Debug, Default)]
pub struct CollectingMatchResultSink {
    matches: Vec<MatchResult>,
    files: Vec<IndexedFile>,
    finished: usize,
}

impl CollectingMatchResultSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the collected matches.
    #[must_use]
    pub fn matches(&self) -> &[MatchResult] {
        &self.matches
    }

    /// Consumes the sink and returns the collected matches.
    #[must_use]
    pub fn into_matches(self) -> Vec<MatchResult> {
        self.matches
    }

    /// Returns the files announced so far.
    #[must_use]
    pub fn files(&self) -> &[IndexedFile] {
        &self.files
    }

    /// Returns how many times the search reported completion.
    #[must_use]
    pub const fn finished_count(&self) -> usize {
        self.finished
    }
}

impl MatchResultSink for CollectingMatchResultSink {
    fn new_match(&mut self, result: MatchResult) {
        self.matches.push(result);
    }

    fn process_file(&mut self, file: &IndexedFile) {
        self.files.push(file.clone());
    }

    fn matching_finished(&mut self) {
        self.finished += 1;
    }
}

/// Sink decorator that drops matches already delivered in this search.
///
/// Two matches are duplicates when they start at the same node of the same
/// file, which happens when overlapping scope elements are searched.
#[derive(Debug)]
pub struct DuplicateFilteringResultSink<S> {
    inner: S,
    seen: HashSet<MatchIdentity>,
}

impl<S: MatchResultSink> DuplicateFilteringResultSink<S> {
    /// Wraps `inner`.
    #[must_use]
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            seen: HashSet::new(),
        }
    }

    /// Returns the wrapped sink.
    #[must_use]
    pub const fn inner(&self) -> &S {
        &self.inner
    }

    /// Unwraps the decorator.
    #[must_use]
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: MatchResultSink> MatchResultSink for DuplicateFilteringResultSink<S> {
    fn new_match(&mut self, result: MatchResult) {
        if self.seen.insert(result.identity()) {
            self.inner.new_match(result);
        } else {
            tracing::trace!(
                target: "trawl::sink",
                event = "duplicate_dropped",
                file = result.file(),
            );
        }
    }

    fn process_file(&mut self, file: &IndexedFile) {
        self.inner.process_file(file);
    }

    fn matching_finished(&mut self) {
        self.inner.matching_finished();
    }

    fn set_matching_process(&mut self, process: MatchingProcess) {
        self.inner.set_matching_process(process);
    }

    fn progress_indicator(&self) -> Option<Arc<dyn ProgressIndicator>> {
        self.inner.progress_indicator()
    }
}
