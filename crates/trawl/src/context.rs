//! Per-search matching state.

use std::sync::Arc;

use trawl_core::MatchOptions;
use trawl_syntax::{ArrayBackedNodeIterator, Node, ParseResult};

use crate::compiler::CompiledPattern;
use crate::sink::{DuplicateFilteringResultSink, MatchResultSink};
use crate::visitor::{MatchingVisitor, Pins};

const CONTEXT_TARGET: &str = "trawl::context";

/// Lifecycle of a [`MatchContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContextState {
    /// Nothing configured.
    #[default]
    Fresh,
    /// A pattern and a sink are in place.
    Configured,
    /// Tasks are being processed.
    Draining,
    /// The sink has been told the search is over.
    Finished,
}

/// The pattern, sink, and switches for one search invocation.
///
/// The sink is always wrapped in a [`DuplicateFilteringResultSink`], so a
/// node reached through overlapping scope elements is reported once.
pub struct MatchContext<'s> {
    state: ContextState,
    pattern: Option<Arc<CompiledPattern>>,
    sink: Option<DuplicateFilteringResultSink<Box<dyn MatchResultSink + 's>>>,
    recurse: bool,
    pins: Pins,
}

impl Default for MatchContext<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MatchContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchContext")
            .field("state", &self.state)
            .field("pattern", &self.pattern.as_ref().map(|p| p.options().pattern()))
            .field("recurse", &self.recurse)
            .field("pins", &self.pins.len())
            .finish_non_exhaustive()
    }
}

impl<'s> MatchContext<'s> {
    /// Creates an unconfigured context that matches recursively.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: ContextState::Fresh,
            pattern: None,
            sink: None,
            recurse: true,
            pins: Pins::new(),
        }
    }

    /// Installs a pattern and sink, discarding any previous configuration.
    pub fn configure(&mut self, pattern: Arc<CompiledPattern>, sink: Box<dyn MatchResultSink + 's>) {
        self.clear();
        self.pattern = Some(pattern);
        self.sink = Some(DuplicateFilteringResultSink::new(sink));
        self.state = ContextState::Configured;
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ContextState {
        self.state
    }

    /// Returns the compiled pattern, if configured.
    #[must_use]
    pub const fn pattern(&self) -> Option<&Arc<CompiledPattern>> {
        self.pattern.as_ref()
    }

    /// Returns the options of the configured pattern.
    #[must_use]
    pub fn options(&self) -> Option<&MatchOptions> {
        self.pattern.as_deref().map(CompiledPattern::options)
    }

    /// Returns whether matching descends into candidate children.
    #[must_use]
    pub const fn should_recursively_match(&self) -> bool {
        self.recurse
    }

    /// Turns descent into candidate children on or off.
    pub const fn set_should_recursively_match(&mut self, recurse: bool) {
        self.recurse = recurse;
    }

    /// Requires `pattern_node` to match `candidate` and nothing else.
    pub fn pin(&mut self, pattern_node: Node<'_>, candidate: Node<'_>) {
        self.pins.insert(pattern_node.id(), candidate.id());
    }

    /// Marks the start of task processing.
    pub fn begin_draining(&mut self) {
        if self.state == ContextState::Configured {
            self.state = ContextState::Draining;
        }
    }

    pub(crate) fn sink_mut(
        &mut self,
    ) -> Option<&mut DuplicateFilteringResultSink<Box<dyn MatchResultSink + 's>>> {
        self.sink.as_mut()
    }

    /// Matches the pattern at `node` and, when recursion is on, inside it.
    ///
    /// Trees in another language than the pattern are ignored. Returns the
    /// number of results handed to the sink, before duplicate filtering.
    pub fn match_element<'t>(&mut self, tree: &'t ParseResult, node: Node<'t>) -> usize {
        let Self {
            pattern,
            sink,
            recurse,
            pins,
            ..
        } = self;
        let (Some(pattern), Some(sink)) = (pattern.as_deref(), sink.as_mut()) else {
            return 0;
        };
        if pattern.language() != tree.language() {
            tracing::trace!(
                target: CONTEXT_TARGET,
                event = "language_skipped",
                file = %tree.label(),
            );
            return 0;
        }

        let mut emitted = 0_usize;
        let visitor = MatchingVisitor::new(pattern, tree, Some(&*pins), *recurse);
        visitor.match_context(&mut ArrayBackedNodeIterator::single(node), &mut |result| {
            emitted += 1;
            sink.new_match(result);
        });
        emitted
    }

    /// Tells the sink the search is over, once.
    pub fn finish(&mut self) {
        if self.state == ContextState::Finished {
            return;
        }
        if let Some(sink) = self.sink.as_mut() {
            sink.matching_finished();
            self.state = ContextState::Finished;
        }
    }

    /// Drops the pattern, sink, and pins and returns to [`ContextState::Fresh`].
    pub fn clear(&mut self) {
        self.state = ContextState::Fresh;
        self.pattern = None;
        self.sink = None;
        self.recurse = true;
        self.pins.clear();
    }
}
