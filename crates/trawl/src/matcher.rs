//! Search entry points.

use std::collections::BTreeMap;
use std::sync::Arc;

use trawl_core::{Configuration, MatchOptions, MatchResult};
use trawl_syntax::{Node, NodeIterator, ParseResult, Parser};

use crate::cancellation::CancellationToken;
use crate::compiler::{CompiledPattern, PatternCompiler};
use crate::context::MatchContext;
use crate::down_up;
use crate::error::{MatchError, TaskError};
use crate::scheduler::{MatchingProcess, SchedulerState, TaskRunner, TaskScheduler};
use crate::sink::{CollectingMatchResultSink, MatchResultSink, ProgressIndicator};
use crate::visitor;
use crate::workspace::{IndexedFile, Workspace};

const MATCHER_TARGET: &str = "trawl::matcher";

/// What a search visits.
#[derive(Debug, Clone)]
pub enum SearchScope<'a> {
    /// Every indexable file of the workspace in the pattern's language.
    Workspace,
    /// Explicit subtrees.
    Elements(Vec<ScopeElement<'a>>),
}

/// A subtree to search: a node together with the tree it belongs to.
#[derive(Debug, Clone, Copy)]
pub struct ScopeElement<'a> {
    tree: &'a ParseResult,
    node: Node<'a>,
}

impl<'a> ScopeElement<'a> {
    /// Creates an element for `node` in `tree`.
    #[must_use]
    pub const fn new(tree: &'a ParseResult, node: Node<'a>) -> Self {
        Self { tree, node }
    }

    /// Creates an element covering the whole of `tree`.
    #[must_use]
    pub fn root(tree: &'a ParseResult) -> Self {
        Self::new(tree, tree.root_node())
    }

    /// Returns the tree.
    #[must_use]
    pub const fn tree(&self) -> &'a ParseResult {
        self.tree
    }

    /// Returns the node.
    #[must_use]
    pub const fn node(&self) -> Node<'a> {
        self.node
    }
}

/// One unit of scheduled work.
#[derive(Debug, Clone)]
pub enum MatchTask<'a> {
    /// Search a whole file from the workspace.
    File(IndexedFile),
    /// Search one explicit subtree.
    Element(ScopeElement<'a>),
}

struct Session<'a> {
    workspace: &'a Workspace,
    context: MatchContext<'a>,
    cancellation: CancellationToken,
    progress: Option<Arc<dyn ProgressIndicator>>,
    scanned: usize,
    total: usize,
}

impl<'a> Session<'a> {
    fn new(workspace: &'a Workspace) -> Self {
        Self {
            workspace,
            context: MatchContext::new(),
            cancellation: CancellationToken::new(),
            progress: None,
            scanned: 0,
            total: 0,
        }
    }

    fn match_file(&mut self, file: &IndexedFile) -> Result<(), TaskError> {
        if let Some(progress) = &self.progress {
            progress.set_text(&file.path().display().to_string());
        }
        if let Some(sink) = self.context.sink_mut() {
            sink.process_file(file);
        }
        let Some(pattern) = self.context.pattern().cloned() else {
            return Ok(());
        };

        let workspace = self.workspace;
        let trees = workspace
            .trees()
            .trees_for(file, pattern.scope(), &self.cancellation)?;
        for tree in &trees {
            for node in workspace.profile().extend_match_one_file(tree) {
                self.context.match_element(tree, node);
            }
        }
        Ok(())
    }

    fn match_scope_element(&mut self, element: ScopeElement<'a>) {
        let tree = element.tree();
        if element.node().parent().is_none() {
            let file = tree.path().map_or_else(
                || IndexedFile::in_memory(tree.label(), tree.language()),
                IndexedFile::file,
            );
            if let Some(sink) = self.context.sink_mut() {
                sink.process_file(&file);
            }
        }
        self.context.match_element(tree, element.node());
    }
}

impl<'a> TaskRunner<MatchTask<'a>> for Session<'a> {
    fn run(&mut self, task: MatchTask<'a>) -> Result<(), TaskError> {
        if self.cancellation.is_cancelled() {
            return Err(TaskError::Cancelled);
        }
        self.scanned += 1;
        if let Some(progress) = &self.progress {
            progress.set_progress(self.scanned, self.total);
        }
        match task {
            MatchTask::File(file) => self.match_file(&file),
            MatchTask::Element(element) => {
                self.match_scope_element(element);
                Ok(())
            }
        }
    }

    fn start_batch_processing(&mut self) {
        self.workspace.start_batch_processing();
    }

    fn finish_batch_processing(&mut self) {
        self.workspace.finish_batch_processing();
    }
}

/// Runs structural searches against a [`Workspace`].
///
/// A matcher owns one context and one scheduler, so it runs one scheduled
/// search at a time. Starting a new search finishes the previous one.
pub struct Matcher<'a> {
    workspace: &'a Workspace,
    options: MatchOptions,
    session: Session<'a>,
    scheduler: TaskScheduler<MatchTask<'a>, Session<'a>>,
}

impl std::fmt::Debug for Matcher<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Matcher")
            .field("options", &self.options)
            .field("context", &self.session.context)
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}

impl<'a> Matcher<'a> {
    /// Creates a matcher with default options.
    #[must_use]
    pub fn new(workspace: &'a Workspace) -> Self {
        Self::with_options(workspace, MatchOptions::default())
    }

    /// Creates a matcher whose single-element operations use `options`.
    #[must_use]
    pub fn with_options(workspace: &'a Workspace, options: MatchOptions) -> Self {
        Self {
            workspace,
            options,
            session: Session::new(workspace),
            scheduler: TaskScheduler::new(CancellationToken::new()),
        }
    }

    /// Makes scheduled searches observe `cancellation`.
    #[must_use]
    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.scheduler.set_cancellation(cancellation.clone());
        self.session.cancellation = cancellation;
        self
    }

    /// Returns the current options.
    #[must_use]
    pub const fn options(&self) -> &MatchOptions {
        &self.options
    }

    /// Returns a handle that can pause or stop the scheduled search.
    #[must_use]
    pub fn matching_process(&self) -> MatchingProcess {
        self.scheduler.matching_process()
    }

    /// Returns the scheduler state.
    #[must_use]
    pub fn state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    /// Returns the context of the scheduled search.
    #[must_use]
    pub const fn context(&self) -> &MatchContext<'a> {
        &self.session.context
    }

    /// Compiles a reference constraint in the language of the current
    /// options.
    ///
    /// # Errors
    ///
    /// See [`PatternCompiler::build_matcher`].
    pub fn build_matcher(&self, constraint: &str) -> Result<Arc<CompiledPattern>, MatchError> {
        PatternCompiler::new(self.workspace.registry())
            .build_matcher(constraint, self.options.language())
    }

    /// Checks that `options` compile.
    ///
    /// # Errors
    ///
    /// Returns the compilation error.
    pub fn validate(&self, options: &MatchOptions) -> Result<(), MatchError> {
        self.compile(options).map(drop)
    }

    /// Cheap precheck before a full match from `candidates`.
    ///
    /// Never returns `false` for a position where the full match would
    /// succeed. The cursor is left where it was.
    #[must_use]
    pub fn check_if_should_attempt_to_match<'t>(
        pattern: &CompiledPattern,
        tree: &'t ParseResult,
        candidates: &mut dyn NodeIterator<'t>,
    ) -> bool {
        visitor::check_if_should_attempt_to_match(pattern, tree, candidates)
    }

    /// Starts a scheduled search and drains it until it finishes or is
    /// paused.
    ///
    /// Every match goes to `sink` through a duplicate filter. The sink's
    /// `matching_finished` runs exactly once for the search, however it ends.
    ///
    /// # Errors
    ///
    /// Returns compilation errors before anything is scheduled, and
    /// [`MatchError::Cancelled`] when the cancellation token fires.
    pub fn find_matches(
        &mut self,
        sink: Box<dyn MatchResultSink + 'a>,
        options: &MatchOptions,
        scope: SearchScope<'a>,
    ) -> Result<(), MatchError> {
        self.scheduler.stop(&mut self.session);
        let pattern = self.compile(options)?;
        options.clone_into(&mut self.options);

        let session = &mut self.session;
        session.context.configure(Arc::clone(&pattern), sink);
        session.scanned = 0;
        session.progress = None;
        if let Some(sink) = session.context.sink_mut() {
            sink.set_matching_process(self.scheduler.matching_process());
            session.progress = sink.progress_indicator();
        }

        self.scheduler.init(session);
        self.scheduler
            .set_end_action(|finished: &mut Session<'a>| finished.context.finish());

        match scope {
            SearchScope::Workspace => {
                let scheduler = &mut self.scheduler;
                let enumerated = self.workspace.index().iterate_indexable_files(
                    &mut |file| {
                        let admitted = !file.is_directory()
                            && file
                                .language()
                                .is_some_and(|language| pattern.scope().admits_language(language));
                        if admitted {
                            scheduler.add_one_task(MatchTask::File(file.clone()));
                        }
                        true
                    },
                    &session.cancellation,
                );
                if let Err(error) = enumerated {
                    self.scheduler.stop(session);
                    return Err(error.into_match_error());
                }
            }
            SearchScope::Elements(elements) => {
                for element in elements {
                    self.scheduler.add_one_task(MatchTask::Element(element));
                }
            }
        }

        session.total = self.scheduler.pending();
        session.context.begin_draining();
        tracing::debug!(
            target: MATCHER_TARGET,
            event = "search_started",
            language = %options.language(),
            tasks = session.total,
        );
        self.process()
    }

    /// Drains queued tasks until the search finishes or is paused.
    ///
    /// # Errors
    ///
    /// As for [`find_matches`](Self::find_matches).
    pub fn process(&mut self) -> Result<(), MatchError> {
        self.scheduler.execute_next(&mut self.session)
    }

    /// Pauses the scheduled search after the current task.
    pub fn pause(&self) {
        self.scheduler.pause();
    }

    /// Resumes a paused search. Does nothing unless paused.
    ///
    /// # Errors
    ///
    /// As for [`find_matches`](Self::find_matches).
    pub fn resume(&mut self) -> Result<(), MatchError> {
        self.scheduler.resume(&mut self.session)
    }

    /// Ends the scheduled search, discarding queued tasks.
    pub fn stop(&mut self) {
        self.scheduler.stop(&mut self.session);
    }

    /// Ends any scheduled search and resets the context.
    pub fn clear_context(&mut self) {
        self.scheduler.stop(&mut self.session);
        self.session.context.clear();
    }

    /// Matches the current options with `element` as the node that stands
    /// for the target variable.
    ///
    /// # Errors
    ///
    /// Returns compilation errors, and [`MatchError::UnsupportedPattern`]
    /// when the pattern has no target and more than one top-level node.
    pub fn match_by_down_up<'t>(
        &self,
        tree: &'t ParseResult,
        element: Node<'t>,
    ) -> Result<Vec<MatchResult>, MatchError> {
        let pattern = self.compile(&self.options)?;
        let mut collector = CollectingMatchResultSink::new();
        {
            let mut context = MatchContext::new();
            context.configure(pattern, Box::new(&mut collector));
            down_up::match_by_down_up(&mut context, self.workspace.profile(), tree, element)?;
            context.finish();
        }
        Ok(collector.into_matches())
    }

    /// Returns whether the current options match exactly at `element`.
    ///
    /// # Errors
    ///
    /// Returns compilation errors.
    pub fn match_node<'t>(&self, tree: &'t ParseResult, element: Node<'t>) -> Result<bool, MatchError> {
        let pattern = self.compile(&self.options)?;
        let mut collector = CollectingMatchResultSink::new();
        {
            let mut context = MatchContext::new();
            context.configure(pattern, Box::new(&mut collector));
            context.set_should_recursively_match(false);
            context.match_element(tree, element);
            context.finish();
        }
        Ok(!collector.matches().is_empty())
    }

    /// Matches a precompiled configuration at `element` only and hands each
    /// result to `processor` together with the configuration.
    pub fn process_matches_in_element<'t>(
        &self,
        configuration: &Configuration,
        pattern: &Arc<CompiledPattern>,
        tree: &'t ParseResult,
        element: Node<'t>,
        processor: impl FnMut(MatchResult, &Configuration),
    ) {
        let sink = ProcessorSink {
            configuration,
            processor,
        };
        let mut context = MatchContext::new();
        context.configure(Arc::clone(pattern), Box::new(sink));
        context.set_should_recursively_match(false);
        context.match_element(tree, element);
        context.finish();
    }

    /// Compiles every configuration once, keyed by name.
    ///
    /// Configurations that fail to compile are logged and map to `None`.
    #[must_use]
    pub fn precompile_options(
        &self,
        configurations: &[Configuration],
    ) -> BTreeMap<String, Option<Arc<CompiledPattern>>> {
        let mut compiled = BTreeMap::new();
        for configuration in configurations {
            if compiled.contains_key(configuration.name()) {
                continue;
            }
            let pattern = self
                .compile(configuration.options())
                .inspect_err(|error| {
                    tracing::warn!(
                        target: MATCHER_TARGET,
                        event = "precompile_failed",
                        configuration = configuration.name(),
                        error = %error,
                    );
                })
                .ok();
            compiled.insert(configuration.name().to_owned(), pattern);
        }
        compiled
    }

    /// Parses `source` and matches `options` in it without scheduling.
    ///
    /// Results arrive in source order.
    ///
    /// # Errors
    ///
    /// Returns compilation errors.
    pub fn find_matches_in_source(
        &self,
        source: &str,
        options: &MatchOptions,
    ) -> Result<Vec<MatchResult>, MatchError> {
        self.compile(options)?;
        let tree = Parser::new(options.language())?.parse(source)?;
        let elements: Vec<_> = self
            .workspace
            .profile()
            .extend_match_one_file(&tree)
            .into_iter()
            .map(|node| ScopeElement::new(&tree, node))
            .collect();
        self.find_matches_in_elements(&elements, options)
    }

    /// Matches `options` in each of `elements` in the order given, without
    /// scheduling.
    ///
    /// Unlike a scheduled [`SearchScope::Elements`] search, which drains
    /// last-in first-out, results follow the order of `elements` and then
    /// tree order within each element.
    ///
    /// # Errors
    ///
    /// Returns compilation errors.
    pub fn find_matches_in_elements(
        &self,
        elements: &[ScopeElement<'_>],
        options: &MatchOptions,
    ) -> Result<Vec<MatchResult>, MatchError> {
        let pattern = self.compile(options)?;
        let mut collector = CollectingMatchResultSink::new();
        {
            let mut context = MatchContext::new();
            context.configure(pattern, Box::new(&mut collector));
            for element in elements {
                context.match_element(element.tree(), element.node());
            }
            context.finish();
        }
        Ok(collector.into_matches())
    }

    fn compile(&self, options: &MatchOptions) -> Result<Arc<CompiledPattern>, MatchError> {
        let registry = self.workspace.registry();
        self.workspace
            .cache()
            .get_or_compile(options, || PatternCompiler::new(registry).compile(options))
    }
}

struct ProcessorSink<'c, F> {
    configuration: &'c Configuration,
    processor: F,
}

impl<F: FnMut(MatchResult, &Configuration)> MatchResultSink for ProcessorSink<'_, F> {
    fn new_match(&mut self, result: MatchResult) {
        (self.processor)(result, self.configuration);
    }
}
