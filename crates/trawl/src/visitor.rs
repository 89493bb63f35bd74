//! Alignment of pattern nodes against candidate nodes.

use std::collections::{BTreeMap, HashMap};

use trawl_core::{Binding, MatchResult, MatchedNode};
use trawl_syntax::{ArrayBackedNodeIterator, Node, NodeIterator, ParseResult, SiblingNodeIterator};

use crate::compiler::CompiledPattern;
use crate::handlers::{MatchOutcome, TypedVariable, node_text};

/// Pattern node id to the candidate node id it must match.
pub(crate) type Pins = HashMap<usize, usize>;

/// How the end of the pattern sequence relates to the candidate sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Alignment {
    /// Candidates may remain once the pattern is exhausted.
    Prefix,
    /// Both sequences must end together.
    Exact,
}

#[derive(Debug, Clone)]
enum Bound<'t> {
    Node(Node<'t>),
    Run(Vec<Node<'t>>),
}

/// Variable bindings accumulated while one match is attempted.
#[derive(Debug, Clone, Default)]
pub(crate) struct Bindings<'t> {
    entries: BTreeMap<String, Bound<'t>>,
}

impl<'t> Bindings<'t> {
    fn bind(&mut self, name: &str, bound: Bound<'t>, source: &str) -> bool {
        if name == "_" {
            return true;
        }
        if let Some(existing) = self.entries.get(name) {
            return bound_text(existing, source) == bound_text(&bound, source);
        }
        self.entries.insert(name.to_owned(), bound);
        true
    }

    pub(crate) fn into_bindings(self, source: &str) -> BTreeMap<String, Binding> {
        self.entries
            .into_iter()
            .map(|(name, bound)| {
                let binding = match bound {
                    Bound::Node(node) => Binding::Node(MatchedNode::from_node(node, source)),
                    Bound::Run(nodes) => Binding::run(&nodes, source),
                };
                (name, binding)
            })
            .collect()
    }
}

fn bound_text<'s>(bound: &Bound<'_>, source: &'s str) -> &'s str {
    match bound {
        Bound::Node(node) => node_text(*node, source),
        Bound::Run(nodes) => match (nodes.first(), nodes.last()) {
            (Some(first), Some(last)) => source
                .get(first.start_byte()..last.end_byte())
                .unwrap_or_default(),
            _ => "",
        },
    }
}

/// Walks candidate nodes and reports every place the pattern matches.
pub(crate) struct MatchingVisitor<'p, 't> {
    pattern: &'p CompiledPattern,
    tree: &'t ParseResult,
    pins: Option<&'p Pins>,
    recurse: bool,
}

impl<'p, 't> MatchingVisitor<'p, 't> {
    pub(crate) const fn new(
        pattern: &'p CompiledPattern,
        tree: &'t ParseResult,
        pins: Option<&'p Pins>,
        recurse: bool,
    ) -> Self {
        Self {
            pattern,
            tree,
            pins,
            recurse,
        }
    }

    pub(crate) const fn pattern(&self) -> &'p CompiledPattern {
        self.pattern
    }

    pub(crate) fn candidate_text(&self, node: Node<'_>) -> &'t str {
        self.tree.text(node)
    }

    /// Tries the pattern at every candidate position and, when recursion is
    /// on, inside every candidate. The cursor is restored afterwards.
    pub(crate) fn match_context(
        &self,
        candidates: &mut dyn NodeIterator<'t>,
        emit: &mut dyn FnMut(MatchResult),
    ) {
        let mut steps = 0_usize;
        while let Some(start) = candidates.current() {
            self.match_at(candidates, emit);
            if self.recurse && start.child_count() > 0 {
                self.match_context(&mut SiblingNodeIterator::children(start), emit);
            }
            candidates.advance();
            steps += 1;
        }
        for _ in 0..steps {
            candidates.rewind();
        }
    }

    fn match_at(&self, candidates: &mut dyn NodeIterator<'t>, emit: &mut dyn FnMut(MatchResult)) {
        let mut patterns = self.pattern.nodes();
        let mut bindings = Bindings::default();
        let Some(consumed) =
            self.align(&mut patterns, candidates, Alignment::Prefix, &mut bindings)
        else {
            return;
        };
        if consumed == 0 {
            return;
        }

        let source = self.tree.source();
        let mut roots = Vec::with_capacity(consumed);
        for _ in 0..consumed {
            if let Some(node) = candidates.current() {
                roots.push(MatchedNode::from_node(node, source));
            }
            candidates.advance();
        }
        for _ in 0..consumed {
            candidates.rewind();
        }
        emit(
            MatchResult::new(
                self.tree.label(),
                roots,
                bindings.into_bindings(source),
                source,
            )
            .with_tree_id(self.tree.id()),
        );
    }

    /// Aligns the remaining pattern nodes with the remaining candidates.
    ///
    /// Returns the number of candidates consumed. Both cursors are back at
    /// their entry positions when this returns. On success `bindings` holds
    /// the bindings of the match; on failure its contents are unspecified.
    pub(crate) fn align(
        &self,
        patterns: &mut dyn NodeIterator<'p>,
        candidates: &mut dyn NodeIterator<'t>,
        mode: Alignment,
        bindings: &mut Bindings<'t>,
    ) -> Option<usize> {
        let Some(pattern_node) = patterns.current() else {
            return match mode {
                Alignment::Prefix => Some(0),
                Alignment::Exact => candidates.current().is_none().then_some(0),
            };
        };
        let handler = self.pattern.handler(pattern_node)?;

        match handler.step(self, pattern_node, candidates.current(), bindings) {
            MatchOutcome::Mismatch => None,
            MatchOutcome::Advance => {
                patterns.advance();
                candidates.advance();
                let rest = self.align(patterns, candidates, mode, bindings);
                patterns.rewind();
                candidates.rewind();
                rest.map(|consumed| consumed + 1)
            }
            MatchOutcome::Run { variable } => {
                self.align_run(variable, patterns, candidates, mode, bindings)
            }
        }
    }

    /// Greedy run with backtracking: take as many acceptable candidates as
    /// allowed, then give them back one at a time until the rest aligns.
    fn align_run(
        &self,
        variable: usize,
        patterns: &mut dyn NodeIterator<'p>,
        candidates: &mut dyn NodeIterator<'t>,
        mode: Alignment,
        bindings: &mut Bindings<'t>,
    ) -> Option<usize> {
        let typed = self.pattern.variable(variable)?;
        let mut taken = Vec::new();
        while taken.len() < typed.max_count() {
            let Some(candidate) = candidates.current() else {
                break;
            };
            if !self.accepts(variable, candidate) {
                break;
            }
            taken.push(candidate);
            candidates.advance();
        }

        patterns.advance();
        let mut result = None;
        loop {
            if taken.len() >= typed.min_count() {
                let mut trial = bindings.clone();
                if trial.bind(typed.name(), Bound::Run(taken.clone()), self.tree.source())
                    && let Some(rest) = self.align(patterns, candidates, mode, &mut trial)
                {
                    *bindings = trial;
                    result = Some(rest + taken.len());
                    break;
                }
            }
            if taken.pop().is_none() {
                break;
            }
            candidates.rewind();
        }
        for _ in 0..taken.len() {
            candidates.rewind();
        }
        patterns.rewind();
        result
    }

    /// Aligns the children of two nodes exactly.
    pub(crate) fn align_children(
        &self,
        pattern_node: Node<'p>,
        candidate: Node<'t>,
        bindings: &mut Bindings<'t>,
    ) -> bool {
        let mut patterns = SiblingNodeIterator::children(pattern_node);
        let mut candidates = SiblingNodeIterator::children(candidate);
        let mut trial = bindings.clone();
        if self
            .align(&mut patterns, &mut candidates, Alignment::Exact, &mut trial)
            .is_some()
        {
            *bindings = trial;
            true
        } else {
            false
        }
    }

    /// Returns whether a pinned pattern node is being compared with the
    /// candidate it is pinned to.
    ///
    /// In loose mode a candidate also qualifies when it only wraps the
    /// pinned node.
    pub(crate) fn pin_allows(&self, pattern_node: Node<'_>, candidate: Node<'_>) -> bool {
        let Some(&pinned) = self.pins.and_then(|pins| pins.get(&pattern_node.id())) else {
            return true;
        };
        if pinned == candidate.id() {
            return true;
        }
        if !self.pattern.options().loose() {
            return false;
        }
        let wrappers = self.tree.language().wrapper_kinds();
        let mut current = candidate;
        while wrappers.contains(&current.kind()) && current.named_child_count() == 1 {
            let Some(inner) = current.named_child(0) else {
                break;
            };
            if inner.id() == pinned {
                return true;
            }
            current = inner;
        }
        false
    }

    /// Checks every constraint of a variable except binding consistency.
    pub(crate) fn accepts(&self, variable: usize, candidate: Node<'t>) -> bool {
        let pattern = self.pattern;
        let Some(typed) = pattern.variable(variable) else {
            return false;
        };
        typed.accepts_shape(candidate, self.tree.source())
            && typed
                .reference()
                .is_none_or(|reference| self.matches_reference(reference, candidate))
    }

    fn matches_reference(&self, reference: &'p CompiledPattern, candidate: Node<'t>) -> bool {
        if reference.language() != self.tree.language() {
            return false;
        }
        let visitor = Self::new(reference, self.tree, None, false);
        let mut patterns = reference.nodes();
        let mut candidates = ArrayBackedNodeIterator::single(candidate);
        visitor
            .align(
                &mut patterns,
                &mut candidates,
                Alignment::Exact,
                &mut Bindings::default(),
            )
            .is_some()
    }

    /// Records a single-node binding, failing on inconsistency.
    pub(crate) fn bind(
        &self,
        variable: usize,
        candidate: Node<'t>,
        bindings: &mut Bindings<'t>,
    ) -> bool {
        self.pattern
            .variable(variable)
            .map(TypedVariable::name)
            .is_some_and(|name| bindings.bind(name, Bound::Node(candidate), self.tree.source()))
    }
}

/// Cheap precheck run before a full match from `candidates`.
///
/// Walks the top-level pattern nodes and the candidates in step, asking only
/// each handler's [`can_match`](crate::MatchingHandler::can_match). Stops
/// with `true` at the first variable-length handler, because the cheap walk
/// cannot know how many candidates it would consume. Both cursors are
/// restored before returning.
pub(crate) fn check_if_should_attempt_to_match<'t>(
    pattern: &CompiledPattern,
    tree: &'t ParseResult,
    candidates: &mut dyn NodeIterator<'t>,
) -> bool {
    let mut patterns = pattern.nodes();
    let mut steps = 0_usize;
    let source = tree.source();
    let verdict = loop {
        let Some(pattern_node) = patterns.current() else {
            break true;
        };
        let Some(handler) = pattern.handler(pattern_node) else {
            break false;
        };
        if handler.is_variable_length(pattern) {
            break true;
        }
        let Some(candidate) = candidates.current() else {
            break false;
        };
        if !handler.can_match(pattern, pattern_node, candidate, source) {
            break false;
        }
        patterns.advance();
        candidates.advance();
        steps += 1;
    };
    patterns.reset();
    for _ in 0..steps {
        candidates.rewind();
    }
    verdict
}
