//! Per-node matching strategies.
//!
//! Compilation assigns one [`MatchingHandler`] to every pattern node. The
//! visitor asks the handler of the current pattern node how it relates to the
//! current candidate and moves its cursors according to the answer.

use std::sync::Arc;

use regex::Regex;
use trawl_syntax::Node;

use crate::compiler::CompiledPattern;
use crate::visitor::{Bindings, MatchingVisitor};

/// How a pattern node is matched against candidate nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchingHandler {
    /// Same node kind, children aligned one by one.
    Structural {
        /// Whether the node is one of the pattern's top-level nodes.
        top_level: bool,
    },
    /// Same node kind and identical text. Used for leaf tokens.
    Literal {
        /// Whether the node is one of the pattern's top-level nodes.
        top_level: bool,
    },
    /// A metavariable. Accepts whatever satisfies the variable's constraint.
    Substitution {
        /// Index of the variable in [`CompiledPattern::variables`].
        variable: usize,
        /// Whether the node is one of the pattern's top-level nodes.
        top_level: bool,
    },
}

/// The answer a handler gives for one pattern/candidate pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    /// The candidate cannot stand for the pattern node.
    Mismatch,
    /// The candidate matched; both cursors advance by one.
    Advance,
    /// The pattern node consumes a run of candidates of variable length.
    Run {
        /// Index of the variable that owns the run.
        variable: usize,
    },
}

impl MatchingHandler {
    /// Returns whether the handler belongs to a top-level pattern node.
    #[must_use]
    pub const fn is_top_level(self) -> bool {
        match self {
            Self::Structural { top_level }
            | Self::Literal { top_level }
            | Self::Substitution { top_level, .. } => top_level,
        }
    }

    /// Returns the variable index for substitution handlers.
    #[must_use]
    pub const fn variable(self) -> Option<usize> {
        match self {
            Self::Substitution { variable, .. } => Some(variable),
            Self::Structural { .. } | Self::Literal { .. } => None,
        }
    }

    /// Cheap compatibility check that never rejects a pair the full match
    /// would accept.
    ///
    /// Only kinds, literal text, and variable shape constraints are looked
    /// at. Children, references, and bindings are left to the full match.
    #[must_use]
    pub fn can_match(
        self,
        pattern: &CompiledPattern,
        pattern_node: Node<'_>,
        candidate: Node<'_>,
        candidate_source: &str,
    ) -> bool {
        match self {
            Self::Structural { .. } => pattern_node.kind() == candidate.kind(),
            Self::Literal { .. } => {
                pattern_node.kind() == candidate.kind()
                    && pattern.text(pattern_node) == node_text(candidate, candidate_source)
            }
            Self::Substitution { variable, .. } => pattern
                .variable(variable)
                .is_some_and(|typed| typed.accepts_shape(candidate, candidate_source)),
        }
    }

    /// Returns whether the handler may consume any number of candidates other
    /// than exactly one.
    #[must_use]
    pub fn is_variable_length(self, pattern: &CompiledPattern) -> bool {
        self.variable()
            .and_then(|index| pattern.variable(index))
            .is_some_and(TypedVariable::is_variable_length)
    }

    pub(crate) fn step<'p, 't>(
        self,
        visitor: &MatchingVisitor<'p, 't>,
        pattern_node: Node<'p>,
        candidate: Option<Node<'t>>,
        bindings: &mut Bindings<'t>,
    ) -> MatchOutcome {
        if let Self::Substitution { variable, .. } = self
            && self.is_variable_length(visitor.pattern())
        {
            return MatchOutcome::Run { variable };
        }
        let Some(candidate) = candidate else {
            return MatchOutcome::Mismatch;
        };
        if !visitor.pin_allows(pattern_node, candidate) {
            return MatchOutcome::Mismatch;
        }

        let matched = match self {
            Self::Structural { .. } => {
                pattern_node.kind() == candidate.kind()
                    && visitor.align_children(pattern_node, candidate, bindings)
            }
            Self::Literal { .. } => {
                pattern_node.kind() == candidate.kind()
                    && visitor.pattern().text(pattern_node) == visitor.candidate_text(candidate)
            }
            Self::Substitution { variable, .. } => {
                visitor.accepts(variable, candidate) && visitor.bind(variable, candidate, bindings)
            }
        };
        if matched {
            MatchOutcome::Advance
        } else {
            MatchOutcome::Mismatch
        }
    }
}

/// A metavariable together with its compiled constraint.
#[derive(Debug, Clone)]
pub struct TypedVariable {
    name: String,
    min_count: usize,
    max_count: usize,
    kinds: Vec<String>,
    regex: Option<Regex>,
    reference: Option<Arc<CompiledPattern>>,
    target: bool,
}

impl TypedVariable {
    pub(crate) const fn new(name: String, min_count: usize, max_count: usize) -> Self {
        Self {
            name,
            min_count,
            max_count,
            kinds: Vec::new(),
            regex: None,
            reference: None,
            target: false,
        }
    }

    pub(crate) fn constrain(
        &mut self,
        kinds: Vec<String>,
        regex: Option<Regex>,
        reference: Option<Arc<CompiledPattern>>,
        target: bool,
    ) {
        self.kinds = kinds;
        self.regex = regex;
        self.reference = reference;
        self.target = target;
    }

    pub(crate) const fn set_counts(&mut self, min_count: usize, max_count: usize) {
        self.min_count = min_count;
        self.max_count = max_count;
    }

    /// Returns the variable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns whether this is the `$_` wildcard.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.name == "_"
    }

    /// Minimum number of nodes the variable must consume.
    #[must_use]
    pub const fn min_count(&self) -> usize {
        self.min_count
    }

    /// Maximum number of nodes the variable may consume.
    #[must_use]
    pub const fn max_count(&self) -> usize {
        self.max_count
    }

    /// Returns whether the variable consumes anything other than one node.
    #[must_use]
    pub const fn is_variable_length(&self) -> bool {
        self.min_count != 1 || self.max_count != 1
    }

    /// Returns whether the variable is the search target.
    #[must_use]
    pub const fn is_target(&self) -> bool {
        self.target
    }

    /// Returns the pattern the bound node must also match, if any.
    #[must_use]
    pub fn reference(&self) -> Option<&Arc<CompiledPattern>> {
        self.reference.as_ref()
    }

    /// Checks the node kind and text constraints.
    #[must_use]
    pub fn accepts_shape(&self, node: Node<'_>, source: &str) -> bool {
        let kind_ok = self.kinds.is_empty() || self.kinds.iter().any(|kind| kind == node.kind());
        kind_ok
            && self
                .regex
                .as_ref()
                .is_none_or(|regex| regex.is_match(node_text(node, source)))
    }
}

pub(crate) fn node_text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    source.get(node.byte_range()).unwrap_or_default()
}
