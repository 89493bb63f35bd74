//! The record emitted for every successful match.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::binding::{Binding, MatchedNode};
use crate::span::Span;

/// One successful match of a compiled pattern.
///
/// The record is fully owned, so it outlives the tree it was taken from and
/// can be streamed to another thread or serialised as a JSON line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Label of the tree the match came from, usually a file path.
    pub file: String,
    /// The candidate nodes aligned with the pattern's top-level nodes.
    pub roots: Vec<MatchedNode>,
    /// The source text from the first root to the last.
    pub text: String,
    /// Metavariable bindings keyed by name.
    pub bindings: BTreeMap<String, Binding>,
    /// Id of the parsed tree the match came from. Zero when unknown.
    #[serde(skip)]
    pub tree_id: u64,
}

/// Identifies the subtree a match starts at within one search.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MatchIdentity {
    /// Label of the tree the match came from.
    pub file: String,
    /// Byte offset where the first matched root starts.
    pub start_byte: u32,
    /// Byte offset where the first matched root ends.
    pub end_byte: u32,
    /// Kind of the first matched root.
    pub kind: String,
    /// Id of the parsed tree, which separates trees sharing a label.
    pub tree_id: u64,
}

impl MatchResult {
    /// Creates a match result, taking the covered text from `source`.
    #[must_use]
    pub fn new(
        file: String,
        roots: Vec<MatchedNode>,
        bindings: BTreeMap<String, Binding>,
        source: &str,
    ) -> Self {
        let text = match (roots.first(), roots.last()) {
            (Some(first), Some(last)) => source
                .get(usize_of(first.span.start_byte)..usize_of(last.span.end_byte))
                .unwrap_or_default()
                .to_owned(),
            _ => String::new(),
        };
        Self {
            file,
            roots,
            text,
            bindings,
            tree_id: 0,
        }
    }

    /// Records the id of the tree the match came from.
    #[must_use]
    pub const fn with_tree_id(mut self, tree_id: u64) -> Self {
        self.tree_id = tree_id;
        self
    }

    /// Returns the tree label.
    #[must_use]
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Returns the matched roots in source order.
    #[must_use]
    pub fn roots(&self) -> &[MatchedNode] {
        &self.roots
    }

    /// Returns the binding for a metavariable.
    #[must_use]
    pub fn binding(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    /// Returns every binding.
    #[must_use]
    pub const fn bindings(&self) -> &BTreeMap<String, Binding> {
        &self.bindings
    }

    /// Returns the span from the first root to the last.
    #[must_use]
    pub fn span(&self) -> Option<Span> {
        let first = self.roots.first()?;
        let last = self.roots.last()?;
        Some(first.span.cover(&last.span))
    }

    /// Returns the source text from the first root to the last.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the identity used to suppress duplicate emissions.
    ///
    /// Two results share an identity when they start at the same subtree of
    /// the same tree. In-memory trees share a label, so the tree id takes
    /// part as well.
    #[must_use]
    pub fn identity(&self) -> MatchIdentity {
        let (start_byte, end_byte, kind) = self.roots.first().map_or_else(
            || (0, 0, String::new()),
            |root| (root.span.start_byte, root.span.end_byte, root.kind.clone()),
        );
        MatchIdentity {
            file: self.file.clone(),
            start_byte,
            end_byte,
            kind,
            tree_id: self.tree_id,
        }
    }
}

fn usize_of(offset: u32) -> usize {
    usize::try_from(offset).unwrap_or(usize::MAX)
}
