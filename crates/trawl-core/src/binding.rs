//! Owned records of the syntax nodes a match covers and binds.
//!
//! A single metavariable (`$x`) produces a [`Binding::Node`]; a run
//! metavariable (`$$$args`) produces [`Binding::Nodes`] holding zero or more
//! sibling nodes.

use serde::{Deserialize, Serialize};
use trawl_syntax::Node;

use crate::span::Span;

/// A syntax node copied out of its tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedNode {
    /// The span of the node in the source.
    pub span: Span,
    /// The Tree-sitter node kind (e.g. `"identifier"`, `"call"`).
    pub kind: String,
    /// The source text of the node.
    pub text: String,
}

impl MatchedNode {
    /// Creates a matched node from its parts.
    #[must_use]
    pub const fn new(span: Span, kind: String, text: String) -> Self {
        Self { span, kind, text }
    }

    /// Copies a live node out of the source it was parsed from.
    #[must_use]
    pub fn from_node(node: Node<'_>, source: &str) -> Self {
        Self::new(
            Span::of(node),
            node.kind().to_owned(),
            source.get(node.byte_range()).unwrap_or_default().to_owned(),
        )
    }

    /// Returns the node span.
    #[must_use]
    pub const fn span(&self) -> &Span {
        &self.span
    }

    /// Returns the node kind.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the node text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// The value bound to a metavariable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Binding {
    /// Exactly one node.
    Node(MatchedNode),
    /// A run of sibling nodes, possibly empty.
    Nodes {
        /// The nodes in source order.
        nodes: Vec<MatchedNode>,
        /// The source text from the first node to the last.
        text: String,
    },
}

impl Binding {
    /// Binds a run of sibling nodes, keeping the source text between the
    /// first and the last.
    #[must_use]
    pub fn run(nodes: &[Node<'_>], source: &str) -> Self {
        let text = match (nodes.first(), nodes.last()) {
            (Some(first), Some(last)) => source
                .get(first.start_byte()..last.end_byte())
                .unwrap_or_default()
                .to_owned(),
            _ => String::new(),
        };
        Self::Nodes {
            nodes: nodes
                .iter()
                .map(|node| MatchedNode::from_node(*node, source))
                .collect(),
            text,
        }
    }

    /// Returns the bound text.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Node(node) => &node.text,
            Self::Nodes { text, .. } => text,
        }
    }

    /// Returns the bound nodes as a slice.
    #[must_use]
    pub fn nodes(&self) -> &[MatchedNode] {
        match self {
            Self::Node(node) => std::slice::from_ref(node),
            Self::Nodes { nodes, .. } => nodes,
        }
    }

    /// Returns the single bound node, if this is a single binding.
    #[must_use]
    pub const fn as_node(&self) -> Option<&MatchedNode> {
        match self {
            Self::Node(node) => Some(node),
            Self::Nodes { .. } => None,
        }
    }
}
