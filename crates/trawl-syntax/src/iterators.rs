//! Cursors over ordered runs of syntax nodes.
//!
//! The matcher walks pattern nodes and candidate nodes through the same
//! [`NodeIterator`] interface, so alignment code never cares whether a run
//! comes from a pre-built list or from a live sibling chain.

use tree_sitter::Node;

/// A resettable, rewindable cursor over a sequence of nodes.
///
/// The cursor is positioned on [`current`](Self::current) until it moves past
/// the final node, after which `current` returns `None`.
pub trait NodeIterator<'tree> {
    /// Returns the node under the cursor, or `None` once exhausted.
    fn current(&self) -> Option<Node<'tree>>;

    /// Returns whether the cursor is still on a node.
    fn has_next(&self) -> bool {
        self.current().is_some()
    }

    /// Moves to the next node. Does nothing once exhausted.
    fn advance(&mut self);

    /// Moves back one node. Does nothing at the starting position.
    fn rewind(&mut self);

    /// Returns to the position the cursor was created at.
    fn reset(&mut self);
}

/// A cursor over an owned list of nodes.
#[derive(Debug, Clone)]
pub struct ArrayBackedNodeIterator<'tree> {
    nodes: Vec<Node<'tree>>,
    index: usize,
}

impl<'tree> ArrayBackedNodeIterator<'tree> {
    /// Creates a cursor positioned on the first node of `nodes`.
    #[must_use]
    pub const fn new(nodes: Vec<Node<'tree>>) -> Self {
        Self { nodes, index: 0 }
    }

    /// Creates a cursor over exactly one node.
    #[must_use]
    pub fn single(node: Node<'tree>) -> Self {
        Self::new(vec![node])
    }

    /// Returns the number of nodes in the list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl<'tree> NodeIterator<'tree> for ArrayBackedNodeIterator<'tree> {
    fn current(&self) -> Option<Node<'tree>> {
        self.nodes.get(self.index).copied()
    }

    fn advance(&mut self) {
        if self.index < self.nodes.len() {
            self.index += 1;
        }
    }

    fn rewind(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    fn reset(&mut self) {
        self.index = 0;
    }
}

/// A cursor that follows a node's sibling chain lazily.
///
/// Extra nodes such as comments are skipped in both directions.
#[derive(Debug, Clone)]
pub struct SiblingNodeIterator<'tree> {
    start: Option<Node<'tree>>,
    current: Option<Node<'tree>>,
    last: Option<Node<'tree>>,
}

impl<'tree> SiblingNodeIterator<'tree> {
    /// Creates a cursor over `node` and every following sibling.
    #[must_use]
    pub const fn starting_at(node: Node<'tree>) -> Self {
        Self {
            start: Some(node),
            current: Some(node),
            last: None,
        }
    }

    /// Creates a cursor over the children of `parent`.
    #[must_use]
    pub fn children(parent: Node<'tree>) -> Self {
        let first = parent.child(0).and_then(|child| {
            if child.is_extra() {
                next_sibling(child)
            } else {
                Some(child)
            }
        });
        Self {
            start: first,
            current: first,
            last: None,
        }
    }
}

impl<'tree> NodeIterator<'tree> for SiblingNodeIterator<'tree> {
    fn current(&self) -> Option<Node<'tree>> {
        self.current
    }

    fn advance(&mut self) {
        if let Some(node) = self.current {
            self.last = Some(node);
            self.current = next_sibling(node);
        }
    }

    fn rewind(&mut self) {
        match self.current {
            None => self.current = self.last,
            Some(node) if Some(node) == self.start => {}
            Some(node) => self.current = previous_sibling(node),
        }
    }

    fn reset(&mut self) {
        self.current = self.start;
        self.last = None;
    }
}

fn next_sibling(node: Node<'_>) -> Option<Node<'_>> {
    let mut next = node.next_sibling();
    while let Some(candidate) = next {
        if !candidate.is_extra() {
            return Some(candidate);
        }
        next = candidate.next_sibling();
    }
    None
}

fn previous_sibling(node: Node<'_>) -> Option<Node<'_>> {
    let mut previous = node.prev_sibling();
    while let Some(candidate) = previous {
        if !candidate.is_extra() {
            return Some(candidate);
        }
        previous = candidate.prev_sibling();
    }
    None
}
