//! Language-specific adjustments to matching.

use trawl_syntax::{Node, ParseResult, SupportedLanguage};

/// Hooks through which a language can adjust matching.
pub trait StructuralProfile {
    /// Returns the nodes of a tree that a file-level search starts from.
    fn extend_match_one_file<'t>(&self, tree: &'t ParseResult) -> Vec<Node<'t>> {
        vec![tree.root_node()]
    }

    /// Returns the pattern node ancestor climbing starts from.
    fn extend_matched_by_down_up<'p>(&self, target: Node<'p>) -> Node<'p> {
        target
    }

    /// Normalises a node reached while climbing in loose mode.
    fn update_current_node<'n>(&self, node: Node<'n>, _language: SupportedLanguage) -> Node<'n> {
        node
    }
}

/// Profile that looks through wrapper nodes in loose mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultProfile;

impl StructuralProfile for DefaultProfile {
    fn update_current_node<'n>(&self, node: Node<'n>, language: SupportedLanguage) -> Node<'n> {
        let wrappers = language.wrapper_kinds();
        let mut current = node;
        while wrappers.contains(&current.kind()) {
            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }
        current
    }
}
