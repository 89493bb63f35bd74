//! Matching anchored at a node inside the match.
//!
//! A down-up search starts from a node that should correspond to the
//! pattern's target variable, climbs candidate and pattern ancestors in step
//! until the pattern's top level is reached, and then runs one ordinary
//! top-down match there with every visited pattern node pinned to the
//! candidate it was paired with.

use trawl_syntax::{ArrayBackedNodeIterator, Node, ParseResult};

use crate::compiler::CompiledPattern;
use crate::context::MatchContext;
use crate::error::MatchError;
use crate::visitor::check_if_should_attempt_to_match;
use crate::workspace::StructuralProfile;

/// Runs a down-up match from `element` in an already configured context.
pub(crate) fn match_by_down_up<'t>(
    context: &mut MatchContext<'_>,
    profile: &dyn StructuralProfile,
    tree: &'t ParseResult,
    element: Node<'t>,
) -> Result<(), MatchError> {
    let Some(pattern) = context.pattern().cloned() else {
        return Ok(());
    };
    if pattern.language() != tree.language() {
        return Ok(());
    }
    context.set_should_recursively_match(false);

    let start = match pattern.target_node() {
        Some(target) => climb_with_target(context, &pattern, profile, tree, element, target),
        None => climb_without_target(&pattern, element)?,
    };
    let Some(start) = start else {
        return Ok(());
    };

    if check_if_should_attempt_to_match(&pattern, tree, &mut ArrayBackedNodeIterator::single(start)) {
        context.match_element(tree, start);
    }
    Ok(())
}

fn climb_with_target<'t>(
    context: &mut MatchContext<'_>,
    pattern: &CompiledPattern,
    profile: &dyn StructuralProfile,
    tree: &'t ParseResult,
    element: Node<'t>,
    target: Node<'_>,
) -> Option<Node<'t>> {
    let loose = pattern.options().loose();
    let language = pattern.language();
    let mut candidate = element;
    let mut pattern_node = profile.extend_matched_by_down_up(target);
    let mut start = None;
    let mut reached_top = false;

    loop {
        let Some(handler) = pattern.handler(pattern_node) else {
            break;
        };
        let same_kind = candidate.kind() == pattern_node.kind();
        let typed_fits = pattern.is_typed_var(pattern_node)
            && handler.can_match(pattern, pattern_node, candidate, tree.source());
        if !same_kind && !typed_fits {
            break;
        }

        context.pin(pattern_node, candidate);
        start = Some(candidate);
        if handler.is_top_level() {
            reached_top = true;
            break;
        }

        let (Some(candidate_parent), Some(pattern_parent)) =
            (candidate.parent(), pattern_node.parent())
        else {
            break;
        };
        candidate = candidate_parent;
        pattern_node = pattern_parent;
        if loose {
            candidate = profile.update_current_node(candidate, language);
            pattern_node = profile.update_current_node(pattern_node, language);
        }
    }

    if reached_top { start } else { None }
}

fn climb_without_target<'t>(
    pattern: &CompiledPattern,
    element: Node<'t>,
) -> Result<Option<Node<'t>>, MatchError> {
    let roots = pattern.parsed().top_level_nodes();
    let [top] = roots.as_slice() else {
        return Err(MatchError::unsupported(
            "down-up matching without a target needs a single top-level pattern node",
        ));
    };

    let mut current = element.parent();
    while let Some(node) = current {
        if node.kind() == top.kind() {
            return Ok(Some(node));
        }
        current = node.parent();
    }
    Ok(None)
}
