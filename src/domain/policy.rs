//! Drop legality: which drag-and-drop moves are structurally allowed.
//!
//! Policy only. The move engine trusts its caller to have asked here first.

use tracing::debug;

use crate::domain::arena::{Forest, TreeNode};
use crate::domain::entities::DropPosition;

/// Root groups stay where they are; only nested groups can be picked up.
pub fn can_drag(node: &TreeNode) -> bool {
    node.level > 0
}

/// Decide whether dropping `dragged` at `position` relative to `target` is legal.
///
/// Rejected: self drops, drops into the dragged subtree, unknown ids, and
/// drops that would leave the node exactly where it is. For `before`/`after`
/// only the immediate neighbour counts as "where it is".
pub fn can_drop(forest: &Forest, dragged: &str, target: &str, position: DropPosition) -> bool {
    if dragged == target {
        debug!(dragged, "rejected drop onto itself");
        return false;
    }
    let (Some(dragged_node), Some(target_node)) =
        (forest.find_by_id(dragged), forest.find_by_id(target))
    else {
        debug!(dragged, target, "rejected drop with unknown node");
        return false;
    };
    if forest.is_descendant(dragged, target) {
        debug!(dragged, target, "rejected drop into own subtree");
        return false;
    }
    if is_same_position(forest, dragged_node, target_node, position) {
        debug!(dragged, target, %position, "rejected drop without effect");
        return false;
    }
    debug!(
        "checking drop: {} {} {}",
        dragged_node.name(),
        position,
        target_node.name()
    );
    true
}

fn is_same_position(
    forest: &Forest,
    dragged: &TreeNode,
    target: &TreeNode,
    position: DropPosition,
) -> bool {
    match position {
        DropPosition::Inside => forest
            .find_parent(dragged.id.as_str())
            .is_some_and(|parent| parent.id == target.id),
        DropPosition::Before => {
            sibling_offsets(forest, dragged, target).is_some_and(|(d, t)| d + 1 == t)
        }
        DropPosition::After => {
            sibling_offsets(forest, dragged, target).is_some_and(|(d, t)| t + 1 == d)
        }
    }
}

/// Offsets of both nodes when they share a container (same parent, or both roots).
fn sibling_offsets(forest: &Forest, a: &TreeNode, b: &TreeNode) -> Option<(usize, usize)> {
    let (a_container, a_offset) = forest.position_of(a.id.as_str())?;
    let (b_container, b_offset) = forest.position_of(b.id.as_str())?;
    (a_container == b_container).then_some((a_offset, b_offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::GroupPayload;

    #[test]
    fn given_root_and_child_when_checking_drag_then_only_child_is_draggable() {
        let mut forest = Forest::new();
        forest.insert("1", GroupPayload::named("Org"), None).unwrap();
        forest.insert("1-1", GroupPayload::named("Team"), Some("1")).unwrap();

        assert!(!can_drag(forest.find_by_id("1").unwrap()));
        assert!(can_drag(forest.find_by_id("1-1").unwrap()));
    }
}
