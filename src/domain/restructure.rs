//! Restructuring engine: move a subtree, delete nodes and promote their children.
//!
//! Both operations are pure: they read the input forest, edit a copy and
//! return it. Unknown ids degrade to "no change"; nothing here fails.

use std::cmp::Reverse;

use itertools::Itertools;
use tracing::{debug, instrument, warn};

use crate::domain::arena::Forest;
use crate::domain::entities::{DropPosition, NodeId};

/// Move `dragged` (with its whole subtree) to `position` relative to `target`.
///
/// Legality is not re-checked here; call [`can_drop`](crate::domain::policy::can_drop)
/// first. The input comes back unchanged when either node is missing, or when
/// the target would vanish together with the detached subtree.
#[instrument(level = "debug", skip(forest))]
pub fn move_node(forest: &Forest, dragged: &str, target: &str, position: DropPosition) -> Forest {
    let Some(dragged_idx) = forest.index_of(dragged) else {
        warn!(dragged, "dragged node not found");
        return forest.clone();
    };
    if !forest.contains(target) || dragged == target || forest.is_descendant(dragged, target) {
        warn!(target, "target node not found outside the dragged subtree");
        return forest.clone();
    }

    let mut next = forest.clone();
    next.detach(dragged_idx);

    // Offsets may have shifted if the dragged node was an earlier sibling
    let Some(target_idx) = next.index_of(target) else {
        return forest.clone();
    };
    match position {
        DropPosition::Inside => next.attach(dragged_idx, Some(target_idx), None),
        DropPosition::Before | DropPosition::After => {
            let Some((container, offset)) = next.position_of(target) else {
                warn!(target, "target node lost its container");
                return forest.clone();
            };
            let at = match position {
                DropPosition::Before => offset,
                _ => offset + 1,
            };
            next.attach(dragged_idx, container, Some(at));
        }
    }

    next.restamp_all();
    next.bump_version();
    debug!(version = next.version(), "moved {} {} {}", dragged, position, target);
    next
}

/// Delete every node named in `ids`, handing each one's children to its parent.
///
/// Promoted children keep their order and go after the parent's existing
/// children (after the existing roots when a root is deleted). Nodes are
/// processed deepest first so a deleted descendant has already handed its
/// children up before its deleted ancestor does the same. Ids that are
/// unknown, repeated, or already gone are skipped. Stamps of the result are
/// re-derived from the structure, as after a move.
#[instrument(level = "debug", skip(forest, ids))]
pub fn delete_and_reparent<S: AsRef<str>>(forest: &Forest, ids: &[S]) -> Forest {
    let pending: Vec<NodeId> = ids
        .iter()
        .filter_map(|id| forest.index_of(id.as_ref()).map(|idx| (id.as_ref(), idx)))
        .sorted_by_key(|&(_, idx)| Reverse(forest.structural_depth(idx)))
        .map(|(id, _)| NodeId::from(id))
        .collect();

    if pending.is_empty() {
        debug!("nothing to delete");
        return forest.clone();
    }

    let mut next = forest.clone();
    let mut removed = 0usize;
    for id in &pending {
        match next.index_of(id.as_str()) {
            Some(idx) => {
                if next.remove_and_promote(idx).is_some() {
                    removed += 1;
                }
            }
            None => debug!(%id, "already removed, skipping"),
        }
    }

    if removed == 0 {
        return forest.clone();
    }
    next.restamp_all();
    next.bump_version();
    debug!(removed, version = next.version(), "deleted nodes");
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::GroupPayload;

    fn chain() -> Forest {
        let mut forest = Forest::new();
        forest.insert("a", GroupPayload::named("A"), None).unwrap();
        forest.insert("b", GroupPayload::named("B"), Some("a")).unwrap();
        forest.insert("c", GroupPayload::named("C"), Some("b")).unwrap();
        forest
    }

    #[test]
    fn given_target_inside_dragged_subtree_when_moving_then_returns_input() {
        let forest = chain();
        let result = move_node(&forest, "a", "c", DropPosition::Inside);
        assert_eq!(result, forest);
        assert_eq!(result.version(), forest.version());
    }

    #[test]
    fn given_repeated_id_when_deleting_then_deletes_once() {
        let forest = chain();
        let result = delete_and_reparent(&forest, &["b", "b"]);
        assert_eq!(result.len(), 2);
        assert_eq!(result.version(), forest.version() + 1);
    }
}
