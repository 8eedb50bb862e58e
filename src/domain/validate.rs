//! Structural consistency checks for a forest.

use tracing::warn;

use crate::domain::arena::Forest;
use crate::domain::error::DomainError;

/// Check every root and every parent/child pair; report the first violation.
///
/// Roots must carry level 0 and no parent id. Each child must sit one level
/// below its parent and carry the parent's id.
pub fn check(forest: &Forest) -> Result<(), DomainError> {
    for root in forest.iter().filter(|node| node.is_root()) {
        if root.level != 0 || root.parent_id.is_some() {
            return Err(DomainError::RootHasParent {
                node: root.id.clone(),
                level: root.level,
            });
        }
    }
    for node in forest.iter() {
        for child in forest.children(node) {
            if child.level != node.level + 1 {
                return Err(DomainError::LevelMismatch {
                    node: child.id.clone(),
                    expected: node.level + 1,
                    found: child.level,
                });
            }
            if child.parent_id.as_ref() != Some(&node.id) {
                return Err(DomainError::ParentMismatch {
                    node: child.id.clone(),
                    expected: node.id.clone(),
                    found: child.parent_id.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Boolean form of [`check`]; the failing node is logged.
pub fn validate(forest: &Forest) -> bool {
    match check(forest) {
        Ok(()) => true,
        Err(e) => {
            warn!("{}", e);
            false
        }
    }
}
