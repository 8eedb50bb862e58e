//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::entities::NodeId;

/// Domain errors represent structural violations of the group hierarchy.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("duplicate node id: {0}")]
    DuplicateId(NodeId),

    #[error("duplicate group name: {0}")]
    DuplicateName(String),

    #[error("cycle detected in group hierarchy at: {0}")]
    CycleDetected(String),

    #[error("level inconsistency: {node} should be level {expected}, but is {found}")]
    LevelMismatch {
        node: NodeId,
        expected: usize,
        found: usize,
    },

    #[error("parent id inconsistency: {node} parent should be {expected}, but is {}", or_none(.found))]
    ParentMismatch {
        node: NodeId,
        expected: NodeId,
        found: Option<NodeId>,
    },

    #[error("root node {node} must have level 0 and no parent (level {level})")]
    RootHasParent { node: NodeId, level: usize },

    #[error("invalid drop position: {0} (expected before, after or inside)")]
    InvalidPosition(String),
}

fn or_none(id: &Option<NodeId>) -> &str {
    id.as_ref().map(NodeId::as_str).unwrap_or("<none>")
}
