//! Domain entities: core data structures

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Opaque identifier of a group node, unique across a forest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Data carried by a group node.
///
/// Structural operations never look inside the payload; it travels with its
/// node unchanged. `name` doubles as the join key to the external group record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPayload {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_count: Option<u32>,
}

impl GroupPayload {
    /// Payload with only a display name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Where a dragged node lands relative to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropPosition {
    /// Sibling, directly in front of the target
    Before,
    /// Sibling, directly behind the target
    After,
    /// Last child of the target
    Inside,
}

impl DropPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            DropPosition::Before => "before",
            DropPosition::After => "after",
            DropPosition::Inside => "inside",
        }
    }
}

impl fmt::Display for DropPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DropPosition {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "before" => Ok(DropPosition::Before),
            "after" => Ok(DropPosition::After),
            "inside" => Ok(DropPosition::Inside),
            other => Err(DomainError::InvalidPosition(other.to_string())),
        }
    }
}

/// Flat group record as delivered by the external data source.
///
/// Parent links are by name; a missing or unknown parent makes the group a root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_count: Option<u32>,
}

impl GroupRecord {
    pub fn new(name: impl Into<String>, parent: Option<&str>) -> Self {
        Self {
            name: name.into(),
            parent: parent.map(str::to_string),
            ..Self::default()
        }
    }
}

/// One row of the flattened hierarchy handed to a storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatEntry {
    pub name: String,
    pub parent_name: Option<String>,
    pub level: usize,
}

/// Nested snapshot view of a node and its subtree.
///
/// This is the shape the table layer renders and the shape snapshots are
/// stored in. Stamps (`level`, `parent_id`) are kept as given, so an
/// inconsistent snapshot loads fine and is reported by the validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupNode {
    pub id: NodeId,
    #[serde(flatten)]
    pub payload: GroupPayload,
    pub level: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<GroupNode>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_mixed_case_position_when_parsing_then_accepts() {
        assert_eq!("Before".parse::<DropPosition>(), Ok(DropPosition::Before));
        assert_eq!(" inside ".parse::<DropPosition>(), Ok(DropPosition::Inside));
        assert_eq!(DropPosition::After.to_string(), "after");
    }

    #[test]
    fn given_unknown_position_when_parsing_then_returns_error() {
        let err = "below".parse::<DropPosition>().unwrap_err();
        assert_eq!(err, DomainError::InvalidPosition("below".to_string()));
    }

    #[test]
    fn given_snapshot_json_when_deserializing_then_reads_camel_case_fields() {
        let json = r#"{"id":"1","name":"Org","level":0,"appCount":3,
            "children":[{"id":"1-1","name":"Team","level":1,"parentId":"1"}]}"#;
        let node: GroupNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.payload.app_count, Some(3));
        assert_eq!(node.children[0].parent_id, Some(NodeId::from("1")));
        assert!(node.children[0].children.is_empty());
    }
}
