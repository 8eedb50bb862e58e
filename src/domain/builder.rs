//! Forest builder: turns flat group records into a group forest.

use std::collections::HashMap;

use tracing::{debug, instrument};

use crate::domain::arena::Forest;
use crate::domain::entities::{GroupPayload, GroupRecord};
use crate::domain::error::DomainError;

/// Result type for tree construction.
pub type TreeResult<T> = Result<T, DomainError>;

/// Constructs a forest from `(name, parent name)` records.
///
/// Ids are assigned from the record position (`group-1`, `group-2`, ...).
/// A record without a parent, or whose parent names no record, becomes a
/// root. Children keep record order.
pub struct ForestBuilder {
    id_prefix: String,
}

impl Default for ForestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ForestBuilder {
    pub fn new() -> Self {
        Self {
            id_prefix: "group".to_string(),
        }
    }

    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = prefix.into();
        self
    }

    /// Build the forest, levels stamped top-down.
    #[instrument(level = "debug", skip(self, records), fields(records = records.len()))]
    pub fn build(&self, records: &[GroupRecord]) -> TreeResult<Forest> {
        let mut by_name: HashMap<&str, usize> = HashMap::new();
        for (pos, record) in records.iter().enumerate() {
            if by_name.insert(record.name.as_str(), pos).is_some() {
                return Err(DomainError::DuplicateName(record.name.clone()));
            }
        }

        // Children per parent position, in record order
        let mut children: HashMap<usize, Vec<usize>> = HashMap::new();
        let mut roots = Vec::new();
        for (pos, record) in records.iter().enumerate() {
            match record
                .parent
                .as_deref()
                .and_then(|parent| by_name.get(parent))
            {
                Some(&parent_pos) => children.entry(parent_pos).or_default().push(pos),
                None => roots.push(pos),
            }
        }

        let mut forest = Forest::new();
        let mut placed = vec![false; records.len()];
        let mut stack: Vec<(usize, Option<String>)> =
            roots.iter().rev().map(|&pos| (pos, None)).collect();

        while let Some((pos, parent_id)) = stack.pop() {
            let id = self.node_id(pos);
            forest.insert(id.as_str(), Self::payload(&records[pos]), parent_id.as_deref())?;
            placed[pos] = true;
            if let Some(kids) = children.get(&pos) {
                for &child in kids.iter().rev() {
                    stack.push((child, Some(id.clone())));
                }
            }
        }

        // Anything not reached from a root hangs off a parent loop
        if let Some(pos) = placed.iter().position(|&p| !p) {
            return Err(DomainError::CycleDetected(records[pos].name.clone()));
        }

        debug!(nodes = forest.len(), roots = roots.len(), "built forest");
        Ok(forest)
    }

    fn node_id(&self, pos: usize) -> String {
        format!("{}-{}", self.id_prefix, pos + 1)
    }

    fn payload(record: &GroupRecord) -> GroupPayload {
        GroupPayload {
            name: record.name.clone(),
            description: Some(
                record
                    .description
                    .clone()
                    .unwrap_or_else(|| format!("Group: {}", record.name)),
            ),
            uuid: record.uuid.clone(),
            app_count: Some(record.app_count.unwrap_or(0)),
            resource_count: Some(record.resource_count.unwrap_or(0)),
        }
    }
}
