//! Arena-backed forest of group nodes.
//!
//! Nodes live in a generational arena and reference each other by index;
//! an id map gives O(1) lookup by [`NodeId`]. The nested view
//! ([`GroupNode`]) is derived on demand for rendering and snapshots.

use std::collections::HashMap;

use generational_arena::{Arena, Index};
use tracing::{instrument, trace};

use crate::domain::entities::{FlatEntry, GroupNode, GroupPayload, NodeId};
use crate::domain::error::DomainError;

/// Group node in the arena-based forest.
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Forest-unique identifier
    pub id: NodeId,
    /// Opaque group data, untouched by structural edits
    pub payload: GroupPayload,
    /// Depth stamp, 0 for roots
    pub level: usize,
    /// Id of the direct parent, None for roots
    pub parent_id: Option<NodeId>,
    /// Index of parent node in the arena, None for root nodes
    pub(crate) parent: Option<Index>,
    /// Indices of child nodes in display order
    pub(crate) children: Vec<Index>,
}

impl TreeNode {
    pub fn name(&self) -> &str {
        &self.payload.name
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}

/// Ordered collection of group trees.
///
/// A `Forest` is a value: engine operations take `&Forest` and hand back a new
/// one, so a caller may hold on to the previous snapshot. `version` grows by
/// one with every applied edit and is left alone by no-ops.
#[derive(Debug, Clone)]
pub struct Forest {
    arena: Arena<TreeNode>,
    roots: Vec<Index>,
    ids: HashMap<NodeId, Index>,
    version: u64,
}

impl Default for Forest {
    fn default() -> Self {
        Self::new()
    }
}

/// Structural equality: same ids, payloads, stamps and ordering.
impl PartialEq for Forest {
    fn eq(&self, other: &Self) -> bool {
        self.to_nested() == other.to_nested()
    }
}

impl Forest {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            roots: Vec::new(),
            ids: HashMap::new(),
            version: 0,
        }
    }

    /// Append a node as the last child of `parent` (or as the last root).
    ///
    /// Level and parent id are stamped from the attachment point.
    #[instrument(level = "trace", skip(self, payload))]
    pub fn insert(
        &mut self,
        id: impl Into<NodeId> + std::fmt::Debug,
        payload: GroupPayload,
        parent: Option<&str>,
    ) -> Result<(), DomainError> {
        let id = id.into();
        if self.ids.contains_key(&id) {
            return Err(DomainError::DuplicateId(id));
        }
        let parent_idx = match parent {
            Some(parent_id) => Some(
                self.index_of(parent_id)
                    .ok_or_else(|| DomainError::NodeNotFound(parent_id.to_string()))?,
            ),
            None => None,
        };
        let node = TreeNode {
            id: id.clone(),
            payload,
            level: 0,
            parent_id: None,
            parent: None,
            children: Vec::new(),
        };
        let idx = self.arena.insert(node);
        self.ids.insert(id, idx);
        self.attach(idx, parent_idx, None);
        Ok(())
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains_key(id)
    }

    /// Root nodes in display order.
    pub fn roots(&self) -> impl Iterator<Item = &TreeNode> + '_ {
        self.roots.iter().filter_map(|&idx| self.arena.get(idx))
    }

    /// Direct children of `node` in display order.
    pub fn children<'a>(&'a self, node: &'a TreeNode) -> impl Iterator<Item = &'a TreeNode> + 'a {
        node.children.iter().filter_map(|&idx| self.arena.get(idx))
    }

    /// Ids of the direct children of `id`, empty when `id` is unknown.
    pub fn child_ids(&self, id: &str) -> Vec<NodeId> {
        self.find_by_id(id)
            .map(|node| self.children(node).map(|c| c.id.clone()).collect())
            .unwrap_or_default()
    }

    /// Ids of the roots in display order.
    pub fn root_ids(&self) -> Vec<NodeId> {
        self.roots().map(|n| n.id.clone()).collect()
    }

    #[instrument(level = "trace", skip(self))]
    pub fn find_by_id(&self, id: &str) -> Option<&TreeNode> {
        self.index_of(id).and_then(|idx| self.arena.get(idx))
    }

    /// Direct parent of `id`; None for roots and unknown ids.
    #[instrument(level = "trace", skip(self))]
    pub fn find_parent(&self, id: &str) -> Option<&TreeNode> {
        self.find_by_id(id)
            .and_then(|node| node.parent)
            .and_then(|idx| self.arena.get(idx))
    }

    /// True iff `node` sits somewhere below `ancestor` (never for itself).
    #[instrument(level = "trace", skip(self))]
    pub fn is_descendant(&self, ancestor: &str, node: &str) -> bool {
        let (Some(ancestor_idx), Some(node_idx)) = (self.index_of(ancestor), self.index_of(node))
        else {
            return false;
        };
        let mut current = self.arena.get(node_idx).and_then(|n| n.parent);
        while let Some(idx) = current {
            if idx == ancestor_idx {
                return true;
            }
            current = self.arena.get(idx).and_then(|n| n.parent);
        }
        false
    }

    /// Copy of the forest with every `level` and `parent_id` re-derived from
    /// the structure, roots first.
    #[instrument(level = "debug", skip(self))]
    pub fn recalculate_levels(&self) -> Forest {
        let mut forest = self.clone();
        forest.restamp_all();
        forest
    }

    /// Ids of `id` and everything below it, pre-order.
    pub fn subtree_ids(&self, id: &str) -> Vec<NodeId> {
        let mut ids = Vec::new();
        let mut stack: Vec<Index> = self.index_of(id).into_iter().collect();
        while let Some(idx) = stack.pop() {
            if let Some(node) = self.arena.get(idx) {
                ids.push(node.id.clone());
                stack.extend(node.children.iter().rev());
            }
        }
        ids
    }

    /// Number of node levels in the deepest tree, 0 for an empty forest.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.roots
            .iter()
            .map(|&root| self.calculate_depth(root))
            .max()
            .unwrap_or(0)
    }

    fn calculate_depth(&self, node_idx: Index) -> usize {
        if let Some(node) = self.arena.get(node_idx) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Collects the ids of all nodes without children, in display order.
    pub fn leaf_ids(&self) -> Vec<NodeId> {
        self.iter()
            .filter(|node| node.children.is_empty())
            .map(|node| node.id.clone())
            .collect()
    }

    /// Pre-order traversal over all trees, in display order.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    /// Post-order traversal: children before their parent.
    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self)
    }

    /// `(name, parent name, level)` rows in display order, for storage.
    pub fn flatten(&self) -> Vec<FlatEntry> {
        self.iter()
            .map(|node| FlatEntry {
                name: node.payload.name.clone(),
                parent_name: node
                    .parent
                    .and_then(|idx| self.arena.get(idx))
                    .map(|p| p.payload.name.clone()),
                level: node.level,
            })
            .collect()
    }

    /// Nested view of the whole forest.
    pub fn to_nested(&self) -> Vec<GroupNode> {
        self.roots
            .iter()
            .filter_map(|&idx| self.nested_node(idx))
            .collect()
    }

    fn nested_node(&self, idx: Index) -> Option<GroupNode> {
        let node = self.arena.get(idx)?;
        Some(GroupNode {
            id: node.id.clone(),
            payload: node.payload.clone(),
            level: node.level,
            parent_id: node.parent_id.clone(),
            children: node
                .children
                .iter()
                .filter_map(|&child| self.nested_node(child))
                .collect(),
        })
    }

    /// Load a nested view, keeping its stamps untouched.
    ///
    /// Fails only on duplicate ids; inconsistent stamps are left for the
    /// validator to report.
    #[instrument(level = "debug", skip(nodes))]
    pub fn from_nested(nodes: Vec<GroupNode>) -> Result<Forest, DomainError> {
        let mut forest = Forest::new();
        let mut stack: Vec<(GroupNode, Option<Index>)> =
            nodes.into_iter().rev().map(|n| (n, None)).collect();

        while let Some((mut group, parent)) = stack.pop() {
            if forest.ids.contains_key(&group.id) {
                return Err(DomainError::DuplicateId(group.id));
            }
            let children = std::mem::take(&mut group.children);
            let idx = forest.arena.insert(TreeNode {
                id: group.id.clone(),
                payload: group.payload,
                level: group.level,
                parent_id: group.parent_id,
                parent,
                children: Vec::new(),
            });
            forest.ids.insert(group.id, idx);
            match parent.and_then(|p| forest.arena.get_mut(p)) {
                Some(parent_node) => parent_node.children.push(idx),
                None => forest.roots.push(idx),
            }
            stack.extend(children.into_iter().rev().map(|c| (c, Some(idx))));
        }
        Ok(forest)
    }

    // ----------------------------------------------------------------
    // Crate-internal structure editing, used by the engines.
    // ----------------------------------------------------------------

    pub(crate) fn index_of(&self, id: &str) -> Option<Index> {
        self.ids.get(id).copied()
    }

    /// Container (None = root list) and offset of `id` within it.
    pub(crate) fn position_of(&self, id: &str) -> Option<(Option<Index>, usize)> {
        let idx = self.index_of(id)?;
        let parent = self.arena.get(idx)?.parent;
        let offset = self.container(parent)?.iter().position(|&i| i == idx)?;
        Some((parent, offset))
    }

    /// Number of edges between `idx` and its root.
    pub(crate) fn structural_depth(&self, idx: Index) -> usize {
        let mut depth = 0;
        let mut current = self.arena.get(idx).and_then(|n| n.parent);
        while let Some(parent) = current {
            depth += 1;
            current = self.arena.get(parent).and_then(|n| n.parent);
        }
        depth
    }

    pub(crate) fn bump_version(&mut self) {
        self.version += 1;
    }

    fn container(&self, parent: Option<Index>) -> Option<&Vec<Index>> {
        match parent {
            None => Some(&self.roots),
            Some(p) => self.arena.get(p).map(|n| &n.children),
        }
    }

    fn container_mut(&mut self, parent: Option<Index>) -> Option<&mut Vec<Index>> {
        match parent {
            None => Some(&mut self.roots),
            Some(p) => self.arena.get_mut(p).map(|n| &mut n.children),
        }
    }

    /// Unlink `idx` from its container; the subtree below it stays intact.
    pub(crate) fn detach(&mut self, idx: Index) {
        let Some(parent) = self.arena.get(idx).map(|n| n.parent) else {
            return;
        };
        if let Some(container) = self.container_mut(parent) {
            container.retain(|&i| i != idx);
        }
        if let Some(node) = self.arena.get_mut(idx) {
            node.parent = None;
        }
    }

    /// Link a detached `idx` under `parent` (None = root list) at `at`
    /// (None = append) and re-stamp its subtree.
    pub(crate) fn attach(&mut self, idx: Index, parent: Option<Index>, at: Option<usize>) {
        let (level, parent_id) = match parent {
            None => (0, None),
            Some(p) => match self.arena.get(p) {
                Some(parent_node) => (parent_node.level + 1, Some(parent_node.id.clone())),
                None => return,
            },
        };
        if let Some(container) = self.container_mut(parent) {
            let at = at.unwrap_or(container.len()).min(container.len());
            container.insert(at, idx);
        }
        if let Some(node) = self.arena.get_mut(idx) {
            node.parent = parent;
        }
        self.stamp_subtree(idx, level, parent_id);
    }

    /// Drop `idx` from the forest; its children move, in order, to the end of
    /// the container `idx` lived in.
    pub(crate) fn remove_and_promote(&mut self, idx: Index) -> Option<TreeNode> {
        let (parent, children) = {
            let node = self.arena.get(idx)?;
            (node.parent, node.children.clone())
        };
        self.detach(idx);
        for child in children {
            if let Some(node) = self.arena.get_mut(child) {
                node.parent = None;
            }
            self.attach(child, parent, None);
        }
        let removed = self.arena.remove(idx)?;
        self.ids.remove(&removed.id);
        trace!(id = %removed.id, "removed node");
        Some(removed)
    }

    fn stamp_subtree(&mut self, idx: Index, level: usize, parent_id: Option<NodeId>) {
        let mut stack = vec![(idx, level, parent_id)];
        while let Some((current, level, parent_id)) = stack.pop() {
            let Some(node) = self.arena.get_mut(current) else {
                continue;
            };
            node.level = level;
            node.parent_id = parent_id;
            let id = node.id.clone();
            for &child in &node.children {
                stack.push((child, level + 1, Some(id.clone())));
            }
        }
    }

    pub(crate) fn restamp_all(&mut self) {
        for root in self.roots.clone() {
            self.stamp_subtree(root, 0, None);
        }
    }
}

pub struct TreeIterator<'a> {
    forest: &'a Forest,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(forest: &'a Forest) -> Self {
        // Reverse so the first root is popped first
        let stack = forest.roots.iter().rev().copied().collect();
        Self { forest, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.forest.arena.get(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some(node);
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    forest: &'a Forest,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(forest: &'a Forest) -> Self {
        let stack = forest.roots.iter().rev().map(|&idx| (idx, false)).collect();
        Self { forest, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.forest.arena.get(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some(node);
                }
            }
        }
        None
    }
}
