//! Group tree service
//!
//! Owns the current forest and applies edits to it: checks the drag/drop
//! policy, runs the engine, validates and commits. The host is told about
//! committed edits by [`GroupTreeService::notify`], which the caller runs once
//! the new forest is persisted.

use std::collections::BTreeMap;
use std::sync::Arc;

use itertools::Itertools;
use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{
    can_drag, can_drop, check, delete_and_reparent, move_node, DomainError, DropPosition, Forest,
    ForestBuilder, GroupRecord,
};
use crate::infrastructure::traits::{ActionInvoker, GroupRepository};

/// Caller-side rules applied around the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditPolicy {
    /// Allow picking up level-0 groups
    pub allow_root_drag: bool,
    /// Run the validator before committing an edit
    pub validate_after_edit: bool,
    /// Action run after every committed edit
    pub on_change_action: Option<String>,
}

impl Default for EditPolicy {
    fn default() -> Self {
        Self {
            allow_root_drag: false,
            validate_after_edit: true,
            on_change_action: None,
        }
    }
}

/// Service holding one forest and serializing edits to it.
pub struct GroupTreeService {
    repository: Arc<dyn GroupRepository>,
    invoker: Arc<dyn ActionInvoker>,
    policy: EditPolicy,
    forest: Forest,
    /// Action parameters of the last committed edit not yet reported
    pending: Option<BTreeMap<String, String>>,
}

impl GroupTreeService {
    /// Create a service with an empty forest.
    pub fn new(
        repository: Arc<dyn GroupRepository>,
        invoker: Arc<dyn ActionInvoker>,
        policy: EditPolicy,
    ) -> Self {
        Self {
            repository,
            invoker,
            policy,
            forest: Forest::new(),
            pending: None,
        }
    }

    /// Start from an existing forest (e.g. a loaded snapshot).
    pub fn with_forest(mut self, forest: Forest) -> Self {
        self.forest = forest;
        self
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn into_forest(self) -> Forest {
        self.forest
    }

    /// Replace the forest with one built from the repository's records.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&mut self) -> ApplicationResult<&Forest> {
        let records = self.repository.fetch_all().with_context("fetch group records")?;
        let forest = ForestBuilder::default().build(&records)?;
        info!("loaded {} groups", forest.len());
        self.forest = forest;
        Ok(&self.forest)
    }

    /// Move a group; rejected moves leave the forest untouched.
    ///
    /// A committed move is reported to the host by the next [`notify`](Self::notify).
    #[instrument(level = "debug", skip(self))]
    pub fn move_group(
        &mut self,
        dragged: &str,
        target: &str,
        position: DropPosition,
    ) -> ApplicationResult<&Forest> {
        let node = self
            .forest
            .find_by_id(dragged)
            .ok_or_else(|| DomainError::NodeNotFound(dragged.to_string()))?;
        if !self.forest.contains(target) {
            return Err(DomainError::NodeNotFound(target.to_string()).into());
        }
        if !self.policy.allow_root_drag && !can_drag(node) {
            return Err(ApplicationError::RootNotDraggable(dragged.to_string()));
        }
        if !can_drop(&self.forest, dragged, target, position) {
            return Err(ApplicationError::IllegalMove {
                dragged: dragged.to_string(),
                target: target.to_string(),
                position,
            });
        }

        let next = move_node(&self.forest, dragged, target, position);
        let params = BTreeMap::from([
            ("operation".to_string(), "move".to_string()),
            ("dragged".to_string(), dragged.to_string()),
            ("target".to_string(), target.to_string()),
            ("position".to_string(), position.to_string()),
        ]);
        self.commit(next, params)?;
        Ok(&self.forest)
    }

    /// Delete groups, promoting their children. Returns how many were removed.
    ///
    /// Only removed ids are reported to the host by the next [`notify`](Self::notify).
    #[instrument(level = "debug", skip(self, ids))]
    pub fn delete_groups<S: AsRef<str>>(&mut self, ids: &[S]) -> ApplicationResult<usize> {
        let next = delete_and_reparent(&self.forest, ids);
        let removed = self.forest.len() - next.len();
        if removed == 0 {
            debug!("no groups deleted");
            return Ok(0);
        }
        let deleted = ids
            .iter()
            .map(|id| id.as_ref())
            .filter(|&id| self.forest.contains(id) && !next.contains(id))
            .unique()
            .join(",");
        let params = BTreeMap::from([
            ("operation".to_string(), "delete".to_string()),
            ("deleted".to_string(), deleted),
        ]);
        self.commit(next, params)?;
        Ok(removed)
    }

    /// External record joined to the node `id` by its name.
    pub fn lookup(&self, id: &str) -> ApplicationResult<Option<GroupRecord>> {
        let node = self
            .forest
            .find_by_id(id)
            .ok_or_else(|| DomainError::NodeNotFound(id.to_string()))?;
        self.repository
            .fetch_by_name(node.name())
            .with_context("fetch group record")
    }

    fn commit(&mut self, next: Forest, mut params: BTreeMap<String, String>) -> ApplicationResult<()> {
        if self.policy.validate_after_edit {
            check(&next).map_err(ApplicationError::Inconsistent)?;
        }
        self.forest = next;
        debug!(version = self.forest.version(), "committed edit");

        params.insert("version".to_string(), self.forest.version().to_string());
        self.pending = Some(params);
        Ok(())
    }

    /// True if a committed edit has not been reported to the host yet.
    pub fn has_pending_change(&self) -> bool {
        self.pending.is_some()
    }

    /// Run the on-change action for the last committed edit, if any.
    ///
    /// The edit stays committed when the action fails.
    #[instrument(level = "debug", skip(self))]
    pub fn notify(&mut self) -> ApplicationResult<()> {
        let Some(params) = self.pending.take() else {
            return Ok(());
        };
        let Some(action) = &self.policy.on_change_action else {
            debug!("no on-change action configured");
            return Ok(());
        };
        self.invoker
            .run_action(action, &params)
            .with_context("run on-change action")
    }
}
