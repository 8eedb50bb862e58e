//! Service container for dependency injection
//!
//! Wires up the group tree service with its collaborators.

use std::sync::Arc;

use crate::application::services::{EditPolicy, GroupTreeService};
use crate::config::Settings;
use crate::domain::Forest;
use crate::infrastructure::traits::{
    ActionInvoker, CommandActionInvoker, GroupRepository, NoopActionInvoker, TomlGroupRepository,
};

/// Container holding settings and collaborators.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Group record source
    pub repository: Arc<dyn GroupRepository>,

    /// Host action hook
    pub invoker: Arc<dyn ActionInvoker>,
}

impl ServiceContainer {
    /// Create a service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        let repository = Arc::new(TomlGroupRepository::new(settings.records_file.clone()));
        let invoker: Arc<dyn ActionInvoker> = if settings.on_change_action.is_some() {
            Arc::new(CommandActionInvoker)
        } else {
            Arc::new(NoopActionInvoker)
        };
        Self::with_deps(settings, repository, invoker)
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        repository: Arc<dyn GroupRepository>,
        invoker: Arc<dyn ActionInvoker>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            repository,
            invoker,
        }
    }

    /// Edit rules derived from the settings.
    pub fn edit_policy(&self) -> EditPolicy {
        EditPolicy {
            allow_root_drag: self.settings.allow_root_drag,
            validate_after_edit: self.settings.validate_after_edit,
            on_change_action: self.settings.on_change_action.clone(),
        }
    }

    /// Group tree service working on `forest`.
    pub fn group_tree_service(&self, forest: Forest) -> GroupTreeService {
        GroupTreeService::new(
            Arc::clone(&self.repository),
            Arc::clone(&self.invoker),
            self.edit_policy(),
        )
        .with_forest(forest)
    }
}
