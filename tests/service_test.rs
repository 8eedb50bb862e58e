//! Tests for GroupTreeService with in-memory collaborators

use std::collections::BTreeMap;
use std::io;
use std::sync::{Arc, Mutex};

use grouptree::application::services::{EditPolicy, GroupTreeService};
use grouptree::application::ApplicationError;
use grouptree::config::Settings;
use grouptree::domain::{DomainError, DropPosition, GroupRecord, NodeId};
use grouptree::infrastructure::di::ServiceContainer;
use grouptree::infrastructure::traits::{
    ActionInvoker, InMemoryGroupRepository, NoopActionInvoker,
};
use grouptree::util::testing::{init_test_setup, sample_forest};

type Calls = Vec<(String, BTreeMap<String, String>)>;

/// Remembers every action it is asked to run.
#[derive(Default)]
struct RecordingInvoker {
    calls: Mutex<Calls>,
    fail: bool,
}

impl RecordingInvoker {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn calls(&self) -> Calls {
        self.calls.lock().unwrap().clone()
    }
}

impl ActionInvoker for RecordingInvoker {
    fn run_action(&self, name: &str, params: &BTreeMap<String, String>) -> io::Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((name.to_string(), params.clone()));
        if self.fail {
            return Err(io::Error::other("action failed"));
        }
        Ok(())
    }
}

fn records() -> Vec<GroupRecord> {
    let mut platform = GroupRecord::new("Platform Group", Some("Organization"));
    platform.app_count = Some(12);
    vec![
        GroupRecord::new("Organization", None),
        platform,
        GroupRecord::new("Digital Marketing", Some("Platform Group")),
        GroupRecord::new("Operations", Some("Organization")),
    ]
}

fn service_with(policy: EditPolicy, invoker: Arc<dyn ActionInvoker>) -> GroupTreeService {
    let repository = Arc::new(InMemoryGroupRepository::new(records()));
    GroupTreeService::new(repository, invoker, policy)
}

fn notifying_policy() -> EditPolicy {
    EditPolicy {
        on_change_action: Some("sync-groups".to_string()),
        ..EditPolicy::default()
    }
}

#[test]
fn given_records_when_loading_then_service_holds_forest() {
    init_test_setup();
    let mut service = service_with(EditPolicy::default(), Arc::new(NoopActionInvoker));

    let forest = service.load().unwrap();

    assert_eq!(forest.len(), 4);
    assert_eq!(forest.root_ids(), vec![NodeId::from("group-1")]);
}

#[test]
fn given_legal_move_when_moving_and_notifying_then_host_sees_the_move() {
    // Arrange
    let invoker = Arc::new(RecordingInvoker::default());
    let mut service = service_with(notifying_policy(), invoker.clone());
    service.load().unwrap();

    // Act
    let forest = service
        .move_group("group-4", "group-2", DropPosition::Before)
        .unwrap();
    assert_eq!(
        forest.child_ids("group-1"),
        vec![NodeId::from("group-4"), NodeId::from("group-2")]
    );
    // Nothing reaches the host before notify
    assert!(invoker.calls().is_empty());
    assert!(service.has_pending_change());
    service.notify().unwrap();

    // Assert
    assert!(!service.has_pending_change());
    let calls = invoker.calls();
    assert_eq!(calls.len(), 1);
    let (name, params) = &calls[0];
    assert_eq!(name, "sync-groups");
    assert_eq!(params["operation"], "move");
    assert_eq!(params["dragged"], "group-4");
    assert_eq!(params["target"], "group-2");
    assert_eq!(params["position"], "before");
    assert_eq!(params["version"], "1");
}

#[test]
fn given_root_when_moving_then_rejected_unless_policy_allows() {
    let mut service = service_with(EditPolicy::default(), Arc::new(NoopActionInvoker));
    service.load().unwrap();

    let result = service.move_group("group-1", "group-3", DropPosition::After);
    assert!(matches!(result, Err(ApplicationError::RootNotDraggable(id)) if id == "group-1"));

    let policy = EditPolicy {
        allow_root_drag: true,
        ..EditPolicy::default()
    };
    let mut service = service_with(policy, Arc::new(NoopActionInvoker));
    service.load().unwrap();
    // Target sits inside the dragged subtree, so the drop itself is illegal
    let result = service.move_group("group-1", "group-3", DropPosition::After);
    assert!(matches!(result, Err(ApplicationError::IllegalMove { .. })));
}

#[test]
fn given_drop_without_effect_when_moving_then_illegal_and_forest_untouched() {
    let invoker = Arc::new(RecordingInvoker::default());
    let mut service = service_with(notifying_policy(), invoker.clone());
    service.load().unwrap();
    let before = service.forest().clone();

    let result = service.move_group("group-2", "group-1", DropPosition::Inside);

    assert!(matches!(
        result,
        Err(ApplicationError::IllegalMove {
            position: DropPosition::Inside,
            ..
        })
    ));
    assert_eq!(service.forest(), &before);
    assert_eq!(service.forest().version(), before.version());
    service.notify().unwrap();
    assert!(invoker.calls().is_empty());
}

#[test]
fn given_unknown_node_when_moving_then_reports_not_found() {
    let mut service = service_with(EditPolicy::default(), Arc::new(NoopActionInvoker));
    service.load().unwrap();

    let dragged = service.move_group("nope", "group-1", DropPosition::Inside).map(|_| ());
    let target = service.move_group("group-2", "nope", DropPosition::Inside).map(|_| ());

    assert!(matches!(
        dragged,
        Err(ApplicationError::Domain(DomainError::NodeNotFound(id))) if id == "nope"
    ));
    assert!(matches!(
        target,
        Err(ApplicationError::Domain(DomainError::NodeNotFound(_)))
    ));
}

#[test]
fn given_ids_when_deleting_then_host_sees_only_removed_ids() {
    let invoker = Arc::new(RecordingInvoker::default());
    let mut service = service_with(notifying_policy(), invoker.clone());
    service.load().unwrap();

    let removed = service
        .delete_groups(&["group-2", "missing", "group-2"])
        .unwrap();
    service.notify().unwrap();
    service.notify().unwrap();

    assert_eq!(removed, 1);
    let forest = service.forest();
    assert_eq!(forest.find_by_id("group-3").unwrap().level, 1);
    let calls = invoker.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1["operation"], "delete");
    assert_eq!(calls[0].1["deleted"], "group-2");
}

#[test]
fn given_only_unknown_ids_when_deleting_then_nothing_committed() {
    let invoker = Arc::new(RecordingInvoker::default());
    let mut service = service_with(notifying_policy(), invoker.clone());
    service.load().unwrap();

    let removed = service.delete_groups(&["missing"]).unwrap();
    service.notify().unwrap();

    assert_eq!(removed, 0);
    assert_eq!(service.forest().version(), 0);
    assert!(invoker.calls().is_empty());
}

#[test]
fn given_failing_action_when_notifying_then_reports_failure_and_keeps_edit() {
    let invoker = Arc::new(RecordingInvoker::failing());
    let mut service = service_with(notifying_policy(), invoker.clone());
    service.load().unwrap();

    service
        .move_group("group-3", "group-1", DropPosition::Inside)
        .unwrap();
    let result = service.notify();

    assert!(matches!(
        result,
        Err(ApplicationError::OperationFailed { ref context, .. }) if context == "run on-change action"
    ));
    // The edit itself stays committed
    assert_eq!(service.forest().version(), 1);
    assert_eq!(service.forest().find_by_id("group-3").unwrap().level, 1);
}

#[test]
fn given_node_when_looking_up_then_returns_record_by_name() {
    let mut service = service_with(EditPolicy::default(), Arc::new(NoopActionInvoker));
    service.load().unwrap();

    let record = service.lookup("group-2").unwrap().unwrap();

    assert_eq!(record.name, "Platform Group");
    assert_eq!(record.app_count, Some(12));
    assert!(service.lookup("missing").is_err());
}

#[test]
fn given_container_when_building_service_then_policy_follows_settings() {
    let settings = Settings {
        allow_root_drag: true,
        ..Settings::default()
    };
    let container = ServiceContainer::with_deps(
        settings,
        Arc::new(InMemoryGroupRepository::default()),
        Arc::new(NoopActionInvoker),
    );

    let mut service = container.group_tree_service(sample_forest());

    assert!(container.edit_policy().allow_root_drag);
    // Root drag is allowed now
    let forest = service
        .move_group("2", "1-1", DropPosition::Inside)
        .unwrap();
    assert_eq!(forest.find_by_id("2").unwrap().level, 2);
}
