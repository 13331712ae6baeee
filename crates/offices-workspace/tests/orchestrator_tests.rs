use async_trait::async_trait;
use offices_core::{
    Diagnostics, GroupDefinition, GroupHandle, GroupRoleLink, OfficesConfig, ProvisioningApi,
    ProvisioningError, RecordId, SecurityRole, Slug, UserRef, ValidationFailure,
    WorkspaceDefinition, WorkspaceHandle,
};
use offices_test_utils::{berlin, office_record, test_config, user, InMemoryProvisioner};
use offices_workspace::{EventOutcome, RecordEvent, WorkspaceLifecycleOrchestrator, WorkspaceState};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

fn setup() -> (Arc<InMemoryProvisioner>, WorkspaceLifecycleOrchestrator, OfficesConfig) {
    let config = test_config();
    let provisioner = Arc::new(InMemoryProvisioner::new());
    let orchestrator = WorkspaceLifecycleOrchestrator::new(
        provisioner.clone(),
        Arc::new(config.clone()),
        Diagnostics::new(config.diagnostics.clone()),
    );
    (provisioner, orchestrator, config)
}

#[tokio::test]
async fn berlin_is_provisioned_then_removed() {
    let (provisioner, orchestrator, config) = setup();

    let outcome = orchestrator.handle(RecordEvent::ItemAdded(berlin(&config, 42))).await;
    assert_eq!(
        outcome,
        EventOutcome::Provisioned {
            slug: Slug::from_raw("user-web-42"),
            memberships: 3,
        }
    );

    let workspace = provisioner.workspace("user-web-42").expect("workspace exists");
    assert_eq!(workspace.definition.title, "Berlin");
    assert_eq!(workspace.definition.template, "STS#0");
    assert!(workspace.definition.break_role_inheritance);
    assert_eq!(
        workspace.links.iter().map(|l| l.role).collect::<Vec<_>>(),
        vec![
            SecurityRole::Administrator,
            SecurityRole::Contributor,
            SecurityRole::Reader
        ]
    );

    for group in [
        "Berlin - Office Owners",
        "Berlin - Office Members",
        "Berlin - Office Visitors",
    ] {
        assert_eq!(provisioner.group_owner(group).as_deref(), Some("alice"));
    }
    assert_eq!(provisioner.group_members("Berlin - Office Owners"), vec!["alice"]);
    assert_eq!(provisioner.group_members("Berlin - Office Members"), vec!["alice", "bob"]);
    assert!(provisioner.group_members("Berlin - Office Visitors").is_empty());
    assert_eq!(orchestrator.tracker().state(RecordId(42)), WorkspaceState::Provisioned);

    let outcome = orchestrator.handle(RecordEvent::ItemDeleted(RecordId(42))).await;
    assert_eq!(
        outcome,
        EventOutcome::Deprovisioned {
            slug: Slug::from_raw("user-web-42"),
        }
    );
    assert!(provisioner.workspace("user-web-42").is_none());
    assert_eq!(orchestrator.tracker().state(RecordId(42)), WorkspaceState::Deleted);
}

#[tokio::test]
async fn repeated_upsert_converges() {
    let (provisioner, orchestrator, config) = setup();

    orchestrator.handle(RecordEvent::ItemAdded(berlin(&config, 42))).await;
    let outcome = orchestrator.handle(RecordEvent::ItemUpdated(berlin(&config, 42))).await;

    assert!(matches!(outcome, EventOutcome::Provisioned { .. }));
    assert_eq!(provisioner.workspace_count(), 1);
    assert_eq!(provisioner.group_names().len(), 3);
    assert_eq!(provisioner.group_members("Berlin - Office Members"), vec!["alice", "bob"]);
    assert_eq!(provisioner.workspace("user-web-42").unwrap().links.len(), 3);
}

#[tokio::test]
async fn update_refreshes_title_and_groups() {
    let (provisioner, orchestrator, config) = setup();
    orchestrator.handle(RecordEvent::ItemAdded(berlin(&config, 42))).await;

    let renamed = office_record(
        &config,
        42,
        Some("Berlin Mitte"),
        Some(user(2, "bob")),
        vec![user(3, "carol")],
    );
    orchestrator.handle(RecordEvent::ItemUpdated(renamed)).await;

    assert_eq!(provisioner.workspace_count(), 1);
    assert_eq!(
        provisioner.workspace("user-web-42").unwrap().definition.title,
        "Berlin Mitte"
    );
    assert_eq!(
        provisioner.group_owner("Berlin Mitte - Office Owners").as_deref(),
        Some("bob")
    );
    assert_eq!(provisioner.group_members("Berlin Mitte - Office Members"), vec!["carol"]);
}

#[tokio::test]
async fn non_actionable_records_make_no_calls() {
    let (provisioner, orchestrator, config) = setup();
    let members = vec![user(1, "alice")];

    let cases = [
        (
            office_record(&config, 1, None, Some(user(1, "alice")), members.clone()),
            ValidationFailure::MissingName,
        ),
        (
            office_record(&config, 2, Some("   "), Some(user(1, "alice")), members.clone()),
            ValidationFailure::MissingName,
        ),
        (
            office_record(&config, 3, Some("Paris"), None, members.clone()),
            ValidationFailure::MissingDirector,
        ),
        (
            office_record(&config, 4, Some("Paris"), Some(user(1, "alice")), Vec::new()),
            ValidationFailure::MissingMembers,
        ),
    ];

    for (record, expected) in cases {
        let id = record.id;
        let outcome = orchestrator.handle(RecordEvent::ItemAdded(record)).await;
        assert_eq!(outcome, EventOutcome::Skipped { id, reason: expected });
    }

    assert_eq!(provisioner.call_count(), 0);
    assert!(orchestrator.tracker().is_empty());
}

#[tokio::test]
async fn delete_without_workspace_is_noop() {
    let (provisioner, orchestrator, _config) = setup();

    let outcome = orchestrator.handle(RecordEvent::ItemDeleted(RecordId(42))).await;

    assert_eq!(
        outcome,
        EventOutcome::AlreadyAbsent {
            slug: Slug::from_raw("user-web-42"),
        }
    );
    assert!(!outcome.is_failure());
    assert_eq!(provisioner.workspace_count(), 0);
}

#[tokio::test]
async fn slug_lookup_is_exact() {
    let (provisioner, orchestrator, _config) = setup();
    provisioner.seed_workspace("user-web-42", "Berlin");

    let outcome = orchestrator.handle(RecordEvent::ItemDeleted(RecordId(4))).await;

    assert!(matches!(outcome, EventOutcome::AlreadyAbsent { .. }));
    assert!(provisioner.workspace("user-web-42").is_some());
}

#[tokio::test]
async fn deleted_record_is_not_reprovisioned() {
    let (provisioner, orchestrator, config) = setup();
    orchestrator.handle(RecordEvent::ItemAdded(berlin(&config, 42))).await;
    orchestrator.handle(RecordEvent::ItemDeleted(RecordId(42))).await;

    let outcome = orchestrator.handle(RecordEvent::ItemUpdated(berlin(&config, 42))).await;

    assert_eq!(
        outcome,
        EventOutcome::Ignored {
            id: RecordId(42),
            state: WorkspaceState::Deleted,
        }
    );
    assert_eq!(provisioner.workspace_count(), 0);
}

#[tokio::test]
async fn deploy_failure_is_reported_and_retryable() {
    let (provisioner, orchestrator, config) = setup();
    provisioner.fail_deploys(true);

    let outcome = orchestrator.handle(RecordEvent::ItemAdded(berlin(&config, 42))).await;
    assert!(outcome.is_failure());
    assert!(matches!(outcome, EventOutcome::Failed { id: RecordId(42), .. }));
    assert_eq!(provisioner.workspace_count(), 0);
    assert_eq!(orchestrator.tracker().state(RecordId(42)), WorkspaceState::NoWorkspace);

    // The next event for the record converges.
    provisioner.fail_deploys(false);
    let outcome = orchestrator.handle(RecordEvent::ItemUpdated(berlin(&config, 42))).await;
    assert!(matches!(outcome, EventOutcome::Provisioned { .. }));
}

#[tokio::test]
async fn membership_failure_leaves_deployed_workspace() {
    let (provisioner, orchestrator, config) = setup();
    provisioner.fail_memberships(true);

    let outcome = orchestrator.handle(RecordEvent::ItemAdded(berlin(&config, 42))).await;

    assert!(outcome.is_failure());
    assert!(provisioner.workspace("user-web-42").is_some());
    assert!(provisioner.group_members("Berlin - Office Owners").is_empty());
}

#[tokio::test]
async fn independent_records_are_handled_concurrently() {
    let (provisioner, orchestrator, config) = setup();
    let paris = office_record(
        &config,
        7,
        Some("Paris"),
        Some(user(3, "carol")),
        vec![user(3, "carol")],
    );

    let (first, second) = tokio::join!(
        orchestrator.handle(RecordEvent::ItemAdded(berlin(&config, 42))),
        orchestrator.handle(RecordEvent::ItemAdded(paris)),
    );

    assert!(matches!(first, EventOutcome::Provisioned { .. }));
    assert!(matches!(second, EventOutcome::Provisioned { .. }));
    assert_eq!(provisioner.workspace_count(), 2);
    assert_eq!(orchestrator.tracker().len(), 2);
}

/// Provisioning target that never answers in time
struct StalledProvisioner;

#[async_trait]
impl ProvisioningApi for StalledProvisioner {
    async fn deploy_groups(&self, _groups: &[GroupDefinition]) -> Result<(), ProvisioningError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(())
    }

    async fn deploy_workspace(
        &self,
        _workspace: &WorkspaceDefinition,
        _links: &[GroupRoleLink],
    ) -> Result<(), ProvisioningError> {
        Ok(())
    }

    async fn find_workspace_by_slug(
        &self,
        _slug: &Slug,
    ) -> Result<Option<WorkspaceHandle>, ProvisioningError> {
        Ok(None)
    }

    async fn find_group(
        &self,
        _workspace: &WorkspaceHandle,
        _name: &str,
    ) -> Result<Option<GroupHandle>, ProvisioningError> {
        Ok(None)
    }

    async fn delete_workspace(&self, _workspace: &WorkspaceHandle) -> Result<(), ProvisioningError> {
        Ok(())
    }

    async fn add_user_to_group(
        &self,
        _group: &GroupHandle,
        _user: &UserRef,
    ) -> Result<(), ProvisioningError> {
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn stalled_provisioning_times_out() {
    let config = test_config();
    let orchestrator = WorkspaceLifecycleOrchestrator::new(
        Arc::new(StalledProvisioner),
        Arc::new(config.clone()),
        Diagnostics::new(config.diagnostics.clone()),
    );

    let outcome = orchestrator.handle(RecordEvent::ItemAdded(berlin(&config, 42))).await;

    assert!(matches!(outcome, EventOutcome::Failed { id: RecordId(42), .. }));
    assert_eq!(orchestrator.tracker().state(RecordId(42)), WorkspaceState::NoWorkspace);
}
