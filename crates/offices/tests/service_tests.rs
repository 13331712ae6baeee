use offices::prelude::*;
use offices_core::{ConfigError, JobDefinition};
use offices_test_utils::{
    berlin, office_store, office_values, test_config, user, InMemoryProvisioner,
    InMemoryRecordStore, InMemoryScheduler,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

struct Host {
    store: Arc<InMemoryRecordStore>,
    provisioner: Arc<InMemoryProvisioner>,
    scheduler: Arc<InMemoryScheduler>,
}

impl Host {
    fn new(store: InMemoryRecordStore) -> Self {
        Self {
            store: Arc::new(store),
            provisioner: Arc::new(InMemoryProvisioner::new()),
            scheduler: Arc::new(InMemoryScheduler::new()),
        }
    }

    fn service(&self, config: OfficesConfig) -> Result<OfficesService, OfficesError> {
        OfficesService::new(OfficesContext::new(
            self.store.clone(),
            self.provisioner.clone(),
            self.scheduler.clone(),
            config,
        ))
    }
}

#[tokio::test]
async fn activation_installs_sync_job() {
    let config = test_config();
    let host = Host::new(office_store(&config));
    let service = host.service(config).unwrap();
    host.scheduler
        .register_recurring(&JobDefinition::new("ListSynchronizationJob", "stale", 60))
        .await
        .unwrap();

    let job = service.activate().await.unwrap();

    assert_eq!(job.interval_minutes, 30);
    assert_eq!(host.scheduler.removed_jobs(), vec!["ListSynchronizationJob"]);
    assert_eq!(host.scheduler.run_now_calls(), vec!["ListSynchronizationJob"]);
    assert_eq!(host.scheduler.job("ListSynchronizationJob"), Some(job));

    assert!(service.deactivate().await.unwrap());
    assert!(host.scheduler.job("ListSynchronizationJob").is_none());
}

#[tokio::test]
async fn activation_reports_missing_archive_field() {
    let config = test_config();
    let store = InMemoryRecordStore::new();
    store.add_list(&config.lists.source, config.office_fields().all());
    let archive = config.archive_fields();
    store.add_list(
        &config.lists.archive,
        vec![archive.name, archive.director, archive.title],
    );
    let host = Host::new(store);
    let service = host.service(config).unwrap();

    let err = service.activate().await.unwrap_err();

    match err {
        OfficesError::Config(ConfigError::MissingFields { list, fields }) => {
            assert_eq!(list, "/lists/Offices2");
            assert_eq!(fields, vec!["swc_SourceId"]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(host.scheduler.job("ListSynchronizationJob").is_none());
}

#[tokio::test]
async fn activation_fails_without_source_list() {
    let config = test_config();
    let host = Host::new(InMemoryRecordStore::new());
    let service = host.service(config).unwrap();

    let err = service.activate().await.unwrap_err();

    assert!(matches!(err, OfficesError::Store(_)));
}

#[test]
fn unusable_config_is_rejected() {
    let host = Host::new(InMemoryRecordStore::new());
    let mut config = test_config();
    config.slug_prefix = String::new();

    let err = host.service(config).unwrap_err();

    assert!(matches!(
        err,
        OfficesError::Config(ConfigError::BlankSetting("slug_prefix"))
    ));
}

#[tokio::test]
async fn office_lifecycle_end_to_end() {
    let config = test_config();
    let host = Host::new(office_store(&config));
    let service = host.service(config.clone()).unwrap();
    service.activate().await.unwrap();

    let id = host.store.insert(
        &config.lists.source,
        office_values(
            &config,
            Some("Berlin"),
            Some(user(1, "alice")),
            vec![user(1, "alice"), user(2, "bob")],
        ),
    );
    let outcome = service
        .handle_event(RecordEvent::ItemAdded(berlin(&config, id.0)))
        .await;
    let slug = format!("user-web-{id}");
    assert_eq!(
        outcome,
        EventOutcome::Provisioned {
            slug: Slug::from_raw(slug.clone()),
            memberships: 3,
        }
    );

    let report = service.run_sync().await;
    assert_eq!(report.copied, 1);
    assert_eq!(host.store.records(&config.lists.archive).len(), 1);

    let outcome = service.handle_event(RecordEvent::ItemDeleted(id)).await;
    assert_eq!(outcome, EventOutcome::Deprovisioned { slug: Slug::from_raw(slug.clone()) });
    assert!(host.provisioner.workspace(&slug).is_none());
    assert_eq!(
        service.orchestrator().tracker().state(id),
        WorkspaceState::Deleted
    );

    // Archive history survives the source record's workspace.
    assert_eq!(host.store.records(&config.lists.archive).len(), 1);
}
