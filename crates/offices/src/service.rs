//! Service wiring
//!
//! [`OfficesService`] builds the orchestrator, the synchronizer and the job
//! installer from one injected [`OfficesContext`].

use offices_core::{
    bounded, Diagnostics, JobDefinition, JobScheduler, ListId, OfficesConfig, OfficesError,
    ProvisioningApi, RecordStore,
};
use offices_sync::{RecordSynchronizer, SingleInstanceGuard, SyncJobInstaller, SyncReport};
use offices_workspace::{EventOutcome, RecordEvent, WorkspaceLifecycleOrchestrator};
use std::sync::Arc;

/// Collaborators and settings supplied by the host
#[derive(Clone)]
pub struct OfficesContext {
    /// Record store holding the source and archive lists
    pub store: Arc<dyn RecordStore>,
    /// Workspace and group provisioning
    pub provisioning: Arc<dyn ProvisioningApi>,
    /// Recurring job scheduler
    pub scheduler: Arc<dyn JobScheduler>,
    /// Settings
    pub config: OfficesConfig,
}

impl OfficesContext {
    /// Create new context
    #[must_use]
    pub fn new(
        store: Arc<dyn RecordStore>,
        provisioning: Arc<dyn ProvisioningApi>,
        scheduler: Arc<dyn JobScheduler>,
        config: OfficesConfig,
    ) -> Self {
        Self {
            store,
            provisioning,
            scheduler,
            config,
        }
    }
}

/// Entry point for hosts
pub struct OfficesService {
    store: Arc<dyn RecordStore>,
    config: Arc<OfficesConfig>,
    orchestrator: WorkspaceLifecycleOrchestrator,
    synchronizer: RecordSynchronizer,
    installer: SyncJobInstaller,
}

impl std::fmt::Debug for OfficesService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfficesService")
            .field("orchestrator", &self.orchestrator)
            .field("synchronizer", &self.synchronizer)
            .finish_non_exhaustive()
    }
}

impl OfficesService {
    /// Wire the services
    ///
    /// # Errors
    /// `OfficesError::Config` when the configuration is unusable
    pub fn new(context: OfficesContext) -> Result<Self, OfficesError> {
        context.config.validate()?;

        let config = Arc::new(context.config);
        let diagnostics = Diagnostics::new(config.diagnostics.clone());

        let orchestrator = WorkspaceLifecycleOrchestrator::new(
            context.provisioning,
            Arc::clone(&config),
            diagnostics.clone(),
        );
        let guard = SingleInstanceGuard::new(
            Arc::clone(&context.scheduler),
            config.job.guard_policy,
            config.call_timeout(),
        );
        let synchronizer = RecordSynchronizer::new(
            Arc::clone(&context.store),
            guard,
            Arc::clone(&config),
            diagnostics.clone(),
        );
        let installer = SyncJobInstaller::new(context.scheduler, Arc::clone(&config), diagnostics);

        Ok(Self {
            store: context.store,
            config,
            orchestrator,
            synchronizer,
            installer,
        })
    }

    /// Settings in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &OfficesConfig {
        &self.config
    }

    /// Workspace orchestrator
    #[inline]
    #[must_use]
    pub fn orchestrator(&self) -> &WorkspaceLifecycleOrchestrator {
        &self.orchestrator
    }

    /// Check both list schemas, then install the synchronization job
    ///
    /// # Errors
    /// - `ConfigError::MissingFields` when a list lacks a configured field
    /// - store and scheduler failures
    pub async fn activate(&self) -> Result<JobDefinition, OfficesError> {
        self.verify_schema().await?;
        let job = self.installer.install().await?;
        tracing::info!(job = %job.name, "offices services activated");
        Ok(job)
    }

    /// Remove the synchronization job; `false` when it was not installed
    ///
    /// # Errors
    /// Scheduler failures
    pub async fn deactivate(&self) -> Result<bool, OfficesError> {
        self.installer.uninstall().await
    }

    /// Handle one record event
    pub async fn handle_event(&self, event: RecordEvent) -> EventOutcome {
        self.orchestrator.handle(event).await
    }

    /// One synchronization run, as invoked by the scheduler
    pub async fn run_sync(&self) -> SyncReport {
        self.synchronizer.run().await
    }

    async fn verify_schema(&self) -> Result<(), OfficesError> {
        let limit = self.config.call_timeout();
        let store = self.store.as_ref();

        let source = self.open(&self.config.lists.source).await?;
        bounded(
            "list_fields",
            limit,
            self.config.office_fields().verify(store, &source),
        )
        .await?;

        let archive = self.open(&self.config.lists.archive).await?;
        bounded(
            "list_fields",
            limit,
            self.config.archive_fields().verify(store, &archive),
        )
        .await
    }

    async fn open(&self, url: &str) -> Result<ListId, OfficesError> {
        bounded("open_list", self.config.call_timeout(), self.store.open_list(url)).await
    }
}
