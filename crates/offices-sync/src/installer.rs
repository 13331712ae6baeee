//! Sync job installation
//!
//! Installing replaces any job of the same name, registers it as recurring
//! and triggers an immediate first run.

use crate::job::{sync_job_definition, JobTarget};
use offices_core::{bounded, Diagnostics, JobDefinition, JobScheduler, OfficesConfig, OfficesError};
use std::sync::Arc;

/// Registers and removes the synchronization job
pub struct SyncJobInstaller {
    scheduler: Arc<dyn JobScheduler>,
    config: Arc<OfficesConfig>,
    diagnostics: Diagnostics,
}

impl std::fmt::Debug for SyncJobInstaller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncJobInstaller")
            .field("job", &self.config.job.name)
            .finish_non_exhaustive()
    }
}

impl SyncJobInstaller {
    /// Create new installer
    #[must_use]
    pub fn new(
        scheduler: Arc<dyn JobScheduler>,
        config: Arc<OfficesConfig>,
        diagnostics: Diagnostics,
    ) -> Self {
        Self {
            scheduler,
            config,
            diagnostics,
        }
    }

    /// Replace, register and start the job
    ///
    /// # Errors
    /// - `OfficesError::Config` when the job has no site or web url
    /// - Scheduler failures and timeouts, after logging them
    pub async fn install(&self) -> Result<JobDefinition, OfficesError> {
        let job = sync_job_definition(&self.config);
        JobTarget::from_definition(&job)?;

        match self.register(&job).await {
            Ok(()) => {
                tracing::info!(
                    job = %job.name,
                    interval_minutes = job.interval_minutes,
                    "synchronization job installed"
                );
                Ok(job)
            }
            Err(e) => {
                self.diagnostics
                    .error(&format!("Failed to install timer job {}", job.name), &e);
                Err(e)
            }
        }
    }

    async fn register(&self, job: &JobDefinition) -> Result<(), OfficesError> {
        let limit = self.config.call_timeout();
        if bounded("unregister", limit, self.scheduler.unregister(&job.name)).await? {
            tracing::debug!(job = %job.name, "removed existing job");
        }
        bounded(
            "register_recurring",
            limit,
            self.scheduler.register_recurring(job),
        )
        .await?;
        bounded("run_now", limit, self.scheduler.run_now(&job.name)).await
    }

    /// Remove the job; `false` when it was not registered
    ///
    /// # Errors
    /// Scheduler failures and timeouts, after logging them
    pub async fn uninstall(&self) -> Result<bool, OfficesError> {
        let name = &self.config.job.name;
        match bounded(
            "unregister",
            self.config.call_timeout(),
            self.scheduler.unregister(name),
        )
        .await
        {
            Ok(removed) => {
                tracing::info!(job = %name, removed, "synchronization job uninstalled");
                Ok(removed)
            }
            Err(e) => {
                self.diagnostics
                    .error(&format!("Failed to remove timer job {name}"), &e);
                Err(e)
            }
        }
    }
}
