//! Single-instance guard
//!
//! The scheduler reports how many instances of a job are running, the
//! current one included. More than one means another run is in flight and
//! the caller must stop before touching any list.
//!
//! With [`GuardPolicy::Exclusive`] the guard also holds an in-process lock
//! for the duration of the run, so overlapping runs inside one process are
//! rejected even when the scheduler under-reports.

use offices_core::{bounded, GuardPolicy, JobScheduler, OfficesError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Held for the duration of a run
#[derive(Debug)]
pub struct GuardPermit {
    _local: Option<OwnedMutexGuard<()>>,
}

/// Result of a guard check
#[derive(Debug)]
pub enum GuardDecision {
    /// No other run detected
    Proceed(GuardPermit),
    /// Another run is active
    Busy {
        /// Instances seen, the caller included
        instances: usize,
    },
}

impl GuardDecision {
    /// Whether the caller must abort
    #[inline]
    #[must_use]
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy { .. })
    }
}

/// Guard against overlapping synchronization runs
pub struct SingleInstanceGuard {
    scheduler: Arc<dyn JobScheduler>,
    policy: GuardPolicy,
    limit: Duration,
    local: Arc<Mutex<()>>,
}

impl std::fmt::Debug for SingleInstanceGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingleInstanceGuard")
            .field("policy", &self.policy)
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}

impl SingleInstanceGuard {
    /// Create new guard
    #[must_use]
    pub fn new(scheduler: Arc<dyn JobScheduler>, policy: GuardPolicy, limit: Duration) -> Self {
        Self {
            scheduler,
            policy,
            limit,
            local: Arc::new(Mutex::new(())),
        }
    }

    /// Configured policy
    #[inline]
    #[must_use]
    pub fn policy(&self) -> GuardPolicy {
        self.policy
    }

    /// `true` when the scheduler sees more than one instance of `job_name`
    ///
    /// # Errors
    /// Scheduler failures and timeouts
    pub async fn is_already_running(&self, job_name: &str) -> Result<bool, OfficesError> {
        Ok(self.running_instances(job_name).await? > 1)
    }

    /// Decide whether a run of `job_name` may proceed
    ///
    /// # Errors
    /// Scheduler failures and timeouts; the caller must treat them as busy.
    pub async fn acquire(&self, job_name: &str) -> Result<GuardDecision, OfficesError> {
        let instances = self.running_instances(job_name).await?;
        if instances > 1 {
            tracing::debug!(job = job_name, instances, "scheduler reports overlapping run");
            return Ok(GuardDecision::Busy { instances });
        }

        let local = match self.policy {
            GuardPolicy::Advisory => None,
            GuardPolicy::Exclusive => match Arc::clone(&self.local).try_lock_owned() {
                Ok(permit) => Some(permit),
                Err(_) => {
                    tracing::debug!(job = job_name, "run already active in this process");
                    return Ok(GuardDecision::Busy {
                        instances: instances.max(2),
                    });
                }
            },
        };

        Ok(GuardDecision::Proceed(GuardPermit { _local: local }))
    }

    async fn running_instances(&self, job_name: &str) -> Result<usize, OfficesError> {
        bounded(
            "running_instances",
            self.limit,
            self.scheduler.running_instances(job_name),
        )
        .await
    }
}
