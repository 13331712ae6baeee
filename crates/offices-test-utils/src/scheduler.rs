use async_trait::async_trait;
use offices_core::{JobDefinition, JobScheduler, SchedulerError};
use parking_lot::Mutex;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
struct SchedulerState {
    jobs: BTreeMap<String, JobDefinition>,
    running: BTreeMap<String, usize>,
    run_now: Vec<String>,
    unregistered: Vec<String>,
    unavailable: bool,
}

/// Scheduler kept in memory; running counts are set by the test
#[derive(Debug, Default)]
pub struct InMemoryScheduler {
    inner: Mutex<SchedulerState>,
}

impl InMemoryScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `count` instances of `job` as running
    pub fn set_running(&self, job: &str, count: usize) {
        self.inner.lock().running.insert(job.to_string(), count);
    }

    pub fn job(&self, name: &str) -> Option<JobDefinition> {
        self.inner.lock().jobs.get(name).cloned()
    }

    pub fn run_now_calls(&self) -> Vec<String> {
        self.inner.lock().run_now.clone()
    }

    /// Names passed to `unregister` that existed at the time
    pub fn removed_jobs(&self) -> Vec<String> {
        self.inner.lock().unregistered.clone()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.lock().unavailable = unavailable;
    }

    fn check_available(state: &SchedulerState) -> Result<(), SchedulerError> {
        if state.unavailable {
            Err(SchedulerError::Unavailable("in-memory scheduler offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl JobScheduler for InMemoryScheduler {
    async fn running_instances(&self, job_name: &str) -> Result<usize, SchedulerError> {
        let state = self.inner.lock();
        Self::check_available(&state)?;
        Ok(state.running.get(job_name).copied().unwrap_or(1))
    }

    async fn register_recurring(&self, job: &JobDefinition) -> Result<(), SchedulerError> {
        let mut state = self.inner.lock();
        Self::check_available(&state)?;
        if job.interval_minutes == 0 {
            return Err(SchedulerError::Rejected("interval must be positive".into()));
        }
        state.jobs.insert(job.name.clone(), job.clone());
        Ok(())
    }

    async fn run_now(&self, job_name: &str) -> Result<(), SchedulerError> {
        let mut state = self.inner.lock();
        Self::check_available(&state)?;
        if !state.jobs.contains_key(job_name) {
            return Err(SchedulerError::JobNotFound(job_name.to_string()));
        }
        state.run_now.push(job_name.to_string());
        Ok(())
    }

    async fn unregister(&self, job_name: &str) -> Result<bool, SchedulerError> {
        let mut state = self.inner.lock();
        Self::check_available(&state)?;
        let existed = state.jobs.remove(job_name).is_some();
        if existed {
            state.unregistered.push(job_name.to_string());
        }
        Ok(existed)
    }
}
