//! Scheduler contract
//!
//! The scheduler owns recurring jobs and the bookkeeping of running instances.

use crate::error::SchedulerError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Recurring job registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDefinition {
    /// Unique job name
    pub name: String,
    /// Human readable title
    pub title: String,
    /// Interval between runs
    pub interval_minutes: u32,
    /// Persisted job properties
    pub properties: BTreeMap<String, String>,
}

impl JobDefinition {
    /// Create new job definition
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, title: impl Into<String>, interval_minutes: u32) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            interval_minutes,
            properties: BTreeMap::new(),
        }
    }

    /// With property
    #[inline]
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Property value, if set
    #[inline]
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

/// Recurring job scheduler
#[async_trait]
pub trait JobScheduler: Send + Sync {
    /// Number of instances of the job currently scheduled or running,
    /// including the caller's own instance
    async fn running_instances(&self, job_name: &str) -> Result<usize, SchedulerError>;

    /// Register (or replace) a recurring job
    async fn register_recurring(&self, job: &JobDefinition) -> Result<(), SchedulerError>;

    /// Start a registered job immediately
    async fn run_now(&self, job_name: &str) -> Result<(), SchedulerError>;

    /// Remove a job; returns whether it existed
    async fn unregister(&self, job_name: &str) -> Result<bool, SchedulerError>;
}
