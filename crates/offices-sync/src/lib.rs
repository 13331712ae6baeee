//! Offices Sync - incremental record synchronization
//!
//! A recurring job copies office records not yet flagged as copied into the
//! archive list and flags them on the source, guarded against overlapping
//! runs.
//!
//! # Example
//!
//! ```rust,ignore
//! use offices_sync::{RecordSynchronizer, SingleInstanceGuard};
//!
//! let guard = SingleInstanceGuard::new(scheduler, config.job.guard_policy, config.call_timeout());
//! let synchronizer = RecordSynchronizer::new(store, guard, config, diagnostics);
//! let report = synchronizer.run().await;
//! ```

#![warn(unreachable_pub)]

pub mod guard;
pub mod installer;
pub mod job;
pub mod synchronizer;

pub use guard::{GuardDecision, GuardPermit, SingleInstanceGuard};
pub use installer::SyncJobInstaller;
pub use job::{sync_job_definition, JobTarget, SITE_URL_PROPERTY, WEB_URL_PROPERTY};
pub use synchronizer::{RecordSynchronizer, SkipReason, SyncReport};
