//! Offices Workspace - workspace lifecycle orchestration
//!
//! Turns office record events into an isolated collaboration workspace with
//! Owners, Members and Visitors groups, and removes it when the record goes.
//!
//! # Example
//!
//! ```rust,ignore
//! use offices_workspace::{RecordEvent, WorkspaceLifecycleOrchestrator};
//!
//! let orchestrator = WorkspaceLifecycleOrchestrator::new(provisioning, config, diagnostics);
//! let outcome = orchestrator.handle(RecordEvent::ItemAdded(snapshot)).await;
//! ```

#![warn(unreachable_pub)]

pub mod event;
pub mod lifecycle;
pub mod orchestrator;
pub mod plan;

pub use event::{EventOutcome, RecordEvent};
pub use lifecycle::{
    allowed_transitions, validate_transition, LifecycleError, LifecycleTracker, WorkspaceState,
};
pub use orchestrator::WorkspaceLifecycleOrchestrator;
pub use plan::{group_name, GroupRole, WorkspacePlan};
