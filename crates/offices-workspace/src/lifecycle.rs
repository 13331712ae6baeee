//! Workspace lifecycle per record id
//!
//! `NoWorkspace -> Provisioned -> Deleted`, with `Provisioned -> Provisioned`
//! for updates and `NoWorkspace -> Deleted` for records removed before they
//! were ever actionable. `Deleted` is terminal.

use dashmap::DashMap;
use offices_core::RecordId;
use serde::{Deserialize, Serialize};

/// Lifecycle state of the workspace belonging to one record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkspaceState {
    /// Nothing provisioned yet
    NoWorkspace,
    /// Workspace and groups deployed
    Provisioned,
    /// Record deleted, workspace removed
    Deleted,
}

/// Lifecycle errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    /// Transition not allowed from the current state
    #[error("illegal workspace transition: {from:?} -> {to:?}")]
    IllegalTransition {
        /// Current state
        from: WorkspaceState,
        /// Requested state
        to: WorkspaceState,
    },
}

/// Validate a state transition
///
/// # Errors
/// `LifecycleError::IllegalTransition` when `to` is not reachable from `from`.
pub fn validate_transition(from: WorkspaceState, to: WorkspaceState) -> Result<(), LifecycleError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(LifecycleError::IllegalTransition { from, to })
    }
}

/// States reachable from `from`
#[must_use]
pub fn allowed_transitions(from: WorkspaceState) -> Vec<WorkspaceState> {
    use WorkspaceState::*;
    match from {
        NoWorkspace => vec![Provisioned, Deleted],
        Provisioned => vec![Provisioned, Deleted],
        Deleted => vec![],
    }
}

/// In-process record of lifecycle states
///
/// Only reflects events seen by this process; an unknown id is `NoWorkspace`.
#[derive(Debug, Default)]
pub struct LifecycleTracker {
    states: DashMap<RecordId, WorkspaceState>,
}

impl LifecycleTracker {
    /// Create empty tracker
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of a record's workspace
    #[must_use]
    pub fn state(&self, id: RecordId) -> WorkspaceState {
        self.states
            .get(&id)
            .map_or(WorkspaceState::NoWorkspace, |s| *s)
    }

    /// Check that `to` is reachable without changing anything
    ///
    /// # Errors
    /// `LifecycleError::IllegalTransition`
    pub fn check(&self, id: RecordId, to: WorkspaceState) -> Result<(), LifecycleError> {
        validate_transition(self.state(id), to)
    }

    /// Move a record to `to`
    ///
    /// # Errors
    /// `LifecycleError::IllegalTransition`, leaving the state unchanged
    pub fn advance(&self, id: RecordId, to: WorkspaceState) -> Result<(), LifecycleError> {
        let mut entry = self.states.entry(id).or_insert(WorkspaceState::NoWorkspace);
        validate_transition(*entry, to)?;
        *entry = to;
        Ok(())
    }

    /// Number of tracked records
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether no record is tracked
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
