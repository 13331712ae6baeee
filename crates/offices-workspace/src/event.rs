//! Record events delivered by the hosting runtime

use crate::lifecycle::WorkspaceState;
use offices_core::{CorrelationId, Record, RecordId, Slug, ValidationFailure};

/// Record lifecycle event
///
/// Add and update carry an immutable snapshot of the record at event time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordEvent {
    /// Record created
    ItemAdded(Record),
    /// Record changed
    ItemUpdated(Record),
    /// Record removed
    ItemDeleted(RecordId),
}

impl RecordEvent {
    /// Id of the record the event is about
    #[inline]
    #[must_use]
    pub fn record_id(&self) -> RecordId {
        match self {
            Self::ItemAdded(record) | Self::ItemUpdated(record) => record.id,
            Self::ItemDeleted(id) => *id,
        }
    }

    /// Event kind for logs
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ItemAdded(_) => "ItemAdded",
            Self::ItemUpdated(_) => "ItemUpdated",
            Self::ItemDeleted(_) => "ItemDeleted",
        }
    }
}

/// How an event was handled
///
/// Handling never fails towards the event source; failures are reported here
/// with the correlation id of the diagnostics entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// Record not actionable, nothing done
    Skipped {
        /// Record id
        id: RecordId,
        /// First missing attribute
        reason: ValidationFailure,
    },
    /// Workspace and groups deployed, memberships applied
    Provisioned {
        /// Workspace slug
        slug: Slug,
        /// Membership calls made
        memberships: usize,
    },
    /// Workspace deleted
    Deprovisioned {
        /// Workspace slug
        slug: Slug,
    },
    /// Delete for a record whose workspace does not exist
    AlreadyAbsent {
        /// Workspace slug
        slug: Slug,
    },
    /// Event not applicable in the record's current state
    Ignored {
        /// Record id
        id: RecordId,
        /// State that rejected the event
        state: WorkspaceState,
    },
    /// External call failed; logged and considered handled
    Failed {
        /// Record id
        id: RecordId,
        /// Diagnostics entry
        correlation: CorrelationId,
    },
}

impl EventOutcome {
    /// Whether the outcome represents a failure
    #[inline]
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}
