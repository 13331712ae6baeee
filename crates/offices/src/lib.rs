//! Offices
//!
//! Office records drive two services:
//! - every actionable office gets a collaboration workspace with Owners,
//!   Members and Visitors groups, removed again when the record is deleted
//! - a recurring job copies new offices into an archive list
//!
//! # Example
//!
//! ```rust,ignore
//! use offices::prelude::*;
//!
//! let service = OfficesService::new(OfficesContext::new(store, provisioning, scheduler, config))?;
//! service.activate().await?;
//!
//! let outcome = service.handle_event(RecordEvent::ItemAdded(record)).await;
//! let report = service.run_sync().await;
//! ```

#![warn(unreachable_pub)]

pub mod service;

pub use service::{OfficesContext, OfficesService};

pub use offices_core;
pub use offices_sync;
pub use offices_workspace;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for hosting the offices services
    pub use crate::{OfficesContext, OfficesService};
    pub use offices_core::prelude::*;
    pub use offices_sync::{SkipReason, SyncReport};
    pub use offices_workspace::{EventOutcome, RecordEvent, WorkspaceState};
}
