//! Offices Core
//!
//! Shared foundation for the office record services:
//! - Record model and typed, fault-tolerant field access
//! - The validation gate deciding whether a record is actionable
//! - Contracts for the external collaborators (record store, provisioning, scheduler)
//! - Error taxonomy, configuration and the injected diagnostics context
//!
//! # Example
//!
//! ```rust,ignore
//! use offices_core::prelude::*;
//!
//! let config = OfficesConfig::default();
//! let fields = config.office_fields();
//! let snapshot = OfficeSnapshot::from_record(&record, &fields);
//!
//! if let Ok(office) = validation::check(&snapshot) {
//!     println!("{} is actionable", office.name);
//! }
//! ```

#![warn(unreachable_pub)]

pub mod call;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod fields;
pub mod provisioning;
pub mod scheduler;
pub mod store;
pub mod types;
pub mod validation;

pub use call::bounded;
pub use config::{
    DiagnosticsConfig, FailureScope, FieldNames, GroupSuffixes, GuardPolicy, JobSettings,
    ListUrls, OfficesConfig,
};
pub use diagnostics::{CorrelationId, Diagnostics};
pub use error::{ConfigError, OfficesError, ProvisioningError, SchedulerError, StoreError};
pub use fields::{ArchiveFields, FieldKey, FieldValue, FromFieldValue, OfficeFields, Record};
pub use provisioning::{
    GroupDefinition, GroupHandle, GroupRoleLink, ProvisioningApi, SecurityRole,
    WorkspaceDefinition, WorkspaceHandle,
};
pub use scheduler::{JobDefinition, JobScheduler};
pub use store::{Filter, RecordStore};
pub use types::{ListId, RecordId, Slug, UserRef};
pub use validation::{ActionableOffice, OfficeSnapshot, ValidationFailure};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with office records
    pub use crate::{
        validation, ActionableOffice, Diagnostics, FieldKey, FieldValue, Filter, JobScheduler,
        OfficeFields, OfficeSnapshot, OfficesConfig, OfficesError, ProvisioningApi, Record,
        RecordId, RecordStore, Slug, UserRef,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
