//! Error types for the office services
//!
//! Collaborator failures keep their own enums so callers can tell a store
//! outage from a provisioning rejection; [`OfficesError`] wraps them at the
//! component boundary where they are logged and turned into outcomes.

use crate::types::{RecordId, Slug};

/// Main error type
#[derive(Debug, thiserror::Error)]
pub enum OfficesError {
    /// Record store call failed
    #[error("record store error: {0}")]
    Store(#[from] StoreError),

    /// Provisioning call failed
    #[error("provisioning error: {0}")]
    Provisioning(#[from] ProvisioningError),

    /// Scheduler call failed
    #[error("scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// Configuration or schema error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// External call exceeded its time limit
    #[error("{operation} timed out after {duration_secs}s")]
    Timeout {
        /// Name of the call
        operation: &'static str,
        /// Applied limit
        duration_secs: u64,
    },
}

impl OfficesError {
    /// Check if a later attempt may succeed without intervention
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Store(e) => e.is_transient(),
            Self::Provisioning(e) => e.is_transient(),
            Self::Scheduler(e) => matches!(e, SchedulerError::Unavailable(_)),
            Self::Config(_) => false,
        }
    }
}

/// Record store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No list at the url
    #[error("list not found: {0}")]
    ListNotFound(String),

    /// No record with the id
    #[error("record {id} not found in {list}")]
    RecordNotFound {
        /// List handle
        list: String,
        /// Record id
        id: RecordId,
    },

    /// Write refused by the store
    #[error("write rejected: {0}")]
    WriteRejected(String),

    /// Store unreachable
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Transient failures
    #[inline]
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Provisioning errors
#[derive(Debug, thiserror::Error)]
pub enum ProvisioningError {
    /// Deploying definitions failed
    #[error("deploy failed: {0}")]
    DeployFailed(String),

    /// Workspace vanished between resolve and use
    #[error("workspace not found: {0}")]
    WorkspaceNotFound(Slug),

    /// Membership change refused
    #[error("cannot add {user} to {group}: {reason}")]
    MembershipFailed {
        /// Group name
        group: String,
        /// User login
        user: String,
        /// Reason reported by the target
        reason: String,
    },

    /// Provisioning target unreachable
    #[error("provisioning target unavailable: {0}")]
    Unavailable(String),
}

impl ProvisioningError {
    /// Transient failures
    #[inline]
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Scheduler errors
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// No job with the name
    #[error("job not found: {0}")]
    JobNotFound(String),

    /// Registration refused
    #[error("job rejected: {0}")]
    Rejected(String),

    /// Scheduler unreachable
    #[error("scheduler unavailable: {0}")]
    Unavailable(String),
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required setting is blank
    #[error("setting `{0}` must not be blank")]
    BlankSetting(&'static str),

    /// Setting out of range
    #[error("setting `{setting}` is invalid: {reason}")]
    InvalidValue {
        /// Setting name
        setting: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// Configured fields are not defined on the list
    #[error("list {list} is missing fields {fields:?}")]
    MissingFields {
        /// List handle
        list: String,
        /// Missing static names
        fields: Vec<String>,
    },

    /// TOML could not be parsed
    #[error("cannot parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offices_error_display() {
        let err = OfficesError::Timeout {
            operation: "deploy_groups",
            duration_secs: 30,
        };
        assert_eq!(err.to_string(), "deploy_groups timed out after 30s");

        let err: OfficesError = StoreError::ListNotFound("/lists/Offices".into()).into();
        assert!(err.to_string().contains("list not found"));
    }

    #[test]
    fn offices_error_is_retryable() {
        assert!(OfficesError::Timeout {
            operation: "query",
            duration_secs: 1
        }
        .is_retryable());
        assert!(OfficesError::from(StoreError::Unavailable("down".into())).is_retryable());
        assert!(OfficesError::from(ProvisioningError::Unavailable("down".into())).is_retryable());
        assert!(!OfficesError::from(ProvisioningError::DeployFailed("bad".into())).is_retryable());
        assert!(!OfficesError::from(ConfigError::BlankSetting("job.name")).is_retryable());
    }
}
