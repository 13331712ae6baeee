//! Service configuration
//!
//! One [`OfficesConfig`] is built per process (defaults, builders or TOML)
//! and handed to every component at construction.

use crate::error::ConfigError;
use crate::fields::{ArchiveFields, FieldKey, OfficeFields};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OfficesConfig {
    /// Source and archive list urls
    pub lists: ListUrls,
    /// Field static names
    pub fields: FieldNames,
    /// Workspace slug prefix
    pub slug_prefix: String,
    /// Site template used for new workspaces
    pub workspace_template: String,
    /// Role suffixes of the three security groups
    pub groups: GroupSuffixes,
    /// Synchronization job settings
    pub job: JobSettings,
    /// Time limit applied to every external call
    pub call_timeout_secs: u64,
    /// Diagnostics area and categories
    pub diagnostics: DiagnosticsConfig,
}

impl OfficesConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from TOML; missing keys take their defaults
    ///
    /// # Errors
    /// - `ConfigError::Parse` for malformed TOML
    /// - any error reported by [`OfficesConfig::validate`]
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// With site and web urls the job runs against
    #[inline]
    #[must_use]
    pub fn with_site(mut self, site_url: impl Into<String>, web_url: impl Into<String>) -> Self {
        self.job.site_url = site_url.into();
        self.job.web_url = web_url.into();
        self
    }

    /// With call timeout
    #[inline]
    #[must_use]
    pub fn with_call_timeout_secs(mut self, secs: u64) -> Self {
        self.call_timeout_secs = secs;
        self
    }

    /// With synchronizer failure scope
    #[inline]
    #[must_use]
    pub fn with_failure_scope(mut self, scope: FailureScope) -> Self {
        self.job.failure_scope = scope;
        self
    }

    /// With guard policy
    #[inline]
    #[must_use]
    pub fn with_guard_policy(mut self, policy: GuardPolicy) -> Self {
        self.job.guard_policy = policy;
        self
    }

    /// With job interval
    #[inline]
    #[must_use]
    pub fn with_interval_minutes(mut self, minutes: u32) -> Self {
        self.job.interval_minutes = minutes;
        self
    }

    /// Call timeout as a duration
    #[inline]
    #[must_use]
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Resolve source list field keys
    #[must_use]
    pub fn office_fields(&self) -> OfficeFields {
        OfficeFields {
            name: FieldKey::new(&self.fields.name),
            director: FieldKey::new(&self.fields.director),
            members: FieldKey::new(&self.fields.members),
            is_copied: FieldKey::new(&self.fields.is_copied),
            title: FieldKey::new(&self.fields.title),
        }
    }

    /// Resolve archive list field keys
    #[must_use]
    pub fn archive_fields(&self) -> ArchiveFields {
        ArchiveFields {
            name: FieldKey::new(&self.fields.name),
            director: FieldKey::new(&self.fields.director),
            title: FieldKey::new(&self.fields.title),
            source_id: FieldKey::new(&self.fields.source_id),
        }
    }

    /// Check settings that would make every operation fail
    ///
    /// Site and web urls are checked by the job itself before each run.
    ///
    /// # Errors
    /// - `ConfigError::BlankSetting` for an empty name, url or suffix
    /// - `ConfigError::InvalidValue` for a zero interval or timeout
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("lists.source", &self.lists.source),
            ("lists.archive", &self.lists.archive),
            ("fields.name", &self.fields.name),
            ("fields.director", &self.fields.director),
            ("fields.members", &self.fields.members),
            ("fields.is_copied", &self.fields.is_copied),
            ("fields.title", &self.fields.title),
            ("fields.source_id", &self.fields.source_id),
            ("slug_prefix", &self.slug_prefix),
            ("groups.owners", &self.groups.owners),
            ("groups.members", &self.groups.members),
            ("groups.visitors", &self.groups.visitors),
            ("job.name", &self.job.name),
        ];
        if let Some((setting, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ConfigError::BlankSetting(*setting));
        }

        if self.job.interval_minutes == 0 {
            return Err(ConfigError::InvalidValue {
                setting: "job.interval_minutes",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.call_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                setting: "call_timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

impl Default for OfficesConfig {
    fn default() -> Self {
        Self {
            lists: ListUrls::default(),
            fields: FieldNames::default(),
            slug_prefix: "user-web-".to_string(),
            workspace_template: "STS#0".to_string(),
            groups: GroupSuffixes::default(),
            job: JobSettings::default(),
            call_timeout_secs: 60,
            diagnostics: DiagnosticsConfig::default(),
        }
    }
}

/// Web-relative list urls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListUrls {
    /// Office records
    pub source: String,
    /// Archive copies
    pub archive: String,
}

impl Default for ListUrls {
    fn default() -> Self {
        Self {
            source: "/lists/Offices".to_string(),
            archive: "/lists/Offices2".to_string(),
        }
    }
}

/// Field static names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldNames {
    /// Office name
    pub name: String,
    /// Director
    pub director: String,
    /// Members
    pub members: String,
    /// Copy-flag
    pub is_copied: String,
    /// Built-in title
    pub title: String,
    /// Archive back-reference to the source record
    pub source_id: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            name: "swc_Name".to_string(),
            director: "swc_DirectorUser".to_string(),
            members: "swc_OfficeMembers".to_string(),
            is_copied: "swc_FieldIsCopied".to_string(),
            title: "Title".to_string(),
            source_id: "swc_SourceId".to_string(),
        }
    }
}

/// Role suffixes; group names are `"<office name> - <suffix>"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupSuffixes {
    /// Administrators of the workspace
    pub owners: String,
    /// Contributors
    pub members: String,
    /// Readers
    pub visitors: String,
}

impl Default for GroupSuffixes {
    fn default() -> Self {
        Self {
            owners: "Office Owners".to_string(),
            members: "Office Members".to_string(),
            visitors: "Office Visitors".to_string(),
        }
    }
}

/// What a failed record does to the rest of a synchronization run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureScope {
    /// The first failure ends the run
    #[default]
    Batch,
    /// A failed record is logged and skipped
    PerRecord,
}

/// How overlapping synchronization runs are detected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardPolicy {
    /// Trust the scheduler's running-instance count only
    #[default]
    Advisory,
    /// Scheduler count plus an in-process lock
    Exclusive,
}

/// Synchronization job settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobSettings {
    /// Unique job name
    pub name: String,
    /// Job title
    pub title: String,
    /// Minutes between runs
    pub interval_minutes: u32,
    /// Site the job runs against
    pub site_url: String,
    /// Web (server-relative) the lists live in
    pub web_url: String,
    /// Failure scope
    pub failure_scope: FailureScope,
    /// Guard policy
    pub guard_policy: GuardPolicy,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            name: "ListSynchronizationJob".to_string(),
            title: "Copy list items from Offices list to Offices2 list".to_string(),
            interval_minutes: 30,
            site_url: String::new(),
            web_url: String::new(),
            failure_scope: FailureScope::default(),
            guard_policy: GuardPolicy::default(),
        }
    }
}

/// Diagnostics area and categories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Area every entry is tagged with
    pub area: String,
    /// Category of error entries
    pub error_category: String,
    /// Category of informational entries
    pub message_category: String,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            area: "Offices".to_string(),
            error_category: "OfficesError".to_string(),
            message_category: "OfficesMessage".to_string(),
        }
    }
}
