//! Synchronization job definition and run settings
//!
//! The job carries the site and web it runs against as properties. A run
//! with either one blank is refused before anything else happens.

use offices_core::{ConfigError, JobDefinition, JobSettings, OfficesConfig};

/// Property holding the site url
pub const SITE_URL_PROPERTY: &str = "SiteUrl";
/// Property holding the server-relative web url
pub const WEB_URL_PROPERTY: &str = "WebUrl";

/// Where a run reads and writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobTarget {
    /// Site url
    pub site_url: String,
    /// Web url
    pub web_url: String,
}

impl JobTarget {
    /// Target from configured job settings
    ///
    /// # Errors
    /// `ConfigError::BlankSetting` when the site or web url is empty
    pub fn from_settings(settings: &JobSettings) -> Result<Self, ConfigError> {
        Self::checked(&settings.site_url, &settings.web_url)
    }

    /// Target from the properties stored on a job definition
    ///
    /// # Errors
    /// `ConfigError::BlankSetting` when a property is missing or empty
    pub fn from_definition(job: &JobDefinition) -> Result<Self, ConfigError> {
        Self::checked(
            job.property(SITE_URL_PROPERTY).unwrap_or_default(),
            job.property(WEB_URL_PROPERTY).unwrap_or_default(),
        )
    }

    fn checked(site_url: &str, web_url: &str) -> Result<Self, ConfigError> {
        if site_url.trim().is_empty() {
            return Err(ConfigError::BlankSetting("job.site_url"));
        }
        if web_url.trim().is_empty() {
            return Err(ConfigError::BlankSetting("job.web_url"));
        }
        Ok(Self {
            site_url: site_url.to_string(),
            web_url: web_url.to_string(),
        })
    }
}

/// Recurring job definition for the synchronizer
#[must_use]
pub fn sync_job_definition(config: &OfficesConfig) -> JobDefinition {
    let job = &config.job;
    JobDefinition::new(&job.name, &job.title, job.interval_minutes)
        .with_property(SITE_URL_PROPERTY, &job.site_url)
        .with_property(WEB_URL_PROPERTY, &job.web_url)
}
