//! Diagnostics context
//!
//! [`Diagnostics`] is constructed once per process and cloned into every
//! component. Each entry is emitted through `tracing` tagged with the
//! configured area and category plus a fresh [`CorrelationId`], which is
//! returned so callers can surface it in their outcomes.

use crate::config::DiagnosticsConfig;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::fmt::Write as _;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Correlation token attached to a diagnostics entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationId(pub Uuid);

impl CorrelationId {
    /// Generate new correlation id
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Injected diagnostics sink
#[derive(Debug, Clone)]
pub struct Diagnostics {
    inner: Arc<DiagnosticsConfig>,
}

impl Diagnostics {
    /// Create from configuration
    #[inline]
    #[must_use]
    pub fn new(config: DiagnosticsConfig) -> Self {
        Self {
            inner: Arc::new(config),
        }
    }

    /// Area every entry is tagged with
    #[inline]
    #[must_use]
    pub fn area(&self) -> &str {
        &self.inner.area
    }

    /// Record an error with its full source chain
    pub fn error(&self, message: &str, error: &(dyn Error + 'static)) -> CorrelationId {
        let correlation = CorrelationId::new();
        tracing::error!(
            area = %self.inner.area,
            category = %self.inner.error_category,
            correlation = %correlation,
            error = %describe_error(error),
            "{message}"
        );
        correlation
    }

    /// Record an informational message
    pub fn message(&self, message: impl fmt::Display) -> CorrelationId {
        let correlation = CorrelationId::new();
        tracing::info!(
            area = %self.inner.area,
            category = %self.inner.message_category,
            correlation = %correlation,
            "{message}"
        );
        correlation
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(DiagnosticsConfig::default())
    }
}

/// Render an error and every source below it on one line
#[must_use]
pub fn describe_error(error: &(dyn Error + 'static)) -> String {
    let mut out = error.to_string();
    let mut source = error.source();
    while let Some(inner) = source {
        let _ = write!(out, "; caused by: {inner}");
        source = inner.source();
    }
    out
}

/// Install a fmt subscriber for hosts that have none
///
/// `RUST_LOG` wins over `default_filter`. Returns `false` when a global
/// subscriber was already installed.
pub fn init_tracing(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
