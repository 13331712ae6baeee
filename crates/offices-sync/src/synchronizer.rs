//! Record synchronizer
//!
//! Copies office records that are not yet flagged as copied into the archive
//! list, then flags them on the source. The flag is the only idempotency
//! token: a record is flagged only after its archive copy was persisted, so
//! anything left unflagged by a failed run is picked up by the next one.

use crate::guard::{GuardDecision, SingleInstanceGuard};
use crate::job::JobTarget;
use offices_core::{
    bounded, ArchiveFields, ConfigError, CorrelationId, Diagnostics, FailureScope, FieldKey, FieldValue,
    Filter, ListId, OfficeFields, OfficesConfig, OfficesError, Record, RecordStore,
};
use std::sync::Arc;

/// Why a run stopped before processing every pending record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Site or web url not configured
    InvalidSettings {
        /// Offending setting
        setting: &'static str,
    },
    /// Another run is active
    AlreadyRunning {
        /// Instances seen, this one included
        instances: usize,
    },
    /// The guard could not be evaluated
    GuardUnavailable {
        /// Diagnostics entry
        correlation: CorrelationId,
    },
    /// A store failure ended the run
    Aborted {
        /// Diagnostics entry
        correlation: CorrelationId,
    },
}

/// Summary of one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Records selected as not yet copied
    pub selected: usize,
    /// Records copied and flagged
    pub copied: usize,
    /// Records that failed
    pub failed: usize,
    /// Set when the run did not go through every selected record
    pub skipped_reason: Option<SkipReason>,
}

impl SyncReport {
    fn skipped(reason: SkipReason) -> Self {
        Self {
            skipped_reason: Some(reason),
            ..Self::default()
        }
    }

    /// Whether every selected record was copied
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.skipped_reason.is_none() && self.failed == 0
    }
}

/// Incremental source to archive copier
pub struct RecordSynchronizer {
    store: Arc<dyn RecordStore>,
    guard: SingleInstanceGuard,
    config: Arc<OfficesConfig>,
    office: OfficeFields,
    archive: ArchiveFields,
    copy_pairs: [(FieldKey, FieldKey); 3],
    diagnostics: Diagnostics,
}

impl std::fmt::Debug for RecordSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordSynchronizer")
            .field("guard", &self.guard)
            .field("office", &self.office)
            .field("archive", &self.archive)
            .finish_non_exhaustive()
    }
}

impl RecordSynchronizer {
    /// Create new synchronizer
    #[must_use]
    pub fn new(
        store: Arc<dyn RecordStore>,
        guard: SingleInstanceGuard,
        config: Arc<OfficesConfig>,
        diagnostics: Diagnostics,
    ) -> Self {
        let office = config.office_fields();
        let archive = config.archive_fields();
        let copy_pairs = [
            (office.title.clone(), archive.title.clone()),
            (office.name.clone(), archive.name.clone()),
            (office.director.clone(), archive.director.clone()),
        ];
        Self {
            store,
            guard,
            config,
            office,
            archive,
            copy_pairs,
            diagnostics,
        }
    }

    /// Run one synchronization pass
    ///
    /// Never fails; problems are logged through diagnostics and reflected in
    /// the report.
    pub async fn run(&self) -> SyncReport {
        let job = &self.config.job;

        if let Err(e) = JobTarget::from_settings(job) {
            self.diagnostics
                .message(format_args!("Timer job {} can not be started: {e}", job.title));
            let setting = match e {
                ConfigError::BlankSetting(setting) => setting,
                _ => "job",
            };
            return SyncReport::skipped(SkipReason::InvalidSettings { setting });
        }

        let _permit = match self.guard.acquire(&job.name).await {
            Ok(GuardDecision::Proceed(permit)) => permit,
            Ok(GuardDecision::Busy { instances }) => {
                self.diagnostics.message(format_args!(
                    "You can not run multiple instances of the same timer job. Name: {}, Time start attempt: {}",
                    job.title,
                    chrono::Local::now().format("%d:%m:%Y:%H:%M:%S")
                ));
                return SyncReport::skipped(SkipReason::AlreadyRunning { instances });
            }
            Err(e) => {
                let correlation = self
                    .diagnostics
                    .error(&format!("Timer job {} could not check running instances", job.title), &e);
                return SyncReport::skipped(SkipReason::GuardUnavailable { correlation });
            }
        };

        let mut report = SyncReport::default();
        if let Err(e) = self.copy_pending(&mut report).await {
            let correlation = self.diagnostics.error(
                &format!(
                    "Failed to copy the elements of the list {} to the list {}",
                    self.config.lists.source, self.config.lists.archive
                ),
                &e,
            );
            report.skipped_reason = Some(SkipReason::Aborted { correlation });
        }

        tracing::info!(
            job = %job.name,
            selected = report.selected,
            copied = report.copied,
            failed = report.failed,
            "synchronization run finished"
        );
        report
    }

    async fn copy_pending(&self, report: &mut SyncReport) -> Result<(), OfficesError> {
        let limit = self.config.call_timeout();
        let source = bounded(
            "open_list",
            limit,
            self.store.open_list(&self.config.lists.source),
        )
        .await?;
        let archive = bounded(
            "open_list",
            limit,
            self.store.open_list(&self.config.lists.archive),
        )
        .await?;

        let pending = Filter::NotEqual(self.office.is_copied.clone(), FieldValue::Bool(true));
        let projection = [
            self.office.name.clone(),
            self.office.director.clone(),
            self.office.is_copied.clone(),
            self.office.title.clone(),
        ];
        let records = bounded(
            "query",
            limit,
            self.store.query(&source, &pending, &projection),
        )
        .await?;
        report.selected = records.len();

        if records.is_empty() {
            tracing::debug!(list = %source, "no pending records");
            return Ok(());
        }

        for record in &records {
            match self.copy_record(&archive, record).await {
                Ok(()) => report.copied += 1,
                Err(e) => {
                    report.failed += 1;
                    match self.config.job.failure_scope {
                        FailureScope::Batch => return Err(e),
                        FailureScope::PerRecord => {
                            self.diagnostics
                                .error(&format!("Failed to copy record {}", record.id), &e);
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Create the archive copy, persist it, then flag the source
    async fn copy_record(&self, archive: &ListId, source: &Record) -> Result<(), OfficesError> {
        let limit = self.config.call_timeout();

        let mut copy = bounded("create_record", limit, self.store.create_record(archive)).await?;
        source.copy_fields_to(&mut copy, &self.copy_pairs);
        copy.set_field(
            self.archive.source_id.clone(),
            FieldValue::Number(i64::from(source.id.0)),
        );
        bounded("update_record", limit, self.store.update_record(&copy)).await?;

        let flag = Record::new(source.id, source.list.clone())
            .with_field(self.office.is_copied.clone(), FieldValue::Bool(true));
        bounded("update_record", limit, self.store.update_record(&flag)).await?;

        tracing::debug!(source = %source.id, archive = %copy.id, "record copied");
        Ok(())
    }
}
