//! Workspace lifecycle orchestrator
//!
//! Reacts to record events in the request path:
//! - add/update of an actionable record deploys the workspace, its three
//!   groups and their role links as one batch, then applies memberships
//! - delete removes the workspace if it exists
//!
//! Create and update share one path; the provisioning layer merges into an
//! existing workspace under the same slug.

use crate::event::{EventOutcome, RecordEvent};
use crate::lifecycle::{LifecycleTracker, WorkspaceState};
use crate::plan::{GroupRole, WorkspacePlan};
use offices_core::{
    bounded, validation, ActionableOffice, Diagnostics, GroupHandle, OfficeFields,
    OfficeSnapshot, OfficesConfig, OfficesError, ProvisioningApi, Record, RecordId, Slug, UserRef,
    WorkspaceHandle,
};
use std::sync::Arc;

/// Drives workspace provisioning from record events
pub struct WorkspaceLifecycleOrchestrator {
    provisioning: Arc<dyn ProvisioningApi>,
    config: Arc<OfficesConfig>,
    fields: OfficeFields,
    diagnostics: Diagnostics,
    tracker: LifecycleTracker,
}

impl std::fmt::Debug for WorkspaceLifecycleOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceLifecycleOrchestrator")
            .field("fields", &self.fields)
            .field("tracked", &self.tracker.len())
            .finish_non_exhaustive()
    }
}

impl WorkspaceLifecycleOrchestrator {
    /// Create new orchestrator
    #[must_use]
    pub fn new(
        provisioning: Arc<dyn ProvisioningApi>,
        config: Arc<OfficesConfig>,
        diagnostics: Diagnostics,
    ) -> Self {
        let fields = config.office_fields();
        Self {
            provisioning,
            config,
            fields,
            diagnostics,
            tracker: LifecycleTracker::new(),
        }
    }

    /// Lifecycle states seen by this orchestrator
    #[inline]
    #[must_use]
    pub fn tracker(&self) -> &LifecycleTracker {
        &self.tracker
    }

    /// Handle one record event
    ///
    /// Never fails: provisioning errors are logged through diagnostics and
    /// reported as [`EventOutcome::Failed`].
    pub async fn handle(&self, event: RecordEvent) -> EventOutcome {
        tracing::debug!(record = %event.record_id(), kind = event.kind(), "handling record event");

        match event {
            RecordEvent::ItemAdded(snapshot) | RecordEvent::ItemUpdated(snapshot) => {
                self.on_upsert(&snapshot).await
            }
            RecordEvent::ItemDeleted(id) => self.on_delete(id).await,
        }
    }

    async fn on_upsert(&self, snapshot: &Record) -> EventOutcome {
        let id = snapshot.id;
        let office = match validation::check(&OfficeSnapshot::from_record(snapshot, &self.fields)) {
            Ok(office) => office,
            Err(reason) => {
                tracing::debug!(record = %id, reason = reason.as_str(), "office not actionable, skipping");
                return EventOutcome::Skipped { id, reason };
            }
        };

        if let Err(e) = self.tracker.check(id, WorkspaceState::Provisioned) {
            tracing::warn!(record = %id, "ignoring upsert: {e}");
            return EventOutcome::Ignored {
                id,
                state: self.tracker.state(id),
            };
        }

        match self.provision(&office).await {
            Ok((slug, memberships)) => {
                if let Err(e) = self.tracker.advance(id, WorkspaceState::Provisioned) {
                    tracing::warn!(record = %id, "workspace provisioned after delete: {e}");
                }
                tracing::info!(record = %id, slug = %slug, memberships, "workspace provisioned");
                EventOutcome::Provisioned { slug, memberships }
            }
            Err(e) => {
                let correlation = self
                    .diagnostics
                    .error(&format!("failed to provision workspace for office {id}"), &e);
                EventOutcome::Failed { id, correlation }
            }
        }
    }

    async fn on_delete(&self, id: RecordId) -> EventOutcome {
        if let Err(e) = self.tracker.check(id, WorkspaceState::Deleted) {
            tracing::warn!(record = %id, "ignoring delete: {e}");
            return EventOutcome::Ignored {
                id,
                state: self.tracker.state(id),
            };
        }

        let slug = Slug::for_record(&self.config.slug_prefix, id);
        match self.deprovision(&slug).await {
            Ok(existed) => {
                if let Err(e) = self.tracker.advance(id, WorkspaceState::Deleted) {
                    tracing::warn!(record = %id, "{e}");
                }
                if existed {
                    tracing::info!(record = %id, slug = %slug, "workspace deleted");
                    EventOutcome::Deprovisioned { slug }
                } else {
                    tracing::debug!(record = %id, slug = %slug, "no workspace to delete");
                    EventOutcome::AlreadyAbsent { slug }
                }
            }
            Err(e) => {
                let correlation = self
                    .diagnostics
                    .error(&format!("failed to delete workspace {slug}"), &e);
                EventOutcome::Failed { id, correlation }
            }
        }
    }

    /// Deploy the plan, then apply memberships on the resolved workspace
    async fn provision(&self, office: &ActionableOffice) -> Result<(Slug, usize), OfficesError> {
        let plan = WorkspacePlan::for_office(office, &self.config);
        let limit = self.config.call_timeout();

        // Groups must exist at site level before the workspace links them.
        bounded("deploy_groups", limit, self.provisioning.deploy_groups(&plan.groups)).await?;
        bounded(
            "deploy_workspace",
            limit,
            self.provisioning.deploy_workspace(&plan.workspace, &plan.links),
        )
        .await?;

        let found = bounded(
            "find_workspace_by_slug",
            limit,
            self.provisioning.find_workspace_by_slug(plan.slug()),
        )
        .await?;
        let Some(workspace) = found else {
            tracing::warn!(slug = %plan.slug(), "workspace not found after deploy, memberships skipped");
            return Ok((plan.slug().clone(), 0));
        };

        let mut memberships = 0;
        if let Some(owners) = self.resolve_group(&workspace, &plan, GroupRole::Owners).await? {
            self.add_member(&owners, &office.director).await?;
            memberships += 1;
        }
        if let Some(members) = self.resolve_group(&workspace, &plan, GroupRole::Members).await? {
            for member in &office.members {
                self.add_member(&members, member).await?;
                memberships += 1;
            }
        }

        Ok((plan.slug().clone(), memberships))
    }

    async fn resolve_group(
        &self,
        workspace: &WorkspaceHandle,
        plan: &WorkspacePlan,
        role: GroupRole,
    ) -> Result<Option<GroupHandle>, OfficesError> {
        let Some(name) = plan.group(role) else {
            return Ok(None);
        };
        let group = bounded(
            "find_group",
            self.config.call_timeout(),
            self.provisioning.find_group(workspace, name),
        )
        .await?;
        if group.is_none() {
            tracing::warn!(slug = %workspace.slug, group = name, "group missing on workspace");
        }
        Ok(group)
    }

    async fn add_member(
        &self,
        group: &GroupHandle,
        user: &UserRef,
    ) -> Result<(), OfficesError> {
        bounded(
            "add_user_to_group",
            self.config.call_timeout(),
            self.provisioning.add_user_to_group(group, user),
        )
        .await
    }

    /// Delete the workspace under `slug`; `false` when there was none
    async fn deprovision(&self, slug: &Slug) -> Result<bool, OfficesError> {
        let limit = self.config.call_timeout();
        let found = bounded(
            "find_workspace_by_slug",
            limit,
            self.provisioning.find_workspace_by_slug(slug),
        )
        .await?;
        let Some(workspace) = found else {
            return Ok(false);
        };
        bounded(
            "delete_workspace",
            limit,
            self.provisioning.delete_workspace(&workspace),
        )
        .await?;
        Ok(true)
    }
}
