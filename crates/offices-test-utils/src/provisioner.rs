use async_trait::async_trait;
use offices_core::{
    GroupDefinition, GroupHandle, GroupRoleLink, ProvisioningApi, ProvisioningError, Slug,
    UserRef, WorkspaceDefinition, WorkspaceHandle,
};
use parking_lot::Mutex;
use std::collections::BTreeMap;

/// Workspace as stored by [`InMemoryProvisioner`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceSnapshot {
    pub definition: WorkspaceDefinition,
    pub links: Vec<GroupRoleLink>,
}

#[derive(Debug, Clone, Default)]
struct GroupState {
    owner: String,
    members: Vec<String>,
}

#[derive(Debug, Default)]
struct ProvisionState {
    groups: BTreeMap<String, GroupState>,
    workspaces: BTreeMap<Slug, WorkspaceSnapshot>,
    calls: usize,
    fail_deploys: bool,
    fail_memberships: bool,
}

/// Provisioning target kept in memory
///
/// Groups live at site level and survive workspace deletion. Deploys merge
/// into existing state under the same slug or group name.
#[derive(Debug, Default)]
pub struct InMemoryProvisioner {
    inner: Mutex<ProvisionState>,
}

impl InMemoryProvisioner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn workspace(&self, slug: &str) -> Option<WorkspaceSnapshot> {
        self.inner
            .lock()
            .workspaces
            .get(&Slug::from_raw(slug))
            .cloned()
    }

    pub fn workspace_count(&self) -> usize {
        self.inner.lock().workspaces.len()
    }

    pub fn group_names(&self) -> Vec<String> {
        self.inner.lock().groups.keys().cloned().collect()
    }

    pub fn group_owner(&self, name: &str) -> Option<String> {
        self.inner.lock().groups.get(name).map(|g| g.owner.clone())
    }

    pub fn group_members(&self, name: &str) -> Vec<String> {
        self.inner
            .lock()
            .groups
            .get(name)
            .map(|g| g.members.clone())
            .unwrap_or_default()
    }

    /// Every call received, successful or not
    pub fn call_count(&self) -> usize {
        self.inner.lock().calls
    }

    pub fn fail_deploys(&self, fail: bool) {
        self.inner.lock().fail_deploys = fail;
    }

    pub fn fail_memberships(&self, fail: bool) {
        self.inner.lock().fail_memberships = fail;
    }

    /// Seed a workspace that was provisioned outside the services
    pub fn seed_workspace(&self, slug: &str, title: &str) {
        let definition = WorkspaceDefinition {
            slug: Slug::from_raw(slug),
            title: title.to_string(),
            description: String::new(),
            template: "STS#0".to_string(),
            break_role_inheritance: false,
            copy_role_assignments: false,
        };
        self.inner.lock().workspaces.insert(
            definition.slug.clone(),
            WorkspaceSnapshot {
                definition,
                links: Vec::new(),
            },
        );
    }
}

#[async_trait]
impl ProvisioningApi for InMemoryProvisioner {
    async fn deploy_groups(&self, groups: &[GroupDefinition]) -> Result<(), ProvisioningError> {
        let mut state = self.inner.lock();
        state.calls += 1;
        if state.fail_deploys {
            return Err(ProvisioningError::DeployFailed("injected group deploy failure".into()));
        }
        for group in groups {
            state.groups.entry(group.name.clone()).or_default().owner = group.owner_login.clone();
        }
        Ok(())
    }

    async fn deploy_workspace(
        &self,
        workspace: &WorkspaceDefinition,
        links: &[GroupRoleLink],
    ) -> Result<(), ProvisioningError> {
        let mut state = self.inner.lock();
        state.calls += 1;
        if state.fail_deploys {
            return Err(ProvisioningError::DeployFailed("injected workspace deploy failure".into()));
        }
        if let Some(missing) = links.iter().find(|l| !state.groups.contains_key(&l.group)) {
            return Err(ProvisioningError::DeployFailed(format!(
                "group {} does not exist",
                missing.group
            )));
        }

        let entry = state
            .workspaces
            .entry(workspace.slug.clone())
            .or_insert_with(|| WorkspaceSnapshot {
                definition: workspace.clone(),
                links: Vec::new(),
            });
        entry.definition = workspace.clone();
        for link in links {
            if !entry.links.contains(link) {
                entry.links.push(link.clone());
            }
        }
        Ok(())
    }

    async fn find_workspace_by_slug(
        &self,
        slug: &Slug,
    ) -> Result<Option<WorkspaceHandle>, ProvisioningError> {
        let mut state = self.inner.lock();
        state.calls += 1;
        Ok(state.workspaces.get(slug).map(|ws| WorkspaceHandle {
            slug: ws.definition.slug.clone(),
            title: ws.definition.title.clone(),
        }))
    }

    async fn find_group(
        &self,
        workspace: &WorkspaceHandle,
        name: &str,
    ) -> Result<Option<GroupHandle>, ProvisioningError> {
        let mut state = self.inner.lock();
        state.calls += 1;
        if !state.workspaces.contains_key(&workspace.slug) {
            return Err(ProvisioningError::WorkspaceNotFound(workspace.slug.clone()));
        }
        Ok(state.groups.contains_key(name).then(|| GroupHandle {
            name: name.to_string(),
        }))
    }

    async fn delete_workspace(&self, workspace: &WorkspaceHandle) -> Result<(), ProvisioningError> {
        let mut state = self.inner.lock();
        state.calls += 1;
        state
            .workspaces
            .remove(&workspace.slug)
            .map(|_| ())
            .ok_or_else(|| ProvisioningError::WorkspaceNotFound(workspace.slug.clone()))
    }

    async fn add_user_to_group(
        &self,
        group: &GroupHandle,
        user: &UserRef,
    ) -> Result<(), ProvisioningError> {
        let mut state = self.inner.lock();
        state.calls += 1;
        if state.fail_memberships {
            return Err(ProvisioningError::MembershipFailed {
                group: group.name.clone(),
                user: user.login.clone(),
                reason: "injected membership failure".into(),
            });
        }
        let stored = state.groups.get_mut(&group.name).ok_or_else(|| {
            ProvisioningError::MembershipFailed {
                group: group.name.clone(),
                user: user.login.clone(),
                reason: "group does not exist".into(),
            }
        })?;
        if !stored.members.contains(&user.login) {
            stored.members.push(user.login.clone());
        }
        Ok(())
    }
}
