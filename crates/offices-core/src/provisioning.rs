//! Workspace provisioning contract
//!
//! Definitions describe the desired state; the provisioning layer deploys
//! them and is expected to merge into whatever already exists under the same
//! slug or group name.

use crate::error::ProvisioningError;
use crate::types::{Slug, UserRef};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Built-in permission level granted to a group on a workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SecurityRole {
    /// Full control
    Administrator,
    /// Read and write content
    Contributor,
    /// Read only
    Reader,
}

/// Desired workspace (sub-site) state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceDefinition {
    /// Url slug, the dedup key
    pub slug: Slug,
    /// Display title
    pub title: String,
    /// Description
    pub description: String,
    /// Site template identifier
    pub template: String,
    /// Stop inheriting permissions from the parent
    pub break_role_inheritance: bool,
    /// Copy parent role assignments when breaking inheritance
    pub copy_role_assignments: bool,
}

/// Desired site-level security group
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupDefinition {
    /// Group name, unique at site level
    pub name: String,
    /// Owner login
    pub owner_login: String,
}

/// Role granted to a group on the workspace
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupRoleLink {
    /// Group name
    pub group: String,
    /// Granted role
    pub role: SecurityRole,
}

/// Concrete workspace resolved from the provisioning layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceHandle {
    /// Slug
    pub slug: Slug,
    /// Current title
    pub title: String,
}

/// Concrete security group resolved from the provisioning layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupHandle {
    /// Group name
    pub name: String,
}

/// Workspace provisioning target
#[async_trait]
pub trait ProvisioningApi: Send + Sync {
    /// Create or merge site-level groups
    async fn deploy_groups(&self, groups: &[GroupDefinition]) -> Result<(), ProvisioningError>;

    /// Create or merge a workspace and link groups to roles on it
    async fn deploy_workspace(
        &self,
        workspace: &WorkspaceDefinition,
        links: &[GroupRoleLink],
    ) -> Result<(), ProvisioningError>;

    /// Resolve a workspace by exact slug
    async fn find_workspace_by_slug(
        &self,
        slug: &Slug,
    ) -> Result<Option<WorkspaceHandle>, ProvisioningError>;

    /// Resolve a group visible from a workspace by exact name
    async fn find_group(
        &self,
        workspace: &WorkspaceHandle,
        name: &str,
    ) -> Result<Option<GroupHandle>, ProvisioningError>;

    /// Delete a workspace
    async fn delete_workspace(&self, workspace: &WorkspaceHandle) -> Result<(), ProvisioningError>;

    /// Add a user to a group; adding an existing member is a no-op
    async fn add_user_to_group(
        &self,
        group: &GroupHandle,
        user: &UserRef,
    ) -> Result<(), ProvisioningError>;
}
