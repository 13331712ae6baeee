//! Provisioning plan for one office
//!
//! Pure construction of the workspace, group and role-link definitions that
//! the orchestrator deploys as one batch.

use offices_core::{
    ActionableOffice, GroupDefinition, GroupRoleLink, OfficesConfig, SecurityRole, Slug,
    WorkspaceDefinition,
};

/// The three access tiers of an office workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupRole {
    /// Administrators
    Owners,
    /// Contributors
    Members,
    /// Readers
    Visitors,
}

impl GroupRole {
    /// All tiers in deploy order
    pub const ALL: [GroupRole; 3] = [GroupRole::Owners, GroupRole::Members, GroupRole::Visitors];

    /// Role granted on the workspace
    #[inline]
    #[must_use]
    pub fn security_role(self) -> SecurityRole {
        match self {
            Self::Owners => SecurityRole::Administrator,
            Self::Members => SecurityRole::Contributor,
            Self::Visitors => SecurityRole::Reader,
        }
    }

    /// Configured name suffix
    #[inline]
    #[must_use]
    pub fn suffix(self, config: &OfficesConfig) -> &str {
        match self {
            Self::Owners => &config.groups.owners,
            Self::Members => &config.groups.members,
            Self::Visitors => &config.groups.visitors,
        }
    }
}

/// `"<office name> - <role suffix>"`
#[must_use]
pub fn group_name(office_name: &str, role: GroupRole, config: &OfficesConfig) -> String {
    format!("{office_name} - {}", role.suffix(config))
}

/// Everything deployed for one office
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspacePlan {
    /// Workspace definition
    pub workspace: WorkspaceDefinition,
    /// Group definitions, in [`GroupRole::ALL`] order
    pub groups: Vec<GroupDefinition>,
    /// Group to role links on the workspace
    pub links: Vec<GroupRoleLink>,
}

impl WorkspacePlan {
    /// Build the plan for a validated office
    #[must_use]
    pub fn for_office(office: &ActionableOffice, config: &OfficesConfig) -> Self {
        let workspace = WorkspaceDefinition {
            slug: Slug::for_record(&config.slug_prefix, office.id),
            title: office.name.clone(),
            description: String::new(),
            template: config.workspace_template.clone(),
            break_role_inheritance: true,
            copy_role_assignments: false,
        };

        let groups = GroupRole::ALL
            .iter()
            .map(|role| GroupDefinition {
                name: group_name(&office.name, *role, config),
                owner_login: office.director.login.clone(),
            })
            .collect();

        let links = GroupRole::ALL
            .iter()
            .map(|role| GroupRoleLink {
                group: group_name(&office.name, *role, config),
                role: role.security_role(),
            })
            .collect();

        Self {
            workspace,
            groups,
            links,
        }
    }

    /// Slug of the planned workspace
    #[inline]
    #[must_use]
    pub fn slug(&self) -> &Slug {
        &self.workspace.slug
    }

    /// Name of the group for a tier
    #[must_use]
    pub fn group(&self, role: GroupRole) -> Option<&str> {
        let index = GroupRole::ALL.iter().position(|r| *r == role)?;
        self.groups.get(index).map(|g| g.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use offices_core::{RecordId, UserRef};
    use pretty_assertions::assert_eq;

    fn berlin() -> ActionableOffice {
        ActionableOffice {
            id: RecordId(42),
            name: "Berlin".to_string(),
            director: UserRef::new(1, "alice"),
            members: vec![UserRef::new(1, "alice"), UserRef::new(2, "bob")],
        }
    }

    #[test]
    fn plan_names_and_roles() {
        let config = OfficesConfig::default();
        let plan = WorkspacePlan::for_office(&berlin(), &config);

        assert_eq!(plan.slug().as_str(), "user-web-42");
        assert_eq!(plan.workspace.title, "Berlin");
        assert_eq!(plan.workspace.description, "");
        assert_eq!(plan.workspace.template, "STS#0");
        assert!(plan.workspace.break_role_inheritance);
        assert!(!plan.workspace.copy_role_assignments);

        let names: Vec<&str> = plan.groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Berlin - Office Owners",
                "Berlin - Office Members",
                "Berlin - Office Visitors"
            ]
        );
        assert!(plan.groups.iter().all(|g| g.owner_login == "alice"));

        let roles: Vec<SecurityRole> = plan.links.iter().map(|l| l.role).collect();
        assert_eq!(
            roles,
            vec![
                SecurityRole::Administrator,
                SecurityRole::Contributor,
                SecurityRole::Reader
            ]
        );
        assert_eq!(plan.group(GroupRole::Members), Some("Berlin - Office Members"));
    }
}
