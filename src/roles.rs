//! Static role/permission matrix shown in the admin console.
//!
//! The matrix is display data only; nothing in the crate enforces it.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::errors::{PortalError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    SuperAdmin,
    Admin,
    Reviewer,
    Finance,
    Member,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::SuperAdmin,
        Role::Admin,
        Role::Reviewer,
        Role::Finance,
        Role::Member,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Admin => "admin",
            Role::Reviewer => "reviewer",
            Role::Finance => "finance",
            Role::Member => "member",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "Super Admin",
            Role::Admin => "Admin",
            Role::Reviewer => "Reviewer",
            Role::Finance => "Finance",
            Role::Member => "Member",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Permission {
    ManageMembers,
    ReviewApplications,
    ApproveApplications,
    ManagePayments,
    ManageContent,
    ViewReports,
    ManageRoles,
}

impl Permission {
    pub const ALL: [Permission; 7] = [
        Permission::ManageMembers,
        Permission::ReviewApplications,
        Permission::ApproveApplications,
        Permission::ManagePayments,
        Permission::ManageContent,
        Permission::ViewReports,
        Permission::ManageRoles,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ManageMembers => "manage_members",
            Permission::ReviewApplications => "review_applications",
            Permission::ApproveApplications => "approve_applications",
            Permission::ManagePayments => "manage_payments",
            Permission::ManageContent => "manage_content",
            Permission::ViewReports => "view_reports",
            Permission::ManageRoles => "manage_roles",
        }
    }
}

macro_rules! snake_case_display {
    ($ty:ty, $what:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
                <$ty>::ALL
                    .into_iter()
                    .find(|item| item.as_str() == normalized)
                    .ok_or_else(|| format!("unknown {} `{}`", $what, s.trim()))
            }
        }
    };
}

snake_case_display!(Role, "role");
snake_case_display!(Permission, "permission");

/// Role to granted-permission table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionMatrix {
    grants: BTreeMap<(Role, Permission), bool>,
}

impl Default for PermissionMatrix {
    fn default() -> Self {
        use Permission::*;

        let mut grants = BTreeMap::new();
        for role in Role::ALL {
            for permission in Permission::ALL {
                let granted = match role {
                    Role::SuperAdmin => true,
                    Role::Admin => permission != ManageRoles,
                    Role::Reviewer => {
                        matches!(permission, ReviewApplications | ViewReports)
                    }
                    Role::Finance => matches!(permission, ManagePayments | ViewReports),
                    Role::Member => false,
                };
                grants.insert((role, permission), granted);
            }
        }
        Self { grants }
    }
}

impl PermissionMatrix {
    pub fn allows(&self, role: Role, permission: Permission) -> bool {
        self.grants
            .get(&(role, permission))
            .copied()
            .unwrap_or(false)
    }

    /// Flips one cell and returns its new value.
    pub fn toggle(&mut self, role: Role, permission: Permission) -> Result<bool> {
        if role == Role::SuperAdmin && permission == Permission::ManageRoles {
            return Err(PortalError::InvalidInput(
                "super_admin always keeps manage_roles".into(),
            ));
        }
        let cell = self.grants.entry((role, permission)).or_insert(false);
        *cell = !*cell;
        tracing::info!(role = %role, permission = %permission, granted = *cell, "permission toggled");
        Ok(*cell)
    }

    pub fn permissions_for(&self, role: Role) -> Vec<Permission> {
        Permission::ALL
            .into_iter()
            .filter(|permission| self.allows(role, *permission))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matrix_grants_expected_cells() {
        let matrix = PermissionMatrix::default();
        assert!(matrix.allows(Role::SuperAdmin, Permission::ManageRoles));
        assert!(!matrix.allows(Role::Admin, Permission::ManageRoles));
        assert!(matrix.allows(Role::Reviewer, Permission::ReviewApplications));
        assert!(!matrix.allows(Role::Reviewer, Permission::ApproveApplications));
        assert!(matrix.permissions_for(Role::Member).is_empty());
    }

    #[test]
    fn toggle_flips_and_reports_new_value() {
        let mut matrix = PermissionMatrix::default();
        assert!(matrix
            .toggle(Role::Reviewer, Permission::ApproveApplications)
            .unwrap());
        assert!(matrix.allows(Role::Reviewer, Permission::ApproveApplications));
        assert!(!matrix
            .toggle(Role::Reviewer, Permission::ApproveApplications)
            .unwrap());
    }

    #[test]
    fn super_admin_keeps_manage_roles() {
        let mut matrix = PermissionMatrix::default();
        assert!(matrix
            .toggle(Role::SuperAdmin, Permission::ManageRoles)
            .is_err());
        assert!(matrix.allows(Role::SuperAdmin, Permission::ManageRoles));
    }

    #[test]
    fn names_parse_with_hyphens() {
        assert_eq!("super-admin".parse::<Role>().unwrap(), Role::SuperAdmin);
        assert_eq!(
            "view_reports".parse::<Permission>().unwrap(),
            Permission::ViewReports
        );
        assert!("owner".parse::<Role>().is_err());
    }
}
