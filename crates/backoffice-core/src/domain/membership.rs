//! Membership entity (user <-> organization)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Permission, Role};

/// At most one active membership exists per `(user_id, organization_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Membership {
    pub id: Uuid,
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub role: Role,
    pub is_active: bool,
    pub joined_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Membership {
    pub fn new(user_id: Uuid, organization_id: Uuid, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            organization_id,
            role,
            is_active: true,
            joined_at: now,
            updated_at: now,
        }
    }

    /// True only for an active membership whose role grants `permission`.
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.is_active && self.role.grants(permission)
    }

    pub fn update_role(&mut self, role: Role) {
        self.role = role;
        self.updated_at = Utc::now();
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inactive_membership_has_no_permissions() {
        let mut membership = Membership::new(Uuid::new_v4(), Uuid::new_v4(), Role::OrgAdmin);
        assert!(membership.has_permission(Permission::OrgManage));

        membership.deactivate();
        assert!(!membership.has_permission(Permission::OrgManage));
        assert!(!membership.has_permission(Permission::OrgView));
    }

    #[test]
    fn test_update_role_changes_grants() {
        let mut membership = Membership::new(Uuid::new_v4(), Uuid::new_v4(), Role::OrgMember);
        assert!(!membership.has_permission(Permission::MembersManage));

        membership.update_role(Role::OrgAdmin);
        assert!(membership.has_permission(Permission::MembersManage));
        assert!(membership.updated_at >= membership.joined_at);
    }
}
