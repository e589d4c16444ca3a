//! Organization roles and the permissions they grant

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "org.view")]
    OrgView,
    #[serde(rename = "org.manage")]
    OrgManage,
    #[serde(rename = "org.invite_members")]
    OrgInviteMembers,
    #[serde(rename = "org.remove_members")]
    OrgRemoveMembers,
    #[serde(rename = "products.view")]
    ProductsView,
    #[serde(rename = "products.create")]
    ProductsCreate,
    #[serde(rename = "products.manage")]
    ProductsManage,
    #[serde(rename = "products.delete")]
    ProductsDelete,
    #[serde(rename = "members.view")]
    MembersView,
    #[serde(rename = "members.manage")]
    MembersManage,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::OrgView => "org.view",
            Permission::OrgManage => "org.manage",
            Permission::OrgInviteMembers => "org.invite_members",
            Permission::OrgRemoveMembers => "org.remove_members",
            Permission::ProductsView => "products.view",
            Permission::ProductsCreate => "products.create",
            Permission::ProductsManage => "products.manage",
            Permission::ProductsDelete => "products.delete",
            Permission::MembersView => "members.view",
            Permission::MembersManage => "members.manage",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "org.view" => Some(Permission::OrgView),
            "org.manage" => Some(Permission::OrgManage),
            "org.invite_members" => Some(Permission::OrgInviteMembers),
            "org.remove_members" => Some(Permission::OrgRemoveMembers),
            "products.view" => Some(Permission::ProductsView),
            "products.create" => Some(Permission::ProductsCreate),
            "products.manage" => Some(Permission::ProductsManage),
            "products.delete" => Some(Permission::ProductsDelete),
            "members.view" => Some(Permission::MembersView),
            "members.manage" => Some(Permission::MembersManage),
            _ => None,
        }
    }
}

const ORG_ADMIN_PERMISSIONS: &[Permission] = &[
    Permission::OrgView,
    Permission::OrgManage,
    Permission::OrgInviteMembers,
    Permission::OrgRemoveMembers,
    Permission::ProductsView,
    Permission::ProductsCreate,
    Permission::ProductsManage,
    Permission::ProductsDelete,
    Permission::MembersView,
    Permission::MembersManage,
];

const ORG_MEMBER_PERMISSIONS: &[Permission] = &[
    Permission::OrgView,
    Permission::ProductsView,
    Permission::MembersView,
];

const PRODUCT_PROVIDER_PERMISSIONS: &[Permission] = &[
    Permission::OrgView,
    Permission::ProductsView,
    Permission::ProductsCreate,
    Permission::ProductsManage,
];

/// Role a user holds inside an organization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    OrgAdmin,
    OrgMember,
    ProductProvider,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::OrgAdmin => "org_admin",
            Role::OrgMember => "org_member",
            Role::ProductProvider => "product_provider",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "org_admin" => Some(Role::OrgAdmin),
            "org_member" => Some(Role::OrgMember),
            "product_provider" => Some(Role::ProductProvider),
            _ => None,
        }
    }

    pub fn permissions(&self) -> &'static [Permission] {
        match self {
            Role::OrgAdmin => ORG_ADMIN_PERMISSIONS,
            Role::OrgMember => ORG_MEMBER_PERMISSIONS,
            Role::ProductProvider => PRODUCT_PROVIDER_PERMISSIONS,
        }
    }

    pub fn grants(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::OrgMember
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_names() {
        for role in [Role::OrgAdmin, Role::OrgMember, Role::ProductProvider] {
            assert_eq!(Role::from_str(role.as_str()), Some(role));
        }
        assert_eq!(Role::from_str("superuser"), None);
    }

    #[test]
    fn test_role_grants() {
        assert!(Role::OrgAdmin.grants(Permission::OrgInviteMembers));
        assert!(!Role::OrgMember.grants(Permission::OrgInviteMembers));
        assert!(Role::ProductProvider.grants(Permission::ProductsCreate));
        assert!(!Role::ProductProvider.grants(Permission::ProductsDelete));
    }

    #[test]
    fn test_permission_wire_names() {
        let json = serde_json::to_string(&Permission::OrgInviteMembers).unwrap();
        assert_eq!(json, "\"org.invite_members\"");
        assert_eq!(Permission::from_str("members.manage"), Some(Permission::MembersManage));
    }
}
