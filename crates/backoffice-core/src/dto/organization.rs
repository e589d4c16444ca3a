//! Organization, membership and invitation request DTOs

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::common::{entity_name, not_nil};
use crate::domain::Role;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOrganizationRequest {
    /// Creator; becomes owner and first `org_admin`.
    #[validate(custom(function = "not_nil"))]
    pub owner_user_id: Uuid,

    #[validate(custom(function = "entity_name"))]
    pub name: String,

    #[validate(length(max = 1000, message = "description must be at most 1000 characters"))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateOrganizationRequest {
    #[validate(custom(function = "entity_name"))]
    pub name: Option<String>,

    #[validate(length(max = 1000, message = "description must be at most 1000 characters"))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TransferOwnershipRequest {
    #[validate(custom(function = "not_nil"))]
    pub new_owner_user_id: Uuid,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct InviteUserRequest {
    #[validate(custom(function = "not_nil"))]
    pub inviter_user_id: Uuid,

    #[validate(email(message = "email must be a valid address"))]
    pub email: String,

    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AcceptInvitationRequest {
    #[validate(length(min = 1, message = "token is required"))]
    pub token: String,

    #[validate(custom(function = "not_nil"))]
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateMemberRoleRequest {
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invite_requires_valid_email() {
        let req = InviteUserRequest {
            inviter_user_id: Uuid::new_v4(),
            email: "not-an-email".into(),
            role: Role::OrgMember,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_invite_role_defaults_to_member() {
        let req: InviteUserRequest = serde_json::from_value(serde_json::json!({
            "inviter_user_id": Uuid::new_v4(),
            "email": "guest@example.com"
        }))
        .unwrap();
        assert_eq!(req.role, Role::OrgMember);
        assert!(req.validate().is_ok());
    }
}
