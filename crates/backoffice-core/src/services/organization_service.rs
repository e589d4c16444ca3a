// ============================================================================
// Back-office Core - Organization Service
// File: crates/backoffice-core/src/services/organization_service.rs
// ============================================================================
//! Organizations, memberships and invitations

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use backoffice_shared::utils::mask_email;

use crate::domain::{Invitation, Membership, Organization, Permission, Role};
use crate::dto::{
    AcceptInvitationRequest, CreateOrganizationRequest, InviteUserRequest, TransferOwnershipRequest,
    UpdateMemberRoleRequest, UpdateOrganizationRequest,
};
use crate::error::{DomainError, ErrorDomain};
use crate::repositories::{InvitationRepository, MembershipRepository, OrganizationRepository};

pub struct OrganizationService {
    organizations: Arc<dyn OrganizationRepository>,
    memberships: Arc<dyn MembershipRepository>,
    invitations: Arc<dyn InvitationRepository>,
    invitation_ttl: Duration,
}

impl OrganizationService {
    pub fn new(
        organizations: Arc<dyn OrganizationRepository>,
        memberships: Arc<dyn MembershipRepository>,
        invitations: Arc<dyn InvitationRepository>,
        invitation_ttl: Duration,
    ) -> Self {
        Self {
            organizations,
            memberships,
            invitations,
            invitation_ttl,
        }
    }

    /// Creates the organization and an active `org_admin` membership for its creator.
    pub async fn create_organization(&self, request: CreateOrganizationRequest) -> Result<Organization, DomainError> {
        validate(&request)?;

        let organization = Organization::new(&request.name, request.description, request.owner_user_id);
        let owner = Membership::new(request.owner_user_id, organization.id, Role::OrgAdmin);
        let created = self.organizations.create(&organization, &owner).await?;

        info!("Organization created: {} ({}) owner {}", created.name, created.id, created.owner_user_id);
        Ok(created)
    }

    pub async fn get_organization(&self, id: Uuid) -> Result<Organization, DomainError> {
        self.organizations
            .find_by_id(id)
            .await?
            .ok_or(DomainError::OrganizationNotFound(id))
    }

    pub async fn get_user_organizations(&self, user_id: Uuid) -> Result<Vec<Organization>, DomainError> {
        self.organizations.find_by_user(user_id).await
    }

    pub async fn update_organization(
        &self,
        id: Uuid,
        request: UpdateOrganizationRequest,
    ) -> Result<Organization, DomainError> {
        validate(&request)?;

        let mut organization = self.get_organization(id).await?;
        if let Some(name) = request.name {
            organization.name = name.trim().to_string();
        }
        if let Some(description) = request.description {
            organization.description = Some(description.trim().to_string());
        }
        organization.touch();

        self.organizations.update(&organization).await
    }

    /// The new owner must already be an active member; they are promoted to
    /// `org_admin` if they hold a lesser role.
    pub async fn transfer_ownership(
        &self,
        id: Uuid,
        request: TransferOwnershipRequest,
    ) -> Result<Organization, DomainError> {
        validate(&request)?;

        let mut organization = self.get_organization(id).await?;
        let new_owner = request.new_owner_user_id;

        let mut membership = self.active_membership(new_owner, id).await?;
        if membership.role != Role::OrgAdmin {
            membership.update_role(Role::OrgAdmin);
            self.memberships.update(&membership).await?;
        }

        let previous = organization.owner_user_id;
        organization.transfer_ownership(new_owner);
        let updated = self.organizations.update(&organization).await?;

        info!("Organization {} ownership transferred from {} to {}", id, previous, new_owner);
        Ok(updated)
    }

    pub async fn invite_user(&self, organization_id: Uuid, request: InviteUserRequest) -> Result<Invitation, DomainError> {
        validate(&request)?;

        self.get_organization(organization_id).await?;
        self.require_permission(organization_id, request.inviter_user_id, Permission::OrgInviteMembers)
            .await?;

        let invitation = Invitation::new(
            organization_id,
            request.inviter_user_id,
            &request.email,
            request.role,
            self.invitation_ttl,
        );
        let created = self.invitations.create(&invitation).await?;

        info!(
            "Invitation {} created for {} in organization {}",
            created.id,
            mask_email(&created.email),
            organization_id
        );
        Ok(created)
    }

    pub async fn get_invitations(&self, organization_id: Uuid) -> Result<Vec<Invitation>, DomainError> {
        self.get_organization(organization_id).await?;
        self.invitations.find_by_organization(organization_id).await
    }

    /// Redeems the invitation and creates the membership in one storage
    /// step. An existing active membership fails with a conflict and leaves
    /// the invitation unused.
    pub async fn accept_invitation(&self, request: AcceptInvitationRequest) -> Result<Membership, DomainError> {
        validate(&request)?;
        let now = Utc::now();

        // 1. Look up and pre-check
        let invitation = self
            .invitations
            .find_by_token(&request.token)
            .await?
            .ok_or(DomainError::InvitationNotFound)?;
        invitation.ensure_redeemable(now).inspect_err(|e| {
            warn!("Invitation {} rejected: {}", invitation.id, e);
        })?;

        // 2. Refuse duplicate membership
        if self
            .memberships
            .find_by_user_and_organization(request.user_id, invitation.organization_id)
            .await?
            .is_some()
        {
            return Err(DomainError::MembershipAlreadyExists {
                user_id: request.user_id,
                organization_id: invitation.organization_id,
            });
        }

        // 3. Claim and join; the claim is authoritative under concurrency
        let membership = Membership::new(request.user_id, invitation.organization_id, invitation.role);
        let created = self
            .invitations
            .redeem(&invitation.token, &membership, now)
            .await
            .inspect_err(|e| warn!("Invitation {} not redeemed: {}", invitation.id, e))?;

        info!(
            "User {} joined organization {} as {}",
            request.user_id,
            invitation.organization_id,
            invitation.role.as_str()
        );
        Ok(created)
    }

    pub async fn get_members(&self, organization_id: Uuid) -> Result<Vec<Membership>, DomainError> {
        self.get_organization(organization_id).await?;
        self.memberships.find_by_organization(organization_id).await
    }

    pub async fn update_member_role(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        request: UpdateMemberRoleRequest,
    ) -> Result<Membership, DomainError> {
        validate(&request)?;

        let mut membership = self.active_membership(user_id, organization_id).await?;
        membership.update_role(request.role);
        let updated = self.memberships.update(&membership).await?;

        info!("Member {} of organization {} now {}", user_id, organization_id, request.role.as_str());
        Ok(updated)
    }

    pub async fn remove_member(&self, organization_id: Uuid, user_id: Uuid) -> Result<(), DomainError> {
        let organization = self.get_organization(organization_id).await?;
        if organization.is_owner(user_id) {
            warn!("Refusing to remove owner {} from organization {}", user_id, organization_id);
            return Err(DomainError::CannotRemoveOwner);
        }

        self.memberships.delete(user_id, organization_id).await?;
        info!("Member {} removed from organization {}", user_id, organization_id);
        Ok(())
    }

    pub async fn has_permission(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        permission: Permission,
    ) -> Result<bool, DomainError> {
        Ok(self
            .memberships
            .find_by_user_and_organization(user_id, organization_id)
            .await?
            .is_some_and(|m| m.has_permission(permission)))
    }

    async fn active_membership(&self, user_id: Uuid, organization_id: Uuid) -> Result<Membership, DomainError> {
        self.memberships
            .find_by_user_and_organization(user_id, organization_id)
            .await?
            .filter(|m| m.is_active)
            .ok_or(DomainError::MembershipNotFound { user_id, organization_id })
    }

    async fn require_permission(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        permission: Permission,
    ) -> Result<(), DomainError> {
        if !self.has_permission(organization_id, user_id, permission).await? {
            warn!("User {} denied {} in organization {}", user_id, permission.as_str(), organization_id);
            return Err(DomainError::PermissionDenied {
                user_id,
                permission: permission.as_str().to_string(),
            });
        }
        Ok(())
    }
}

fn validate<T: Validate>(request: &T) -> Result<(), DomainError> {
    request
        .validate()
        .map_err(|e| DomainError::from_validation_errors(ErrorDomain::Organizations, &e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::repositories::{MockInvitationRepository, MockMembershipRepository, MockOrganizationRepository};
    use mockall::predicate::*;

    fn service(
        organizations: MockOrganizationRepository,
        memberships: MockMembershipRepository,
        invitations: MockInvitationRepository,
    ) -> OrganizationService {
        OrganizationService::new(
            Arc::new(organizations),
            Arc::new(memberships),
            Arc::new(invitations),
            Duration::hours(24),
        )
    }

    #[tokio::test]
    async fn test_create_organization_writes_admin_membership_with_it() {
        let owner = Uuid::new_v4();
        let mut organizations = MockOrganizationRepository::new();
        organizations
            .expect_create()
            .withf(move |o, m| {
                m.user_id == owner && m.organization_id == o.id && m.role == Role::OrgAdmin && m.is_active
            })
            .times(1)
            .returning(|o, _| Ok(o.clone()));
        let svc = service(organizations, MockMembershipRepository::new(), MockInvitationRepository::new());
        let org = svc
            .create_organization(CreateOrganizationRequest {
                owner_user_id: owner,
                name: "Acme".into(),
                description: None,
            })
            .await
            .unwrap();

        assert_eq!(org.owner_user_id, owner);
    }

    #[tokio::test]
    async fn test_invite_requires_permission() {
        let org = Organization::new("Acme", None, Uuid::new_v4());
        let org_id = org.id;
        let inviter = Uuid::new_v4();

        let mut organizations = MockOrganizationRepository::new();
        organizations.expect_find_by_id().returning(move |_| Ok(Some(org.clone())));
        let mut memberships = MockMembershipRepository::new();
        memberships
            .expect_find_by_user_and_organization()
            .with(eq(inviter), eq(org_id))
            .returning(move |u, o| Ok(Some(Membership::new(u, o, Role::OrgMember))));
        let mut invitations = MockInvitationRepository::new();
        invitations.expect_create().never();

        let svc = service(organizations, memberships, invitations);
        let err = svc
            .invite_user(
                org_id,
                InviteUserRequest {
                    inviter_user_id: inviter,
                    email: "guest@example.com".into(),
                    role: Role::OrgMember,
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::PermissionDenied);
        assert_eq!(err.code().status(), 403);
    }

    #[tokio::test]
    async fn test_accept_with_existing_membership_leaves_invitation_unused() {
        let org_id = Uuid::new_v4();
        let user = Uuid::new_v4();
        let invitation = Invitation::new(org_id, Uuid::new_v4(), "guest@example.com", Role::OrgMember, Duration::hours(1));
        let token = invitation.token.clone();

        let mut invitations = MockInvitationRepository::new();
        invitations.expect_find_by_token().returning(move |_| Ok(Some(invitation.clone())));
        invitations.expect_redeem().never();
        let mut memberships = MockMembershipRepository::new();
        memberships
            .expect_find_by_user_and_organization()
            .returning(|u, o| Ok(Some(Membership::new(u, o, Role::OrgMember))));

        let svc = service(MockOrganizationRepository::new(), memberships, invitations);
        let err = svc
            .accept_invitation(AcceptInvitationRequest { token, user_id: user })
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::MemberExists);
    }

    #[tokio::test]
    async fn test_accept_redeems_through_repository() {
        let org_id = Uuid::new_v4();
        let invitation = Invitation::new(org_id, Uuid::new_v4(), "guest@example.com", Role::ProductProvider, Duration::hours(1));
        let token = invitation.token.clone();

        let mut invitations = MockInvitationRepository::new();
        invitations.expect_find_by_token().returning(move |_| Ok(Some(invitation.clone())));
        let expected_token = token.clone();
        invitations
            .expect_redeem()
            .withf(move |t, m, _| t == expected_token && m.organization_id == org_id)
            .times(1)
            .returning(|_, m, _| Ok(m.clone()));
        let mut memberships = MockMembershipRepository::new();
        memberships.expect_find_by_user_and_organization().returning(|_, _| Ok(None));

        let svc = service(MockOrganizationRepository::new(), memberships, invitations);
        let membership = svc
            .accept_invitation(AcceptInvitationRequest { token, user_id: Uuid::new_v4() })
            .await
            .unwrap();

        assert_eq!(membership.role, Role::ProductProvider);
        assert_eq!(membership.organization_id, org_id);
    }

    #[tokio::test]
    async fn test_accept_losing_the_claim_reports_used() {
        let invitation = Invitation::new(Uuid::new_v4(), Uuid::new_v4(), "guest@example.com", Role::OrgMember, Duration::hours(1));
        let token = invitation.token.clone();

        let mut invitations = MockInvitationRepository::new();
        // Still unused when read, claimed by someone else before redeem.
        invitations.expect_find_by_token().returning(move |_| Ok(Some(invitation.clone())));
        invitations
            .expect_redeem()
            .times(1)
            .returning(|_, _, _| Err(DomainError::InvitationAlreadyUsed));
        let mut memberships = MockMembershipRepository::new();
        memberships.expect_find_by_user_and_organization().returning(|_, _| Ok(None));

        let svc = service(MockOrganizationRepository::new(), memberships, invitations);
        let err = svc
            .accept_invitation(AcceptInvitationRequest { token, user_id: Uuid::new_v4() })
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::InvitationUsed);
    }

    #[tokio::test]
    async fn test_owner_cannot_be_removed() {
        let owner = Uuid::new_v4();
        let org = Organization::new("Acme", None, owner);
        let org_id = org.id;

        let mut organizations = MockOrganizationRepository::new();
        organizations.expect_find_by_id().returning(move |_| Ok(Some(org.clone())));
        let mut memberships = MockMembershipRepository::new();
        memberships.expect_delete().never();

        let svc = service(organizations, memberships, MockInvitationRepository::new());
        let err = svc.remove_member(org_id, owner).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::CannotRemoveOwner);
    }

    #[tokio::test]
    async fn test_transfer_requires_membership() {
        let org = Organization::new("Acme", None, Uuid::new_v4());
        let org_id = org.id;

        let mut organizations = MockOrganizationRepository::new();
        organizations.expect_find_by_id().returning(move |_| Ok(Some(org.clone())));
        organizations.expect_update().never();
        let mut memberships = MockMembershipRepository::new();
        memberships.expect_find_by_user_and_organization().returning(|_, _| Ok(None));

        let svc = service(organizations, memberships, MockInvitationRepository::new());
        let err = svc
            .transfer_ownership(org_id, TransferOwnershipRequest { new_owner_user_id: Uuid::new_v4() })
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::MemberNotFound);
    }
}
