//! In-memory organization, membership and invitation repositories

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use backoffice_core::domain::{Invitation, Membership, Organization};
use backoffice_core::error::{DomainError, ErrorCode};
use backoffice_core::repositories::{InvitationRepository, MembershipRepository, OrganizationRepository};

use super::{MemoryStore, Tables};

pub struct MemoryOrganizationRepository {
    store: MemoryStore,
}

impl MemoryOrganizationRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl OrganizationRepository for MemoryOrganizationRepository {
    async fn create(&self, organization: &Organization, owner: &Membership) -> Result<Organization, DomainError> {
        let mut tables = self.store.lock();
        if !tables.users.contains_key(&organization.owner_user_id) {
            return Err(DomainError::UserNotFound(organization.owner_user_id));
        }

        tables.organizations.insert(organization.id, organization.clone());
        if let Err(e) = insert_membership(&mut tables, owner) {
            tables.organizations.remove(&organization.id);
            return Err(e);
        }
        Ok(organization.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Organization>, DomainError> {
        Ok(self.store.lock().organizations.get(&id).cloned())
    }

    async fn update(&self, organization: &Organization) -> Result<Organization, DomainError> {
        let mut tables = self.store.lock();
        if !tables.organizations.contains_key(&organization.id) {
            return Err(DomainError::OrganizationNotFound(organization.id));
        }
        if !tables.users.contains_key(&organization.owner_user_id) {
            return Err(DomainError::UserNotFound(organization.owner_user_id));
        }
        tables.organizations.insert(organization.id, organization.clone());
        Ok(organization.clone())
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Organization>, DomainError> {
        let tables = self.store.lock();
        let mut organizations: Vec<Organization> = tables
            .memberships
            .values()
            .filter(|m| m.user_id == user_id && m.is_active)
            .filter_map(|m| tables.organizations.get(&m.organization_id))
            .cloned()
            .collect();
        organizations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(organizations)
    }
}

pub struct MemoryMembershipRepository {
    store: MemoryStore,
}

impl MemoryMembershipRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

/// Same foreign-key and active-uniqueness rules as the memberships table.
fn insert_membership(tables: &mut Tables, membership: &Membership) -> Result<(), DomainError> {
    if !tables.organizations.contains_key(&membership.organization_id) {
        return Err(DomainError::OrganizationNotFound(membership.organization_id));
    }
    if !tables.users.contains_key(&membership.user_id) {
        return Err(DomainError::UserNotFound(membership.user_id));
    }
    let duplicate = membership.is_active
        && tables.memberships.values().any(|m| {
            m.user_id == membership.user_id && m.organization_id == membership.organization_id && m.is_active
        });
    if duplicate {
        return Err(DomainError::MembershipAlreadyExists {
            user_id: membership.user_id,
            organization_id: membership.organization_id,
        });
    }

    tables.memberships.insert(membership.id, membership.clone());
    Ok(())
}

fn sorted_by_join(mut memberships: Vec<Membership>) -> Vec<Membership> {
    memberships.sort_by_key(|m| m.joined_at);
    memberships
}

#[async_trait]
impl MembershipRepository for MemoryMembershipRepository {
    async fn find_by_user_and_organization(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<Membership>, DomainError> {
        Ok(self
            .store
            .lock()
            .memberships
            .values()
            .find(|m| m.user_id == user_id && m.organization_id == organization_id && m.is_active)
            .cloned())
    }

    async fn find_by_organization(&self, organization_id: Uuid) -> Result<Vec<Membership>, DomainError> {
        let tables = self.store.lock();
        Ok(sorted_by_join(
            tables
                .memberships
                .values()
                .filter(|m| m.organization_id == organization_id)
                .cloned()
                .collect(),
        ))
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Membership>, DomainError> {
        let tables = self.store.lock();
        Ok(sorted_by_join(
            tables
                .memberships
                .values()
                .filter(|m| m.user_id == user_id)
                .cloned()
                .collect(),
        ))
    }

    async fn update(&self, membership: &Membership) -> Result<Membership, DomainError> {
        let mut tables = self.store.lock();
        let stored = tables
            .memberships
            .get_mut(&membership.id)
            .ok_or(DomainError::MembershipNotFound {
                user_id: membership.user_id,
                organization_id: membership.organization_id,
            })?;

        stored.role = membership.role;
        stored.is_active = membership.is_active;
        stored.updated_at = membership.updated_at;
        Ok(stored.clone())
    }

    async fn delete(&self, user_id: Uuid, organization_id: Uuid) -> Result<(), DomainError> {
        let mut tables = self.store.lock();
        let before = tables.memberships.len();
        tables
            .memberships
            .retain(|_, m| !(m.user_id == user_id && m.organization_id == organization_id));

        if tables.memberships.len() == before {
            return Err(DomainError::MembershipNotFound { user_id, organization_id });
        }
        Ok(())
    }
}

pub struct MemoryInvitationRepository {
    store: MemoryStore,
}

impl MemoryInvitationRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl InvitationRepository for MemoryInvitationRepository {
    async fn create(&self, invitation: &Invitation) -> Result<Invitation, DomainError> {
        let mut tables = self.store.lock();

        if !tables.organizations.contains_key(&invitation.organization_id) {
            return Err(DomainError::OrganizationNotFound(invitation.organization_id));
        }
        if !tables.users.contains_key(&invitation.inviter_user_id) {
            return Err(DomainError::UserNotFound(invitation.inviter_user_id));
        }
        if tables.invitations.values().any(|i| i.token == invitation.token) {
            return Err(DomainError::storage(
                ErrorCode::OrganizationOperationFailed,
                "duplicate invitation token",
            ));
        }

        tables.invitations.insert(invitation.id, invitation.clone());
        Ok(invitation.clone())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Invitation>, DomainError> {
        Ok(self
            .store
            .lock()
            .invitations
            .values()
            .find(|i| i.token == token)
            .cloned())
    }

    async fn find_by_organization(&self, organization_id: Uuid) -> Result<Vec<Invitation>, DomainError> {
        let tables = self.store.lock();
        let mut invitations: Vec<Invitation> = tables
            .invitations
            .values()
            .filter(|i| i.organization_id == organization_id)
            .cloned()
            .collect();
        invitations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(invitations)
    }

    async fn redeem(
        &self,
        token: &str,
        membership: &Membership,
        now: DateTime<Utc>,
    ) -> Result<Membership, DomainError> {
        let mut tables = self.store.lock();

        let mut claimed = tables
            .invitations
            .values()
            .find(|i| i.token == token)
            .cloned()
            .ok_or(DomainError::InvitationNotFound)?;
        claimed.redeem(now)?;

        insert_membership(&mut tables, membership)?;
        tables.invitations.insert(claimed.id, claimed);
        Ok(membership.clone())
    }
}
