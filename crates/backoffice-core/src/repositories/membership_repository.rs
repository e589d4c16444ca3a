//! Membership repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Membership;
use crate::error::DomainError;

/// Memberships are only inserted together with an organization or an
/// invitation redemption; see those repositories.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Active membership only.
    async fn find_by_user_and_organization(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<Membership>, DomainError>;
    async fn find_by_organization(&self, organization_id: Uuid) -> Result<Vec<Membership>, DomainError>;
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Membership>, DomainError>;
    async fn update(&self, membership: &Membership) -> Result<Membership, DomainError>;
    async fn delete(&self, user_id: Uuid, organization_id: Uuid) -> Result<(), DomainError>;
}
