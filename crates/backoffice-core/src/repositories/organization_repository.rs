//! Organization repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Membership, Organization};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    /// Writes the organization and its creator's membership together; on
    /// failure neither is stored.
    async fn create(&self, organization: &Organization, owner: &Membership) -> Result<Organization, DomainError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Organization>, DomainError>;
    async fn update(&self, organization: &Organization) -> Result<Organization, DomainError>;
    /// Organizations in which the user holds an active membership.
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Organization>, DomainError>;
}
