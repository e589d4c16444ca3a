//! Provider repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Provider;
use crate::dto::ListQuery;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProviderRepository: Send + Sync {
    async fn create(&self, provider: &Provider) -> Result<Provider, DomainError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Provider>, DomainError>;
    async fn update(&self, provider: &Provider) -> Result<Provider, DomainError>;
    async fn delete(&self, id: Uuid) -> Result<(), DomainError>;
    async fn list(&self, query: &ListQuery) -> Result<(Vec<Provider>, u64), DomainError>;
    async fn find_by_organization(&self, organization_id: Uuid) -> Result<Vec<Provider>, DomainError>;
    /// Active providers whose name or code contains `term`, capped at the search limit.
    async fn search(&self, term: &str, organization_id: Uuid) -> Result<Vec<Provider>, DomainError>;
    async fn exists_by_name_and_organization(
        &self,
        name: &str,
        organization_id: Uuid,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, DomainError>;
}
