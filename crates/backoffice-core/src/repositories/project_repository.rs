//! Project repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Project, ProjectProvider, ProjectProviderDetails, ProjectStats};
use crate::dto::ListQuery;
use crate::error::DomainError;

/// Persistence port for projects and their provider links.
///
/// Implementations translate storage constraint violations into the matching
/// domain conflict or not-found error and never leak raw storage errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Fails `ProjectNameExists` when the unique `(organization_id, name)`
    /// constraint rejects the row.
    async fn create(&self, project: &Project) -> Result<Project, DomainError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Project>, DomainError>;
    async fn update(&self, project: &Project) -> Result<Project, DomainError>;
    async fn delete(&self, id: Uuid) -> Result<(), DomainError>;

    /// Returns the requested page and the total row count for the filters.
    async fn list(&self, query: &ListQuery) -> Result<(Vec<Project>, u64), DomainError>;
    /// Active projects of an organization ordered by name.
    async fn find_active_by_organization(&self, organization_id: Uuid) -> Result<Vec<Project>, DomainError>;
    async fn search(&self, term: &str, organization_id: Uuid) -> Result<Vec<Project>, DomainError>;
    /// Active projects holding an active link to the provider, ordered by name.
    async fn find_by_provider(&self, provider_id: Uuid) -> Result<Vec<Project>, DomainError>;
    async fn exists_by_name_and_organization(
        &self,
        name: &str,
        organization_id: Uuid,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, DomainError>;
    /// Total and active counts taken from the same row set in one read.
    async fn stats_by_organization(&self, organization_id: Uuid) -> Result<ProjectStats, DomainError>;

    async fn add_provider(&self, link: &ProjectProvider) -> Result<ProjectProvider, DomainError>;
    async fn remove_provider(&self, project_id: Uuid, provider_id: Uuid) -> Result<(), DomainError>;
    async fn update_provider_role(
        &self,
        project_id: Uuid,
        provider_id: Uuid,
        role: Option<String>,
    ) -> Result<ProjectProvider, DomainError>;
    /// Links ordered by link creation time, oldest first.
    async fn list_providers(&self, project_id: Uuid) -> Result<Vec<ProjectProviderDetails>, DomainError>;
    /// Inserts missing links and skips existing ones. Atomic: an unknown
    /// project or provider fails the whole batch with nothing written.
    async fn add_providers_bulk(&self, project_id: Uuid, provider_ids: &[Uuid]) -> Result<(), DomainError>;
    /// Deletes whichever of the links exist; absent ones are ignored.
    async fn remove_providers_bulk(&self, project_id: Uuid, provider_ids: &[Uuid]) -> Result<(), DomainError>;
}
