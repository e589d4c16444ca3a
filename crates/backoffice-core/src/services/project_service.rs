// ============================================================================
// Back-office Core - Project Service
// File: crates/backoffice-core/src/services/project_service.rs
// ============================================================================
//! Project use cases: CRUD, listing, duplication, stats and provider links

use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

use backoffice_shared::Paginated;

use crate::domain::{
    Project, ProjectProvider, ProjectProviderDetails, ProjectStats, ProjectWithProviders,
};
use crate::dto::{
    AddProjectProviderRequest, BulkProjectProvidersRequest, CreateProjectRequest,
    DuplicateProjectRequest, ListParams, UpdateProjectProviderRoleRequest, UpdateProjectRequest,
};
use crate::error::{DomainError, ErrorDomain};
use crate::repositories::ProjectRepository;

pub struct ProjectService<R: ProjectRepository + ?Sized> {
    repo: Arc<R>,
}

impl<R: ProjectRepository + ?Sized> ProjectService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Creates a project, then attaches `provider_ids` on a best-effort basis.
    ///
    /// A failed attach is logged and does not fail or roll back the create.
    pub async fn create_project(&self, request: CreateProjectRequest) -> Result<Project, DomainError> {
        // 1. Validate before touching storage
        validate(&request)?;
        let name = request.name.trim();

        // 2. Name must be free within the organization
        if self
            .repo
            .exists_by_name_and_organization(name, request.organization_id, None)
            .await?
        {
            warn!("Project name '{}' already exists in organization {}", name, request.organization_id);
            return Err(DomainError::ProjectNameExists {
                name: name.to_string(),
                organization_id: request.organization_id,
            });
        }

        // 3. Persist
        let project = Project::new(
            request.organization_id,
            name,
            request.description,
            request.metadata.unwrap_or_default(),
        );
        let created = self.repo.create(&project).await?;
        info!("Project created: {} ({})", created.name, created.id);

        // 4. Attach providers
        if !request.provider_ids.is_empty() {
            if let Err(e) = self.repo.add_providers_bulk(created.id, &request.provider_ids).await {
                warn!("Failed to attach providers to new project {}: {}", created.id, e);
            }
        }

        Ok(created)
    }

    pub async fn get_project(&self, id: Uuid) -> Result<Project, DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::ProjectNotFound(id))
    }

    pub async fn get_project_with_providers(&self, id: Uuid) -> Result<ProjectWithProviders, DomainError> {
        let project = self.get_project(id).await?;
        let providers = self.repo.list_providers(id).await?;
        Ok(ProjectWithProviders { project, providers })
    }

    /// Applies the fields present in `request`. A rename is checked for
    /// uniqueness with the project itself excluded.
    pub async fn update_project(&self, id: Uuid, request: UpdateProjectRequest) -> Result<Project, DomainError> {
        validate(&request)?;

        let mut project = self.get_project(id).await?;

        if let Some(name) = request.name.as_deref().map(str::trim) {
            if name != project.name {
                if self
                    .repo
                    .exists_by_name_and_organization(name, project.organization_id, Some(id))
                    .await?
                {
                    warn!("Rename of project {} to '{}' conflicts", id, name);
                    return Err(DomainError::ProjectNameExists {
                        name: name.to_string(),
                        organization_id: project.organization_id,
                    });
                }
                project.rename(name);
            }
        }
        if let Some(description) = request.description {
            project.description = Some(description.trim().to_string());
        }
        if let Some(is_active) = request.is_active {
            project.set_active(is_active);
        }
        if let Some(metadata) = request.metadata {
            project.metadata = metadata;
        }
        project.touch();

        let updated = self.repo.update(&project).await?;
        info!("Project updated: {}", id);
        Ok(updated)
    }

    pub async fn delete_project(&self, id: Uuid) -> Result<(), DomainError> {
        self.repo.delete(id).await?;
        info!("Project deleted: {}", id);
        Ok(())
    }

    pub async fn list_projects(&self, params: ListParams) -> Result<Paginated<Project>, DomainError> {
        validate(&params)?;
        let query = params.into_query();
        let (items, total) = self.repo.list(&query).await?;
        Ok(Paginated::new(items, total, query.pagination))
    }

    pub async fn get_projects_by_organization(&self, organization_id: Uuid) -> Result<Vec<Project>, DomainError> {
        self.repo.find_active_by_organization(organization_id).await
    }

    /// Blank terms match nothing.
    pub async fn search_projects(&self, term: &str, organization_id: Uuid) -> Result<Vec<Project>, DomainError> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }
        self.repo.search(term, organization_id).await
    }

    pub async fn get_projects_by_provider(&self, provider_id: Uuid) -> Result<Vec<Project>, DomainError> {
        self.repo.find_by_provider(provider_id).await
    }

    pub async fn activate_project(&self, id: Uuid) -> Result<Project, DomainError> {
        self.set_active(id, true).await
    }

    pub async fn deactivate_project(&self, id: Uuid) -> Result<Project, DomainError> {
        self.set_active(id, false).await
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<Project, DomainError> {
        let request = UpdateProjectRequest {
            is_active: Some(active),
            ..Default::default()
        };
        self.update_project(id, request).await
    }

    /// New project with the original's organization, description, metadata
    /// and provider set, all copied by value.
    pub async fn duplicate_project(&self, id: Uuid, request: DuplicateProjectRequest) -> Result<Project, DomainError> {
        validate(&request)?;

        let original = self.get_project(id).await?;
        let provider_ids = self
            .repo
            .list_providers(id)
            .await?
            .into_iter()
            .map(|p| p.provider_id)
            .collect();

        let duplicate = self
            .create_project(CreateProjectRequest {
                organization_id: original.organization_id,
                name: request.name,
                description: original.description.clone(),
                metadata: Some(original.metadata.clone()),
                provider_ids,
            })
            .await?;

        info!("Project {} duplicated as {}", id, duplicate.id);
        Ok(duplicate)
    }

    pub async fn get_project_stats(&self, organization_id: Uuid) -> Result<ProjectStats, DomainError> {
        self.repo.stats_by_organization(organization_id).await
    }

    // ------------------------------------------------------------------------
    // Provider links
    // ------------------------------------------------------------------------

    pub async fn add_provider(
        &self,
        project_id: Uuid,
        request: AddProjectProviderRequest,
    ) -> Result<ProjectProvider, DomainError> {
        validate(&request)?;

        let project = self.get_project(project_id).await?;
        let link = ProjectProvider::new(&project, request.provider_id, request.role);

        match self.repo.add_provider(&link).await {
            Ok(created) => {
                info!("Provider {} linked to project {}", request.provider_id, project_id);
                Ok(created)
            }
            Err(e @ DomainError::ProjectProviderExists { .. }) => {
                warn!("Provider {} already linked to project {}", request.provider_id, project_id);
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn remove_provider(&self, project_id: Uuid, provider_id: Uuid) -> Result<(), DomainError> {
        self.repo.remove_provider(project_id, provider_id).await?;
        info!("Provider {} unlinked from project {}", provider_id, project_id);
        Ok(())
    }

    pub async fn update_provider_role(
        &self,
        project_id: Uuid,
        provider_id: Uuid,
        request: UpdateProjectProviderRoleRequest,
    ) -> Result<ProjectProvider, DomainError> {
        validate(&request)?;
        self.repo.update_provider_role(project_id, provider_id, request.role).await
    }

    pub async fn get_project_providers(&self, project_id: Uuid) -> Result<Vec<ProjectProviderDetails>, DomainError> {
        self.get_project(project_id).await?;
        self.repo.list_providers(project_id).await
    }

    /// Idempotent attach of a set of providers.
    pub async fn add_providers_bulk(
        &self,
        project_id: Uuid,
        request: BulkProjectProvidersRequest,
    ) -> Result<(), DomainError> {
        validate(&request)?;
        let provider_ids = dedup(request.provider_ids);

        self.repo
            .add_providers_bulk(project_id, &provider_ids)
            .await
            .inspect_err(|e| error!("Bulk attach to project {} failed: {}", project_id, e))?;

        info!("Bulk attached {} provider(s) to project {}", provider_ids.len(), project_id);
        Ok(())
    }

    /// Detaches whichever providers are linked. Unlike `remove_provider`,
    /// ids with no link are not an error.
    pub async fn remove_providers_bulk(
        &self,
        project_id: Uuid,
        request: BulkProjectProvidersRequest,
    ) -> Result<(), DomainError> {
        validate(&request)?;
        let provider_ids = dedup(request.provider_ids);

        self.repo.remove_providers_bulk(project_id, &provider_ids).await?;

        info!("Bulk detached {} provider(s) from project {}", provider_ids.len(), project_id);
        Ok(())
    }
}

fn validate<T: Validate>(request: &T) -> Result<(), DomainError> {
    request
        .validate()
        .map_err(|e| DomainError::from_validation_errors(ErrorDomain::Projects, &e))
}

fn dedup(mut ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    ids.retain(|id| seen.insert(*id));
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Metadata;
    use crate::error::ErrorCode;
    use crate::repositories::MockProjectRepository;
    use mockall::predicate::*;
    use serde_json::json;

    fn project(org: Uuid, name: &str) -> Project {
        Project::new(org, name, Some("desc".into()), Metadata::new())
    }

    fn create_request(org: Uuid, name: &str, provider_ids: Vec<Uuid>) -> CreateProjectRequest {
        CreateProjectRequest {
            organization_id: org,
            name: name.to_string(),
            description: None,
            metadata: None,
            provider_ids,
        }
    }

    #[tokio::test]
    async fn test_create_rejects_existing_name() {
        let org = Uuid::new_v4();
        let mut repo = MockProjectRepository::new();
        repo.expect_exists_by_name_and_organization()
            .with(eq("Website"), eq(org), eq(None))
            .returning(|_, _, _| Ok(true));
        repo.expect_create().never();

        let service = ProjectService::new(Arc::new(repo));
        let err = service
            .create_project(create_request(org, "Website", vec![]))
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::ProjectNameExists);
    }

    #[tokio::test]
    async fn test_create_validation_happens_before_storage() {
        let mut repo = MockProjectRepository::new();
        repo.expect_exists_by_name_and_organization().never();
        repo.expect_create().never();

        let service = ProjectService::new(Arc::new(repo));
        let err = service
            .create_project(create_request(Uuid::new_v4(), &"x".repeat(256), vec![]))
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::ProjectValidationFailed);
    }

    #[tokio::test]
    async fn test_create_swallows_bulk_attach_failure() {
        let org = Uuid::new_v4();
        let mut repo = MockProjectRepository::new();
        repo.expect_exists_by_name_and_organization().returning(|_, _, _| Ok(false));
        repo.expect_create().returning(|p| Ok(p.clone()));
        repo.expect_add_providers_bulk()
            .times(1)
            .returning(|_, ids| Err(DomainError::ProviderNotFound(ids[0])));

        let service = ProjectService::new(Arc::new(repo));
        let created = service
            .create_project(create_request(org, "Website", vec![Uuid::new_v4()]))
            .await
            .unwrap();

        assert_eq!(created.name, "Website");
        assert_eq!(created.organization_id, org);
    }

    #[tokio::test]
    async fn test_create_without_providers_skips_bulk() {
        let mut repo = MockProjectRepository::new();
        repo.expect_exists_by_name_and_organization().returning(|_, _, _| Ok(false));
        repo.expect_create().returning(|p| Ok(p.clone()));
        repo.expect_add_providers_bulk().never();

        let service = ProjectService::new(Arc::new(repo));
        assert!(service
            .create_project(create_request(Uuid::new_v4(), "Website", vec![]))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_rename_to_own_name_skips_uniqueness_check() {
        let existing = project(Uuid::new_v4(), "Website");
        let id = existing.id;
        let mut repo = MockProjectRepository::new();
        repo.expect_find_by_id()
            .with(eq(id))
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_exists_by_name_and_organization().never();
        repo.expect_update().returning(|p| Ok(p.clone()));

        let service = ProjectService::new(Arc::new(repo));
        let updated = service
            .update_project(
                id,
                UpdateProjectRequest {
                    name: Some("Website".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Website");
    }

    #[tokio::test]
    async fn test_rename_excludes_own_id() {
        let org = Uuid::new_v4();
        let existing = project(org, "Website");
        let id = existing.id;
        let mut repo = MockProjectRepository::new();
        repo.expect_find_by_id().returning(move |_| Ok(Some(existing.clone())));
        repo.expect_exists_by_name_and_organization()
            .with(eq("Portal"), eq(org), eq(Some(id)))
            .returning(|_, _, _| Ok(true));
        repo.expect_update().never();

        let service = ProjectService::new(Arc::new(repo));
        let err = service
            .update_project(
                id,
                UpdateProjectRequest {
                    name: Some("Portal".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::ProjectNameExists { .. }));
    }

    #[tokio::test]
    async fn test_deactivate_uses_update_path() {
        let existing = project(Uuid::new_v4(), "Website");
        let id = existing.id;
        let mut repo = MockProjectRepository::new();
        repo.expect_find_by_id().returning(move |_| Ok(Some(existing.clone())));
        repo.expect_update()
            .withf(|p| !p.is_active && p.name == "Website")
            .times(1)
            .returning(|p| Ok(p.clone()));

        let service = ProjectService::new(Arc::new(repo));
        let updated = service.deactivate_project(id).await.unwrap();
        assert!(!updated.is_active);
    }

    #[tokio::test]
    async fn test_update_missing_project() {
        let mut repo = MockProjectRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let service = ProjectService::new(Arc::new(repo));
        let err = service.activate_project(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ProjectNotFound);
    }

    #[tokio::test]
    async fn test_duplicate_copies_fields_and_providers() {
        let org = Uuid::new_v4();
        let mut original = project(org, "Website");
        original.metadata.insert("tier".into(), json!("gold"));
        let id = original.id;
        let provider_id = Uuid::new_v4();
        let joined_at = original.created_at;

        let mut repo = MockProjectRepository::new();
        repo.expect_find_by_id().returning(move |_| Ok(Some(original.clone())));
        repo.expect_list_providers().with(eq(id)).returning(move |_| {
            Ok(vec![ProjectProviderDetails {
                provider_id,
                provider_name: "Acme".into(),
                role: None,
                is_active: true,
                joined_at,
            }])
        });
        repo.expect_exists_by_name_and_organization().returning(|_, _, _| Ok(false));
        repo.expect_create()
            .withf(move |p| p.organization_id == org && p.metadata["tier"] == "gold")
            .returning(|p| Ok(p.clone()));
        repo.expect_add_providers_bulk()
            .withf(move |_, ids| ids == [provider_id])
            .times(1)
            .returning(|_, _| Ok(()));

        let service = ProjectService::new(Arc::new(repo));
        let duplicate = service
            .duplicate_project(id, DuplicateProjectRequest { name: "Website Copy".into() })
            .await
            .unwrap();

        assert_ne!(duplicate.id, id);
        assert_eq!(duplicate.name, "Website Copy");
        assert_eq!(duplicate.description.as_deref(), Some("desc"));
    }

    #[tokio::test]
    async fn test_add_provider_requires_project() {
        let mut repo = MockProjectRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));
        repo.expect_add_provider().never();

        let service = ProjectService::new(Arc::new(repo));
        let err = service
            .add_provider(
                Uuid::new_v4(),
                AddProjectProviderRequest { provider_id: Uuid::new_v4(), role: None },
            )
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::ProjectNotFound);
    }

    #[tokio::test]
    async fn test_add_provider_copies_organization() {
        let existing = project(Uuid::new_v4(), "Website");
        let id = existing.id;
        let org = existing.organization_id;
        let mut repo = MockProjectRepository::new();
        repo.expect_find_by_id().returning(move |_| Ok(Some(existing.clone())));
        repo.expect_add_provider()
            .withf(move |link| link.organization_id == org && link.project_id == id && link.is_active)
            .returning(|link| Ok(link.clone()));

        let service = ProjectService::new(Arc::new(repo));
        let link = service
            .add_provider(
                id,
                AddProjectProviderRequest { provider_id: Uuid::new_v4(), role: Some("lead".into()) },
            )
            .await
            .unwrap();

        assert_eq!(link.role.as_deref(), Some("lead"));
    }

    #[tokio::test]
    async fn test_bulk_add_deduplicates_ids() {
        let provider_id = Uuid::new_v4();
        let mut repo = MockProjectRepository::new();
        repo.expect_add_providers_bulk()
            .withf(move |_, ids| ids.len() == 1 && ids[0] == provider_id)
            .returning(|_, _| Ok(()));

        let service = ProjectService::new(Arc::new(repo));
        service
            .add_providers_bulk(
                Uuid::new_v4(),
                BulkProjectProvidersRequest { provider_ids: vec![provider_id, provider_id] },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_search_blank_term_returns_empty() {
        let mut repo = MockProjectRepository::new();
        repo.expect_search().never();

        let service = ProjectService::new(Arc::new(repo));
        assert!(service.search_projects("  ", Uuid::new_v4()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_builds_page_info() {
        let mut repo = MockProjectRepository::new();
        repo.expect_list()
            .withf(|q| q.pagination.page == 2 && q.pagination.page_size == 10)
            .returning(|_| Ok((vec![], 25)));

        let service = ProjectService::new(Arc::new(repo));
        let page = service
            .list_projects(ListParams {
                page: Some(2),
                page_size: Some(10),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.info.total_pages, 3);
        assert!(page.info.has_next);
        assert!(page.info.has_previous);
    }
}
