//! In-memory project repository

use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use backoffice_core::domain::{Project, ProjectProvider, ProjectProviderDetails, ProjectStats};
use backoffice_core::dto::ListQuery;
use backoffice_core::error::DomainError;
use backoffice_core::repositories::ProjectRepository;
use backoffice_shared::utils::contains_ignore_case;
use backoffice_shared::{paginate_slice, SortField};

use super::{MemoryStore, Tables};

pub struct MemoryProjectRepository {
    store: MemoryStore,
}

impl MemoryProjectRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

fn name_taken(tables: &Tables, name: &str, organization_id: Uuid, exclude_id: Option<Uuid>) -> bool {
    tables.projects.values().any(|p| {
        p.organization_id == organization_id && p.name == name && Some(p.id) != exclude_id
    })
}

fn matches_search(project: &Project, term: &str) -> bool {
    contains_ignore_case(&project.name, term)
        || project
            .description
            .as_deref()
            .is_some_and(|d| contains_ignore_case(d, term))
}

fn compare(a: &Project, b: &Project, field: SortField) -> Ordering {
    match field {
        SortField::Name => a.name.cmp(&b.name),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    }
}

fn sorted_by_name(mut projects: Vec<Project>) -> Vec<Project> {
    projects.sort_by(|a, b| a.name.cmp(&b.name));
    projects
}

#[async_trait]
impl ProjectRepository for MemoryProjectRepository {
    async fn create(&self, project: &Project) -> Result<Project, DomainError> {
        let mut tables = self.store.lock();

        if !tables.organizations.contains_key(&project.organization_id) {
            return Err(DomainError::OrganizationNotFound(project.organization_id));
        }
        if name_taken(&tables, &project.name, project.organization_id, None) {
            warn!("Unique violation on project name '{}'", project.name);
            return Err(DomainError::ProjectNameExists {
                name: project.name.clone(),
                organization_id: project.organization_id,
            });
        }

        tables.projects.insert(project.id, project.clone());
        Ok(project.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Project>, DomainError> {
        Ok(self.store.lock().projects.get(&id).cloned())
    }

    async fn update(&self, project: &Project) -> Result<Project, DomainError> {
        let mut tables = self.store.lock();

        if !tables.projects.contains_key(&project.id) {
            return Err(DomainError::ProjectNotFound(project.id));
        }
        if name_taken(&tables, &project.name, project.organization_id, Some(project.id)) {
            return Err(DomainError::ProjectNameExists {
                name: project.name.clone(),
                organization_id: project.organization_id,
            });
        }

        tables.projects.insert(project.id, project.clone());
        Ok(project.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut tables = self.store.lock();

        if tables.projects.remove(&id).is_none() {
            return Err(DomainError::ProjectNotFound(id));
        }
        tables.project_providers.retain(|l| l.project_id != id);
        Ok(())
    }

    async fn list(&self, query: &ListQuery) -> Result<(Vec<Project>, u64), DomainError> {
        let tables = self.store.lock();

        let mut matched: Vec<Project> = tables
            .projects
            .values()
            .filter(|p| query.organization_id.is_none_or(|org| p.organization_id == org))
            .filter(|p| query.is_active.is_none_or(|active| p.is_active == active))
            .filter(|p| query.search.as_deref().is_none_or(|term| matches_search(p, term)))
            .cloned()
            .collect();

        matched.sort_by(|a, b| {
            let ord = compare(a, b, query.sort_by);
            let ord = if query.sort_order.is_desc() { ord.reverse() } else { ord };
            ord.then_with(|| a.id.cmp(&b.id))
        });

        let total = matched.len() as u64;
        Ok((paginate_slice(&matched, query.pagination), total))
    }

    async fn find_active_by_organization(&self, organization_id: Uuid) -> Result<Vec<Project>, DomainError> {
        let tables = self.store.lock();
        Ok(sorted_by_name(
            tables
                .projects
                .values()
                .filter(|p| p.organization_id == organization_id && p.is_active)
                .cloned()
                .collect(),
        ))
    }

    async fn search(&self, term: &str, organization_id: Uuid) -> Result<Vec<Project>, DomainError> {
        let tables = self.store.lock();
        Ok(sorted_by_name(
            tables
                .projects
                .values()
                .filter(|p| p.organization_id == organization_id && p.is_active && matches_search(p, term))
                .cloned()
                .collect(),
        ))
    }

    async fn find_by_provider(&self, provider_id: Uuid) -> Result<Vec<Project>, DomainError> {
        let tables = self.store.lock();
        Ok(sorted_by_name(
            tables
                .project_providers
                .iter()
                .filter(|l| l.provider_id == provider_id && l.is_active)
                .filter_map(|l| tables.projects.get(&l.project_id))
                .filter(|p| p.is_active)
                .cloned()
                .collect(),
        ))
    }

    async fn exists_by_name_and_organization(
        &self,
        name: &str,
        organization_id: Uuid,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, DomainError> {
        Ok(name_taken(&self.store.lock(), name, organization_id, exclude_id))
    }

    async fn stats_by_organization(&self, organization_id: Uuid) -> Result<ProjectStats, DomainError> {
        let tables = self.store.lock();
        let (total, active) = tables
            .projects
            .values()
            .filter(|p| p.organization_id == organization_id)
            .fold((0u64, 0u64), |(total, active), p| (total + 1, active + u64::from(p.is_active)));
        Ok(ProjectStats::from_counts(total, active))
    }

    async fn add_provider(&self, link: &ProjectProvider) -> Result<ProjectProvider, DomainError> {
        let mut tables = self.store.lock();

        if !tables.projects.contains_key(&link.project_id) {
            return Err(DomainError::ProjectNotFound(link.project_id));
        }
        if !tables.providers.contains_key(&link.provider_id) {
            return Err(DomainError::ProviderNotFound(link.provider_id));
        }
        if tables.link_position(link.project_id, link.provider_id).is_some() {
            return Err(DomainError::ProjectProviderExists {
                project_id: link.project_id,
                provider_id: link.provider_id,
            });
        }

        tables.project_providers.push(link.clone());
        Ok(link.clone())
    }

    async fn remove_provider(&self, project_id: Uuid, provider_id: Uuid) -> Result<(), DomainError> {
        let mut tables = self.store.lock();
        let index = tables
            .link_position(project_id, provider_id)
            .ok_or(DomainError::ProjectProviderNotFound { project_id, provider_id })?;
        tables.project_providers.remove(index);
        Ok(())
    }

    async fn update_provider_role(
        &self,
        project_id: Uuid,
        provider_id: Uuid,
        role: Option<String>,
    ) -> Result<ProjectProvider, DomainError> {
        let mut tables = self.store.lock();
        let index = tables
            .link_position(project_id, provider_id)
            .ok_or(DomainError::ProjectProviderNotFound { project_id, provider_id })?;

        let link = &mut tables.project_providers[index];
        link.role = role;
        link.updated_at = Utc::now();
        Ok(link.clone())
    }

    async fn list_providers(&self, project_id: Uuid) -> Result<Vec<ProjectProviderDetails>, DomainError> {
        let tables = self.store.lock();

        let mut links: Vec<&ProjectProvider> = tables
            .project_providers
            .iter()
            .filter(|l| l.project_id == project_id)
            .collect();
        // Stable: equal timestamps keep insertion order.
        links.sort_by_key(|l| l.created_at);

        Ok(links
            .into_iter()
            .filter_map(|l| {
                tables.providers.get(&l.provider_id).map(|p| ProjectProviderDetails {
                    provider_id: l.provider_id,
                    provider_name: p.name.clone(),
                    role: l.role.clone(),
                    is_active: l.is_active,
                    joined_at: l.created_at,
                })
            })
            .collect())
    }

    async fn add_providers_bulk(&self, project_id: Uuid, provider_ids: &[Uuid]) -> Result<(), DomainError> {
        let mut tables = self.store.lock();

        // An empty batch still requires the project: against a missing
        // project it is ProjectNotFound, not a no-op.
        let project = tables
            .projects
            .get(&project_id)
            .cloned()
            .ok_or(DomainError::ProjectNotFound(project_id))?;

        // Validate the whole batch before writing anything.
        if let Some(missing) = provider_ids.iter().find(|id| !tables.providers.contains_key(*id)) {
            return Err(DomainError::ProviderNotFound(*missing));
        }

        let mut inserted = 0usize;
        for provider_id in provider_ids {
            if tables.link_position(project_id, *provider_id).is_none() {
                tables
                    .project_providers
                    .push(ProjectProvider::new(&project, *provider_id, None));
                inserted += 1;
            }
        }

        debug!("Bulk attach to project {}: {} inserted", project_id, inserted);
        Ok(())
    }

    async fn remove_providers_bulk(&self, project_id: Uuid, provider_ids: &[Uuid]) -> Result<(), DomainError> {
        self.store
            .lock()
            .project_providers
            .retain(|l| !(l.project_id == project_id && provider_ids.contains(&l.provider_id)));
        Ok(())
    }
}
