//! In-memory provider repository

use std::cmp::Ordering;

use async_trait::async_trait;
use tracing::warn;
use uuid::Uuid;

use backoffice_core::domain::Provider;
use backoffice_core::dto::ListQuery;
use backoffice_core::error::DomainError;
use backoffice_core::repositories::ProviderRepository;
use backoffice_shared::constants::SEARCH_RESULT_LIMIT;
use backoffice_shared::utils::contains_ignore_case;
use backoffice_shared::{paginate_slice, SortField};

use super::{MemoryStore, Tables};

pub struct MemoryProviderRepository {
    store: MemoryStore,
}

impl MemoryProviderRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

fn name_taken(tables: &Tables, name: &str, organization_id: Uuid, exclude_id: Option<Uuid>) -> bool {
    tables.providers.values().any(|p| {
        p.organization_id == organization_id && p.name == name && Some(p.id) != exclude_id
    })
}

fn matches_search(provider: &Provider, term: &str) -> bool {
    contains_ignore_case(&provider.name, term)
        || provider
            .provider_code
            .as_deref()
            .is_some_and(|c| contains_ignore_case(c, term))
}

fn compare(a: &Provider, b: &Provider, field: SortField) -> Ordering {
    match field {
        SortField::Name => a.name.cmp(&b.name),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    }
}

/// Foreign keys and the per-organization name constraint.
fn check_write(tables: &Tables, provider: &Provider, exclude_id: Option<Uuid>) -> Result<(), DomainError> {
    if !tables.organizations.contains_key(&provider.organization_id) {
        return Err(DomainError::OrganizationNotFound(provider.organization_id));
    }
    if let Some(user_id) = provider.user_id {
        if !tables.users.contains_key(&user_id) {
            return Err(DomainError::UserNotFound(user_id));
        }
    }
    if name_taken(tables, &provider.name, provider.organization_id, exclude_id) {
        warn!("Unique violation on provider name '{}'", provider.name);
        return Err(DomainError::ProviderNameExists {
            name: provider.name.clone(),
            organization_id: provider.organization_id,
        });
    }
    Ok(())
}

#[async_trait]
impl ProviderRepository for MemoryProviderRepository {
    async fn create(&self, provider: &Provider) -> Result<Provider, DomainError> {
        let mut tables = self.store.lock();
        check_write(&tables, provider, None)?;
        tables.providers.insert(provider.id, provider.clone());
        Ok(provider.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Provider>, DomainError> {
        Ok(self.store.lock().providers.get(&id).cloned())
    }

    async fn update(&self, provider: &Provider) -> Result<Provider, DomainError> {
        let mut tables = self.store.lock();
        if !tables.providers.contains_key(&provider.id) {
            return Err(DomainError::ProviderNotFound(provider.id));
        }
        check_write(&tables, provider, Some(provider.id))?;
        tables.providers.insert(provider.id, provider.clone());
        Ok(provider.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut tables = self.store.lock();
        if tables.providers.remove(&id).is_none() {
            return Err(DomainError::ProviderNotFound(id));
        }
        tables.project_providers.retain(|l| l.provider_id != id);
        Ok(())
    }

    async fn list(&self, query: &ListQuery) -> Result<(Vec<Provider>, u64), DomainError> {
        let tables = self.store.lock();

        let mut matched: Vec<Provider> = tables
            .providers
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

    async fn find_by_organization(&self, organization_id: Uuid) -> Result<Vec<Provider>, DomainError> {
        let tables = self.store.lock();
        let mut providers: Vec<Provider> = tables
            .providers
            .values()
            .filter(|p| p.organization_id == organization_id)
            .cloned()
            .collect();
        providers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(providers)
    }

    async fn search(&self, term: &str, organization_id: Uuid) -> Result<Vec<Provider>, DomainError> {
        let tables = self.store.lock();
        let mut providers: Vec<Provider> = tables
            .providers
            .values()
            .filter(|p| p.organization_id == organization_id && p.is_active && matches_search(p, term))
            .cloned()
            .collect();
        providers.sort_by(|a, b| a.name.cmp(&b.name));
        providers.truncate(SEARCH_RESULT_LIMIT);
        Ok(providers)
    }

    async fn exists_by_name_and_organization(
        &self,
        name: &str,
        organization_id: Uuid,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, DomainError> {
        Ok(name_taken(&self.store.lock(), name, organization_id, exclude_id))
    }
}
