//! Provider use cases

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use backoffice_shared::Paginated;

use crate::domain::Provider;
use crate::dto::{CreateProviderRequest, DuplicateProviderRequest, ListParams, UpdateProviderRequest};
use crate::error::{DomainError, ErrorDomain};
use crate::repositories::ProviderRepository;

pub struct ProviderService<R: ProviderRepository + ?Sized> {
    repo: Arc<R>,
}

impl<R: ProviderRepository + ?Sized> ProviderService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn create_provider(&self, request: CreateProviderRequest) -> Result<Provider, DomainError> {
        validate(&request)?;
        let name = request.name.trim();

        self.ensure_name_free(name, request.organization_id, None).await?;

        let mut provider = Provider::new(
            request.organization_id,
            request.user_id,
            name,
            request.provider_code,
            request.metadata.unwrap_or_default(),
        );
        if let Some(is_active) = request.is_active {
            provider.set_active(is_active);
        }

        let created = self.repo.create(&provider).await?;
        info!("Provider created: {} ({})", created.name, created.id);
        Ok(created)
    }

    pub async fn get_provider(&self, id: Uuid) -> Result<Provider, DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::ProviderNotFound(id))
    }

    pub async fn update_provider(&self, id: Uuid, request: UpdateProviderRequest) -> Result<Provider, DomainError> {
        validate(&request)?;

        let mut provider = self.get_provider(id).await?;

        if let Some(name) = request.name.as_deref().map(str::trim) {
            if name != provider.name {
                self.ensure_name_free(name, provider.organization_id, Some(id)).await?;
                provider.rename(name);
            }
        }
        if let Some(user_id) = request.user_id {
            provider.user_id = Some(user_id);
        }
        if let Some(code) = request.provider_code {
            provider.provider_code = Some(code.trim().to_string());
        }
        if let Some(is_active) = request.is_active {
            provider.set_active(is_active);
        }
        if let Some(metadata) = request.metadata {
            provider.metadata = metadata;
        }
        provider.touch();

        let updated = self.repo.update(&provider).await?;
        info!("Provider updated: {}", id);
        Ok(updated)
    }

    pub async fn delete_provider(&self, id: Uuid) -> Result<(), DomainError> {
        self.repo.delete(id).await?;
        info!("Provider deleted: {}", id);
        Ok(())
    }

    pub async fn list_providers(&self, params: ListParams) -> Result<Paginated<Provider>, DomainError> {
        validate(&params)?;
        let query = params.into_query();
        let (items, total) = self.repo.list(&query).await?;
        Ok(Paginated::new(items, total, query.pagination))
    }

    pub async fn get_providers_by_organization(&self, organization_id: Uuid) -> Result<Vec<Provider>, DomainError> {
        self.repo.find_by_organization(organization_id).await
    }

    pub async fn search_providers(&self, term: &str, organization_id: Uuid) -> Result<Vec<Provider>, DomainError> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }
        self.repo.search(term, organization_id).await
    }

    pub async fn activate_provider(&self, id: Uuid) -> Result<Provider, DomainError> {
        self.update_provider(id, UpdateProviderRequest { is_active: Some(true), ..Default::default() })
            .await
    }

    pub async fn deactivate_provider(&self, id: Uuid) -> Result<Provider, DomainError> {
        self.update_provider(id, UpdateProviderRequest { is_active: Some(false), ..Default::default() })
            .await
    }

    pub async fn duplicate_provider(&self, id: Uuid, request: DuplicateProviderRequest) -> Result<Provider, DomainError> {
        validate(&request)?;
        let original = self.get_provider(id).await?;

        let duplicate = self
            .create_provider(CreateProviderRequest {
                organization_id: original.organization_id,
                user_id: original.user_id,
                name: request.name,
                provider_code: original.provider_code.clone(),
                is_active: Some(original.is_active),
                metadata: Some(original.metadata.clone()),
            })
            .await?;

        info!("Provider {} duplicated as {}", id, duplicate.id);
        Ok(duplicate)
    }

    async fn ensure_name_free(
        &self,
        name: &str,
        organization_id: Uuid,
        exclude_id: Option<Uuid>,
    ) -> Result<(), DomainError> {
        if self
            .repo
            .exists_by_name_and_organization(name, organization_id, exclude_id)
            .await?
        {
            warn!("Provider name '{}' already exists in organization {}", name, organization_id);
            return Err(DomainError::ProviderNameExists {
                name: name.to_string(),
                organization_id,
            });
        }
        Ok(())
    }
}

fn validate<T: Validate>(request: &T) -> Result<(), DomainError> {
    request
        .validate()
        .map_err(|e| DomainError::from_validation_errors(ErrorDomain::Providers, &e))
}
