//! `/providers` handlers

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use backoffice_core::domain::{Project, Provider};
use backoffice_core::dto::{CreateProviderRequest, DuplicateProviderRequest, ListParams, UpdateProviderRequest};
use backoffice_core::ErrorDomain;
use backoffice_shared::PageInfo;

use super::projects::SearchQuery;
use crate::error::ApiError;
use crate::extract::{required, OrReject};
use crate::response::{created, ok, ApiResult, Created};
use crate::state::AppState;

const DOMAIN: ErrorDomain = ErrorDomain::Providers;

type IdPath = Result<Path<Uuid>, PathRejection>;

#[derive(Debug, Serialize)]
pub struct ProviderListResponse {
    pub providers: Vec<Provider>,
    #[serde(flatten)]
    pub info: PageInfo,
}

pub async fn create_provider(
    State(state): State<AppState>,
    payload: Result<Json<CreateProviderRequest>, JsonRejection>,
) -> Created<Provider> {
    let request = payload.or_reject(DOMAIN)?;
    created(state.providers.create_provider(request).await?)
}

pub async fn list_providers(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<ProviderListResponse> {
    let params = params.or_reject(DOMAIN)?;
    let page = state.providers.list_providers(params).await?;
    ok(ProviderListResponse {
        providers: page.items,
        info: page.info,
    })
}

pub async fn search_providers(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> ApiResult<Vec<Provider>> {
    let query = query.or_reject(DOMAIN)?;
    let term = required(query.q, DOMAIN, "q")?;
    let organization_id = required(query.organization_id, DOMAIN, "organization_id")?;
    ok(state.providers.search_providers(&term, organization_id).await?)
}

pub async fn get_providers_by_organization(State(state): State<AppState>, path: IdPath) -> ApiResult<Vec<Provider>> {
    let organization_id = path.or_reject(DOMAIN)?;
    ok(state.providers.get_providers_by_organization(organization_id).await?)
}

pub async fn get_provider(State(state): State<AppState>, path: IdPath) -> ApiResult<Provider> {
    let id = path.or_reject(DOMAIN)?;
    ok(state.providers.get_provider(id).await?)
}

pub async fn update_provider(
    State(state): State<AppState>,
    path: IdPath,
    payload: Result<Json<UpdateProviderRequest>, JsonRejection>,
) -> ApiResult<Provider> {
    let id = path.or_reject(DOMAIN)?;
    let request = payload.or_reject(DOMAIN)?;
    ok(state.providers.update_provider(id, request).await?)
}

pub async fn delete_provider(State(state): State<AppState>, path: IdPath) -> Result<StatusCode, ApiError> {
    let id = path.or_reject(DOMAIN)?;
    state.providers.delete_provider(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn activate_provider(State(state): State<AppState>, path: IdPath) -> ApiResult<Provider> {
    let id = path.or_reject(DOMAIN)?;
    ok(state.providers.activate_provider(id).await?)
}

pub async fn deactivate_provider(State(state): State<AppState>, path: IdPath) -> ApiResult<Provider> {
    let id = path.or_reject(DOMAIN)?;
    ok(state.providers.deactivate_provider(id).await?)
}

pub async fn duplicate_provider(
    State(state): State<AppState>,
    path: IdPath,
    payload: Result<Json<DuplicateProviderRequest>, JsonRejection>,
) -> Created<Provider> {
    let id = path.or_reject(DOMAIN)?;
    let request = payload.or_reject(DOMAIN)?;
    created(state.providers.duplicate_provider(id, request).await?)
}

/// Active projects linked to the provider.
pub async fn get_provider_projects(State(state): State<AppState>, path: IdPath) -> ApiResult<Vec<Project>> {
    let id = path.or_reject(DOMAIN)?;
    ok(state.projects.get_projects_by_provider(id).await?)
}
