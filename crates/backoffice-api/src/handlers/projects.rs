// ============================================================================
// Back-office API - Project Handlers
// File: crates/backoffice-api/src/handlers/projects.rs
// ============================================================================
//! `/projects` handlers, including provider links

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use backoffice_core::domain::{Project, ProjectProvider, ProjectProviderDetails, ProjectStats, ProjectWithProviders};
use backoffice_core::dto::{
    AddProjectProviderRequest, BulkProjectProvidersRequest, CreateProjectRequest,
    DuplicateProjectRequest, ListParams, UpdateProjectProviderRoleRequest, UpdateProjectRequest,
};
use backoffice_core::ErrorDomain;
use backoffice_shared::PageInfo;

use crate::error::ApiError;
use crate::extract::{required, OrReject};
use crate::response::{created, ok, ApiResult, Created};
use crate::state::AppState;

const DOMAIN: ErrorDomain = ErrorDomain::Projects;

type IdPath = Result<Path<Uuid>, PathRejection>;
type LinkPath = Result<Path<(Uuid, Uuid)>, PathRejection>;

#[derive(Debug, Serialize)]
pub struct ProjectListResponse {
    pub projects: Vec<Project>,
    #[serde(flatten)]
    pub info: PageInfo,
}

#[derive(Debug, Serialize)]
pub struct ProjectProvidersResponse {
    pub providers: Vec<ProjectProviderDetails>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub organization_id: Option<Uuid>,
}

/// POST /api/v1/projects
pub async fn create_project(
    State(state): State<AppState>,
    payload: Result<Json<CreateProjectRequest>, JsonRejection>,
) -> Created<Project> {
    let request = payload.or_reject(DOMAIN)?;
    created(state.projects.create_project(request).await?)
}

/// GET /api/v1/projects
pub async fn list_projects(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<ProjectListResponse> {
    let params = params.or_reject(DOMAIN)?;
    let page = state.projects.list_projects(params).await?;
    ok(ProjectListResponse {
        projects: page.items,
        info: page.info,
    })
}

/// GET /api/v1/projects/search?q=&organization_id=
pub async fn search_projects(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> ApiResult<Vec<Project>> {
    let query = query.or_reject(DOMAIN)?;
    let term = required(query.q, DOMAIN, "q")?;
    let organization_id = required(query.organization_id, DOMAIN, "organization_id")?;
    ok(state.projects.search_projects(&term, organization_id).await?)
}

/// GET /api/v1/projects/organization/{org_id}
pub async fn get_projects_by_organization(State(state): State<AppState>, path: IdPath) -> ApiResult<Vec<Project>> {
    let organization_id = path.or_reject(DOMAIN)?;
    ok(state.projects.get_projects_by_organization(organization_id).await?)
}

/// GET /api/v1/projects/organization/{org_id}/stats
pub async fn get_project_stats(State(state): State<AppState>, path: IdPath) -> ApiResult<ProjectStats> {
    let organization_id = path.or_reject(DOMAIN)?;
    ok(state.projects.get_project_stats(organization_id).await?)
}

/// GET /api/v1/projects/{id}
pub async fn get_project(State(state): State<AppState>, path: IdPath) -> ApiResult<Project> {
    let id = path.or_reject(DOMAIN)?;
    ok(state.projects.get_project(id).await?)
}

/// GET /api/v1/projects/{id}/with-providers
pub async fn get_project_with_providers(
    State(state): State<AppState>,
    path: IdPath,
) -> ApiResult<ProjectWithProviders> {
    let id = path.or_reject(DOMAIN)?;
    ok(state.projects.get_project_with_providers(id).await?)
}

/// PUT /api/v1/projects/{id}
pub async fn update_project(
    State(state): State<AppState>,
    path: IdPath,
    payload: Result<Json<UpdateProjectRequest>, JsonRejection>,
) -> ApiResult<Project> {
    let id = path.or_reject(DOMAIN)?;
    let request = payload.or_reject(DOMAIN)?;
    ok(state.projects.update_project(id, request).await?)
}

/// DELETE /api/v1/projects/{id}
pub async fn delete_project(State(state): State<AppState>, path: IdPath) -> Result<StatusCode, ApiError> {
    let id = path.or_reject(DOMAIN)?;
    state.projects.delete_project(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/projects/{id}/activate
pub async fn activate_project(State(state): State<AppState>, path: IdPath) -> ApiResult<Project> {
    let id = path.or_reject(DOMAIN)?;
    ok(state.projects.activate_project(id).await?)
}

/// POST /api/v1/projects/{id}/deactivate
pub async fn deactivate_project(State(state): State<AppState>, path: IdPath) -> ApiResult<Project> {
    let id = path.or_reject(DOMAIN)?;
    ok(state.projects.deactivate_project(id).await?)
}

/// POST /api/v1/projects/{id}/duplicate
pub async fn duplicate_project(
    State(state): State<AppState>,
    path: IdPath,
    payload: Result<Json<DuplicateProjectRequest>, JsonRejection>,
) -> Created<Project> {
    let id = path.or_reject(DOMAIN)?;
    let request = payload.or_reject(DOMAIN)?;
    created(state.projects.duplicate_project(id, request).await?)
}

/// GET /api/v1/projects/{id}/providers
pub async fn get_project_providers(
    State(state): State<AppState>,
    path: IdPath,
) -> ApiResult<ProjectProvidersResponse> {
    let id = path.or_reject(DOMAIN)?;
    let providers = state.projects.get_project_providers(id).await?;
    ok(ProjectProvidersResponse {
        total: providers.len(),
        providers,
    })
}

/// POST /api/v1/projects/{id}/providers
pub async fn add_provider(
    State(state): State<AppState>,
    path: IdPath,
    payload: Result<Json<AddProjectProviderRequest>, JsonRejection>,
) -> Created<ProjectProvider> {
    let id = path.or_reject(DOMAIN)?;
    let request = payload.or_reject(DOMAIN)?;
    created(state.projects.add_provider(id, request).await?)
}

/// DELETE /api/v1/projects/{id}/providers/{provider_id}
pub async fn remove_provider(State(state): State<AppState>, path: LinkPath) -> Result<StatusCode, ApiError> {
    let (id, provider_id) = path.or_reject(DOMAIN)?;
    state.projects.remove_provider(id, provider_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/projects/{id}/providers/{provider_id}/role
pub async fn update_provider_role(
    State(state): State<AppState>,
    path: LinkPath,
    payload: Result<Json<UpdateProjectProviderRoleRequest>, JsonRejection>,
) -> ApiResult<ProjectProvider> {
    let (id, provider_id) = path.or_reject(DOMAIN)?;
    let request = payload.or_reject(DOMAIN)?;
    ok(state.projects.update_provider_role(id, provider_id, request).await?)
}

/// POST /api/v1/projects/{id}/providers/bulk
pub async fn add_providers_bulk(
    State(state): State<AppState>,
    path: IdPath,
    payload: Result<Json<BulkProjectProvidersRequest>, JsonRejection>,
) -> ApiResult<()> {
    let id = path.or_reject(DOMAIN)?;
    let request = payload.or_reject(DOMAIN)?;
    ok(state.projects.add_providers_bulk(id, request).await?)
}

/// DELETE /api/v1/projects/{id}/providers/bulk
pub async fn remove_providers_bulk(
    State(state): State<AppState>,
    path: IdPath,
    payload: Result<Json<BulkProjectProvidersRequest>, JsonRejection>,
) -> ApiResult<()> {
    let id = path.or_reject(DOMAIN)?;
    let request = payload.or_reject(DOMAIN)?;
    ok(state.projects.remove_providers_bulk(id, request).await?)
}
