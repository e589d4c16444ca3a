//! `/organizations` and `/invitations` handlers

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use backoffice_core::domain::{Invitation, Membership, Organization, Permission};
use backoffice_core::dto::{
    AcceptInvitationRequest, CreateOrganizationRequest, InviteUserRequest, TransferOwnershipRequest,
    UpdateMemberRoleRequest, UpdateOrganizationRequest,
};
use backoffice_core::{DomainError, ErrorDomain};

use crate::error::ApiError;
use crate::extract::OrReject;
use crate::response::{created, ok, ApiResult, Created};
use crate::state::AppState;

const DOMAIN: ErrorDomain = ErrorDomain::Organizations;

type IdPath = Result<Path<Uuid>, PathRejection>;
type MemberPath = Result<Path<(Uuid, Uuid)>, PathRejection>;

#[derive(Debug, Serialize)]
pub struct PermissionCheck {
    pub permission: Permission,
    pub granted: bool,
}

pub async fn create_organization(
    State(state): State<AppState>,
    payload: Result<Json<CreateOrganizationRequest>, JsonRejection>,
) -> Created<Organization> {
    let request = payload.or_reject(DOMAIN)?;
    created(state.organizations.create_organization(request).await?)
}

pub async fn get_organization(State(state): State<AppState>, path: IdPath) -> ApiResult<Organization> {
    let id = path.or_reject(DOMAIN)?;
    ok(state.organizations.get_organization(id).await?)
}

pub async fn update_organization(
    State(state): State<AppState>,
    path: IdPath,
    payload: Result<Json<UpdateOrganizationRequest>, JsonRejection>,
) -> ApiResult<Organization> {
    let id = path.or_reject(DOMAIN)?;
    let request = payload.or_reject(DOMAIN)?;
    ok(state.organizations.update_organization(id, request).await?)
}

pub async fn transfer_ownership(
    State(state): State<AppState>,
    path: IdPath,
    payload: Result<Json<TransferOwnershipRequest>, JsonRejection>,
) -> ApiResult<Organization> {
    let id = path.or_reject(DOMAIN)?;
    let request = payload.or_reject(DOMAIN)?;
    ok(state.organizations.transfer_ownership(id, request).await?)
}

pub async fn get_members(State(state): State<AppState>, path: IdPath) -> ApiResult<Vec<Membership>> {
    let id = path.or_reject(DOMAIN)?;
    ok(state.organizations.get_members(id).await?)
}

pub async fn update_member_role(
    State(state): State<AppState>,
    path: MemberPath,
    payload: Result<Json<UpdateMemberRoleRequest>, JsonRejection>,
) -> ApiResult<Membership> {
    let (id, user_id) = path.or_reject(DOMAIN)?;
    let request = payload.or_reject(DOMAIN)?;
    ok(state.organizations.update_member_role(id, user_id, request).await?)
}

pub async fn remove_member(State(state): State<AppState>, path: MemberPath) -> Result<StatusCode, ApiError> {
    let (id, user_id) = path.or_reject(DOMAIN)?;
    state.organizations.remove_member(id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/organizations/{id}/members/{user_id}/permissions/{permission}
pub async fn check_permission(
    State(state): State<AppState>,
    path: Result<Path<(Uuid, Uuid, String)>, PathRejection>,
) -> ApiResult<PermissionCheck> {
    let (id, user_id, permission) = path.or_reject(DOMAIN)?;
    let permission = Permission::from_str(&permission)
        .ok_or_else(|| DomainError::validation(DOMAIN, "permission", format!("unknown permission {}", permission)))?;

    let granted = state.organizations.has_permission(id, user_id, permission).await?;
    ok(PermissionCheck { permission, granted })
}

pub async fn invite_user(
    State(state): State<AppState>,
    path: IdPath,
    payload: Result<Json<InviteUserRequest>, JsonRejection>,
) -> Created<Invitation> {
    let id = path.or_reject(DOMAIN)?;
    let request = payload.or_reject(DOMAIN)?;
    created(state.organizations.invite_user(id, request).await?)
}

pub async fn get_invitations(State(state): State<AppState>, path: IdPath) -> ApiResult<Vec<Invitation>> {
    let id = path.or_reject(DOMAIN)?;
    ok(state.organizations.get_invitations(id).await?)
}

/// POST /api/v1/invitations/accept
pub async fn accept_invitation(
    State(state): State<AppState>,
    payload: Result<Json<AcceptInvitationRequest>, JsonRejection>,
) -> Created<Membership> {
    let request = payload.or_reject(DOMAIN)?;
    created(state.organizations.accept_invitation(request).await?)
}
