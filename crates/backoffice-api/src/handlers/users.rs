//! `/users` handlers

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use backoffice_core::domain::{Organization, User, UserProfile};
use backoffice_core::dto::{
    CreateUserProfileRequest, CreateUserRequest, SetPhoneRequest, UpdateProfilePictureRequest,
    UpdateUserProfileRequest, UpdateUserRequest, UserListParams,
};
use backoffice_core::ErrorDomain;

use crate::extract::{required, OrReject};
use crate::response::{created, ok, ApiResult, Created};
use crate::state::AppState;

const DOMAIN: ErrorDomain = ErrorDomain::Users;

type IdPath = Result<Path<Uuid>, PathRejection>;

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
}

pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Created<User> {
    let request = payload.or_reject(DOMAIN)?;
    created(state.users.create_user(request).await?)
}

pub async fn list_users(
    State(state): State<AppState>,
    params: Result<Query<UserListParams>, QueryRejection>,
) -> ApiResult<Vec<User>> {
    let params = params.or_reject(DOMAIN)?;
    ok(state.users.list_users(params).await?)
}

/// GET /api/v1/users/by-email?email=
pub async fn get_user_by_email(
    State(state): State<AppState>,
    query: Result<Query<EmailQuery>, QueryRejection>,
) -> ApiResult<User> {
    let query = query.or_reject(DOMAIN)?;
    let email = required(query.email, DOMAIN, "email")?;
    ok(state.users.get_user_by_email(&email).await?)
}

pub async fn get_user(State(state): State<AppState>, path: IdPath) -> ApiResult<User> {
    let id = path.or_reject(DOMAIN)?;
    ok(state.users.get_user(id).await?)
}

pub async fn update_user(
    State(state): State<AppState>,
    path: IdPath,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult<User> {
    let id = path.or_reject(DOMAIN)?;
    let request = payload.or_reject(DOMAIN)?;
    ok(state.users.update_user(id, request).await?)
}

pub async fn activate_user(State(state): State<AppState>, path: IdPath) -> ApiResult<User> {
    let id = path.or_reject(DOMAIN)?;
    ok(state.users.activate_user(id).await?)
}

pub async fn deactivate_user(State(state): State<AppState>, path: IdPath) -> ApiResult<User> {
    let id = path.or_reject(DOMAIN)?;
    ok(state.users.deactivate_user(id).await?)
}

/// Organizations the user is an active member of.
pub async fn get_user_organizations(State(state): State<AppState>, path: IdPath) -> ApiResult<Vec<Organization>> {
    let id = path.or_reject(DOMAIN)?;
    ok(state.organizations.get_user_organizations(id).await?)
}

pub async fn create_user_profile(
    State(state): State<AppState>,
    path: IdPath,
    payload: Result<Json<CreateUserProfileRequest>, JsonRejection>,
) -> Created<UserProfile> {
    let id = path.or_reject(DOMAIN)?;
    let request = payload.or_reject(DOMAIN)?;
    created(state.users.create_user_profile(id, request).await?)
}

pub async fn get_user_profile(State(state): State<AppState>, path: IdPath) -> ApiResult<UserProfile> {
    let id = path.or_reject(DOMAIN)?;
    ok(state.users.get_user_profile(id).await?)
}

pub async fn update_user_profile(
    State(state): State<AppState>,
    path: IdPath,
    payload: Result<Json<UpdateUserProfileRequest>, JsonRejection>,
) -> ApiResult<UserProfile> {
    let id = path.or_reject(DOMAIN)?;
    let request = payload.or_reject(DOMAIN)?;
    ok(state.users.update_user_profile(id, request).await?)
}

/// PUT /api/v1/users/{id}/profile/picture
pub async fn update_profile_picture(
    State(state): State<AppState>,
    path: IdPath,
    payload: Result<Json<UpdateProfilePictureRequest>, JsonRejection>,
) -> ApiResult<UserProfile> {
    let id = path.or_reject(DOMAIN)?;
    let request = payload.or_reject(DOMAIN)?;
    ok(state.users.update_profile_picture(id, request).await?)
}

/// PUT /api/v1/users/{id}/profile/phone
pub async fn set_user_phone(
    State(state): State<AppState>,
    path: IdPath,
    payload: Result<Json<SetPhoneRequest>, JsonRejection>,
) -> ApiResult<UserProfile> {
    let id = path.or_reject(DOMAIN)?;
    let request = payload.or_reject(DOMAIN)?;
    ok(state.users.set_user_phone(id, request).await?)
}
