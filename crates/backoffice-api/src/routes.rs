//! Router assembly

use std::time::Duration;

use axum::{
    http::{header, Method, StatusCode},
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::handlers::{health, organizations, projects, providers, users};
use crate::state::AppState;

fn project_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(projects::list_projects).post(projects::create_project))
        .route("/search", get(projects::search_projects))
        .route("/organization/{org_id}", get(projects::get_projects_by_organization))
        .route("/organization/{org_id}/stats", get(projects::get_project_stats))
        .route(
            "/{id}",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        .route("/{id}/with-providers", get(projects::get_project_with_providers))
        .route("/{id}/activate", post(projects::activate_project))
        .route("/{id}/deactivate", post(projects::deactivate_project))
        .route("/{id}/duplicate", post(projects::duplicate_project))
        .route(
            "/{id}/providers",
            get(projects::get_project_providers).post(projects::add_provider),
        )
        .route(
            "/{id}/providers/bulk",
            post(projects::add_providers_bulk).delete(projects::remove_providers_bulk),
        )
        .route(
            "/{id}/providers/{provider_id}",
            delete(projects::remove_provider),
        )
        .route("/{id}/providers/{provider_id}/role", put(projects::update_provider_role))
}

fn provider_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(providers::list_providers).post(providers::create_provider))
        .route("/search", get(providers::search_providers))
        .route("/organization/{org_id}", get(providers::get_providers_by_organization))
        .route(
            "/{id}",
            get(providers::get_provider)
                .put(providers::update_provider)
                .delete(providers::delete_provider),
        )
        .route("/{id}/activate", post(providers::activate_provider))
        .route("/{id}/deactivate", post(providers::deactivate_provider))
        .route("/{id}/duplicate", post(providers::duplicate_provider))
        .route("/{id}/projects", get(providers::get_provider_projects))
}

fn organization_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(organizations::create_organization))
        .route(
            "/{id}",
            get(organizations::get_organization).put(organizations::update_organization),
        )
        .route("/{id}/transfer-ownership", post(organizations::transfer_ownership))
        .route("/{id}/members", get(organizations::get_members))
        .route(
            "/{id}/members/{user_id}",
            delete(organizations::remove_member),
        )
        .route("/{id}/members/{user_id}/role", put(organizations::update_member_role))
        .route(
            "/{id}/members/{user_id}/permissions/{permission}",
            get(organizations::check_permission),
        )
        .route(
            "/{id}/invitations",
            get(organizations::get_invitations).post(organizations::invite_user),
        )
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list_users).post(users::create_user))
        .route("/by-email", get(users::get_user_by_email))
        .route("/{id}", get(users::get_user).put(users::update_user))
        .route("/{id}/activate", post(users::activate_user))
        .route("/{id}/deactivate", post(users::deactivate_user))
        .route("/{id}/organizations", get(users::get_user_organizations))
        .route(
            "/{id}/profile",
            get(users::get_user_profile)
                .post(users::create_user_profile)
                .put(users::update_user_profile),
        )
        .route("/{id}/profile/picture", put(users::update_profile_picture))
        .route("/{id}/profile/phone", put(users::set_user_phone))
}

/// Builds the full application router with tracing, request ids, CORS and a
/// per-request timeout.
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    let api = Router::new()
        .nest("/projects", project_routes())
        .nest("/providers", provider_routes())
        .nest("/organizations", organization_routes())
        .nest("/users", user_routes())
        .route("/invitations/accept", post(organizations::accept_invitation));

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1", api)
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, request_timeout))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default().include_headers(false)))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
