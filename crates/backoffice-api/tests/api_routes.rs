//! Router tests over the in-memory backend.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt; // for oneshot

use backoffice_api::{create_router, AppState, Repositories};
use backoffice_infrastructure::MemoryStore;

fn test_router() -> Router {
    let store = MemoryStore::new();
    let repos = Repositories {
        projects: Arc::new(store.projects()),
        providers: Arc::new(store.providers()),
        organizations: Arc::new(store.organizations()),
        memberships: Arc::new(store.memberships()),
        invitations: Arc::new(store.invitations()),
        users: Arc::new(store.users()),
        user_profiles: Arc::new(store.user_profiles()),
    };
    create_router(AppState::new(repos, chrono::Duration::hours(168)), Duration::from_secs(30))
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Creates a user and an organization they own; returns `(user_id, org_id)`.
async fn seed_organization(router: &Router) -> (String, String) {
    let (status, user) = send(
        router,
        Method::POST,
        "/api/v1/users",
        Some(json!({"email": "owner@example.com", "name": "Owner"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let user_id = user["data"]["id"].as_str().unwrap().to_string();

    let (status, org) = send(
        router,
        Method::POST,
        "/api/v1/organizations",
        Some(json!({"owner_user_id": user_id, "name": "Acme"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let org_id = org["data"]["id"].as_str().unwrap().to_string();

    (user_id, org_id)
}

async fn create_project(router: &Router, org_id: &str, name: &str) -> String {
    let (status, body) = send(
        router,
        Method::POST,
        "/api/v1/projects",
        Some(json!({"organization_id": org_id, "name": name})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["id"].as_str().unwrap().to_string()
}

async fn create_provider(router: &Router, org_id: &str, name: &str) -> String {
    let (status, body) = send(
        router,
        Method::POST,
        "/api/v1/providers",
        Some(json!({"organization_id": org_id, "name": name})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_check() {
    let router = test_router();
    let (status, body) = send(&router, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_create_project_envelope_and_conflict() {
    let router = test_router();
    let (_, org_id) = seed_organization(&router).await;

    let request = json!({
        "organization_id": org_id,
        "name": "Apollo",
        "metadata": {"tier": "gold"}
    });
    let (status, body) = send(&router, Method::POST, "/api/v1/projects", Some(request.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "Apollo");
    assert_eq!(body["data"]["is_active"], true);
    assert_eq!(body["data"]["metadata"]["tier"], "gold");
    assert!(body["timestamp"].is_string());

    let (status, body) = send(&router, Method::POST, "/api/v1/projects", Some(request)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "PROJECTS.NAME_EXISTS");
    assert_eq!(body["error"]["status"], 409);
    assert_eq!(body["error"]["details"]["name"], "Apollo");
    assert_eq!(body["error"]["details"]["organization_id"], org_id.as_str());
}

#[tokio::test]
async fn test_validation_failures_are_400() {
    let router = test_router();
    let (_, org_id) = seed_organization(&router).await;

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/v1/projects",
        Some(json!({"organization_id": org_id, "name": "   "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "PROJECTS.VALIDATION_FAILED");
    assert_eq!(body["error"]["details"]["field"], "name");

    let (status, body) = send(&router, Method::GET, "/api/v1/projects/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "PROJECTS.VALIDATION_FAILED");

    let (status, _) = send(&router, Method::GET, "/api/v1/projects?sort_order=sideways", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&router, Method::GET, "/api/v1/projects?page_size=500", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_project_is_404() {
    let router = test_router();
    let uri = format!("/api/v1/projects/{}", uuid::Uuid::new_v4());

    let (status, body) = send(&router, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "PROJECTS.NOT_FOUND");

    let (status, _) = send(&router, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_activate_and_delete() {
    let router = test_router();
    let (_, org_id) = seed_organization(&router).await;
    let id = create_project(&router, &org_id, "Apollo").await;
    create_project(&router, &org_id, "Gemini").await;

    let uri = format!("/api/v1/projects/{id}");
    let (status, body) = send(&router, Method::PUT, &uri, Some(json!({"description": "moon"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["description"], "moon");

    let (status, body) = send(&router, Method::PUT, &uri, Some(json!({"name": "Gemini"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "PROJECTS.NAME_EXISTS");

    let (status, body) = send(&router, Method::POST, &format!("{uri}/deactivate"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_active"], false);

    let (status, body) = send(
        &router,
        Method::GET,
        &format!("/api/v1/projects/organization/{org_id}/stats"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_projects"], 2);
    assert_eq!(body["data"]["active_projects"], 1);
    assert_eq!(body["data"]["inactive_projects"], 1);

    let (status, body) = send(&router, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn test_list_projects_page_info() {
    let router = test_router();
    let (_, org_id) = seed_organization(&router).await;
    for i in 0..25 {
        create_project(&router, &org_id, &format!("project-{i:02}")).await;
    }

    let uri = format!("/api/v1/projects?organization_id={org_id}&page=2&page_size=10&sort_by=name&sort_order=asc");
    let (status, body) = send(&router, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["projects"].as_array().unwrap().len(), 10);
    assert_eq!(data["projects"][0]["name"], "project-10");
    assert_eq!(data["total"], 25);
    assert_eq!(data["page"], 2);
    assert_eq!(data["page_size"], 10);
    assert_eq!(data["total_pages"], 3);
    assert_eq!(data["has_next"], true);
    assert_eq!(data["has_previous"], true);
}

#[tokio::test]
async fn test_search_requires_both_parameters() {
    let router = test_router();
    let (_, org_id) = seed_organization(&router).await;
    create_project(&router, &org_id, "Apollo").await;

    let (status, body) = send(&router, Method::GET, "/api/v1/projects/search?q=apo", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"]["field"], "organization_id");

    let (status, _) = send(
        &router,
        Method::GET,
        &format!("/api/v1/projects/search?organization_id={org_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &router,
        Method::GET,
        &format!("/api/v1/projects/search?q=APO&organization_id={org_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_provider_links() {
    let router = test_router();
    let (_, org_id) = seed_organization(&router).await;
    let project_id = create_project(&router, &org_id, "Apollo").await;
    let a = create_provider(&router, &org_id, "Alpha").await;
    let b = create_provider(&router, &org_id, "Beta").await;
    let links = format!("/api/v1/projects/{project_id}/providers");

    let add = json!({"provider_id": a, "role": "lead"});
    let (status, body) = send(&router, Method::POST, &links, Some(add.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["organization_id"], org_id.as_str());

    let (status, body) = send(&router, Method::POST, &links, Some(add)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "PROJECTS.PROVIDER_EXISTS");

    let (status, _) = send(
        &router,
        Method::POST,
        &format!("{links}/bulk"),
        Some(json!({"provider_ids": [a, b]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&router, Method::GET, &links, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 2);
    assert_eq!(body["data"]["providers"][0]["provider_name"], "Alpha");
    assert_eq!(body["data"]["providers"][0]["role"], "lead");

    let (status, body) = send(
        &router,
        Method::PUT,
        &format!("{links}/{b}/role"),
        Some(json!({"role": "backup"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "backup");

    let (status, _) = send(&router, Method::DELETE, &format!("{links}/{a}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&router, Method::DELETE, &format!("{links}/{a}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "PROJECTS.PROVIDER_NOT_FOUND");

    let (status, _) = send(
        &router,
        Method::DELETE,
        &format!("{links}/bulk"),
        Some(json!({"provider_ids": [a, b]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &router,
        Method::POST,
        &format!("{links}/bulk"),
        Some(json!({"provider_ids": []})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&router, Method::GET, &format!("/api/v1/projects/{project_id}/with-providers"), None).await;
    assert_eq!(body["data"]["name"], "Apollo");
    assert_eq!(body["data"]["providers"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_duplicate_project() {
    let router = test_router();
    let (_, org_id) = seed_organization(&router).await;
    let provider_id = create_provider(&router, &org_id, "Alpha").await;

    let (_, body) = send(
        &router,
        Method::POST,
        "/api/v1/projects",
        Some(json!({
            "organization_id": org_id,
            "name": "Apollo",
            "description": "moon",
            "provider_ids": [provider_id]
        })),
    )
    .await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &router,
        Method::POST,
        &format!("/api/v1/projects/{id}/duplicate"),
        Some(json!({"name": "Apollo II"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["description"], "moon");
    let copy_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_ne!(copy_id, id);

    let (_, body) = send(&router, Method::GET, &format!("/api/v1/projects/{copy_id}/providers"), None).await;
    assert_eq!(body["data"]["total"], 1);

    let (_, body) = send(&router, Method::GET, &format!("/api/v1/providers/{provider_id}/projects"), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_provider_crud() {
    let router = test_router();
    let (_, org_id) = seed_organization(&router).await;
    let id = create_provider(&router, &org_id, "Alpha").await;

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/v1/providers",
        Some(json!({"organization_id": org_id, "name": "Alpha"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "PROVIDERS.NAME_EXISTS");

    let (status, body) = send(
        &router,
        Method::PUT,
        &format!("/api/v1/providers/{id}"),
        Some(json!({"provider_code": "ALP"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["provider_code"], "ALP");

    let (status, body) = send(&router, Method::GET, &format!("/api/v1/providers?organization_id={org_id}&search=alp"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["providers"][0]["id"], id.as_str());

    let (status, _) = send(&router, Method::DELETE, &format!("/api/v1/providers/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&router, Method::GET, &format!("/api/v1/providers/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "PROVIDERS.NOT_FOUND");
}

#[tokio::test]
async fn test_invitation_flow() {
    let router = test_router();
    let (owner_id, org_id) = seed_organization(&router).await;

    let (_, invitee) = send(
        &router,
        Method::POST,
        "/api/v1/users",
        Some(json!({"email": "member@example.com", "name": "Member"})),
    )
    .await;
    let invitee_id = invitee["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &router,
        Method::POST,
        &format!("/api/v1/organizations/{org_id}/invitations"),
        Some(json!({"inviter_user_id": owner_id, "email": "member@example.com", "role": "org_member"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let accept = json!({"token": token, "user_id": invitee_id});
    let (status, body) = send(&router, Method::POST, "/api/v1/invitations/accept", Some(accept.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["role"], "org_member");

    let (status, body) = send(&router, Method::POST, "/api/v1/invitations/accept", Some(accept)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "ORGANIZATIONS.INVITATION_USED");

    let (_, body) = send(&router, Method::GET, &format!("/api/v1/organizations/{org_id}/members"), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (_, body) = send(
        &router,
        Method::GET,
        &format!("/api/v1/organizations/{org_id}/members/{invitee_id}/permissions/org.invite_members"),
        None,
    )
    .await;
    assert_eq!(body["data"]["granted"], false);

    let (status, body) = send(
        &router,
        Method::DELETE,
        &format!("/api/v1/organizations/{org_id}/members/{owner_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "ORGANIZATIONS.CANNOT_REMOVE_OWNER");
}

#[tokio::test]
async fn test_duplicate_email_is_conflict() {
    let router = test_router();
    seed_organization(&router).await;

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/v1/users",
        Some(json!({"email": "OWNER@example.com", "name": "Again"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "USERS.EMAIL_EXISTS");

    let (status, body) = send(&router, Method::GET, "/api/v1/users/by-email?email=owner@example.com", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Owner");
}

#[tokio::test]
async fn test_user_profile_lifecycle() {
    let router = test_router();
    let (user_id, _) = seed_organization(&router).await;
    let profile_uri = format!("/api/v1/users/{user_id}/profile");

    let (status, body) = send(&router, Method::GET, &profile_uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "USERS.PROFILE_NOT_FOUND");

    let (status, body) = send(
        &router,
        Method::POST,
        &profile_uri,
        Some(json!({"first_name": "Olive", "last_name": "Owner"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["first_name"], "Olive");
    assert!(body["data"]["phone"].is_null());

    let (status, body) = send(
        &router,
        Method::POST,
        &profile_uri,
        Some(json!({"first_name": "Olive", "last_name": "Owner"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "USERS.PROFILE_EXISTS");

    let (status, body) = send(&router, Method::PUT, &profile_uri, Some(json!({"bio": "Runs Acme"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["bio"], "Runs Acme");
    assert_eq!(body["data"]["last_name"], "Owner");

    let (status, body) = send(
        &router,
        Method::PUT,
        &format!("{profile_uri}/picture"),
        Some(json!({"picture_url": "https://cdn.example.com/olive.png"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["profile_picture"], "https://cdn.example.com/olive.png");

    let (status, body) = send(
        &router,
        Method::PUT,
        &format!("{profile_uri}/phone"),
        Some(json!({"phone": "abc"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "USERS.VALIDATION_FAILED");

    let (status, body) = send(
        &router,
        Method::PUT,
        &format!("{profile_uri}/phone"),
        Some(json!({"phone": "+62 812 3456 7890"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["phone"], "+62 812 3456 7890");
    assert_eq!(body["data"]["bio"], "Runs Acme");
}

#[tokio::test]
async fn test_profile_for_unknown_user_is_not_found() {
    let router = test_router();
    let (status, body) = send(
        &router,
        Method::POST,
        &format!("/api/v1/users/{}/profile", uuid::Uuid::new_v4()),
        Some(json!({"first_name": "No", "last_name": "One"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "USERS.NOT_FOUND");
}
