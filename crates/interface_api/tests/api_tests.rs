//! Router tests over the in-memory store

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use core_kernel::TenantId;
use interface_api::auth::{create_token, permissions};
use interface_api::config::{ApiConfig, StoreKind};
use interface_api::{create_router, AppState};

const SECRET: &str = "router-test-secret";

fn app() -> Router {
    let config = ApiConfig {
        jwt_secret: SECRET.to_string(),
        store: StoreKind::Memory,
        ..ApiConfig::default()
    };
    create_router(AppState::in_memory(config))
}

fn token(tenant: TenantId, roles: &[&str]) -> String {
    create_token(
        "tester",
        tenant,
        roles.iter().map(|r| r.to_string()).collect(),
        SECRET,
        300,
    )
    .unwrap()
}

fn writer(tenant: TenantId) -> String {
    token(tenant, &[permissions::PARTY_READ, permissions::PARTY_WRITE, permissions::REFERENCE_WRITE])
}

async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn create_organization(app: &Router, token: &str, name: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/organizations",
        Some(token),
        Some(json!({ "organization": { "name": name } })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_is_public() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Method::GET, "/health/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_protected_routes_need_a_token() {
    let app = app();
    let (status, _) = send(&app, Method::GET, "/api/v1/parties", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/api/v1/parties", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_read_role_cannot_write() {
    let app = app();
    let reader = token(TenantId::new(), &[permissions::PARTY_READ]);
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/organizations",
        Some(&reader),
        Some(json!({ "organization": { "name": "Acme" } })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");
}

#[tokio::test]
async fn test_organization_lifecycle() {
    let app = app();
    let tenant = TenantId::new();
    let token = writer(tenant);
    let id = create_organization(&app, &token, "Acme").await;

    let (status, body) = send(&app, Method::GET, &format!("/api/v1/organizations/{}", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["details"]["name"], "Acme");
    assert_eq!(body["details"]["partyType"], "ORGANIZATION");

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/organizations/{}", id),
        Some(&token),
        Some(json!({ "organization": { "name": "Acme Holdings" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["details"]["name"], "Acme Holdings");

    let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/organizations/{}", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, Method::GET, &format!("/api/v1/parties/{}", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, body) = send(&app, Method::GET, &format!("/api/v1/parties/{}/history", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let changes: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["change"].as_str().unwrap())
        .collect();
    assert_eq!(changes, vec!["CREATED", "UPDATED", "DELETED"]);

    let (status, body) = send(&app, Method::GET, &format!("/api/v1/parties/{}/snapshots", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["snapshots"]["totalCount"], 2);
}

#[tokio::test]
async fn test_person_route_rejects_organization() {
    let app = app();
    let token = writer(TenantId::new());
    let id = create_organization(&app, &token, "Acme").await;

    let (status, body) = send(&app, Method::GET, &format!("/api/v1/persons/{}", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_tenants_are_isolated() {
    let app = app();
    let owner = writer(TenantId::new());
    let stranger = writer(TenantId::new());
    let id = create_organization(&app, &owner, "Acme").await;

    let (status, _) = send(&app, Method::GET, &format!("/api/v1/parties/{}", id), Some(&stranger), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, Method::GET, "/api/v1/parties", Some(&stranger), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalCount"], 0);
}

#[tokio::test]
async fn test_party_list_is_paged() {
    let app = app();
    let token = writer(TenantId::new());
    for name in ["Alpha", "Beta", "Gamma"] {
        create_organization(&app, &token, name).await;
    }

    let (status, body) = send(&app, Method::GET, "/api/v1/parties?limit=2&sort=displayName", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["totalCount"], 3);

    let (status, _) = send(&app, Method::GET, "/api/v1/parties?partyType=ROBOT", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_catalog_restricts_segment_codes() {
    let app = app();
    let token = writer(TenantId::new());

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/v1/reference/segment",
        Some(&token),
        Some(json!({
            "locale": "en",
            "code": "RETAIL",
            "description": "Retail customers",
            "partyTypes": ["PERSON"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["catalog"], "segment");

    let (status, body) = send(&app, Method::GET, "/api/v1/reference/segment?locale=en", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/organizations",
        Some(&token),
        Some(json!({
            "organization": { "name": "Acme" },
            "segments": [ { "segment": "RETAIL" } ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");
    assert!(!body["details"].as_array().unwrap().is_empty());

    let (status, _) = send(&app, Method::DELETE, "/api/v1/reference/segment/en/RETAIL", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::DELETE, "/api/v1/reference/segment/en/RETAIL", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_catalog_is_not_found() {
    let app = app();
    let token = writer(TenantId::new());
    let (status, _) = send(&app, Method::GET, "/api/v1/reference/planet", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_associations_are_listed_for_both_ends() {
    let app = app();
    let token = writer(TenantId::new());
    let employer = create_organization(&app, &token, "Acme").await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/persons",
        Some(&token),
        Some(json!({ "person": { "givenName": "Ada", "familyName": "Lovelace" } })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let employee = body["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/associations",
        Some(&token),
        Some(json!({
            "associationType": "EMPLOYER",
            "fromPartyId": employer,
            "toPartyId": employee
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);

    for party in [&employer, &employee] {
        let (status, body) = send(
            &app,
            Method::GET,
            &format!("/api/v1/parties/{}/associations", party),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["associations"]["totalCount"], 1);
    }
}

#[tokio::test]
async fn test_mandate_for_missing_party_is_not_found() {
    let app = app();
    let token = writer(TenantId::new());
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/mandates",
        Some(&token),
        Some(json!({
            "partyId": uuid::Uuid::new_v4(),
            "mandateType": "SIGNING"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
