// tests/http_api.rs
//
// Drives the router in-process. None of these requests reach Postgres:
// the pool is lazy and every path exercised here is rejected (or answered)
// before a query would run.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{TimeDelta, Utc};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use uuid::Uuid;

use titipsini::{
    app,
    config::{AppState, Config},
    models::auth::Role,
};

fn test_state() -> AppState {
    let config = Config::from_lookup(|name| match name {
        "DATABASE_URL" => Some("postgres://titipsini@localhost:5432/titipsini_unused".to_string()),
        "JWT_SECRET" => Some("integration-secret".to_string()),
        _ => None,
    })
    .expect("config");

    let pool = PgPoolOptions::new()
        .connect_lazy(&config.database_url)
        .expect("lazy pool");

    AppState::from_parts(pool, config)
}

fn token_for(state: &AppState, role: Role) -> String {
    state
        .auth_service
        .issue_token(Uuid::new_v4(), role, Utc::now())
        .expect("token")
        .token
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> axum::http::request::Builder {
    Request::builder().method("GET").uri(uri)
}

#[tokio::test]
async fn health_is_public() {
    let router = app::router(test_state());

    let response = router
        .oneshot(get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn dashboard_without_token_is_unauthorized() {
    let router = app::router(test_state());

    let (status, body) = send(router, get("/api/dashboard").body(Body::empty()).unwrap()).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Authentication token is invalid or missing.");
}

#[tokio::test]
async fn dashboard_rejects_customers() {
    let state = test_state();
    let token = token_for(&state, Role::Customer);
    let router = app::router(state);

    let request = get("/api/dashboard")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(router, request).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Access denied.");
}

#[tokio::test]
async fn forbidden_message_follows_accept_language() {
    let state = test_state();
    let token = token_for(&state, Role::Vendor);
    let router = app::router(state);

    let request = get("/api/dashboard")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::ACCEPT_LANGUAGE, "id-ID,id;q=0.9,en;q=0.8")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(router, request).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Akses ditolak.");
}

#[tokio::test]
async fn expired_token_is_unauthorized() {
    let state = test_state();
    let stale = state
        .auth_service
        .issue_token(Uuid::new_v4(), Role::Superadmin, Utc::now() - TimeDelta::hours(3))
        .unwrap()
        .token;
    let router = app::router(state);

    let request = get("/api/dashboard")
        .header(header::AUTHORIZATION, format!("Bearer {stale}"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(router, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn non_bearer_credentials_are_unauthorized() {
    let router = app::router(test_state());

    let request = get("/api/goods")
        .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(router, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn vendors_cannot_issue_invoices() {
    let state = test_state();
    let token = token_for(&state, Role::Vendor);
    let router = app::router(state);

    let request = Request::builder()
        .method("POST")
        .uri("/api/invoices")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({
                "vendorId": Uuid::new_v4(),
                "invoiceNumber": "INV-1",
                "amount": 100000,
                "dueDate": "2024-01-31"
            })
            .to_string(),
        ))
        .unwrap();
    let (status, _) = send(router, request).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn register_reports_invalid_fields() {
    let router = app::router(test_state());

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "email": "not-an-email", "password": "123", "name": "Budi" }).to_string(),
        ))
        .unwrap();
    let (status, body) = send(router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["email"][0], "The e-mail address is invalid.");
    assert_eq!(body["details"]["password"][0], "The password must have at least 6 characters.");
}

#[tokio::test]
async fn openapi_document_lists_the_api() {
    let router = app::router(test_state());

    let (status, body) = send(router, get("/api-docs/openapi.json").body(Body::empty()).unwrap()).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/dashboard"]["get"].is_object());
    assert!(body["paths"]["/api/goods/quote"]["post"].is_object());
    assert!(body["components"]["securitySchemes"]["api_jwt"].is_object());
}

#[tokio::test]
async fn oversized_idempotency_key_is_a_bad_request() {
    let state = test_state();
    let token = token_for(&state, Role::Customer);
    let router = app::router(state);

    let request = Request::builder()
        .method("POST")
        .uri("/api/goods")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .header("Idempotency-Key", "k".repeat(256))
        .body(Body::from(
            json!({
                "branchId": Uuid::new_v4(),
                "categoryId": Uuid::new_v4(),
                "name": "Koper biru",
                "quantity": 1,
                "dateIn": "2024-01-01T10:00:00Z",
                "dateOut": "2024-01-04T10:00:00Z",
                "paymentMethod": "cash"
            })
            .to_string(),
        ))
        .unwrap();
    let (status, body) = send(router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["details"]["idempotencyKey"][0],
        "The Idempotency-Key header may have at most 255 characters."
    );
}

#[tokio::test]
async fn finance_cannot_moderate_vendors() {
    let state = test_state();
    let token = token_for(&state, Role::Finance);
    let router = app::router(state);

    let request = Request::builder()
        .method("PATCH")
        .uri(format!("/api/vendor/{}/status", Uuid::new_v4()))
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "status": "active" }).to_string()))
        .unwrap();
    let (status, _) = send(router, request).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}
