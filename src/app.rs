// src/app.rs

use axum::{
    http::HeaderValue,
    middleware as axum_middleware,
    routing::{get, patch, post, put},
    Json, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

async fn health() -> &'static str {
    "OK"
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

fn cors_layer(allow_origin: Option<&str>) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    match allow_origin.map(str::parse::<HeaderValue>) {
        Some(Ok(origin)) => cors.allow_origin(origin),
        Some(Err(_)) => {
            tracing::warn!("CORS_ALLOW_ORIGIN is not a valid header value; cross-origin requests are refused");
            cors
        }
        None => cors.allow_origin(Any),
    }
}

/// The whole HTTP surface. Split from `main` so tests can drive it with `oneshot`.
pub fn router(app_state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login));

    let protected = Router::new()
        .route("/auth/refresh", post(handlers::auth::refresh))
        // users
        .route("/users/me", get(handlers::auth::get_me))
        .route("/users", get(handlers::users::list_users).post(handlers::users::create_user))
        .route(
            "/users/{id}",
            get(handlers::users::get_user)
                .put(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        )
        // vendors and branches
        .route("/vendor", get(handlers::vendor::list_vendors).post(handlers::vendor::create_vendor))
        .route("/vendor/branch", get(handlers::vendor::list_active_branches))
        .route(
            "/vendor/{id}",
            get(handlers::vendor::get_vendor)
                .put(handlers::vendor::update_vendor)
                .delete(handlers::vendor::delete_vendor),
        )
        .route("/vendor/{id}/status", patch(handlers::vendor::change_vendor_status))
        .route(
            "/vendor/{id}/branch",
            get(handlers::vendor::list_branches).post(handlers::vendor::create_branch),
        )
        .route("/vendor/{id}/invoices", get(handlers::vendor::list_vendor_invoices))
        .route("/branch/{id}/status", patch(handlers::vendor::change_branch_status))
        // goods and categories
        .route("/goods", get(handlers::goods::list_goods).post(handlers::goods::create_deposit))
        .route("/goods/quote", post(handlers::goods::quote))
        .route(
            "/goods/category",
            get(handlers::goods::list_categories).post(handlers::goods::create_category),
        )
        .route(
            "/goods/category/{id}",
            get(handlers::goods::get_category)
                .put(handlers::goods::update_category)
                .delete(handlers::goods::delete_category),
        )
        .route("/goods/{id}", get(handlers::goods::get_goods))
        .route("/goods/{id}/settle", patch(handlers::goods::settle_goods))
        // finance
        .route(
            "/invoices",
            get(handlers::invoices::list_invoices).post(handlers::invoices::create_invoice),
        )
        .route("/invoices/mark-overdue", post(handlers::invoices::mark_overdue))
        .route("/invoices/{id}/pay", patch(handlers::invoices::pay_invoice))
        .route("/tiers", get(handlers::tiers::list_tiers))
        .route("/tiers/{id}", put(handlers::tiers::update_tier))
        .route("/dashboard", get(handlers::dashboard::get_stats))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let cors = cors_layer(app_state.config.cors_allow_origin.as_deref());

    Router::new()
        .nest("/api", public.merge(protected))
        .route("/api-docs/openapi.json", get(openapi_json))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
