// src/handlers/dashboard.rs

use axum::{extract::State, response::IntoResponse, Json};
use chrono::Utc;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{ReportViewers, RequireRole},
    },
    models::dashboard::DashboardStats,
};

#[utoipa::path(
    get,
    path = "/api/dashboard",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Platform summary: cards, weekly trend and rankings", body = DashboardStats),
        (status = 403, description = "Caller is not back-office staff"),
        (status = 500, description = "One of the aggregate queries failed")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_stats(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<ReportViewers>,
) -> Result<impl IntoResponse, ApiError> {
    let stats = app_state
        .dashboard_service
        .get_stats(Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok(Json(stats))
}
