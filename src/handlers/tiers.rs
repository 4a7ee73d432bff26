// src/handlers/tiers.rs

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{FinanceDesk, RequireRole},
    },
    models::tier::TierPlan,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTierPayload {
    #[validate(range(min = 1, message = "value_must_be_positive"))]
    pub max_branches: Option<i32>,
    #[validate(range(min = 0, message = "value_not_negative"))]
    pub monthly_price: Option<i64>,
    pub features: Option<Vec<String>>,
}

#[utoipa::path(
    get,
    path = "/api/tiers",
    tag = "Tiers",
    responses((status = 200, description = "Subscription tiers, cheapest first", body = [TierPlan])),
    security(("api_jwt" = []))
)]
pub async fn list_tiers(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let tiers = app_state
        .tier_service
        .list_tiers()
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok(Json(tiers))
}

#[utoipa::path(
    put,
    path = "/api/tiers/{id}",
    tag = "Tiers",
    params(("id" = Uuid, Path, description = "Tier id")),
    request_body = UpdateTierPayload,
    responses(
        (status = 200, description = "Tier updated", body = TierPlan),
        (status = 404, description = "No such tier")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_tier(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<FinanceDesk>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTierPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, app_state.i18n_store))?;

    let tier = app_state
        .tier_service
        .update_tier(id, payload.max_branches, payload.monthly_price, payload.features)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok(Json(tier))
}
