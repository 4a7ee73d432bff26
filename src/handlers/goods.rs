// src/handlers/goods.rs

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    handlers::{created_or_replayed, idempotency_key},
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{CustomerDesk, FinanceDesk, RequireRole, VendorDesk},
    },
    models::goods::{Category, Goods, NewDeposit, PaymentMethod, PriceQuote},
};

// ---
// Payloads
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryPayload {
    #[validate(length(min = 1, message = "name_required"))]
    pub title: String,
    #[validate(range(min = 0, message = "rate_negative"))]
    pub daily_rate: i64,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryPayload {
    #[validate(length(min = 1, message = "name_required"))]
    pub title: Option<String>,
    #[validate(range(min = 0, message = "rate_negative"))]
    pub daily_rate: Option<i64>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuotePayload {
    pub category_id: Uuid,
    #[schema(example = 2)]
    pub quantity: i64,
    pub date_in: DateTime<Utc>,
    pub date_out: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDepositPayload {
    pub branch_id: Uuid,
    pub category_id: Uuid,
    #[validate(length(min = 1, message = "name_required"))]
    pub name: String,
    pub quantity: i64,
    pub date_in: DateTime<Utc>,
    pub date_out: DateTime<Utc>,
    pub payment_method: PaymentMethod,
    // Required when paying by transfer
    pub bank: Option<String>,
}

// ---
// Categories
// ---
#[utoipa::path(
    get,
    path = "/api/goods/category",
    tag = "Categories",
    responses((status = 200, description = "All pricing categories", body = [Category])),
    security(("api_jwt" = []))
)]
pub async fn list_categories(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let categories = app_state
        .goods_service
        .list_categories()
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok(Json(categories))
}

#[utoipa::path(
    get,
    path = "/api/goods/category/{id}",
    tag = "Categories",
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category found", body = Category),
        (status = 404, description = "No such category")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_category(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let category = app_state
        .goods_service
        .get_category(id)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok(Json(category))
}

#[utoipa::path(
    post,
    path = "/api/goods/category",
    tag = "Categories",
    request_body = CreateCategoryPayload,
    responses((status = 201, description = "Category created", body = Category)),
    security(("api_jwt" = []))
)]
pub async fn create_category(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<FinanceDesk>,
    Json(payload): Json<CreateCategoryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, app_state.i18n_store))?;

    let category = app_state
        .goods_service
        .create_category(&payload.title, payload.daily_rate, &payload.description)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(category)))
}

#[utoipa::path(
    put,
    path = "/api/goods/category/{id}",
    tag = "Categories",
    params(("id" = Uuid, Path, description = "Category id")),
    request_body = UpdateCategoryPayload,
    responses((status = 200, description = "Category updated; existing deposits keep their price", body = Category)),
    security(("api_jwt" = []))
)]
pub async fn update_category(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<FinanceDesk>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, app_state.i18n_store))?;

    let category = app_state
        .goods_service
        .update_category(id, payload.title.as_deref(), payload.daily_rate, payload.description.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok(Json(category))
}

#[utoipa::path(
    delete,
    path = "/api/goods/category/{id}",
    tag = "Categories",
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 409, description = "Goods still reference the category")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_category(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<FinanceDesk>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .goods_service
        .delete_category(id)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// ---
// Deposits
// ---
#[utoipa::path(
    post,
    path = "/api/goods/quote",
    tag = "Goods",
    request_body = QuotePayload,
    responses(
        (status = 200, description = "Price for the requested stay", body = PriceQuote),
        (status = 400, description = "Unknown category, bad quantity or bad dates")
    ),
    security(("api_jwt" = []))
)]
pub async fn quote(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<QuotePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let quote = app_state
        .goods_service
        .quote(payload.category_id, payload.quantity, payload.date_in, payload.date_out)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok(Json(quote))
}

#[utoipa::path(
    post,
    path = "/api/goods",
    tag = "Goods",
    request_body = CreateDepositPayload,
    params(("Idempotency-Key" = Option<String>, Header, description = "Replays the first result for a repeated key")),
    responses(
        (status = 201, description = "Deposit priced and stored", body = Goods),
        (status = 200, description = "Replay of an earlier request with the same key", body = Goods),
        (status = 409, description = "Identical deposit submitted moments ago")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_deposit(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<CustomerDesk>,
    headers: HeaderMap,
    Json(payload): Json<CreateDepositPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, app_state.i18n_store))?;

    let deposit = NewDeposit {
        branch_id: payload.branch_id,
        category_id: payload.category_id,
        name: payload.name,
        quantity: payload.quantity,
        date_in: payload.date_in,
        date_out: payload.date_out,
        payment_method: payload.payment_method,
        bank: payload.bank,
    };

    let key = idempotency_key(&headers).map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    let outcome = app_state
        .goods_service
        .create_deposit(&user.0, deposit, key.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok(created_or_replayed(outcome))
}

#[utoipa::path(
    get,
    path = "/api/goods",
    tag = "Goods",
    responses((status = 200, description = "Deposits visible to the caller", body = [Goods])),
    security(("api_jwt" = []))
)]
pub async fn list_goods(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let goods = app_state
        .goods_service
        .list_goods(&user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok(Json(goods))
}

#[utoipa::path(
    get,
    path = "/api/goods/{id}",
    tag = "Goods",
    params(("id" = Uuid, Path, description = "Goods id")),
    responses(
        (status = 200, description = "Deposit found", body = Goods),
        (status = 404, description = "No such deposit")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_goods(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let goods = app_state
        .goods_service
        .get_goods(&user.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok(Json(goods))
}

#[utoipa::path(
    patch,
    path = "/api/goods/{id}/settle",
    tag = "Goods",
    params(("id" = Uuid, Path, description = "Goods id")),
    responses(
        (status = 200, description = "Deposit collected", body = Goods),
        (status = 400, description = "Deposit already settled")
    ),
    security(("api_jwt" = []))
)]
pub async fn settle_goods(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<VendorDesk>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let goods = app_state
        .goods_service
        .settle(&user.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok(Json(goods))
}
