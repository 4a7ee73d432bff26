// src/handlers/invoices.rs

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
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
        rbac::{FinanceDesk, RequireRole},
    },
    models::finance::{Invoice, NewInvoice},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoicePayload {
    pub vendor_id: Uuid,
    #[validate(length(min = 1, message = "field_required"))]
    #[schema(example = "INV-2024-0001")]
    pub invoice_number: String,
    #[validate(range(min = 0, message = "value_not_negative"))]
    pub amount: i64,
    #[schema(value_type = String, format = Date, example = "2024-01-31")]
    pub due_date: NaiveDate,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OverdueSweepResponse {
    pub updated: u64,
}

#[utoipa::path(
    get,
    path = "/api/invoices",
    tag = "Invoices",
    responses((status = 200, description = "Every invoice, newest first", body = [Invoice])),
    security(("api_jwt" = []))
)]
pub async fn list_invoices(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<FinanceDesk>,
) -> Result<impl IntoResponse, ApiError> {
    let invoices = app_state
        .invoice_service
        .list_invoices()
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok(Json(invoices))
}

#[utoipa::path(
    post,
    path = "/api/invoices",
    tag = "Invoices",
    request_body = CreateInvoicePayload,
    params(("Idempotency-Key" = Option<String>, Header, description = "Replays the first result for a repeated key")),
    responses(
        (status = 201, description = "Invoice issued", body = Invoice),
        (status = 200, description = "Replay of an earlier request with the same key", body = Invoice),
        (status = 404, description = "No such vendor"),
        (status = 409, description = "Invoice number already used")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_invoice(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<FinanceDesk>,
    headers: HeaderMap,
    Json(payload): Json<CreateInvoicePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, app_state.i18n_store))?;

    let invoice = NewInvoice {
        vendor_id: payload.vendor_id,
        invoice_number: payload.invoice_number.trim().to_string(),
        amount: payload.amount,
        due_date: payload.due_date,
    };

    let key = idempotency_key(&headers).map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    let outcome = app_state
        .invoice_service
        .create_invoice(&user.0, invoice, key.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok(created_or_replayed(outcome))
}

#[utoipa::path(
    patch,
    path = "/api/invoices/{id}/pay",
    tag = "Invoices",
    params(("id" = Uuid, Path, description = "Invoice id")),
    responses(
        (status = 200, description = "Invoice marked paid", body = Invoice),
        (status = 400, description = "Invoice already paid")
    ),
    security(("api_jwt" = []))
)]
pub async fn pay_invoice(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<FinanceDesk>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let invoice = app_state
        .invoice_service
        .pay_invoice(id)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok(Json(invoice))
}

#[utoipa::path(
    post,
    path = "/api/invoices/mark-overdue",
    tag = "Invoices",
    responses((status = 200, description = "Pending invoices past due are now overdue", body = OverdueSweepResponse)),
    security(("api_jwt" = []))
)]
pub async fn mark_overdue(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<FinanceDesk>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = app_state
        .invoice_service
        .mark_overdue(Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok(Json(OverdueSweepResponse { updated }))
}
