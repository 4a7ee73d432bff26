// src/handlers/vendor.rs

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
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
    handlers::{created_or_replayed, idempotency_key},
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{InvoiceReaders, RequireRole, StaffOnly, SuperadminOnly, VendorDesk, VendorReaders},
    },
    models::{
        finance::Invoice,
        tier::TierName,
        vendor::{Branch, BranchStatus, NewBranch, NewVendor, Vendor, VendorChanges, VendorStatus},
    },
};

// ---
// Payloads
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateVendorPayload {
    #[validate(length(min = 1, message = "name_required"))]
    pub company_name: String,
    #[validate(length(min = 1, message = "field_required"))]
    pub address: String,
    #[validate(length(min = 1, message = "field_required"))]
    pub phone: String,
    #[validate(email(message = "email_invalid"))]
    pub email: String,
    // Defaults to bronze; only staff may pick another tier
    pub tier: Option<TierName>,
    // Only honoured for staff; a vendor user always owns what they create
    pub owner_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVendorPayload {
    #[validate(length(min = 1, message = "name_required"))]
    pub company_name: Option<String>,
    #[validate(length(min = 1, message = "field_required"))]
    pub address: Option<String>,
    #[validate(length(min = 1, message = "field_required"))]
    pub phone: Option<String>,
    #[validate(email(message = "email_invalid"))]
    pub email: Option<String>,
    pub tier: Option<TierName>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VendorStatusPayload {
    pub status: VendorStatus,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBranchPayload {
    #[validate(length(min = 1, message = "name_required"))]
    pub name: String,
    #[validate(length(min = 1, message = "field_required"))]
    pub address: String,
    #[validate(length(min = 1, message = "field_required"))]
    pub phone: String,
    #[validate(range(min = -90.0, max = 90.0, message = "range"))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0, message = "range"))]
    pub longitude: Option<f64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BranchStatusPayload {
    pub status: BranchStatus,
}

// ---
// Vendors
// ---
#[utoipa::path(
    get,
    path = "/api/vendor",
    tag = "Vendors",
    responses((status = 200, description = "Vendors visible to the caller", body = [Vendor])),
    security(("api_jwt" = []))
)]
pub async fn list_vendors(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<VendorReaders>,
) -> Result<impl IntoResponse, ApiError> {
    let vendors = app_state
        .vendor_service
        .list_vendors(&user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok(Json(vendors))
}

#[utoipa::path(
    post,
    path = "/api/vendor",
    tag = "Vendors",
    request_body = CreateVendorPayload,
    params(("Idempotency-Key" = Option<String>, Header, description = "Replays the first result for a repeated key")),
    responses(
        (status = 201, description = "Vendor registered, pending verification", body = Vendor),
        (status = 200, description = "Replay of an earlier request with the same key", body = Vendor),
        (status = 403, description = "Non-staff caller asked for a paid tier")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_vendor(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<VendorDesk>,
    headers: HeaderMap,
    Json(payload): Json<CreateVendorPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, app_state.i18n_store))?;

    let new_vendor = NewVendor {
        owner_id: payload.owner_id,
        company_name: payload.company_name,
        address: payload.address,
        phone: payload.phone,
        email: payload.email,
        tier: payload.tier.unwrap_or_default(),
    };

    let key = idempotency_key(&headers).map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    let outcome = app_state
        .vendor_service
        .create_vendor(&user.0, new_vendor, key.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok(created_or_replayed(outcome))
}

#[utoipa::path(
    get,
    path = "/api/vendor/{id}",
    tag = "Vendors",
    params(("id" = Uuid, Path, description = "Vendor id")),
    responses(
        (status = 200, description = "Vendor found", body = Vendor),
        (status = 404, description = "No such vendor")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_vendor(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<VendorReaders>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let vendor = app_state
        .vendor_service
        .get_vendor(&user.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok(Json(vendor))
}

#[utoipa::path(
    put,
    path = "/api/vendor/{id}",
    tag = "Vendors",
    params(("id" = Uuid, Path, description = "Vendor id")),
    request_body = UpdateVendorPayload,
    responses((status = 200, description = "Vendor updated", body = Vendor)),
    security(("api_jwt" = []))
)]
pub async fn update_vendor(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<VendorDesk>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateVendorPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, app_state.i18n_store))?;

    let changes = VendorChanges {
        company_name: payload.company_name,
        address: payload.address,
        phone: payload.phone,
        email: payload.email,
        tier: payload.tier,
    };

    let vendor = app_state
        .vendor_service
        .update_vendor(&user.0, id, changes)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok(Json(vendor))
}

#[utoipa::path(
    delete,
    path = "/api/vendor/{id}",
    tag = "Vendors",
    params(("id" = Uuid, Path, description = "Vendor id")),
    responses(
        (status = 204, description = "Vendor deleted"),
        (status = 409, description = "Vendor still has branches or invoices")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_vendor(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<SuperadminOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .vendor_service
        .delete_vendor(id)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    patch,
    path = "/api/vendor/{id}/status",
    tag = "Vendors",
    params(("id" = Uuid, Path, description = "Vendor id")),
    request_body = VendorStatusPayload,
    responses(
        (status = 200, description = "Status changed", body = Vendor),
        (status = 400, description = "Transition not allowed")
    ),
    security(("api_jwt" = []))
)]
pub async fn change_vendor_status(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<VendorStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let vendor = app_state
        .vendor_service
        .change_status(id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok(Json(vendor))
}

#[utoipa::path(
    get,
    path = "/api/vendor/{id}/invoices",
    tag = "Vendors",
    params(("id" = Uuid, Path, description = "Vendor id")),
    responses((status = 200, description = "Invoices billed to the vendor", body = [Invoice])),
    security(("api_jwt" = []))
)]
pub async fn list_vendor_invoices(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<InvoiceReaders>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let invoices = app_state
        .invoice_service
        .list_for_vendor(&user.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok(Json(invoices))
}

// ---
// Branches
// ---
#[utoipa::path(
    get,
    path = "/api/vendor/branch",
    tag = "Branches",
    responses((status = 200, description = "Branches open for deposits", body = [Branch])),
    security(("api_jwt" = []))
)]
pub async fn list_active_branches(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let branches = app_state
        .vendor_service
        .list_active_branches()
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok(Json(branches))
}

#[utoipa::path(
    get,
    path = "/api/vendor/{id}/branch",
    tag = "Branches",
    params(("id" = Uuid, Path, description = "Vendor id")),
    responses((status = 200, description = "The vendor's branches", body = [Branch])),
    security(("api_jwt" = []))
)]
pub async fn list_branches(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<VendorDesk>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let branches = app_state
        .vendor_service
        .list_branches(&user.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok(Json(branches))
}

#[utoipa::path(
    post,
    path = "/api/vendor/{id}/branch",
    tag = "Branches",
    params(("id" = Uuid, Path, description = "Vendor id")),
    request_body = CreateBranchPayload,
    responses(
        (status = 201, description = "Branch registered, pending review", body = Branch),
        (status = 400, description = "Tier branch allowance used up"),
        (status = 404, description = "No such vendor")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_branch(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<VendorDesk>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateBranchPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, app_state.i18n_store))?;

    let new_branch = NewBranch {
        name: payload.name,
        address: payload.address,
        phone: payload.phone,
        latitude: payload.latitude,
        longitude: payload.longitude,
    };

    let branch = app_state
        .vendor_service
        .create_branch(&user.0, id, new_branch)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(branch)))
}

#[utoipa::path(
    patch,
    path = "/api/branch/{id}/status",
    tag = "Branches",
    params(("id" = Uuid, Path, description = "Branch id")),
    request_body = BranchStatusPayload,
    responses(
        (status = 200, description = "Branch reviewed", body = Branch),
        (status = 400, description = "Branch was already reviewed")
    ),
    security(("api_jwt" = []))
)]
pub async fn change_branch_status(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BranchStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let branch = app_state
        .vendor_service
        .change_branch_status(id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok(Json(branch))
}
