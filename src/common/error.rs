// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use thiserror::Error;

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;
use crate::services::pricing::PricingError;

// Internal error taxonomy. Handlers convert it into `ApiError` with the
// caller's locale before it leaves the process.
#[derive(Debug, Error)]
pub enum AppError {
    // --- ValidationError (400) ---
    #[error("Validation error")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Pricing rejected: {0}")]
    Pricing(#[from] PricingError),

    #[error("Bank is required for transfer payments")]
    BankRequired,

    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Tier allows at most {0} branches")]
    TierLimitReached(i32),

    // --- Authentication (401) ---
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Account suspended")]
    AccountSuspended,

    // --- AuthorizationError (403) ---
    #[error("Access denied")]
    Forbidden,

    // --- NotFoundError (404) ---
    #[error("{0} not found")]
    NotFound(&'static str),

    // --- Conflicts (409) ---
    #[error("E-mail already exists")]
    EmailAlreadyExists,

    #[error("Invoice number already exists")]
    InvoiceNumberExists,

    #[error("Duplicate submission")]
    DuplicateSubmission,

    #[error("{0} is still referenced")]
    StillReferenced(&'static str),

    #[error("Unique constraint violated: {0}")]
    UniqueConstraintViolation(String),

    // --- UpstreamError (500) ---
    #[error("Dashboard aggregation failed: {0}")]
    AggregationError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Bcrypt error: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::Pricing(_)
            | AppError::BankRequired
            | AppError::InvalidStatusTransition { .. }
            | AppError::TierLimitReached(_) => StatusCode::BAD_REQUEST,

            AppError::InvalidCredentials | AppError::InvalidToken | AppError::AccountSuspended => {
                StatusCode::UNAUTHORIZED
            }

            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,

            AppError::EmailAlreadyExists
            | AppError::InvoiceNumberExists
            | AppError::DuplicateSubmission
            | AppError::StillReferenced(_)
            | AppError::UniqueConstraintViolation(_) => StatusCode::CONFLICT,

            AppError::AggregationError(_)
            | AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // Translation key plus the placeholder values for it
    fn message(&self) -> (&'static str, Vec<(&'static str, String)>) {
        match self {
            AppError::ValidationError(_) => ("validation_failed", vec![]),
            AppError::Pricing(e) => (e.message_key(), vec![]),
            AppError::BankRequired => ("bank_required", vec![]),
            AppError::InvalidStatusTransition { from, to } => (
                "invalid_status_transition",
                vec![("from", from.clone()), ("to", to.clone())],
            ),
            AppError::TierLimitReached(max) => ("tier_limit_reached", vec![("max", max.to_string())]),
            AppError::InvalidCredentials => ("invalid_credentials", vec![]),
            AppError::InvalidToken => ("invalid_token", vec![]),
            AppError::AccountSuspended => ("account_suspended", vec![]),
            AppError::Forbidden => ("access_denied", vec![]),
            AppError::NotFound(entity) => ("not_found", vec![("entity", entity.to_string())]),
            AppError::EmailAlreadyExists => ("email_already_exists", vec![]),
            AppError::InvoiceNumberExists => ("invoice_number_exists", vec![]),
            AppError::DuplicateSubmission => ("duplicate_submission", vec![]),
            AppError::StillReferenced(entity) => ("still_referenced", vec![("entity", entity.to_string())]),
            AppError::UniqueConstraintViolation(_) => ("unique_violation", vec![]),
            _ => ("internal_error", vec![]),
        }
    }

    /// Converts the error into the wire shape, translating messages to the
    /// caller's language. Upstream failures are logged here and leave the
    /// process with a generic body.
    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let status = self.status();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Internal server error: {}", self);
        }

        let details = match self {
            AppError::ValidationError(errors) => {
                let mut fields: HashMap<String, Vec<String>> = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages = field_errors
                        .iter()
                        .map(|e| {
                            let key = e.message.as_deref().unwrap_or(e.code.as_ref());
                            store.translate(&locale.0, key, &[])
                        })
                        .collect();
                    fields.insert(field.to_string(), messages);
                }
                Some(json!(fields))
            }
            _ => None,
        };

        let (key, args) = self.message();
        ApiError {
            status,
            error: store.translate(&locale.0, key, &args),
            details,
        }
    }
}

// Used where no locale is available (middleware rejections)
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default(), I18nStore::global())
            .into_response()
    }
}

// ---
// ApiError: what the client actually receives
// ---
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{ValidationError, ValidationErrors};

    fn english() -> Locale {
        Locale("en".to_string())
    }

    #[test]
    fn taxonomy_maps_to_status_codes() {
        assert_eq!(AppError::BankRequired.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Pricing(PricingError::NonPositiveQuantity).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotFound("Vendor").status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::StillReferenced("Category").status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::AggregationError("pool timed out".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn upstream_errors_do_not_leak_details() {
        let err = AppError::AggregationError("relation \"goods\" does not exist".into());
        let api = err.to_api_error(&english(), I18nStore::global());

        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.error.contains("goods"));
        assert!(api.details.is_none());
    }

    #[test]
    fn validation_errors_carry_field_details() {
        let mut errors = ValidationErrors::new();
        let mut err = ValidationError::new("length");
        err.message = Some("name_required".into());
        errors.add("name", err);

        let api = AppError::ValidationError(errors).to_api_error(&english(), I18nStore::global());
        let details = api.details.expect("details present");

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(details["name"][0], "Name is required.");
    }

    #[test]
    fn not_found_names_the_entity() {
        let api = AppError::NotFound("Vendor").to_api_error(&english(), I18nStore::global());
        assert_eq!(api.error, "Vendor not found.");
    }
}
