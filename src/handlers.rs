// src/handlers.rs

use axum::{
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use validator::{ValidationError, ValidationErrors};

use crate::{common::error::AppError, services::CreateOutcome};

pub mod auth;
pub mod dashboard;
pub mod goods;
pub mod invoices;
pub mod tiers;
pub mod users;
pub mod vendor;

pub const IDEMPOTENCY_HEADER: &str = "idempotency-key";
const MAX_IDEMPOTENCY_KEY_LEN: usize = 255;

// A blank key counts as absent; one the server cannot store is rejected
pub(crate) fn idempotency_key(headers: &HeaderMap) -> Result<Option<String>, AppError> {
    let Some(value) = headers.get(IDEMPOTENCY_HEADER) else {
        return Ok(None);
    };

    let key = value.to_str().map(str::trim).map_err(|_| invalid_key("idempotency_key_invalid"))?;
    if key.is_empty() {
        return Ok(None);
    }
    if key.len() > MAX_IDEMPOTENCY_KEY_LEN {
        return Err(invalid_key("idempotency_key_too_long"));
    }
    Ok(Some(key.to_owned()))
}

fn invalid_key(message: &'static str) -> AppError {
    let mut error = ValidationError::new("idempotency_key");
    error.message = Some(message.into());
    let mut errors = ValidationErrors::new();
    errors.add("idempotencyKey", error);
    AppError::ValidationError(errors)
}

// 201 for a fresh resource, 200 when an idempotency key replayed an earlier one
pub(crate) fn created_or_replayed<T: Serialize>(outcome: CreateOutcome<T>) -> impl IntoResponse {
    let status = if outcome.is_created() { StatusCode::CREATED } else { StatusCode::OK };
    (status, Json(outcome.into_inner()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn idempotency_key_is_trimmed_and_optional() {
        let mut headers = HeaderMap::new();
        assert_eq!(idempotency_key(&headers).unwrap(), None);

        headers.insert(IDEMPOTENCY_HEADER, HeaderValue::from_static("  order-42 "));
        assert_eq!(idempotency_key(&headers).unwrap().as_deref(), Some("order-42"));

        headers.insert(IDEMPOTENCY_HEADER, HeaderValue::from_static("   "));
        assert_eq!(idempotency_key(&headers).unwrap(), None);
    }

    #[test]
    fn oversized_idempotency_key_is_rejected() {
        let mut headers = HeaderMap::new();
        let at_limit = "k".repeat(MAX_IDEMPOTENCY_KEY_LEN);
        headers.insert(IDEMPOTENCY_HEADER, HeaderValue::from_str(&at_limit).unwrap());
        assert_eq!(idempotency_key(&headers).unwrap().as_deref(), Some(at_limit.as_str()));

        let too_long = "k".repeat(MAX_IDEMPOTENCY_KEY_LEN + 1);
        headers.insert(IDEMPOTENCY_HEADER, HeaderValue::from_str(&too_long).unwrap());
        match idempotency_key(&headers) {
            Err(AppError::ValidationError(errors)) => {
                assert!(errors.field_errors().contains_key("idempotencyKey"));
            }
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn replayed_creates_answer_ok() {
        let created = created_or_replayed(CreateOutcome::Created(1)).into_response();
        let replayed = created_or_replayed(CreateOutcome::Replayed(1)).into_response();

        assert_eq!(created.status(), StatusCode::CREATED);
        assert_eq!(replayed.status(), StatusCode::OK);
    }
}
