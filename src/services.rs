// src/services.rs

pub mod auth;
pub mod dashboard_service;
pub mod goods_service;
pub mod invoice_service;
pub mod pricing;
pub mod tier_service;
pub mod user_service;
pub mod vendor_service;

/// Result of a create call that honours an `Idempotency-Key`.
#[derive(Debug, Clone)]
pub enum CreateOutcome<T> {
    Created(T),
    // The key was seen before; this is the resource it created then
    Replayed(T),
}

impl<T> CreateOutcome<T> {
    pub fn is_created(&self) -> bool {
        matches!(self, CreateOutcome::Created(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            CreateOutcome::Created(value) | CreateOutcome::Replayed(value) => value,
        }
    }
}
