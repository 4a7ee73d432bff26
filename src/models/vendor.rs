// src/models/vendor.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::tier::TierName;

// ---
// 1. Vendor (Mitra)
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "vendor_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VendorStatus {
    Pending,
    Active,
    Suspended,
}

impl VendorStatus {
    /// Verification moves a vendor out of `Pending`; moderation may suspend
    /// and later reinstate it. Nothing returns to `Pending`.
    pub fn can_transition_to(self, next: VendorStatus) -> bool {
        use VendorStatus::*;
        matches!(
            (self, next),
            (Pending, Active) | (Pending, Suspended) | (Active, Suspended) | (Suspended, Active)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub id: Uuid,
    pub owner_id: Option<Uuid>,
    #[schema(example = "PT Titip Aman")]
    pub company_name: String,
    pub address: String,
    #[schema(example = "081234567890")]
    pub phone: String,
    pub email: String,
    pub status: VendorStatus,
    pub tier: TierName,
    pub verified_at: Option<DateTime<Utc>>,
    pub suspended_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// 2. Branch (Cabang)
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "branch_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BranchStatus {
    Pending,
    Active,
    Rejected,
}

impl BranchStatus {
    // Branch review is a one-shot decision.
    pub fn can_transition_to(self, next: BranchStatus) -> bool {
        matches!(
            (self, next),
            (BranchStatus::Pending, BranchStatus::Active) | (BranchStatus::Pending, BranchStatus::Rejected)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub latitude: Option<f64>,
    #[schema(example = 106.8)]
    pub longitude: Option<f64>,
    pub status: BranchStatus,
    pub created_at: DateTime<Utc>,
}

// Input for vendor creation, already validated by the handler
#[derive(Debug, Clone)]
pub struct NewVendor {
    pub owner_id: Option<Uuid>,
    pub company_name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub tier: TierName,
}

// Partial profile update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct VendorChanges {
    pub company_name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub tier: Option<TierName>,
}

#[derive(Debug, Clone)]
pub struct NewBranch {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vendor_verification_and_moderation_paths() {
        assert!(VendorStatus::Pending.can_transition_to(VendorStatus::Active));
        assert!(VendorStatus::Pending.can_transition_to(VendorStatus::Suspended));
        assert!(VendorStatus::Active.can_transition_to(VendorStatus::Suspended));
        assert!(VendorStatus::Suspended.can_transition_to(VendorStatus::Active));
    }

    #[test]
    fn vendor_never_returns_to_pending() {
        assert!(!VendorStatus::Active.can_transition_to(VendorStatus::Pending));
        assert!(!VendorStatus::Suspended.can_transition_to(VendorStatus::Pending));
        assert!(!VendorStatus::Active.can_transition_to(VendorStatus::Active));
    }

    #[test]
    fn branch_review_is_final() {
        assert!(BranchStatus::Pending.can_transition_to(BranchStatus::Active));
        assert!(BranchStatus::Pending.can_transition_to(BranchStatus::Rejected));
        assert!(!BranchStatus::Rejected.can_transition_to(BranchStatus::Active));
        assert!(!BranchStatus::Active.can_transition_to(BranchStatus::Rejected));
    }
}
