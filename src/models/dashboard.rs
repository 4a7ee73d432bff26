// src/models/dashboard.rs

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{finance::InvoiceStatus, vendor::VendorStatus};

// 1. Full dashboard payload (cards, chart and rankings)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(flatten)]
    pub vendors: VendorCounts,
    pub total_branches: i64,
    pub new_branches_24h: i64,
    pub daily_transactions: i64,
    pub monthly_revenue: i64,
    #[serde(flatten)]
    pub invoices: InvoiceTotals,
    // Seven daily counts, oldest first
    pub weekly_trend: Vec<i64>,
    pub popular_categories: Vec<RankedEntry>,
    pub popular_branches: Vec<RankedEntry>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VendorCounts {
    pub total_mitra: i64,
    pub active_mitra: i64,
    pub suspended_mitra: i64,
    pub pending_verification: i64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTotals {
    pub total_invoice_amount: i64,
    pub paid_amount: i64,
    pub outstanding_amount: i64,
}

// 2. Ranking entry (popular categories / branches)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntry {
    pub id: Uuid,
    pub name: String,
    pub count: i64,
}

// 3. Raw aggregate rows
#[derive(Debug, Clone, Copy, FromRow)]
pub struct InvoiceStatusSum {
    pub status: InvoiceStatus,
    pub total: i64,
}

#[derive(Debug, Clone, Copy, FromRow)]
pub struct VendorStatusCount {
    pub status: VendorStatus,
    pub count: i64,
}

#[derive(Debug, Clone, Copy, FromRow)]
pub struct DailyCount {
    pub day: NaiveDate,
    pub count: i64,
}
