// src/models/finance.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "invoice_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Pending, // open
    Paid,    // terminal
    Overdue, // flagged by the overdue sweep
}

impl InvoiceStatus {
    pub fn can_transition_to(self, next: InvoiceStatus) -> bool {
        use InvoiceStatus::*;
        matches!((self, next), (Pending, Paid) | (Overdue, Paid) | (Pending, Overdue))
    }

    /// Pending and overdue invoices both still owe money.
    pub fn is_outstanding(self) -> bool {
        !matches!(self, InvoiceStatus::Paid)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: Uuid,
    pub vendor_id: Uuid,

    #[schema(example = "INV-2024-0001")]
    pub invoice_number: String,

    #[schema(example = 100000)]
    pub amount: i64,

    #[schema(value_type = String, format = Date, example = "2024-01-31")]
    pub due_date: NaiveDate,

    pub status: InvoiceStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub vendor_id: Uuid,
    pub invoice_number: String,
    pub amount: i64,
    pub due_date: NaiveDate,
}
