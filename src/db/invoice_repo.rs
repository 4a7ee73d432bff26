// src/db/invoice_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::map_write_error, error::AppError},
    models::finance::{Invoice, InvoiceStatus, NewInvoice},
};

const INVOICE_COLUMNS: &str = "id, vendor_id, invoice_number, amount, due_date, status, paid_at, created_at";

#[derive(Clone)]
pub struct InvoiceRepository {
    pool: PgPool,
}

impl InvoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_invoice<'e, E>(&self, executor: E, invoice: &NewInvoice) -> Result<Invoice, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Invoice>(&format!(
            r#"
            INSERT INTO invoices (vendor_id, invoice_number, amount, due_date)
            VALUES ($1, $2, $3, $4)
            RETURNING {INVOICE_COLUMNS}
            "#
        ))
        .bind(invoice.vendor_id)
        .bind(&invoice.invoice_number)
        .bind(invoice.amount)
        .bind(invoice.due_date)
        .fetch_one(executor)
        .await
        .map_err(map_write_error)
    }

    pub async fn find_invoice<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Invoice>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let invoice = sqlx::query_as::<_, Invoice>(&format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = $1"))
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(invoice)
    }

    pub async fn list_all(&self) -> Result<Vec<Invoice>, AppError> {
        let invoices = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(invoices)
    }

    pub async fn list_by_vendor(&self, vendor_id: Uuid) -> Result<Vec<Invoice>, AppError> {
        let invoices = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE vendor_id = $1 ORDER BY created_at DESC"
        ))
        .bind(vendor_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(invoices)
    }

    // Guarded on the current status so a paid invoice is never touched again
    pub async fn mark_paid(&self, id: Uuid, expected: InvoiceStatus) -> Result<Option<Invoice>, AppError> {
        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            r#"
            UPDATE invoices SET status = 'paid', paid_at = now()
            WHERE id = $1 AND status = $2
            RETURNING {INVOICE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(expected)
        .fetch_optional(&self.pool)
        .await?;
        Ok(invoice)
    }

    /// Flags every pending invoice due before `today`. Returns how many changed.
    pub async fn mark_overdue_before(&self, today: NaiveDate) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE invoices SET status = 'overdue' WHERE status = 'pending' AND due_date < $1")
            .bind(today)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
