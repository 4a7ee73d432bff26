// src/services/invoice_service.rs

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{IdempotencyRepository, IdempotencyScope, InvoiceRepository, VendorRepository},
    models::{
        auth::{Role, Session},
        finance::{Invoice, InvoiceStatus, NewInvoice},
    },
    services::CreateOutcome,
};

// "Today" for the overdue sweep, in the reporting offset
pub fn local_today(now: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    now.with_timezone(&offset).date_naive()
}

#[derive(Clone)]
pub struct InvoiceService {
    invoice_repo: InvoiceRepository,
    vendor_repo: VendorRepository,
    idempotency_repo: IdempotencyRepository,
    pool: PgPool,
    report_offset: FixedOffset,
}

impl InvoiceService {
    pub fn new(
        invoice_repo: InvoiceRepository,
        vendor_repo: VendorRepository,
        idempotency_repo: IdempotencyRepository,
        pool: PgPool,
        report_offset: FixedOffset,
    ) -> Self {
        Self { invoice_repo, vendor_repo, idempotency_repo, pool, report_offset }
    }

    pub async fn create_invoice(
        &self,
        session: &Session,
        invoice: NewInvoice,
        idempotency_key: Option<&str>,
    ) -> Result<CreateOutcome<Invoice>, AppError> {
        let mut tx = self.pool.begin().await?;

        if let Some(key) = idempotency_key {
            let seen = self
                .idempotency_repo
                .find_resource(&mut *tx, IdempotencyScope::Invoice, session.user_id, key)
                .await?;
            if let Some(invoice_id) = seen {
                let existing = self
                    .invoice_repo
                    .find_invoice(&mut *tx, invoice_id)
                    .await?
                    .ok_or(AppError::NotFound("Invoice"))?;
                return Ok(CreateOutcome::Replayed(existing));
            }
        }

        if self.vendor_repo.find_vendor(&mut *tx, invoice.vendor_id).await?.is_none() {
            return Err(AppError::NotFound("Vendor"));
        }

        let created = self.invoice_repo.create_invoice(&mut *tx, &invoice).await?;

        if let Some(key) = idempotency_key {
            self.idempotency_repo
                .record(&mut *tx, IdempotencyScope::Invoice, session.user_id, key, created.id)
                .await?;
        }

        tx.commit().await?;

        tracing::info!(invoice_id = %created.id, vendor_id = %created.vendor_id, "invoice issued");
        Ok(CreateOutcome::Created(created))
    }

    pub async fn list_invoices(&self) -> Result<Vec<Invoice>, AppError> {
        self.invoice_repo.list_all().await
    }

    // Finance and staff read any vendor's invoices; a vendor user only their own
    pub async fn list_for_vendor(&self, session: &Session, vendor_id: Uuid) -> Result<Vec<Invoice>, AppError> {
        let vendor = self
            .vendor_repo
            .find_vendor(&self.pool, vendor_id)
            .await?
            .ok_or(AppError::NotFound("Vendor"))?;

        let allowed = match session.role {
            Role::Superadmin | Role::Admin | Role::Finance => true,
            Role::Vendor => vendor.owner_id == Some(session.user_id),
            Role::Customer => false,
        };
        if !allowed {
            return Err(AppError::Forbidden);
        }

        self.invoice_repo.list_by_vendor(vendor_id).await
    }

    pub async fn pay_invoice(&self, id: Uuid) -> Result<Invoice, AppError> {
        let current = self
            .invoice_repo
            .find_invoice(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("Invoice"))?;

        let rejected = || AppError::InvalidStatusTransition {
            from: format!("{:?}", current.status).to_lowercase(),
            to: "paid".into(),
        };

        if !current.status.can_transition_to(InvoiceStatus::Paid) {
            return Err(rejected());
        }

        let paid = self.invoice_repo.mark_paid(id, current.status).await?.ok_or_else(rejected)?;

        tracing::info!(invoice_id = %id, amount = paid.amount, "invoice paid");
        Ok(paid)
    }

    /// Flags pending invoices whose due date has passed. Returns the count.
    pub async fn mark_overdue(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let today = local_today(now, self.report_offset);
        let updated = self.invoice_repo.mark_overdue_before(today).await?;

        tracing::info!(%today, updated, "overdue sweep finished");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn today_follows_the_reporting_offset() {
        let wib = FixedOffset::east_opt(7 * 3600).unwrap();
        // 2024-03-31 18:30 UTC is already April 1st in Jakarta
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 18, 30, 0).unwrap();

        assert_eq!(local_today(now, wib), NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
        assert_eq!(
            local_today(now, FixedOffset::east_opt(0).unwrap()),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()
        );
    }
}
