// src/services/goods_service.rs

use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{GoodsRepository, IdempotencyRepository, IdempotencyScope, VendorRepository},
    models::{
        auth::{Role, Session},
        goods::{Category, Goods, NewDeposit, PaymentMethod, PriceQuote, PricedDeposit},
        vendor::{BranchStatus, VendorStatus},
    },
    services::{
        pricing::{self, DayCountPolicy, PricingError},
        CreateOutcome,
    },
};

/// Transfer payments must name the bank; a blank name counts as missing.
pub fn normalize_bank(method: PaymentMethod, bank: Option<String>) -> Result<Option<String>, AppError> {
    let bank = bank.map(|b| b.trim().to_string()).filter(|b| !b.is_empty());
    if method == PaymentMethod::Transfer && bank.is_none() {
        return Err(AppError::BankRequired);
    }
    Ok(bank)
}

#[derive(Clone)]
pub struct GoodsService {
    goods_repo: GoodsRepository,
    vendor_repo: VendorRepository,
    idempotency_repo: IdempotencyRepository,
    pool: PgPool,
    day_policy: DayCountPolicy,
    report_offset: FixedOffset,
    duplicate_window: TimeDelta,
}

impl GoodsService {
    pub fn new(
        goods_repo: GoodsRepository,
        vendor_repo: VendorRepository,
        idempotency_repo: IdempotencyRepository,
        pool: PgPool,
        day_policy: DayCountPolicy,
        report_offset: FixedOffset,
        duplicate_window: TimeDelta,
    ) -> Self {
        Self {
            goods_repo,
            vendor_repo,
            idempotency_repo,
            pool,
            day_policy,
            report_offset,
            duplicate_window,
        }
    }

    // =========================================================================
    //  CATEGORIES
    // =========================================================================

    pub async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        self.goods_repo.list_categories().await
    }

    pub async fn get_category(&self, id: Uuid) -> Result<Category, AppError> {
        self.goods_repo
            .find_category(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("Category"))
    }

    pub async fn create_category(&self, title: &str, daily_rate: i64, description: &str) -> Result<Category, AppError> {
        if daily_rate < 0 {
            return Err(PricingError::NegativeRate.into());
        }
        self.goods_repo.create_category(title, daily_rate, description).await
    }

    pub async fn update_category(
        &self,
        id: Uuid,
        title: Option<&str>,
        daily_rate: Option<i64>,
        description: Option<&str>,
    ) -> Result<Category, AppError> {
        if daily_rate.is_some_and(|rate| rate < 0) {
            return Err(PricingError::NegativeRate.into());
        }
        self.goods_repo
            .update_category(id, title, daily_rate, description)
            .await?
            .ok_or(AppError::NotFound("Category"))
    }

    pub async fn delete_category(&self, id: Uuid) -> Result<(), AppError> {
        if !self.goods_repo.delete_category(id).await? {
            return Err(AppError::NotFound("Category"));
        }
        Ok(())
    }

    // =========================================================================
    //  PRICING
    // =========================================================================

    /// Prices a prospective deposit against the category's current rate.
    pub async fn quote(
        &self,
        category_id: Uuid,
        quantity: i64,
        date_in: DateTime<Utc>,
        date_out: DateTime<Utc>,
    ) -> Result<PriceQuote, AppError> {
        let category = self
            .goods_repo
            .find_category(&self.pool, category_id)
            .await?
            .ok_or(PricingError::UnknownCategory)?;

        let quote = pricing::quote(category.daily_rate, quantity, date_in, date_out, self.day_policy, self.report_offset)?;
        Ok(quote)
    }

    // =========================================================================
    //  DEPOSITS
    // =========================================================================

    pub async fn create_deposit(
        &self,
        session: &Session,
        mut deposit: NewDeposit,
        idempotency_key: Option<&str>,
    ) -> Result<CreateOutcome<Goods>, AppError> {
        deposit.bank = normalize_bank(deposit.payment_method, deposit.bank.take())?;

        let mut tx = self.pool.begin().await?;

        match idempotency_key {
            Some(key) => {
                let seen = self
                    .idempotency_repo
                    .find_resource(&mut *tx, IdempotencyScope::Goods, session.user_id, key)
                    .await?;
                if let Some(goods_id) = seen {
                    let existing = self
                        .goods_repo
                        .find_goods(&mut *tx, goods_id)
                        .await?
                        .ok_or(AppError::NotFound("Goods"))?;
                    return Ok(CreateOutcome::Replayed(existing));
                }
            }
            None if self.duplicate_window > TimeDelta::zero() => {
                let since = Utc::now() - self.duplicate_window;
                let duplicate = self
                    .goods_repo
                    .find_recent_duplicate(&mut *tx, session.user_id, &deposit, since)
                    .await?;
                if duplicate.is_some() {
                    return Err(AppError::DuplicateSubmission);
                }
            }
            None => {}
        }

        // Customers may only deposit at verified branches of active vendors
        let branch = self
            .vendor_repo
            .find_branch(&mut *tx, deposit.branch_id)
            .await?
            .filter(|b| b.status == BranchStatus::Active)
            .ok_or(AppError::NotFound("Branch"))?;
        let vendor_active = self
            .vendor_repo
            .find_vendor(&mut *tx, branch.vendor_id)
            .await?
            .is_some_and(|v| v.status == VendorStatus::Active);
        if !vendor_active {
            return Err(AppError::NotFound("Branch"));
        }

        let category = self
            .goods_repo
            .find_category(&mut *tx, deposit.category_id)
            .await?
            .ok_or(PricingError::UnknownCategory)?;

        let quote = pricing::quote(
            category.daily_rate,
            deposit.quantity,
            deposit.date_in,
            deposit.date_out,
            self.day_policy,
            self.report_offset,
        )?;
        let priced = PricedDeposit {
            daily_rate: category.daily_rate,
            day_total: quote.day_total,
            total_price: quote.total_price,
        };

        let created = self.goods_repo.create_goods(&mut *tx, session.user_id, &deposit, &priced).await?;

        if let Some(key) = idempotency_key {
            self.idempotency_repo
                .record(&mut *tx, IdempotencyScope::Goods, session.user_id, key, created.id)
                .await?;
        }

        tx.commit().await?;

        tracing::info!(goods_id = %created.id, total_price = created.total_price, "deposit created");
        Ok(CreateOutcome::Created(created))
    }

    pub async fn list_goods(&self, session: &Session) -> Result<Vec<Goods>, AppError> {
        match session.role {
            Role::Customer => self.goods_repo.list_by_user(session.user_id).await,
            Role::Vendor => self.goods_repo.list_by_vendor_owner(session.user_id).await,
            Role::Superadmin | Role::Admin | Role::Finance => self.goods_repo.list_all().await,
        }
    }

    pub async fn get_goods(&self, session: &Session, id: Uuid) -> Result<Goods, AppError> {
        let goods = self
            .goods_repo
            .find_goods(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("Goods"))?;

        match session.role {
            Role::Customer if goods.user_id != session.user_id => Err(AppError::NotFound("Goods")),
            Role::Vendor => {
                self.ensure_branch_operator(session, goods.branch_id).await?;
                Ok(goods)
            }
            _ => Ok(goods),
        }
    }

    /// Marks a deposit as collected. Only the operating vendor or staff may do it.
    pub async fn settle(&self, session: &Session, id: Uuid) -> Result<Goods, AppError> {
        let goods = self
            .goods_repo
            .find_goods(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("Goods"))?;

        if !session.role.is_staff() {
            if session.role != Role::Vendor {
                return Err(AppError::Forbidden);
            }
            self.ensure_branch_operator(session, goods.branch_id).await?;
        }

        self.goods_repo.settle_goods(id).await?.ok_or_else(|| AppError::InvalidStatusTransition {
            from: "settled".into(),
            to: "settled".into(),
        })
    }

    async fn ensure_branch_operator(&self, session: &Session, branch_id: Uuid) -> Result<(), AppError> {
        let owner = self.vendor_repo.branch_owner(&self.pool, branch_id).await?;
        if owner != Some(session.user_id) {
            return Err(AppError::Forbidden);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_requires_a_bank() {
        assert!(matches!(
            normalize_bank(PaymentMethod::Transfer, None),
            Err(AppError::BankRequired)
        ));
        assert!(matches!(
            normalize_bank(PaymentMethod::Transfer, Some("   ".into())),
            Err(AppError::BankRequired)
        ));
        assert_eq!(
            normalize_bank(PaymentMethod::Transfer, Some(" BCA ".into())).unwrap(),
            Some("BCA".to_string())
        );
    }

    #[test]
    fn other_methods_accept_no_bank() {
        assert_eq!(normalize_bank(PaymentMethod::Cash, None).unwrap(), None);
        assert_eq!(normalize_bank(PaymentMethod::Qris, Some(String::new())).unwrap(), None);
        assert_eq!(
            normalize_bank(PaymentMethod::Qris, Some("Mandiri".into())).unwrap(),
            Some("Mandiri".to_string())
        );
    }
}
