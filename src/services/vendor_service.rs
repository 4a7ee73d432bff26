// src/services/vendor_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{IdempotencyRepository, IdempotencyScope, TierRepository, VendorRepository},
    models::{
        auth::{Role, Session},
        tier::TierName,
        vendor::{Branch, BranchStatus, NewBranch, NewVendor, Vendor, VendorChanges, VendorStatus},
    },
    services::CreateOutcome,
};

/// Staff manage every vendor; a vendor user only the ones they own.
pub fn ensure_vendor_access(session: &Session, vendor: &Vendor) -> Result<(), AppError> {
    if session.role.is_staff() {
        return Ok(());
    }
    if session.role == Role::Vendor && vendor.owner_id == Some(session.user_id) {
        return Ok(());
    }
    Err(AppError::Forbidden)
}

/// Finance reads every vendor it bills but changes none of them.
pub fn ensure_vendor_read_access(session: &Session, vendor: &Vendor) -> Result<(), AppError> {
    if session.role == Role::Finance {
        return Ok(());
    }
    ensure_vendor_access(session, vendor)
}

fn status_label<T: std::fmt::Debug>(status: T) -> String {
    format!("{:?}", status).to_lowercase()
}

#[derive(Clone)]
pub struct VendorService {
    vendor_repo: VendorRepository,
    tier_repo: TierRepository,
    idempotency_repo: IdempotencyRepository,
    pool: PgPool,
}

impl VendorService {
    pub fn new(
        vendor_repo: VendorRepository,
        tier_repo: TierRepository,
        idempotency_repo: IdempotencyRepository,
        pool: PgPool,
    ) -> Self {
        Self { vendor_repo, tier_repo, idempotency_repo, pool }
    }

    // =========================================================================
    //  VENDORS
    // =========================================================================

    pub async fn create_vendor(
        &self,
        session: &Session,
        mut vendor: NewVendor,
        idempotency_key: Option<&str>,
    ) -> Result<CreateOutcome<Vendor>, AppError> {
        // A vendor user registering a company becomes its owner
        if session.role == Role::Vendor {
            vendor.owner_id = Some(session.user_id);
        }
        // Paid tiers are granted by staff, never self-selected
        if !session.role.is_staff() && vendor.tier != TierName::default() {
            return Err(AppError::Forbidden);
        }

        let mut tx = self.pool.begin().await?;

        if let Some(key) = idempotency_key {
            let seen = self
                .idempotency_repo
                .find_resource(&mut *tx, IdempotencyScope::Vendor, session.user_id, key)
                .await?;
            if let Some(vendor_id) = seen {
                let existing = self
                    .vendor_repo
                    .find_vendor(&mut *tx, vendor_id)
                    .await?
                    .ok_or(AppError::NotFound("Vendor"))?;
                return Ok(CreateOutcome::Replayed(existing));
            }
        }

        let created = self.vendor_repo.create_vendor(&mut *tx, &vendor).await?;

        if let Some(key) = idempotency_key {
            self.idempotency_repo
                .record(&mut *tx, IdempotencyScope::Vendor, session.user_id, key, created.id)
                .await?;
        }

        tx.commit().await?;

        tracing::info!(vendor_id = %created.id, "vendor registered");
        Ok(CreateOutcome::Created(created))
    }

    pub async fn list_vendors(&self, session: &Session) -> Result<Vec<Vendor>, AppError> {
        if session.role.is_staff() || session.role == Role::Finance {
            self.vendor_repo.list_vendors().await
        } else {
            self.vendor_repo.list_by_owner(session.user_id).await
        }
    }

    async fn find_vendor(&self, id: Uuid) -> Result<Vendor, AppError> {
        self.vendor_repo
            .find_vendor(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("Vendor"))
    }

    pub async fn get_vendor(&self, session: &Session, id: Uuid) -> Result<Vendor, AppError> {
        let vendor = self.find_vendor(id).await?;
        ensure_vendor_read_access(session, &vendor)?;
        Ok(vendor)
    }

    pub async fn update_vendor(&self, session: &Session, id: Uuid, changes: VendorChanges) -> Result<Vendor, AppError> {
        let vendor = self.find_vendor(id).await?;
        ensure_vendor_access(session, &vendor)?;

        // Owners edit their profile; the subscription tier is a staff decision
        if !session.role.is_staff() && changes.tier.is_some() {
            return Err(AppError::Forbidden);
        }

        self.vendor_repo
            .update_vendor(id, &changes)
            .await?
            .ok_or(AppError::NotFound("Vendor"))
    }

    pub async fn delete_vendor(&self, id: Uuid) -> Result<(), AppError> {
        if !self.vendor_repo.delete_vendor(id).await? {
            return Err(AppError::NotFound("Vendor"));
        }
        Ok(())
    }

    pub async fn change_status(&self, id: Uuid, next: VendorStatus) -> Result<Vendor, AppError> {
        let current = self.find_vendor(id).await?;

        let rejected = || AppError::InvalidStatusTransition {
            from: status_label(current.status),
            to: status_label(next),
        };

        if !current.status.can_transition_to(next) {
            return Err(rejected());
        }

        // None means another moderator changed the status in between
        let updated = self
            .vendor_repo
            .set_status(id, current.status, next)
            .await?
            .ok_or_else(rejected)?;

        tracing::info!(vendor_id = %id, from = ?current.status, to = ?next, "vendor status changed");
        Ok(updated)
    }

    // =========================================================================
    //  BRANCHES
    // =========================================================================

    /// Registers a branch, bounded by the vendor tier's branch allowance.
    /// The vendor row stays locked until commit so two concurrent requests
    /// cannot both take the last slot.
    pub async fn create_branch(&self, session: &Session, vendor_id: Uuid, branch: NewBranch) -> Result<Branch, AppError> {
        let mut tx = self.pool.begin().await?;

        let vendor = self
            .vendor_repo
            .find_vendor_for_update(&mut *tx, vendor_id)
            .await?
            .ok_or(AppError::NotFound("Vendor"))?;
        ensure_vendor_access(session, &vendor)?;

        let tier = self
            .tier_repo
            .find_by_name(&mut *tx, vendor.tier)
            .await?
            .ok_or(AppError::NotFound("Tier"))?;

        let open_branches = self.vendor_repo.count_open_branches(&mut *tx, vendor_id).await?;
        if open_branches >= i64::from(tier.max_branches) {
            return Err(AppError::TierLimitReached(tier.max_branches));
        }

        let created = self.vendor_repo.create_branch(&mut *tx, vendor_id, &branch).await?;
        tx.commit().await?;

        tracing::info!(vendor_id = %vendor_id, branch_id = %created.id, "branch registered");
        Ok(created)
    }

    pub async fn list_branches(&self, session: &Session, vendor_id: Uuid) -> Result<Vec<Branch>, AppError> {
        let vendor = self.find_vendor(vendor_id).await?;
        ensure_vendor_access(session, &vendor)?;
        self.vendor_repo.list_branches(vendor_id).await
    }

    pub async fn list_active_branches(&self) -> Result<Vec<Branch>, AppError> {
        self.vendor_repo.list_active_branches().await
    }

    pub async fn change_branch_status(&self, id: Uuid, next: BranchStatus) -> Result<Branch, AppError> {
        let current = self
            .vendor_repo
            .find_branch(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("Branch"))?;

        let rejected = || AppError::InvalidStatusTransition {
            from: status_label(current.status),
            to: status_label(next),
        };

        if !current.status.can_transition_to(next) {
            return Err(rejected());
        }

        self.vendor_repo
            .set_branch_status(id, current.status, next)
            .await?
            .ok_or_else(rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn vendor_owned_by(owner: Option<Uuid>) -> Vendor {
        Vendor {
            id: Uuid::new_v4(),
            owner_id: owner,
            company_name: "PT Titip Aman".into(),
            address: "Jl. Sudirman 1".into(),
            phone: "0811".into(),
            email: "mitra@titipsini.test".into(),
            status: VendorStatus::Active,
            tier: TierName::Bronze,
            verified_at: None,
            suspended_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn session(role: Role) -> Session {
        Session { user_id: Uuid::new_v4(), role }
    }

    #[test]
    fn staff_reach_every_vendor() {
        let vendor = vendor_owned_by(Some(Uuid::new_v4()));
        assert!(ensure_vendor_access(&session(Role::Superadmin), &vendor).is_ok());
        assert!(ensure_vendor_access(&session(Role::Admin), &vendor).is_ok());
    }

    #[test]
    fn vendor_users_only_reach_their_own() {
        let owner = session(Role::Vendor);
        let mine = vendor_owned_by(Some(owner.user_id));
        let theirs = vendor_owned_by(Some(Uuid::new_v4()));
        let unowned = vendor_owned_by(None);

        assert!(ensure_vendor_access(&owner, &mine).is_ok());
        assert!(matches!(ensure_vendor_access(&owner, &theirs), Err(AppError::Forbidden)));
        assert!(matches!(ensure_vendor_access(&owner, &unowned), Err(AppError::Forbidden)));
    }

    #[test]
    fn customers_and_finance_are_not_vendor_operators() {
        let customer = session(Role::Customer);
        let vendor = vendor_owned_by(Some(customer.user_id));
        assert!(ensure_vendor_access(&customer, &vendor).is_err());
        assert!(ensure_vendor_access(&session(Role::Finance), &vendor).is_err());
    }

    #[test]
    fn finance_reads_any_vendor() {
        let vendor = vendor_owned_by(Some(Uuid::new_v4()));
        assert!(ensure_vendor_read_access(&session(Role::Finance), &vendor).is_ok());
        assert!(ensure_vendor_read_access(&session(Role::Admin), &vendor).is_ok());
        assert!(matches!(
            ensure_vendor_read_access(&session(Role::Vendor), &vendor),
            Err(AppError::Forbidden)
        ));
        assert!(ensure_vendor_read_access(&session(Role::Customer), &vendor).is_err());
    }

    #[test]
    fn status_labels_match_wire_names() {
        assert_eq!(status_label(VendorStatus::Suspended), "suspended");
        assert_eq!(status_label(BranchStatus::Rejected), "rejected");
    }
}
