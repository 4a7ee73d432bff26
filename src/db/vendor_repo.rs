// src/db/vendor_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::{map_delete_error, map_write_error}, error::AppError},
    models::vendor::{Branch, BranchStatus, NewBranch, NewVendor, Vendor, VendorChanges, VendorStatus},
};

const VENDOR_COLUMNS: &str = "id, owner_id, company_name, address, phone, email, status, tier, \
                              verified_at, suspended_at, created_at, updated_at";
const BRANCH_COLUMNS: &str = "id, vendor_id, name, address, phone, latitude, longitude, status, created_at";

// Vendors (mitra) and their branches
#[derive(Clone)]
pub struct VendorRepository {
    pool: PgPool,
}

impl VendorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  VENDORS
    // =========================================================================

    pub async fn create_vendor<'e, E>(&self, executor: E, vendor: &NewVendor) -> Result<Vendor, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Vendor>(&format!(
            r#"
            INSERT INTO vendors (owner_id, company_name, address, phone, email, tier)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {VENDOR_COLUMNS}
            "#
        ))
        .bind(vendor.owner_id)
        .bind(&vendor.company_name)
        .bind(&vendor.address)
        .bind(&vendor.phone)
        .bind(&vendor.email)
        .bind(vendor.tier)
        .fetch_one(executor)
        .await
        .map_err(map_write_error)
    }

    pub async fn find_vendor<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Vendor>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let vendor = sqlx::query_as::<_, Vendor>(&format!("SELECT {VENDOR_COLUMNS} FROM vendors WHERE id = $1"))
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(vendor)
    }

    // Row lock so concurrent branch registrations see each other's count
    pub async fn find_vendor_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Vendor>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let vendor = sqlx::query_as::<_, Vendor>(&format!(
            "SELECT {VENDOR_COLUMNS} FROM vendors WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(vendor)
    }

    pub async fn list_vendors(&self) -> Result<Vec<Vendor>, AppError> {
        let vendors = sqlx::query_as::<_, Vendor>(&format!(
            "SELECT {VENDOR_COLUMNS} FROM vendors ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(vendors)
    }

    pub async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Vendor>, AppError> {
        let vendors = sqlx::query_as::<_, Vendor>(&format!(
            "SELECT {VENDOR_COLUMNS} FROM vendors WHERE owner_id = $1 ORDER BY created_at DESC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(vendors)
    }

    pub async fn update_vendor(&self, id: Uuid, changes: &VendorChanges) -> Result<Option<Vendor>, AppError> {
        sqlx::query_as::<_, Vendor>(&format!(
            r#"
            UPDATE vendors SET
                company_name = COALESCE($2, company_name),
                address = COALESCE($3, address),
                phone = COALESCE($4, phone),
                email = COALESCE($5, email),
                tier = COALESCE($6, tier),
                updated_at = now()
            WHERE id = $1
            RETURNING {VENDOR_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.company_name.as_deref())
        .bind(changes.address.as_deref())
        .bind(changes.phone.as_deref())
        .bind(changes.email.as_deref())
        .bind(changes.tier)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)
    }

    /// Only updates when the row is still in `expected`, so two moderators
    /// racing on the same vendor cannot both win.
    pub async fn set_status(
        &self,
        id: Uuid,
        expected: VendorStatus,
        next: VendorStatus,
    ) -> Result<Option<Vendor>, AppError> {
        let vendor = sqlx::query_as::<_, Vendor>(&format!(
            r#"
            UPDATE vendors SET
                status = $3,
                verified_at = CASE WHEN $2 = 'pending'::vendor_status AND $3 = 'active'::vendor_status
                                   THEN now() ELSE verified_at END,
                suspended_at = CASE WHEN $3 = 'suspended'::vendor_status THEN now()
                                    WHEN $3 = 'active'::vendor_status THEN NULL
                                    ELSE suspended_at END,
                updated_at = now()
            WHERE id = $1 AND status = $2
            RETURNING {VENDOR_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(expected)
        .bind(next)
        .fetch_optional(&self.pool)
        .await?;
        Ok(vendor)
    }

    pub async fn delete_vendor(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM vendors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_delete_error(e, "Vendor"))?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  BRANCHES
    // =========================================================================

    pub async fn create_branch<'e, E>(&self, executor: E, vendor_id: Uuid, branch: &NewBranch) -> Result<Branch, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Branch>(&format!(
            r#"
            INSERT INTO branches (vendor_id, name, address, phone, latitude, longitude)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {BRANCH_COLUMNS}
            "#
        ))
        .bind(vendor_id)
        .bind(&branch.name)
        .bind(&branch.address)
        .bind(&branch.phone)
        .bind(branch.latitude)
        .bind(branch.longitude)
        .fetch_one(executor)
        .await
        .map_err(map_write_error)
    }

    // Rejected branches do not count against the tier limit
    pub async fn count_open_branches<'e, E>(&self, executor: E, vendor_id: Uuid) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM branches WHERE vendor_id = $1 AND status <> 'rejected'",
        )
        .bind(vendor_id)
        .fetch_one(executor)
        .await?;
        Ok(count)
    }

    pub async fn list_branches(&self, vendor_id: Uuid) -> Result<Vec<Branch>, AppError> {
        let branches = sqlx::query_as::<_, Branch>(&format!(
            "SELECT {BRANCH_COLUMNS} FROM branches WHERE vendor_id = $1 ORDER BY created_at ASC"
        ))
        .bind(vendor_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(branches)
    }

    // Branches customers may deposit at: verified, owned by an active vendor
    pub async fn list_active_branches(&self) -> Result<Vec<Branch>, AppError> {
        let branches = sqlx::query_as::<_, Branch>(
            r#"
            SELECT b.id, b.vendor_id, b.name, b.address, b.phone, b.latitude, b.longitude, b.status, b.created_at
            FROM branches b
            JOIN vendors v ON v.id = b.vendor_id
            WHERE b.status = 'active' AND v.status = 'active'
            ORDER BY b.name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(branches)
    }

    pub async fn find_branch<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Branch>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let branch = sqlx::query_as::<_, Branch>(&format!("SELECT {BRANCH_COLUMNS} FROM branches WHERE id = $1"))
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(branch)
    }

    pub async fn set_branch_status(
        &self,
        id: Uuid,
        expected: BranchStatus,
        next: BranchStatus,
    ) -> Result<Option<Branch>, AppError> {
        let branch = sqlx::query_as::<_, Branch>(&format!(
            "UPDATE branches SET status = $3 WHERE id = $1 AND status = $2 RETURNING {BRANCH_COLUMNS}"
        ))
        .bind(id)
        .bind(expected)
        .bind(next)
        .fetch_optional(&self.pool)
        .await?;
        Ok(branch)
    }

    // Owner of the vendor operating a branch, if any
    pub async fn branch_owner<'e, E>(&self, executor: E, branch_id: Uuid) -> Result<Option<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let owner = sqlx::query_scalar::<_, Option<Uuid>>(
            "SELECT v.owner_id FROM branches b JOIN vendors v ON v.id = b.vendor_id WHERE b.id = $1",
        )
        .bind(branch_id)
        .fetch_optional(executor)
        .await?;
        Ok(owner.flatten())
    }
}
