// src/db/goods_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::{map_delete_error, map_write_error}, error::AppError},
    models::goods::{Category, Goods, NewDeposit, PricedDeposit},
};

const CATEGORY_COLUMNS: &str = "id, title, daily_rate, description, created_at, updated_at";
const GOODS_COLUMNS: &str = "id, branch_id, category_id, user_id, name, quantity, date_in, date_out, \
                             day_total, payment_method, bank, daily_rate, total_price, status, \
                             settled_at, created_at";

// Pricing categories and deposited goods
#[derive(Clone)]
pub struct GoodsRepository {
    pool: PgPool,
}

impl GoodsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CATEGORIES
    // =========================================================================

    pub async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        let categories = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY created_at ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    pub async fn find_category<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Category>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let category = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(category)
    }

    pub async fn create_category(&self, title: &str, daily_rate: i64, description: &str) -> Result<Category, AppError> {
        sqlx::query_as::<_, Category>(&format!(
            r#"
            INSERT INTO categories (title, daily_rate, description)
            VALUES ($1, $2, $3)
            RETURNING {CATEGORY_COLUMNS}
            "#
        ))
        .bind(title)
        .bind(daily_rate)
        .bind(description)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    // Existing deposits keep their rate snapshot; only new quotes see the change
    pub async fn update_category(
        &self,
        id: Uuid,
        title: Option<&str>,
        daily_rate: Option<i64>,
        description: Option<&str>,
    ) -> Result<Option<Category>, AppError> {
        sqlx::query_as::<_, Category>(&format!(
            r#"
            UPDATE categories SET
                title = COALESCE($2, title),
                daily_rate = COALESCE($3, daily_rate),
                description = COALESCE($4, description),
                updated_at = now()
            WHERE id = $1
            RETURNING {CATEGORY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(title)
        .bind(daily_rate)
        .bind(description)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)
    }

    pub async fn delete_category(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_delete_error(e, "Category"))?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  GOODS (TITIPAN)
    // =========================================================================

    pub async fn create_goods<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        deposit: &NewDeposit,
        priced: &PricedDeposit,
    ) -> Result<Goods, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Goods>(&format!(
            r#"
            INSERT INTO goods (
                branch_id, category_id, user_id, name, quantity,
                date_in, date_out, day_total, payment_method, bank,
                daily_rate, total_price
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {GOODS_COLUMNS}
            "#
        ))
        .bind(deposit.branch_id)
        .bind(deposit.category_id)
        .bind(user_id)
        .bind(&deposit.name)
        .bind(deposit.quantity)
        .bind(deposit.date_in)
        .bind(deposit.date_out)
        .bind(priced.day_total)
        .bind(deposit.payment_method)
        .bind(deposit.bank.as_deref())
        .bind(priced.daily_rate)
        .bind(priced.total_price)
        .fetch_one(executor)
        .await
        .map_err(map_write_error)
    }

    pub async fn find_goods<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Goods>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let goods = sqlx::query_as::<_, Goods>(&format!("SELECT {GOODS_COLUMNS} FROM goods WHERE id = $1"))
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(goods)
    }

    /// An identical deposit by the same user created at or after `since`.
    pub async fn find_recent_duplicate<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        deposit: &NewDeposit,
        since: DateTime<Utc>,
    ) -> Result<Option<Goods>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let goods = sqlx::query_as::<_, Goods>(&format!(
            r#"
            SELECT {GOODS_COLUMNS} FROM goods
            WHERE user_id = $1 AND branch_id = $2 AND category_id = $3
              AND name = $4 AND quantity = $5 AND date_in = $6 AND date_out = $7
              AND created_at >= $8
            ORDER BY created_at DESC
            LIMIT 1
            "#
        ))
        .bind(user_id)
        .bind(deposit.branch_id)
        .bind(deposit.category_id)
        .bind(&deposit.name)
        .bind(deposit.quantity)
        .bind(deposit.date_in)
        .bind(deposit.date_out)
        .bind(since)
        .fetch_optional(executor)
        .await?;
        Ok(goods)
    }

    pub async fn list_all(&self) -> Result<Vec<Goods>, AppError> {
        let goods = sqlx::query_as::<_, Goods>(&format!(
            "SELECT {GOODS_COLUMNS} FROM goods ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(goods)
    }

    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Goods>, AppError> {
        let goods = sqlx::query_as::<_, Goods>(&format!(
            "SELECT {GOODS_COLUMNS} FROM goods WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(goods)
    }

    // Goods held at branches of every vendor owned by `owner_id`
    pub async fn list_by_vendor_owner(&self, owner_id: Uuid) -> Result<Vec<Goods>, AppError> {
        let goods = sqlx::query_as::<_, Goods>(
            r#"
            SELECT g.id, g.branch_id, g.category_id, g.user_id, g.name, g.quantity, g.date_in, g.date_out,
                   g.day_total, g.payment_method, g.bank, g.daily_rate, g.total_price, g.status,
                   g.settled_at, g.created_at
            FROM goods g
            JOIN branches b ON b.id = g.branch_id
            JOIN vendors v ON v.id = b.vendor_id
            WHERE v.owner_id = $1
            ORDER BY g.created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(goods)
    }

    // Only active goods settle; returns None when the row is gone or already settled
    pub async fn settle_goods(&self, id: Uuid) -> Result<Option<Goods>, AppError> {
        let goods = sqlx::query_as::<_, Goods>(&format!(
            r#"
            UPDATE goods SET status = 'settled', settled_at = now()
            WHERE id = $1 AND status = 'active'
            RETURNING {GOODS_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(goods)
    }
}
