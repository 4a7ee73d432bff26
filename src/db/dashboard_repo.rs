// src/db/dashboard_repo.rs

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::dashboard::{DailyCount, InvoiceStatusSum, RankedEntry, VendorStatusCount},
};

// Read-only aggregate queries. Each one stands alone so the service can run
// them concurrently on the pool. Windows are half-open: [from, to).
#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // 1. Goods created inside the window
    pub async fn count_goods_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM goods WHERE created_at >= $1 AND created_at < $2",
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    // 2. Revenue (SUM of BIGINT is NUMERIC in Postgres, hence the cast)
    pub async fn sum_goods_revenue_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COALESCE(SUM(total_price), 0)::BIGINT
            FROM goods
            WHERE created_at >= $1 AND created_at < $2
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    // 3. Invoice amounts per status, one row per status present
    pub async fn invoice_sums_by_status(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<InvoiceStatusSum>, AppError> {
        let rows = sqlx::query_as::<_, InvoiceStatusSum>(
            r#"
            SELECT status, COALESCE(SUM(amount), 0)::BIGINT AS total
            FROM invoices
            WHERE created_at >= $1 AND created_at < $2
            GROUP BY status
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // 4. Goods per local calendar day; days without goods are absent
    pub async fn daily_goods_counts(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        offset_secs: i32,
    ) -> Result<Vec<DailyCount>, AppError> {
        let rows = sqlx::query_as::<_, DailyCount>(
            r#"
            SELECT ((created_at AT TIME ZONE 'UTC') + ($3::int * INTERVAL '1 second'))::date AS day,
                   COUNT(*) AS count
            FROM goods
            WHERE created_at >= $1 AND created_at < $2
            GROUP BY 1
            ORDER BY 1 ASC
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(offset_secs)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // 5. Vendors per status
    pub async fn vendor_status_counts(&self) -> Result<Vec<VendorStatusCount>, AppError> {
        let rows = sqlx::query_as::<_, VendorStatusCount>(
            "SELECT status, COUNT(*) AS count FROM vendors GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // 6. Branch totals: all branches, and those registered since `since`
    pub async fn branch_counts(&self, since: DateTime<Utc>) -> Result<(i64, i64), AppError> {
        let counts = sqlx::query_as::<_, (i64, i64)>(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE created_at >= $1) FROM branches",
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(counts)
    }

    // 7. Rankings: most goods first, ties in creation order
    pub async fn popular_categories(&self, limit: i64) -> Result<Vec<RankedEntry>, AppError> {
        let rows = sqlx::query_as::<_, RankedEntry>(
            r#"
            SELECT c.id, c.title AS name, COUNT(g.id) AS count
            FROM categories c
            LEFT JOIN goods g ON g.category_id = c.id
            GROUP BY c.id, c.title, c.created_at
            ORDER BY count DESC, c.created_at ASC, c.id ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn popular_branches(&self, limit: i64) -> Result<Vec<RankedEntry>, AppError> {
        let rows = sqlx::query_as::<_, RankedEntry>(
            r#"
            SELECT b.id, b.name, COUNT(g.id) AS count
            FROM branches b
            LEFT JOIN goods g ON g.branch_id = b.id
            GROUP BY b.id, b.name, b.created_at
            ORDER BY count DESC, b.created_at ASC, b.id ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
