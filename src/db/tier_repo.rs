// src/db/tier_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::tier::{TierName, TierPlan},
};

#[derive(Clone)]
pub struct TierRepository {
    pool: PgPool,
}

impl TierRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_tiers(&self) -> Result<Vec<TierPlan>, AppError> {
        let tiers = sqlx::query_as::<_, TierPlan>(
            "SELECT id, name, max_branches, monthly_price, features, updated_at FROM tier_plans ORDER BY monthly_price ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(tiers)
    }

    pub async fn find_by_name<'e, E>(&self, executor: E, name: TierName) -> Result<Option<TierPlan>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tier = sqlx::query_as::<_, TierPlan>(
            "SELECT id, name, max_branches, monthly_price, features, updated_at FROM tier_plans WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(executor)
        .await?;
        Ok(tier)
    }

    pub async fn update_tier(
        &self,
        id: Uuid,
        max_branches: Option<i32>,
        monthly_price: Option<i64>,
        features: Option<Vec<String>>,
    ) -> Result<Option<TierPlan>, AppError> {
        let tier = sqlx::query_as::<_, TierPlan>(
            r#"
            UPDATE tier_plans SET
                max_branches = COALESCE($2, max_branches),
                monthly_price = COALESCE($3, monthly_price),
                features = COALESCE($4, features),
                updated_at = now()
            WHERE id = $1
            RETURNING id, name, max_branches, monthly_price, features, updated_at
            "#,
        )
        .bind(id)
        .bind(max_branches)
        .bind(monthly_price)
        .bind(features)
        .fetch_optional(&self.pool)
        .await?;
        Ok(tier)
    }
}
