// src/services/tier_service.rs

use uuid::Uuid;

use crate::{common::error::AppError, db::TierRepository, models::tier::TierPlan};

#[derive(Clone)]
pub struct TierService {
    tier_repo: TierRepository,
}

impl TierService {
    pub fn new(tier_repo: TierRepository) -> Self {
        Self { tier_repo }
    }

    pub async fn list_tiers(&self) -> Result<Vec<TierPlan>, AppError> {
        self.tier_repo.list_tiers().await
    }

    // Lowering max_branches never removes existing branches; it only blocks new ones.
    pub async fn update_tier(
        &self,
        id: Uuid,
        max_branches: Option<i32>,
        monthly_price: Option<i64>,
        features: Option<Vec<String>>,
    ) -> Result<TierPlan, AppError> {
        self.tier_repo
            .update_tier(id, max_branches, monthly_price, features)
            .await?
            .ok_or(AppError::NotFound("Tier"))
    }
}
