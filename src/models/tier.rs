// src/models/tier.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "tier_name", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TierName {
    #[default]
    Bronze,
    Silver,
    Gold,
}

// Static reference data, seeded by the first migration
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TierPlan {
    pub id: Uuid,
    pub name: TierName,
    #[schema(example = 3)]
    pub max_branches: i32,
    #[schema(example = 250000)]
    pub monthly_price: i64,
    pub features: Vec<String>,
    pub updated_at: DateTime<Utc>,
}
