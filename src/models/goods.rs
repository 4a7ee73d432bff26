// src/models/goods.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// ---
// 1. Category (pricing per day)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    #[schema(example = "Koper")]
    pub title: String,
    // Minor units per day; 0 marks a free category
    #[schema(example = 5000)]
    pub daily_rate: i64,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// 2. Goods (Titipan)
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_method", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Transfer,
    Qris,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "goods_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum GoodsStatus {
    Active,
    Settled,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Goods {
    pub id: Uuid,
    pub branch_id: Uuid,
    pub category_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub quantity: i64,
    pub date_in: DateTime<Utc>,
    pub date_out: DateTime<Utc>,
    pub day_total: i64,
    pub payment_method: PaymentMethod,
    pub bank: Option<String>,
    // Rate snapshot taken when the deposit was priced
    pub daily_rate: i64,
    pub total_price: i64,
    pub status: GoodsStatus,
    pub settled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// Deposit request after payload validation
#[derive(Debug, Clone)]
pub struct NewDeposit {
    pub branch_id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub quantity: i64,
    pub date_in: DateTime<Utc>,
    pub date_out: DateTime<Utc>,
    pub payment_method: PaymentMethod,
    pub bank: Option<String>,
}

// Values computed by the pricing calculator and stored with the deposit
#[derive(Debug, Clone, Copy)]
pub struct PricedDeposit {
    pub daily_rate: i64,
    pub day_total: i64,
    pub total_price: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    #[schema(example = 3)]
    pub day_total: i64,
    #[schema(example = 30000)]
    pub total_price: i64,
}
