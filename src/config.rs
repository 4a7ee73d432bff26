// src/config.rs

use std::{env, sync::Arc, time::Duration};

use chrono::{FixedOffset, TimeDelta};
use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;

use crate::{
    common::i18n::I18nStore,
    db::{
        DashboardRepository, GoodsRepository, IdempotencyRepository, InvoiceRepository,
        TierRepository, UserRepository, VendorRepository,
    },
    services::{
        auth::AuthService, dashboard_service::DashboardService, goods_service::GoodsService,
        invoice_service::InvoiceService, pricing::DayCountPolicy, tier_service::TierService,
        user_service::UserService, vendor_service::VendorService,
    },
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

// ---
// Config: everything read from the environment (.env included)
// ---
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub jwt_ttl: TimeDelta,
    // Offset that defines "today" and "this month" for reports and calendar billing
    pub report_offset: FixedOffset,
    pub day_policy: DayCountPolicy,
    pub duplicate_window: TimeDelta,
    pub popular_limit: i64,
    pub cors_allow_origin: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::Missing(name));

        let parsed = |name: &'static str, default: i64| -> Result<i64, ConfigError> {
            match lookup(name) {
                Some(value) => value
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| ConfigError::Invalid { name, value }),
                None => Ok(default),
            }
        };

        let positive = |name: &'static str, default: i64| -> Result<i64, ConfigError> {
            let value = parsed(name, default)?;
            if value <= 0 {
                return Err(ConfigError::Invalid { name, value: value.to_string() });
            }
            Ok(value)
        };

        let offset_hours = parsed("REPORT_UTC_OFFSET_HOURS", 7)?;
        let report_offset = i32::try_from(offset_hours * 3600)
            .ok()
            .and_then(FixedOffset::east_opt)
            .ok_or(ConfigError::Invalid {
                name: "REPORT_UTC_OFFSET_HOURS",
                value: offset_hours.to_string(),
            })?;

        let day_policy = match lookup("BILLING_DAY_POLICY") {
            Some(value) => value
                .parse::<DayCountPolicy>()
                .map_err(|_| ConfigError::Invalid { name: "BILLING_DAY_POLICY", value })?,
            None => DayCountPolicy::default(),
        };

        let db_max_connections = u32::try_from(positive("DB_MAX_CONNECTIONS", 5)?).map_err(|_| {
            ConfigError::Invalid { name: "DB_MAX_CONNECTIONS", value: "out of range".into() }
        })?;

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            db_max_connections,
            jwt_ttl: TimeDelta::minutes(positive("JWT_TTL_MINUTES", 60)?),
            report_offset,
            day_policy,
            duplicate_window: TimeDelta::seconds(parsed("DUPLICATE_WINDOW_SECS", 10)?.max(0)),
            popular_limit: positive("POPULAR_LIMIT", 5)?,
            cors_allow_origin: lookup("CORS_ALLOW_ORIGIN"),
        })
    }
}

// ---
// AppState: shared by every request
// ---
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub i18n_store: &'static I18nStore,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub vendor_service: VendorService,
    pub goods_service: GoodsService,
    pub invoice_service: InvoiceService,
    pub tier_service: TierService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Database connection established");

        Ok(Self::from_parts(db_pool, config))
    }

    // Wires the dependency graph on top of an existing pool
    pub fn from_parts(db_pool: PgPool, config: Config) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let vendor_repo = VendorRepository::new(db_pool.clone());
        let goods_repo = GoodsRepository::new(db_pool.clone());
        let invoice_repo = InvoiceRepository::new(db_pool.clone());
        let tier_repo = TierRepository::new(db_pool.clone());
        let idempotency_repo = IdempotencyRepository::new();
        let dashboard_repo = DashboardRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo.clone(), config.jwt_secret.clone(), config.jwt_ttl);
        let user_service = UserService::new(user_repo);
        let vendor_service = VendorService::new(
            vendor_repo.clone(),
            tier_repo.clone(),
            idempotency_repo.clone(),
            db_pool.clone(),
        );
        let goods_service = GoodsService::new(
            goods_repo,
            vendor_repo.clone(),
            idempotency_repo.clone(),
            db_pool.clone(),
            config.day_policy,
            config.report_offset,
            config.duplicate_window,
        );
        let invoice_service = InvoiceService::new(
            invoice_repo,
            vendor_repo,
            idempotency_repo,
            db_pool.clone(),
            config.report_offset,
        );
        let tier_service = TierService::new(tier_repo);
        let dashboard_service = DashboardService::new(dashboard_repo, config.report_offset, config.popular_limit);

        Self {
            db_pool,
            config: Arc::new(config),
            i18n_store: I18nStore::global(),
            auth_service,
            user_service,
            vendor_service,
            goods_service,
            invoice_service,
            tier_service,
            dashboard_service,
        }
    }
}
