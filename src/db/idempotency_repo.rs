// src/db/idempotency_repo.rs

use sqlx::{Executor, PgConnection, Postgres};
use uuid::Uuid;

use crate::common::{db_utils::map_write_error, error::AppError};

// Which create endpoint a key belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdempotencyScope {
    Goods,
    Vendor,
    Invoice,
}

impl IdempotencyScope {
    pub fn as_str(self) -> &'static str {
        match self {
            IdempotencyScope::Goods => "goods",
            IdempotencyScope::Vendor => "vendor",
            IdempotencyScope::Invoice => "invoice",
        }
    }
}

// Always used inside the caller's transaction, so it holds no pool.
#[derive(Clone, Default)]
pub struct IdempotencyRepository;

impl IdempotencyRepository {
    pub fn new() -> Self {
        Self
    }

    /// Looks up the resource a key already produced. Takes a transaction-scoped
    /// advisory lock on the key first: a concurrent request with the same key
    /// waits until this transaction ends, then sees the recorded resource.
    pub async fn find_resource(
        &self,
        conn: &mut PgConnection,
        scope: IdempotencyScope,
        user_id: Uuid,
        key: &str,
    ) -> Result<Option<Uuid>, AppError> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(format!("{}:{}:{}", scope.as_str(), user_id, key))
            .execute(&mut *conn)
            .await?;

        let resource_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT resource_id FROM idempotency_keys WHERE scope = $1 AND user_id = $2 AND key = $3",
        )
        .bind(scope.as_str())
        .bind(user_id)
        .bind(key)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(resource_id)
    }

    // Call after find_resource in the same transaction so the key lock is held
    pub async fn record<'e, E>(
        &self,
        executor: E,
        scope: IdempotencyScope,
        user_id: Uuid,
        key: &str,
        resource_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("INSERT INTO idempotency_keys (scope, user_id, key, resource_id) VALUES ($1, $2, $3, $4)")
            .bind(scope.as_str())
            .bind(user_id)
            .bind(key)
            .bind(resource_id)
            .execute(executor)
            .await
            .map_err(map_write_error)?;
        Ok(())
    }
}
