// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, Role, User, UserStatus},
};

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

// Hashing is CPU-bound, so it runs on the blocking pool
pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("hashing task failed: {}", e))??;
    Ok(hashed)
}

async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password = password.to_owned();
    let password_hash = password_hash.to_owned();
    let valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
        .await
        .map_err(|e| anyhow::anyhow!("password verification task failed: {}", e))??;
    Ok(valid)
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: TimeDelta,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String, ttl: TimeDelta) -> Self {
        Self {
            user_repo,
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            ttl,
        }
    }

    /// Self-registration. Always creates a customer account.
    pub async fn register_user(&self, email: &str, password: &str, name: &str) -> Result<(User, IssuedToken), AppError> {
        let hashed_password = hash_password(password).await?;

        let user = self
            .user_repo
            .create_user(self.user_repo.pool(), email, name, &hashed_password, Role::Customer)
            .await?;

        tracing::info!(user_id = %user.id, "new customer registered");

        let token = self.issue_token(user.id, user.role, Utc::now())?;
        Ok((user, token))
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<(User, IssuedToken), AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        if user.status == UserStatus::Suspended {
            return Err(AppError::AccountSuspended);
        }

        let token = self.issue_token(user.id, user.role, Utc::now())?;
        Ok((user, token))
    }

    /// Renews an unexpired session. Role and status are re-read so a
    /// demotion or suspension takes effect on the next renewal.
    pub async fn refresh(&self, user_id: Uuid) -> Result<(User, IssuedToken), AppError> {
        let user = self.user_repo.find_by_id(user_id).await?.ok_or(AppError::InvalidToken)?;

        if user.status == UserStatus::Suspended {
            return Err(AppError::AccountSuspended);
        }

        let token = self.issue_token(user.id, user.role, Utc::now())?;
        Ok((user, token))
    }

    pub async fn current_user(&self, user_id: Uuid) -> Result<User, AppError> {
        self.user_repo.find_by_id(user_id).await?.ok_or(AppError::NotFound("User"))
    }

    // Signature and expiry only; no database round-trip
    pub fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        let validation = Validation::new(Algorithm::HS256);
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|_| AppError::InvalidToken)?;
        Ok(token_data.claims)
    }

    pub fn issue_token(&self, user_id: Uuid, role: Role, now: DateTime<Utc>) -> Result<IssuedToken, AppError> {
        let expires_at = now + self.ttl;

        let claims = Claims {
            sub: user_id,
            role,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(IssuedToken { token, expires_at })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    // The repository is never touched by token logic; a lazy pool suffices.
    fn service(ttl: TimeDelta) -> AuthService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/titipsini_unused")
            .expect("lazy pool");
        AuthService::new(UserRepository::new(pool), "test-secret".into(), ttl)
    }

    #[tokio::test]
    async fn issued_token_carries_identity_and_role() {
        let auth = service(TimeDelta::minutes(30));
        let user_id = Uuid::new_v4();

        let issued = auth.issue_token(user_id, Role::Finance, Utc::now()).unwrap();
        let claims = auth.validate_token(&issued.token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, Role::Finance);
        assert_eq!(claims.exp as i64, issued.expires_at.timestamp());
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let auth = service(TimeDelta::minutes(30));
        let two_hours_ago = Utc::now() - TimeDelta::hours(2);

        let issued = auth.issue_token(Uuid::new_v4(), Role::Admin, two_hours_ago).unwrap();

        assert!(matches!(auth.validate_token(&issued.token), Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn token_signed_with_another_secret_is_rejected() {
        let auth = service(TimeDelta::minutes(30));
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/titipsini_unused")
            .expect("lazy pool");
        let other = AuthService::new(UserRepository::new(pool), "other-secret".into(), TimeDelta::minutes(30));

        let issued = other.issue_token(Uuid::new_v4(), Role::Superadmin, Utc::now()).unwrap();

        assert!(matches!(auth.validate_token(&issued.token), Err(AppError::InvalidToken)));
        assert!(matches!(auth.validate_token("not-a-jwt"), Err(AppError::InvalidToken)));
    }
}
