// src/services/user_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Role, User, UserStatus},
    services::auth::hash_password,
};

#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
}

impl UserService {
    pub fn new(user_repo: UserRepository) -> Self {
        Self { user_repo }
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.user_repo.list_users().await
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User, AppError> {
        self.user_repo.find_by_id(id).await?.ok_or(AppError::NotFound("User"))
    }

    pub async fn create_user(&self, email: &str, password: &str, name: &str, role: Role) -> Result<User, AppError> {
        let hashed_password = hash_password(password).await?;
        let user = self
            .user_repo
            .create_user(self.user_repo.pool(), email, name, &hashed_password, role)
            .await?;

        tracing::info!(user_id = %user.id, role = ?user.role, "user created by staff");
        Ok(user)
    }

    pub async fn update_user(
        &self,
        acting_user: Uuid,
        id: Uuid,
        name: Option<&str>,
        role: Option<Role>,
        status: Option<UserStatus>,
    ) -> Result<User, AppError> {
        // A superadmin cannot lock themselves out
        if acting_user == id && (status == Some(UserStatus::Suspended) || role.is_some_and(|r| r != Role::Superadmin)) {
            return Err(AppError::Forbidden);
        }

        self.user_repo
            .update_user(id, name, role, status)
            .await?
            .ok_or(AppError::NotFound("User"))
    }

    pub async fn delete_user(&self, acting_user: Uuid, id: Uuid) -> Result<(), AppError> {
        if acting_user == id {
            return Err(AppError::Forbidden);
        }

        if !self.user_repo.delete_user(id).await? {
            return Err(AppError::NotFound("User"));
        }
        Ok(())
    }
}
