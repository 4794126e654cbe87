//! User service - Profile reads and updates for the signed-in user.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Password, User};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    async fn update_profile(
        &self,
        id: Uuid,
        name: Option<String>,
        profile_image_url: Option<String>,
    ) -> AppResult<User>;

    /// Replace the password after checking the current one
    async fn change_password(
        &self,
        id: Uuid,
        current_password: String,
        new_password: String,
    ) -> AppResult<()>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> UserManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.uow.users().find_by_id(id).await?.ok_or_not_found()
    }

    async fn update_profile(
        &self,
        id: Uuid,
        name: Option<String>,
        profile_image_url: Option<String>,
    ) -> AppResult<User> {
        let name = name.map(|name| name.trim().to_string());
        if name.as_deref() == Some("") {
            return Err(AppError::validation("Name cannot be empty"));
        }
        self.uow
            .users()
            .update_profile(id, name, profile_image_url)
            .await
    }

    async fn change_password(
        &self,
        id: Uuid,
        current_password: String,
        new_password: String,
    ) -> AppResult<()> {
        let user = self.get_user(id).await?;
        if !Password::verify_stored(user.password_hash.as_deref(), &current_password) {
            return Err(AppError::InvalidCredentials);
        }

        let hash = Password::new(&new_password)?.into_string();
        self.uow.users().update_password(id, hash).await?;
        tracing::info!(user_id = %id, "Password changed");
        Ok(())
    }
}
