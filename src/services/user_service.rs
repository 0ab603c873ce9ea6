use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{NewUser, User, UserRole},
        dto::request::{CreateUserRequest, UpdateUserRequest},
    },
    repositories::UserRepository,
    services::id_generator::{IdGenerator, IdKind},
};

/// One-way password hashing supplied by the hosting application.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, password: &str) -> AppResult<String>;
}

pub struct UserService {
    repository: Arc<dyn UserRepository>,
    ids: Arc<dyn IdGenerator>,
    hasher: Arc<dyn CredentialHasher>,
}

impl UserService {
    pub fn new(
        repository: Arc<dyn UserRepository>,
        ids: Arc<dyn IdGenerator>,
        hasher: Arc<dyn CredentialHasher>,
    ) -> Self {
        Self {
            repository,
            ids,
            hasher,
        }
    }

    /// Registers a new account. New users start on timeline 1 with their first
    /// access still pending.
    pub async fn register(&self, request: CreateUserRequest) -> AppResult<User> {
        request.validate()?;

        if self.repository.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::AlreadyExists(format!(
                "User with email '{}' already exists",
                request.email.trim().to_lowercase()
            )));
        }

        let password_hash = self.hash_password(&request.password)?;
        let role: UserRole = request.role.parse()?;

        let user = User::new(NewUser {
            id: self.ids.generate(IdKind::from(role)),
            name: request.name,
            email: request.email,
            password_hash,
            cefr: request.cefr,
            role: request.role,
            time_spent_seconds: None,
            timeline: 1,
            first_access: true,
        })?;

        let user = self.repository.create(user).await?;
        log::info!("Registered {} '{}'", user.role().as_str(), user.id());
        Ok(user)
    }

    pub async fn get_user(&self, id: &str) -> AppResult<User> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id '{}' not found", id)))
    }

    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        self.repository.list_active().await
    }

    pub async fn update_user(&self, id: &str, request: UpdateUserRequest) -> AppResult<User> {
        request.validate()?;

        let current = self.get_user(id).await?;

        if let Some(email) = &request.email {
            let email = email.trim().to_lowercase();
            if email != current.email() && self.repository.find_by_email(&email).await?.is_some() {
                return Err(AppError::AlreadyExists(format!(
                    "Email '{}' is already in use",
                    email
                )));
            }
        }

        let mut updated = current.apply(&request.patch())?;
        if let Some(password) = &request.password {
            updated.set_password_hash(&self.hash_password(password)?)?;
        }

        let updated = self.repository.update(updated).await?;
        log::info!("Updated user '{}'", id);
        Ok(updated)
    }

    pub async fn reset_password(&self, id: &str, new_password: &str) -> AppResult<User> {
        let mut user = self.get_user(id).await?;
        user.set_password_hash(&self.hash_password(new_password)?)?;

        let user = self.repository.update(user).await?;
        log::info!("Reset password for user '{}'", id);
        Ok(user)
    }

    pub async fn add_study_time(&self, id: &str, seconds: i64) -> AppResult<User> {
        let mut user = self.get_user(id).await?;
        user.add_study_time(seconds)?;
        self.repository.update(user).await
    }

    pub async fn set_timeline(&self, id: &str, timeline: i32) -> AppResult<User> {
        let mut user = self.get_user(id).await?;
        user.set_timeline(timeline)?;
        self.repository.update(user).await
    }

    /// Returns true when this call consumed the user's first access.
    pub async fn complete_first_access(&self, id: &str) -> AppResult<bool> {
        let mut user = self.get_user(id).await?;
        if !user.complete_first_access() {
            return Ok(false);
        }

        self.repository.update(user).await?;
        log::debug!("User '{}' completed first access", id);
        Ok(true)
    }

    pub async fn delete_user(&self, id: &str) -> AppResult<User> {
        let deleted = self.repository.soft_delete(id, Utc::now()).await?;
        log::info!("Soft-deleted user '{}'", id);
        Ok(deleted)
    }

    fn hash_password(&self, password: &str) -> AppResult<String> {
        if !User::is_strong_password(password) {
            return Err(AppError::validation(
                "password",
                "must have at least 8 characters including uppercase, lowercase, digit and symbol",
            ));
        }
        self.hasher.hash(password)
    }
}
