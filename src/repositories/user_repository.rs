use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{
    bson::{self, doc},
    options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument},
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::{Lifecycle, User},
    repositories::is_duplicate_key,
};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: User) -> AppResult<User>;
    /// Active users only.
    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>>;
    /// Emails stay reserved after a soft delete, so this lookup spans every status.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn list_active(&self) -> AppResult<Vec<User>>;
    async fn update(&self, user: User) -> AppResult<User>;
    async fn soft_delete(&self, id: &str, at: DateTime<Utc>) -> AppResult<User>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        let collection = db.get_collection(collection_name);
        Self { collection }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn create(&self, user: User) -> AppResult<User> {
        self.collection.insert_one(&user).await.map_err(|err| {
            if is_duplicate_key(&err) {
                AppError::AlreadyExists(format!(
                    "User with id '{}' or email '{}' already exists",
                    user.id(),
                    user.email()
                ))
            } else {
                AppError::from(err)
            }
        })?;
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        let user = self
            .collection
            .find_one(doc! { "id": id, "status": Lifecycle::ACTIVE_STATUS })
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = self
            .collection
            .find_one(doc! { "email": email.trim().to_lowercase() })
            .await?;
        Ok(user)
    }

    async fn list_active(&self) -> AppResult<Vec<User>> {
        let cursor = self
            .collection
            .find(doc! { "status": Lifecycle::ACTIVE_STATUS })
            .await?;
        let users: Vec<User> = cursor.try_collect().await?;
        Ok(users)
    }

    async fn update(&self, user: User) -> AppResult<User> {
        let result = self
            .collection
            .replace_one(
                doc! { "id": user.id(), "status": Lifecycle::ACTIVE_STATUS },
                &user,
            )
            .await
            .map_err(|err| {
                if is_duplicate_key(&err) {
                    AppError::AlreadyExists(format!("Email '{}' is already in use", user.email()))
                } else {
                    AppError::from(err)
                }
            })?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "User with id '{}' not found",
                user.id()
            )));
        }

        Ok(user)
    }

    async fn soft_delete(&self, id: &str, at: DateTime<Utc>) -> AppResult<User> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.collection
            .find_one_and_update(
                doc! { "id": id, "status": Lifecycle::ACTIVE_STATUS },
                doc! { "$set": {
                    "status": Lifecycle::DELETED_STATUS,
                    "deleted_at": bson::DateTime::from_chrono(at),
                } },
            )
            .with_options(options)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id '{}' not found", id)))
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for users collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("email_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(email_index).await?;

        log::info!("Successfully created indexes for users collection");
        Ok(())
    }
}
