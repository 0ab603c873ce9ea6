use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{
    bson::{self, doc},
    options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument},
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::{user_question_progress::normalize_chosen_option, UserQuestionProgress},
    repositories::is_duplicate_key,
};

/// The answer to store for a (user, question) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressAnswer {
    pub user_id: String,
    pub question_id: String,
    pub status: bool,
    pub chosen_option: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    async fn create(&self, progress: UserQuestionProgress) -> AppResult<UserQuestionProgress>;
    async fn find_by_user_and_question(
        &self,
        user_id: &str,
        question_id: &str,
    ) -> AppResult<Option<UserQuestionProgress>>;
    async fn update(&self, progress: UserQuestionProgress) -> AppResult<UserQuestionProgress>;
    /// Atomically inserts a record for the pair (taking `candidate_id`) or overwrites
    /// the answer fields of the existing one, keeping its id.
    async fn upsert(
        &self,
        candidate_id: &str,
        answer: ProgressAnswer,
    ) -> AppResult<(UserQuestionProgress, UpsertOutcome)>;
    /// Most recently answered first.
    async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<UserQuestionProgress>>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoProgressRepository {
    collection: Collection<UserQuestionProgress>,
}

impl MongoProgressRepository {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        let collection = db.get_collection(collection_name);
        Self { collection }
    }
}

#[async_trait]
impl ProgressRepository for MongoProgressRepository {
    async fn create(&self, progress: UserQuestionProgress) -> AppResult<UserQuestionProgress> {
        self.collection.insert_one(&progress).await.map_err(|err| {
            if is_duplicate_key(&err) {
                AppError::AlreadyExists(format!(
                    "Progress for user '{}' and question '{}' already exists",
                    progress.user_id, progress.question_id
                ))
            } else {
                AppError::from(err)
            }
        })?;
        Ok(progress)
    }

    async fn find_by_user_and_question(
        &self,
        user_id: &str,
        question_id: &str,
    ) -> AppResult<Option<UserQuestionProgress>> {
        let progress = self
            .collection
            .find_one(doc! { "user_id": user_id, "question_id": question_id })
            .await?;
        Ok(progress)
    }

    async fn update(&self, progress: UserQuestionProgress) -> AppResult<UserQuestionProgress> {
        let result = self
            .collection
            .replace_one(doc! { "id": &progress.id }, &progress)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Progress with id '{}' not found",
                progress.id
            )));
        }

        Ok(progress)
    }

    async fn upsert(
        &self,
        candidate_id: &str,
        answer: ProgressAnswer,
    ) -> AppResult<(UserQuestionProgress, UpsertOutcome)> {
        let chosen_option = normalize_chosen_option(&answer.chosen_option)?;

        // The filter fields are copied into the inserted document; the unique
        // (user_id, question_id) index lets the server retry a conflicting upsert.
        let filter = doc! { "user_id": &answer.user_id, "question_id": &answer.question_id };
        let update = doc! {
            "$setOnInsert": { "id": candidate_id },
            "$set": {
                "status": answer.status,
                "chosen_option": &chosen_option,
                "answered_at": bson::DateTime::from_chrono(Utc::now()),
            },
        };

        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();

        let progress = self
            .collection
            .find_one_and_update(filter, update)
            .with_options(options)
            .await?
            .ok_or_else(|| {
                AppError::InternalError("Progress upsert returned no document".to_string())
            })?;

        let outcome = if progress.id == candidate_id {
            UpsertOutcome::Created
        } else {
            UpsertOutcome::Updated
        };

        Ok((progress, outcome))
    }

    async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<UserQuestionProgress>> {
        let progress = self
            .collection
            .find(doc! { "user_id": user_id })
            .sort(doc! { "answered_at": -1, "id": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(progress)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for progress collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let user_question_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "question_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("user_question_unique".to_string())
                    .build(),
            )
            .build();

        let user_answered_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "answered_at": -1 })
            .options(
                IndexOptions::builder()
                    .name("user_answered_at".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(user_question_index).await?;
        self.collection.create_index(user_answered_index).await?;

        log::info!("Successfully created indexes for progress collection");
        Ok(())
    }
}
