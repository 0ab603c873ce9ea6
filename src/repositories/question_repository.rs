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
    models::domain::{Lifecycle, Question},
    repositories::is_duplicate_key,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    async fn create(&self, question: Question) -> AppResult<Question>;
    /// Active questions only.
    async fn find_active_by_id(&self, id: &str) -> AppResult<Option<Question>>;
    async fn find_by_id(&self, id: &str, include_deleted: bool) -> AppResult<Option<Question>>;
    async fn list_active(&self) -> AppResult<Vec<Question>>;
    async fn list_deleted(&self) -> AppResult<Vec<Question>>;
    /// Replaces an active question; soft-deleted questions are treated as missing.
    async fn update(&self, question: Question) -> AppResult<Question>;
    async fn soft_delete(&self, id: &str, at: DateTime<Utc>) -> AppResult<Question>;
    async fn restore(&self, id: &str) -> AppResult<Question>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoQuestionRepository {
    collection: Collection<Question>,
}

impl MongoQuestionRepository {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        let collection = db.get_collection(collection_name);
        Self { collection }
    }

    async fn set_lifecycle(
        &self,
        id: &str,
        from: &str,
        to: Lifecycle,
    ) -> AppResult<Option<Question>> {
        let mut set = doc! {
            "status": to_status(&to),
            "modified_at": bson::DateTime::from_chrono(Utc::now()),
        };
        let update = match to.deleted_at() {
            Some(at) => {
                set.insert("deleted_at", bson::DateTime::from_chrono(at));
                doc! { "$set": set }
            }
            None => doc! { "$set": set, "$unset": { "deleted_at": "" } },
        };

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let question = self
            .collection
            .find_one_and_update(doc! { "id": id, "status": from }, update)
            .with_options(options)
            .await?;
        Ok(question)
    }
}

fn to_status(lifecycle: &Lifecycle) -> &'static str {
    if lifecycle.is_active() {
        Lifecycle::ACTIVE_STATUS
    } else {
        Lifecycle::DELETED_STATUS
    }
}

#[async_trait]
impl QuestionRepository for MongoQuestionRepository {
    async fn create(&self, question: Question) -> AppResult<Question> {
        self.collection.insert_one(&question).await.map_err(|err| {
            if is_duplicate_key(&err) {
                AppError::AlreadyExists(format!(
                    "Question with id '{}' already exists",
                    question.id()
                ))
            } else {
                AppError::from(err)
            }
        })?;
        Ok(question)
    }

    async fn find_active_by_id(&self, id: &str) -> AppResult<Option<Question>> {
        self.find_by_id(id, false).await
    }

    async fn find_by_id(&self, id: &str, include_deleted: bool) -> AppResult<Option<Question>> {
        let filter = if include_deleted {
            doc! { "id": id }
        } else {
            doc! { "id": id, "status": Lifecycle::ACTIVE_STATUS }
        };
        let question = self.collection.find_one(filter).await?;
        Ok(question)
    }

    async fn list_active(&self) -> AppResult<Vec<Question>> {
        let cursor = self
            .collection
            .find(doc! { "status": Lifecycle::ACTIVE_STATUS })
            .await?;
        let questions: Vec<Question> = cursor.try_collect().await?;
        Ok(questions)
    }

    async fn list_deleted(&self) -> AppResult<Vec<Question>> {
        let cursor = self
            .collection
            .find(doc! { "status": Lifecycle::DELETED_STATUS })
            .await?;
        let questions: Vec<Question> = cursor.try_collect().await?;
        Ok(questions)
    }

    async fn update(&self, question: Question) -> AppResult<Question> {
        let result = self
            .collection
            .replace_one(
                doc! { "id": question.id(), "status": Lifecycle::ACTIVE_STATUS },
                &question,
            )
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Question with id '{}' not found",
                question.id()
            )));
        }

        Ok(question)
    }

    async fn soft_delete(&self, id: &str, at: DateTime<Utc>) -> AppResult<Question> {
        self.set_lifecycle(id, Lifecycle::ACTIVE_STATUS, Lifecycle::Deleted { deleted_at: at })
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Question with id '{}' not found", id)))
    }

    async fn restore(&self, id: &str) -> AppResult<Question> {
        self.set_lifecycle(id, Lifecycle::DELETED_STATUS, Lifecycle::Active)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Deleted question with id '{}' not found", id))
            })
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for questions collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let status_index = IndexModel::builder()
            .keys(doc! { "status": 1 })
            .options(IndexOptions::builder().name("status".to_string()).build())
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(status_index).await?;

        log::info!("Successfully created indexes for questions collection");
        Ok(())
    }
}
