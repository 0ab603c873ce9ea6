use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{Question, QuestionPatch},
        dto::request::{CreateQuestionRequest, UpdateQuestionRequest},
    },
    repositories::QuestionRepository,
    services::id_generator::{IdGenerator, IdKind},
};

pub struct QuestionService {
    repository: Arc<dyn QuestionRepository>,
    ids: Arc<dyn IdGenerator>,
}

impl QuestionService {
    pub fn new(repository: Arc<dyn QuestionRepository>, ids: Arc<dyn IdGenerator>) -> Self {
        Self { repository, ids }
    }

    pub async fn create_question(&self, request: CreateQuestionRequest) -> AppResult<Question> {
        request.validate()?;

        let id = self.ids.generate(IdKind::Question);
        let question = Question::new(request.into_new_question(id))?;
        let question = self.repository.create(question).await?;

        log::info!("Created question '{}'", question.id());
        Ok(question)
    }

    pub async fn get_question(&self, id: &str) -> AppResult<Question> {
        self.repository
            .find_active_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Question with id '{}' not found", id)))
    }

    pub async fn list_questions(&self) -> AppResult<Vec<Question>> {
        self.repository.list_active().await
    }

    pub async fn list_deleted_questions(&self) -> AppResult<Vec<Question>> {
        self.repository.list_deleted().await
    }

    /// Applies the provided fields. An invalid field rejects the whole update and
    /// leaves the stored question untouched.
    pub async fn update_question(
        &self,
        id: &str,
        request: UpdateQuestionRequest,
    ) -> AppResult<Question> {
        request.validate()?;

        let patch = QuestionPatch::from(request);
        let current = self.get_question(id).await?;
        if patch.is_empty() {
            return Ok(current);
        }

        let updated = current.apply(&patch)?;
        let updated = self.repository.update(updated).await?;

        log::info!("Updated question '{}'", id);
        Ok(updated)
    }

    pub async fn delete_question(&self, id: &str) -> AppResult<Question> {
        let deleted = self.repository.soft_delete(id, Utc::now()).await?;
        log::info!("Soft-deleted question '{}'", id);
        Ok(deleted)
    }

    pub async fn restore_question(&self, id: &str) -> AppResult<Question> {
        let restored = self.repository.restore(id).await?;
        log::info!("Restored question '{}'", id);
        Ok(restored)
    }
}
