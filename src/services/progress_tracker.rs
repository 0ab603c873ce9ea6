use std::sync::Arc;

use crate::{
    errors::AppResult,
    models::domain::UserQuestionProgress,
    repositories::{ProgressAnswer, ProgressRepository, UpsertOutcome},
    services::id_generator::{IdGenerator, IdKind},
};

/// Keeps exactly one progress record per (user, question) pair.
pub struct ProgressTracker {
    repository: Arc<dyn ProgressRepository>,
    ids: Arc<dyn IdGenerator>,
}

impl ProgressTracker {
    pub fn new(repository: Arc<dyn ProgressRepository>, ids: Arc<dyn IdGenerator>) -> Self {
        Self { repository, ids }
    }

    /// Records the latest answer for the pair. A first answer creates the record;
    /// later answers overwrite status and chosen option while the id stays put.
    pub async fn record(
        &self,
        user_id: &str,
        question_id: &str,
        status: bool,
        chosen_option: &str,
    ) -> AppResult<UserQuestionProgress> {
        let candidate_id = self.ids.generate(IdKind::Progress);
        let answer = ProgressAnswer {
            user_id: user_id.to_string(),
            question_id: question_id.to_string(),
            status,
            chosen_option: chosen_option.to_string(),
        };

        let (progress, outcome) = self.repository.upsert(&candidate_id, answer).await?;

        match outcome {
            UpsertOutcome::Created => log::info!(
                "Created progress '{}' for user '{}' on question '{}'",
                progress.id,
                user_id,
                question_id
            ),
            UpsertOutcome::Updated => log::info!(
                "Updated progress '{}' for user '{}' on question '{}'",
                progress.id,
                user_id,
                question_id
            ),
        }

        Ok(progress)
    }

    pub async fn progress_for_user(&self, user_id: &str) -> AppResult<Vec<UserQuestionProgress>> {
        self.repository.find_by_user(user_id).await
    }
}
