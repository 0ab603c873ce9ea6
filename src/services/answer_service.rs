use std::sync::Arc;

use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::dto::{
        request::AnswerQuestionRequest,
        response::{AnswerOutcome, ProgressResponse},
    },
    repositories::QuestionRepository,
    services::{answer_evaluator::AnswerEvaluator, progress_tracker::ProgressTracker},
};

/// Answers questions on behalf of a learner and reports their progress.
pub struct AnswerService {
    questions: Arc<dyn QuestionRepository>,
    tracker: ProgressTracker,
}

impl AnswerService {
    pub fn new(questions: Arc<dyn QuestionRepository>, tracker: ProgressTracker) -> Self {
        Self { questions, tracker }
    }

    /// Evaluates the answer and records it against the (user, question) pair.
    ///
    /// Nothing is recorded when the question is missing, soft-deleted, or has no
    /// canonical response.
    pub async fn answer_question(&self, request: AnswerQuestionRequest) -> AppResult<AnswerOutcome> {
        request.validate()?;

        let question = self
            .questions
            .find_active_by_id(&request.question_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Question with id '{}' not found", request.question_id))
            })?;

        let evaluation = AnswerEvaluator::evaluate(&question, &request.user_id, &request.answer)?;

        self.tracker
            .record(
                &request.user_id,
                question.id(),
                evaluation.correct,
                &request.answer,
            )
            .await?;

        Ok(evaluation.into())
    }

    /// Every answered question for the user, newest first, each with a summary of
    /// the question. The summary is `None` once the question no longer exists.
    pub async fn track_progress(&self, user_id: &str) -> AppResult<Vec<ProgressResponse>> {
        if user_id.trim().is_empty() {
            return Err(AppError::validation("user_id", "must not be empty"));
        }

        let records = self.tracker.progress_for_user(user_id).await?;

        let mut responses = Vec::with_capacity(records.len());
        for record in records {
            let snapshot = self
                .questions
                .find_by_id(&record.question_id, true)
                .await?
                .map(|question| question.snapshot());
            responses.push(ProgressResponse::from_progress(record, snapshot));
        }

        Ok(responses)
    }
}
