//! Process-local repositories backed by `RwLock<HashMap>`.
//!
//! They honour the same contracts as the MongoDB implementations, including the
//! atomic progress upsert, and are what the service tests run against.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{Question, User, UserQuestionProgress},
    repositories::{ProgressAnswer, ProgressRepository, QuestionRepository, UpsertOutcome, UserRepository},
};

#[derive(Default)]
pub struct InMemoryQuestionRepository {
    questions: Arc<RwLock<HashMap<String, Question>>>,
}

impl InMemoryQuestionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuestionRepository for InMemoryQuestionRepository {
    async fn create(&self, question: Question) -> AppResult<Question> {
        let mut questions = self.questions.write().await;
        if questions.contains_key(question.id()) {
            return Err(AppError::AlreadyExists(format!(
                "Question with id '{}' already exists",
                question.id()
            )));
        }
        questions.insert(question.id().to_string(), question.clone());
        Ok(question)
    }

    async fn find_active_by_id(&self, id: &str) -> AppResult<Option<Question>> {
        self.find_by_id(id, false).await
    }

    async fn find_by_id(&self, id: &str, include_deleted: bool) -> AppResult<Option<Question>> {
        let questions = self.questions.read().await;
        Ok(questions
            .get(id)
            .filter(|q| include_deleted || q.is_active())
            .cloned())
    }

    async fn list_active(&self) -> AppResult<Vec<Question>> {
        let questions = self.questions.read().await;
        let mut items: Vec<_> = questions.values().filter(|q| q.is_active()).cloned().collect();
        items.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(items)
    }

    async fn list_deleted(&self) -> AppResult<Vec<Question>> {
        let questions = self.questions.read().await;
        let mut items: Vec<_> = questions.values().filter(|q| !q.is_active()).cloned().collect();
        items.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(items)
    }

    async fn update(&self, question: Question) -> AppResult<Question> {
        let mut questions = self.questions.write().await;
        match questions.get(question.id()) {
            Some(existing) if existing.is_active() => {
                questions.insert(question.id().to_string(), question.clone());
                Ok(question)
            }
            _ => Err(AppError::NotFound(format!(
                "Question with id '{}' not found",
                question.id()
            ))),
        }
    }

    async fn soft_delete(&self, id: &str, at: DateTime<Utc>) -> AppResult<Question> {
        let mut questions = self.questions.write().await;
        let question = questions
            .get(id)
            .filter(|q| q.is_active())
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Question with id '{}' not found", id)))?;

        let deleted = question.into_deleted(at);
        questions.insert(id.to_string(), deleted.clone());
        Ok(deleted)
    }

    async fn restore(&self, id: &str) -> AppResult<Question> {
        let mut questions = self.questions.write().await;
        let question = questions
            .get(id)
            .filter(|q| !q.is_active())
            .cloned()
            .ok_or_else(|| {
                AppError::NotFound(format!("Deleted question with id '{}' not found", id))
            })?;

        let restored = question.into_restored();
        questions.insert(id.to_string(), restored.clone());
        Ok(restored)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> AppResult<User> {
        let mut users = self.users.write().await;
        if users.contains_key(user.id()) {
            return Err(AppError::AlreadyExists(format!(
                "User with id '{}' already exists",
                user.id()
            )));
        }
        if users.values().any(|u| u.email() == user.email()) {
            return Err(AppError::AlreadyExists(format!(
                "User with email '{}' already exists",
                user.email()
            )));
        }
        users.insert(user.id().to_string(), user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(id).filter(|u| u.is_active()).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let email = email.trim().to_lowercase();
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email() == email).cloned())
    }

    async fn list_active(&self) -> AppResult<Vec<User>> {
        let users = self.users.read().await;
        let mut items: Vec<_> = users.values().filter(|u| u.is_active()).cloned().collect();
        items.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(items)
    }

    async fn update(&self, user: User) -> AppResult<User> {
        let mut users = self.users.write().await;
        if !users.get(user.id()).is_some_and(|u| u.is_active()) {
            return Err(AppError::NotFound(format!(
                "User with id '{}' not found",
                user.id()
            )));
        }
        if users
            .values()
            .any(|u| u.id() != user.id() && u.email() == user.email())
        {
            return Err(AppError::AlreadyExists(format!(
                "Email '{}' is already in use",
                user.email()
            )));
        }
        users.insert(user.id().to_string(), user.clone());
        Ok(user)
    }

    async fn soft_delete(&self, id: &str, at: DateTime<Utc>) -> AppResult<User> {
        let mut users = self.users.write().await;
        let user = users
            .get(id)
            .filter(|u| u.is_active())
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("User with id '{}' not found", id)))?;

        let deleted = user.into_deleted(at);
        users.insert(id.to_string(), deleted.clone());
        Ok(deleted)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryProgressRepository {
    records: Arc<RwLock<HashMap<String, UserQuestionProgress>>>,
}

impl InMemoryProgressRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record_count(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl ProgressRepository for InMemoryProgressRepository {
    async fn create(&self, progress: UserQuestionProgress) -> AppResult<UserQuestionProgress> {
        let mut records = self.records.write().await;
        if records.contains_key(&progress.id) {
            return Err(AppError::AlreadyExists(format!(
                "Progress with id '{}' already exists",
                progress.id
            )));
        }
        if records
            .values()
            .any(|p| p.user_id == progress.user_id && p.question_id == progress.question_id)
        {
            return Err(AppError::AlreadyExists(format!(
                "Progress for user '{}' and question '{}' already exists",
                progress.user_id, progress.question_id
            )));
        }
        records.insert(progress.id.clone(), progress.clone());
        Ok(progress)
    }

    async fn find_by_user_and_question(
        &self,
        user_id: &str,
        question_id: &str,
    ) -> AppResult<Option<UserQuestionProgress>> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .find(|p| p.user_id == user_id && p.question_id == question_id)
            .cloned())
    }

    async fn update(&self, progress: UserQuestionProgress) -> AppResult<UserQuestionProgress> {
        let mut records = self.records.write().await;
        if !records.contains_key(&progress.id) {
            return Err(AppError::NotFound(format!(
                "Progress with id '{}' not found",
                progress.id
            )));
        }
        records.insert(progress.id.clone(), progress.clone());
        Ok(progress)
    }

    async fn upsert(
        &self,
        candidate_id: &str,
        answer: ProgressAnswer,
    ) -> AppResult<(UserQuestionProgress, UpsertOutcome)> {
        // Lookup and write happen under one lock, so concurrent answers for the
        // same pair serialize here.
        let mut records = self.records.write().await;

        let existing = records
            .values_mut()
            .find(|p| p.user_id == answer.user_id && p.question_id == answer.question_id);

        if let Some(progress) = existing {
            progress.record_answer(answer.status, &answer.chosen_option)?;
            return Ok((progress.clone(), UpsertOutcome::Updated));
        }

        if records.contains_key(candidate_id) {
            return Err(AppError::AlreadyExists(format!(
                "Progress with id '{}' already exists",
                candidate_id
            )));
        }

        let progress = UserQuestionProgress::new(
            candidate_id,
            &answer.user_id,
            &answer.question_id,
            answer.status,
            &answer.chosen_option,
        )?;
        records.insert(progress.id.clone(), progress.clone());
        Ok((progress, UpsertOutcome::Created))
    }

    async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<UserQuestionProgress>> {
        let records = self.records.read().await;
        let mut items: Vec<_> = records
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            b.answered_at
                .cmp(&a.answered_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(items)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}
