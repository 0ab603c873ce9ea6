use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::domain::{
    CefrLevel, Question, QuestionSnapshot, User, UserQuestionProgress, UserRole,
};

/// Result of answering a question. The correct answer is only disclosed on a miss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOutcome {
    pub correct: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub id: String,
    pub user_id: String,
    pub question_id: String,
    pub status: bool,
    pub chosen_option: String,
    pub answered_at: DateTime<Utc>,
    pub question: Option<QuestionSnapshot>,
}

impl ProgressResponse {
    pub fn from_progress(progress: UserQuestionProgress, question: Option<QuestionSnapshot>) -> Self {
        ProgressResponse {
            id: progress.id,
            user_id: progress.user_id,
            question_id: progress.question_id,
            status: progress.status,
            chosen_option: progress.chosen_option,
            answered_at: progress.answered_at,
            question,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResponse {
    pub id: String,
    pub title: String,
    pub cefr: Option<String>,
    #[serde(rename = "type")]
    pub question_type: Option<String>,
    pub theme: Option<String>,
    pub option_a: Option<String>,
    pub option_b: Option<String>,
    pub option_c: Option<String>,
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<&Question> for QuestionResponse {
    fn from(question: &Question) -> Self {
        use crate::models::domain::ResponseLetter;

        QuestionResponse {
            id: question.id().to_string(),
            title: question.title().to_string(),
            cefr: question.cefr().map(str::to_string),
            question_type: question.question_type().map(str::to_string),
            theme: question.theme().map(str::to_string),
            option_a: question.option(ResponseLetter::A).map(str::to_string),
            option_b: question.option(ResponseLetter::B).map(str::to_string),
            option_c: question.option(ResponseLetter::C).map(str::to_string),
            response: question.response().map(|r| r.to_string()),
            deleted_at: question.lifecycle().deleted_at(),
        }
    }
}

/// Outward view of a user for callers of the services. It carries no credential
/// hash, while the `User` the services return still does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub cefr: CefrLevel,
    pub role: UserRole,
    pub time_spent_seconds: i64,
    pub timeline: i32,
    pub first_access: bool,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        UserResponse {
            id: user.id().to_string(),
            name: user.name().to_string(),
            email: user.email().to_string(),
            cefr: user.cefr(),
            role: user.role(),
            time_spent_seconds: user.time_spent_seconds(),
            timeline: user.timeline(),
            first_access: user.first_access(),
        }
    }
}
