use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

/// Latest answer a user gave to a question. At most one exists per (user, question).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct UserQuestionProgress {
    pub id: String,
    pub user_id: String,
    pub question_id: String,
    pub status: bool,
    pub chosen_option: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub answered_at: DateTime<Utc>,
}

/// Display fields copied from the question when progress is listed.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuestionSnapshot {
    pub title: String,
    pub theme: Option<String>,
    pub cefr: Option<String>,
    #[serde(rename = "type")]
    pub question_type: Option<String>,
}

impl UserQuestionProgress {
    pub fn new(
        id: &str,
        user_id: &str,
        question_id: &str,
        status: bool,
        chosen_option: &str,
    ) -> AppResult<Self> {
        for (field, value) in [("id", id), ("user_id", user_id), ("question_id", question_id)] {
            if value.trim().is_empty() {
                return Err(AppError::validation(field, "must not be empty"));
            }
        }

        Ok(UserQuestionProgress {
            id: id.to_string(),
            user_id: user_id.to_string(),
            question_id: question_id.to_string(),
            status,
            chosen_option: normalize_chosen_option(chosen_option)?,
            answered_at: Utc::now(),
        })
    }

    /// Overwrites the answer in place; identity and references never change.
    pub fn record_answer(&mut self, status: bool, chosen_option: &str) -> AppResult<()> {
        self.chosen_option = normalize_chosen_option(chosen_option)?;
        self.status = status;
        self.answered_at = Utc::now();
        Ok(())
    }
}

pub fn normalize_chosen_option(chosen_option: &str) -> AppResult<String> {
    let chosen = chosen_option.trim();
    if chosen.is_empty() {
        return Err(AppError::validation("chosen_option", "must not be empty"));
    }
    Ok(chosen.to_uppercase())
}
