use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};
use crate::models::domain::lifecycle::Lifecycle;
use crate::models::domain::user_question_progress::QuestionSnapshot;

pub const MAX_CEFR_LEN: usize = 10;
pub const MAX_TYPE_LEN: usize = 50;
pub const MAX_THEME_LEN: usize = 100;

/// Letter designating which option holds the canonical response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum ResponseLetter {
    A,
    B,
    C,
}

impl ResponseLetter {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseLetter::A => "A",
            ResponseLetter::B => "B",
            ResponseLetter::C => "C",
        }
    }

    /// Blank input means "no response"; anything else must be A, B or C in any case.
    pub fn parse_optional(value: &str) -> AppResult<Option<Self>> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(None);
        }
        value.parse().map(Some)
    }
}

impl fmt::Display for ResponseLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseLetter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "A" => Ok(ResponseLetter::A),
            "B" => Ok(ResponseLetter::B),
            "C" => Ok(ResponseLetter::C),
            _ => Err(AppError::validation("response", "must be one of A, B or C")),
        }
    }
}

/// Input for [`Question::new`]. Free-form strings are validated on construction.
#[derive(Clone, Debug, Default)]
pub struct NewQuestion {
    pub id: String,
    pub title: String,
    pub cefr: Option<String>,
    pub question_type: Option<String>,
    pub theme: Option<String>,
    pub option_a: Option<String>,
    pub option_b: Option<String>,
    pub option_c: Option<String>,
    pub response: Option<String>,
}

/// Field-level changes to a question. `None` leaves a field untouched and
/// `Some("")` clears an optional field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuestionPatch {
    pub title: Option<String>,
    pub cefr: Option<String>,
    pub question_type: Option<String>,
    pub theme: Option<String>,
    pub option_a: Option<String>,
    pub option_b: Option<String>,
    pub option_c: Option<String>,
    pub response: Option<String>,
}

impl QuestionPatch {
    pub fn is_empty(&self) -> bool {
        *self == QuestionPatch::default()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Question {
    id: String,
    title: String,
    cefr: Option<String>,
    #[serde(rename = "type")]
    question_type: Option<String>,
    theme: Option<String>,
    option_a: Option<String>,
    option_b: Option<String>,
    option_c: Option<String>,
    response: Option<ResponseLetter>,
    #[serde(flatten)]
    lifecycle: Lifecycle,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::models::domain::bson_dates"
    )]
    created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::models::domain::bson_dates"
    )]
    modified_at: Option<DateTime<Utc>>,
}

impl Question {
    pub fn new(data: NewQuestion) -> AppResult<Self> {
        let id = data.id.trim();
        if id.is_empty() {
            return Err(AppError::validation("id", "must not be empty"));
        }

        let now = Utc::now();
        let question = Question {
            id: id.to_string(),
            title: validate_title(&data.title)?,
            cefr: validate_tag("cefr", data.cefr.as_deref(), MAX_CEFR_LEN)?,
            question_type: validate_tag("type", data.question_type.as_deref(), MAX_TYPE_LEN)?,
            theme: validate_tag("theme", data.theme.as_deref(), MAX_THEME_LEN)?,
            option_a: clear_if_blank(data.option_a.as_deref()),
            option_b: clear_if_blank(data.option_b.as_deref()),
            option_c: clear_if_blank(data.option_c.as_deref()),
            response: match data.response.as_deref() {
                Some(value) => ResponseLetter::parse_optional(value)?,
                None => None,
            },
            lifecycle: Lifecycle::Active,
            created_at: Some(now),
            modified_at: Some(now),
        };

        Ok(question)
    }

    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn title(&self) -> &str {
        &self.title
    }
    pub fn cefr(&self) -> Option<&str> {
        self.cefr.as_deref()
    }
    pub fn question_type(&self) -> Option<&str> {
        self.question_type.as_deref()
    }
    pub fn theme(&self) -> Option<&str> {
        self.theme.as_deref()
    }
    pub fn option(&self, letter: ResponseLetter) -> Option<&str> {
        match letter {
            ResponseLetter::A => self.option_a.as_deref(),
            ResponseLetter::B => self.option_b.as_deref(),
            ResponseLetter::C => self.option_c.as_deref(),
        }
    }
    pub fn response(&self) -> Option<ResponseLetter> {
        self.response
    }
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }
    pub fn is_active(&self) -> bool {
        self.lifecycle.is_active()
    }
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        self.modified_at
    }

    pub fn with_title(mut self, title: &str) -> AppResult<Self> {
        self.title = validate_title(title)?;
        Ok(self.touched())
    }

    pub fn with_cefr(mut self, cefr: &str) -> AppResult<Self> {
        self.cefr = validate_tag("cefr", Some(cefr), MAX_CEFR_LEN)?;
        Ok(self.touched())
    }

    pub fn with_type(mut self, question_type: &str) -> AppResult<Self> {
        self.question_type = validate_tag("type", Some(question_type), MAX_TYPE_LEN)?;
        Ok(self.touched())
    }

    pub fn with_theme(mut self, theme: &str) -> AppResult<Self> {
        self.theme = validate_tag("theme", Some(theme), MAX_THEME_LEN)?;
        Ok(self.touched())
    }

    pub fn with_option(mut self, letter: ResponseLetter, text: &str) -> Self {
        let text = clear_if_blank(Some(text));
        match letter {
            ResponseLetter::A => self.option_a = text,
            ResponseLetter::B => self.option_b = text,
            ResponseLetter::C => self.option_c = text,
        }
        self.touched()
    }

    pub fn with_response(mut self, response: &str) -> AppResult<Self> {
        self.response = ResponseLetter::parse_optional(response)?;
        Ok(self.touched())
    }

    /// Applies every field of `patch` or none of them.
    pub fn apply(&self, patch: &QuestionPatch) -> AppResult<Self> {
        let mut next = self.clone();
        if let Some(title) = &patch.title {
            next = next.with_title(title)?;
        }
        if let Some(cefr) = &patch.cefr {
            next = next.with_cefr(cefr)?;
        }
        if let Some(question_type) = &patch.question_type {
            next = next.with_type(question_type)?;
        }
        if let Some(theme) = &patch.theme {
            next = next.with_theme(theme)?;
        }
        if let Some(text) = &patch.option_a {
            next = next.with_option(ResponseLetter::A, text);
        }
        if let Some(text) = &patch.option_b {
            next = next.with_option(ResponseLetter::B, text);
        }
        if let Some(text) = &patch.option_c {
            next = next.with_option(ResponseLetter::C, text);
        }
        if let Some(response) = &patch.response {
            next = next.with_response(response)?;
        }
        Ok(next)
    }

    pub fn into_deleted(mut self, at: DateTime<Utc>) -> Self {
        self.lifecycle = Lifecycle::Deleted { deleted_at: at };
        self.modified_at = Some(at);
        self
    }

    pub fn into_restored(mut self) -> Self {
        self.lifecycle = Lifecycle::Active;
        self.touched()
    }

    fn canonical_response(&self) -> AppResult<ResponseLetter> {
        self.response
            .ok_or_else(|| AppError::NoCanonicalResponse(self.id.clone()))
    }

    /// Case- and whitespace-insensitive comparison against the canonical response.
    pub fn is_correct_answer(&self, submitted: &str) -> AppResult<bool> {
        let canonical = self.canonical_response()?;
        Ok(submitted.trim().to_uppercase() == canonical.as_str())
    }

    /// Text of the option the canonical response designates. `None` when that
    /// option has no text.
    pub fn correct_answer_text(&self) -> AppResult<Option<String>> {
        let canonical = self.canonical_response()?;
        Ok(self.option(canonical).map(str::to_string))
    }

    pub fn snapshot(&self) -> QuestionSnapshot {
        QuestionSnapshot {
            title: self.title.clone(),
            theme: self.theme.clone(),
            cefr: self.cefr.clone(),
            question_type: self.question_type.clone(),
        }
    }

    fn touched(mut self) -> Self {
        self.modified_at = Some(Utc::now());
        self
    }
}

fn validate_title(title: &str) -> AppResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::validation("title", "must not be empty"));
    }
    Ok(title.to_string())
}

fn validate_tag(field: &str, value: Option<&str>, max_len: usize) -> AppResult<Option<String>> {
    let value = clear_if_blank(value);
    if let Some(v) = &value {
        if v.chars().count() > max_len {
            return Err(AppError::validation(
                field,
                format!("must be at most {} characters", max_len),
            ));
        }
    }
    Ok(value)
}

fn clear_if_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
impl Question {
    pub fn test_question(id: &str, response: Option<&str>) -> Self {
        Question::new(NewQuestion {
            id: id.to_string(),
            title: "What is the capital of France?".to_string(),
            cefr: Some("A1".to_string()),
            question_type: Some("multiple-choice".to_string()),
            theme: Some("geography".to_string()),
            option_a: Some("Paris".to_string()),
            option_b: Some("Lyon".to_string()),
            option_c: Some("Nice".to_string()),
            response: response.map(str::to_string),
        })
        .expect("test question should be valid")
    }
}
