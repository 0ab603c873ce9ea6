use std::borrow::Cow;

use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::models::domain::{NewQuestion, QuestionPatch, UserPatch};

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AnswerQuestionRequest {
    #[validate(custom(function = not_blank))]
    pub user_id: String,

    #[validate(custom(function = not_blank))]
    pub question_id: String,

    #[validate(custom(function = not_blank))]
    pub answer: String,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message(Cow::Borrowed("must not be blank")));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    #[validate(length(max = 10))]
    pub cefr: Option<String>,

    #[serde(rename = "type")]
    #[validate(length(max = 50))]
    pub question_type: Option<String>,

    #[validate(length(max = 100))]
    pub theme: Option<String>,

    pub option_a: Option<String>,
    pub option_b: Option<String>,
    pub option_c: Option<String>,

    #[validate(length(max = 10))]
    pub response: Option<String>,
}

impl CreateQuestionRequest {
    pub fn into_new_question(self, id: String) -> NewQuestion {
        NewQuestion {
            id,
            title: self.title,
            cefr: self.cefr,
            question_type: self.question_type,
            theme: self.theme,
            option_a: self.option_a,
            option_b: self.option_b,
            option_c: self.option_c,
            response: self.response,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuestionRequest {
    #[validate(length(min = 1))]
    pub title: Option<String>,

    #[validate(length(max = 10))]
    pub cefr: Option<String>,

    #[serde(rename = "type")]
    #[validate(length(max = 50))]
    pub question_type: Option<String>,

    #[validate(length(max = 100))]
    pub theme: Option<String>,

    pub option_a: Option<String>,
    pub option_b: Option<String>,
    pub option_c: Option<String>,

    #[validate(length(max = 10))]
    pub response: Option<String>,
}

impl From<UpdateQuestionRequest> for QuestionPatch {
    fn from(request: UpdateQuestionRequest) -> Self {
        QuestionPatch {
            title: request.title,
            cefr: request.cefr,
            question_type: request.question_type,
            theme: request.theme,
            option_a: request.option_a,
            option_b: request.option_b,
            option_c: request.option_c,
            response: request.response,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must have at least 8 characters"))]
    pub password: String,

    pub cefr: String,

    pub role: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1))]
    pub name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(min = 8, message = "Password must have at least 8 characters"))]
    pub password: Option<String>,

    pub cefr: Option<String>,

    pub role: Option<String>,
}

impl UpdateUserRequest {
    pub fn patch(&self) -> UserPatch {
        UserPatch {
            name: self.name.clone(),
            email: self.email.clone(),
            cefr: self.cefr.clone(),
            role: self.role.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::question::MAX_TYPE_LEN;

    #[test]
    fn answer_request_requires_every_field() {
        let request = AnswerQuestionRequest {
            user_id: "STUDENT-1".to_string(),
            question_id: String::new(),
            answer: "A".to_string(),
        };

        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("question_id"));
    }

    #[test]
    fn answer_request_rejects_whitespace_answer() {
        let request = AnswerQuestionRequest {
            user_id: "STUDENT-1".to_string(),
            question_id: "Q-1".to_string(),
            answer: "   ".to_string(),
        };

        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert_eq!(fields.len(), 1);
        assert!(fields.contains_key("answer"));
    }

    #[test]
    fn answer_request_deserializes_camel_case() {
        let json = r#"{ "userId": "STUDENT-1", "questionId": "Q-1", "answer": "a" }"#;
        let request: AnswerQuestionRequest = serde_json::from_str(json).expect("should deserialize");

        assert_eq!(request.user_id, "STUDENT-1");
        assert_eq!(request.question_id, "Q-1");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn create_question_request_enforces_tag_lengths() {
        let request = CreateQuestionRequest {
            title: "Choose the right verb".to_string(),
            cefr: Some("A1".to_string()),
            question_type: Some("t".repeat(MAX_TYPE_LEN + 1)),
            theme: None,
            option_a: None,
            option_b: None,
            option_c: None,
            response: Some("A".to_string()),
        };

        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("question_type"));
    }

    #[test]
    fn update_question_request_maps_to_patch() {
        let json = r#"{ "title": "New title", "type": "grammar", "optionB": "went" }"#;
        let request: UpdateQuestionRequest = serde_json::from_str(json).expect("should deserialize");
        assert!(request.validate().is_ok());

        let patch = QuestionPatch::from(request);
        assert_eq!(patch.title.as_deref(), Some("New title"));
        assert_eq!(patch.question_type.as_deref(), Some("grammar"));
        assert_eq!(patch.option_b.as_deref(), Some("went"));
        assert_eq!(patch.response, None);
    }

    #[test]
    fn create_user_request_rejects_bad_email_and_short_password() {
        let request = CreateUserRequest {
            name: "Ana".to_string(),
            email: "ana-at-example".to_string(),
            password: "short".to_string(),
            cefr: "A1".to_string(),
            role: "student".to_string(),
        };

        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }
}
