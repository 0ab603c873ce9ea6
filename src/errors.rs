use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Validation error on '{field}': {message}")]
    ValidationError { field: String, message: String },

    #[error("Question '{0}' has no canonical response")]
    NoCanonicalResponse(String),

    #[error("Study time must be positive, got {0} seconds")]
    InvalidDuration(i64),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AppError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::AlreadyExists(_) => "ALREADY_EXISTS",
            AppError::ValidationError { .. } => "VALIDATION_ERROR",
            AppError::NoCanonicalResponse(_) => "NO_CANONICAL_RESPONSE",
            AppError::InvalidDuration(_) => "INVALID_DURATION",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}
impl From<mongodb::bson::ser::Error> for AppError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        AppError::InternalError(format!("BSON serialization error: {}", err))
    }
}
impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        // Report the alphabetically first offending field; the full list goes
        // into the message.
        let field = err
            .field_errors()
            .keys()
            .min()
            .map(|k| k.to_string())
            .unwrap_or_else(|| "request".to_string());
        AppError::ValidationError {
            field,
            message: err.to_string(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::NotFound("test".into()).error_code(), "NOT_FOUND");
        assert_eq!(
            AppError::validation("email", "bad").error_code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(
            AppError::NoCanonicalResponse("Q-1".into()).error_code(),
            "NO_CANONICAL_RESPONSE"
        );
        assert_eq!(AppError::InvalidDuration(0).error_code(), "INVALID_DURATION");
    }

    #[test]
    fn test_error_messages() {
        let err = AppError::NotFound("question".into());
        assert_eq!(err.to_string(), "Not found: question");

        let err = AppError::validation("title", "must not be empty");
        assert_eq!(
            err.to_string(),
            "Validation error on 'title': must not be empty"
        );

        let err = AppError::InvalidDuration(-5);
        assert_eq!(err.to_string(), "Study time must be positive, got -5 seconds");
    }

    #[test]
    fn validation_errors_report_the_same_field_every_time() {
        for _ in 0..8 {
            let mut errors = validator::ValidationErrors::new();
            errors.add("password", validator::ValidationError::new("length"));
            errors.add("name", validator::ValidationError::new("length"));
            errors.add("email", validator::ValidationError::new("email"));

            match AppError::from(errors) {
                AppError::ValidationError { field, message } => {
                    assert_eq!(field, "email");
                    assert!(message.contains("password"));
                }
                other => panic!("expected validation error, got {:?}", other),
            }
        }
    }
}
