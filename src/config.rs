use std::env;
use secrecy::SecretString;

use crate::errors::{AppError, AppResult};

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_conn_string: SecretString,
    pub mongo_db_name: String,
    pub users_collection: String,
    pub questions_collection: String,
    pub progress_collection: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            mongo_conn_string: SecretString::from(
                env::var("MONGO_CONN_STRING")
                    .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            ),
            mongo_db_name: env::var("MONGO_DB_NAME")
                .unwrap_or_else(|_| "english-coach-local".to_string()),
            users_collection: env::var("USERS_COLLECTION").unwrap_or_else(|_| "users".to_string()),
            questions_collection: env::var("QUESTIONS_COLLECTION")
                .unwrap_or_else(|_| "questions".to_string()),
            progress_collection: env::var("PROGRESS_COLLECTION")
                .unwrap_or_else(|_| "user_question_progress".to_string()),
        }
    }

    /// Collection names must be set and must not point two repositories at the same collection.
    pub fn validate(&self) -> AppResult<()> {
        if self.mongo_db_name.trim().is_empty() {
            return Err(AppError::validation("MONGO_DB_NAME", "must not be empty"));
        }

        let collections = [
            ("USERS_COLLECTION", &self.users_collection),
            ("QUESTIONS_COLLECTION", &self.questions_collection),
            ("PROGRESS_COLLECTION", &self.progress_collection),
        ];

        for (i, (key, name)) in collections.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(AppError::validation(*key, "must not be empty"));
            }
            if collections[..i].iter().any(|(_, other)| other == name) {
                return Err(AppError::validation(
                    *key,
                    format!("collection '{}' is already in use", name),
                ));
            }
        }

        Ok(())
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            mongo_conn_string: SecretString::from("mongodb://localhost:27017".to_string()),
            mongo_db_name: "english-coach-test".to_string(),
            users_collection: "users".to_string(),
            questions_collection: "questions".to_string(),
            progress_collection: "user_question_progress".to_string(),
        }
    }
}
