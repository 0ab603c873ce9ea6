pub mod memory;
pub mod progress_repository;
pub mod question_repository;
pub mod user_repository;

pub use memory::{InMemoryProgressRepository, InMemoryQuestionRepository, InMemoryUserRepository};
pub use progress_repository::{MongoProgressRepository, ProgressAnswer, ProgressRepository, UpsertOutcome};
pub use question_repository::{MongoQuestionRepository, QuestionRepository};
pub use user_repository::{MongoUserRepository, UserRepository};

#[cfg(test)]
pub use progress_repository::MockProgressRepository;
#[cfg(test)]
pub use question_repository::MockQuestionRepository;

/// MongoDB reports unique-index violations with error code 11000.
pub(crate) fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};

    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == 11000,
        ErrorKind::Command(command_error) => command_error.code == 11000,
        _ => false,
    }
}
