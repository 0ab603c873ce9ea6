pub mod answer_evaluator;
pub mod answer_service;
pub mod id_generator;
pub mod progress_tracker;
pub mod question_service;
pub mod user_service;

pub use answer_evaluator::{AnswerEvaluator, Evaluation};
pub use answer_service::AnswerService;
pub use id_generator::{IdGenerator, IdKind, SequentialIdGenerator, UuidIdGenerator};
pub use progress_tracker::ProgressTracker;
pub use question_service::QuestionService;
pub use user_service::{CredentialHasher, UserService};
