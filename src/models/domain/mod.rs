pub mod bson_dates;
pub mod level;
pub mod lifecycle;
pub mod question;
pub mod user;
pub mod user_question_progress;
pub use level::{CefrLevel, UserRole};
pub use lifecycle::Lifecycle;
pub use question::{NewQuestion, Question, QuestionPatch, ResponseLetter};
pub use user::{NewUser, User, UserPatch};
pub use user_question_progress::{QuestionSnapshot, UserQuestionProgress};
