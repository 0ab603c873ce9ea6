use std::sync::Arc;

use english_coach::{
    app_state::{AppState, Repositories},
    config::Config,
    errors::{AppError, AppResult},
    models::{
        domain::User,
        dto::{
            request::{AnswerQuestionRequest, CreateQuestionRequest, CreateUserRequest},
            response::{QuestionResponse, UserResponse},
        },
    },
    repositories::{InMemoryProgressRepository, InMemoryQuestionRepository, InMemoryUserRepository},
    services::{CredentialHasher, SequentialIdGenerator},
};

struct TaggingHasher;

impl CredentialHasher for TaggingHasher {
    fn hash(&self, password: &str) -> AppResult<String> {
        Ok(format!("hashed::{}", password.len()))
    }
}

struct Harness {
    state: AppState,
    progress: Arc<InMemoryProgressRepository>,
}

fn harness() -> Harness {
    let _ = env_logger::builder().is_test(true).try_init();

    let progress = Arc::new(InMemoryProgressRepository::new());
    let repositories = Repositories {
        questions: Arc::new(InMemoryQuestionRepository::new()),
        users: Arc::new(InMemoryUserRepository::new()),
        progress: progress.clone(),
    };

    let state = AppState::with_repositories(
        Config::from_env(),
        repositories,
        Arc::new(SequentialIdGenerator::new()),
        Arc::new(TaggingHasher),
    );

    Harness { state, progress }
}

fn capital_of_france(response: &str) -> CreateQuestionRequest {
    CreateQuestionRequest {
        title: "What is the capital of France?".to_string(),
        cefr: Some("A1".to_string()),
        question_type: Some("multiple-choice".to_string()),
        theme: Some("geography".to_string()),
        option_a: Some("Paris".to_string()),
        option_b: Some("London".to_string()),
        option_c: Some("Rome".to_string()),
        response: Some(response.to_string()),
    }
}

fn answer(user_id: &str, question_id: &str, answer: &str) -> AnswerQuestionRequest {
    AnswerQuestionRequest {
        user_id: user_id.to_string(),
        question_id: question_id.to_string(),
        answer: answer.to_string(),
    }
}

#[tokio::test]
async fn answering_twice_keeps_a_single_progress_record() {
    let h = harness();
    let question = h
        .state
        .question_service
        .create_question(capital_of_france("A"))
        .await
        .expect("question should be created");

    let first = h
        .state
        .answer_service
        .answer_question(answer("STUDENT-1", question.id(), "a"))
        .await
        .expect("first answer should be accepted");
    assert!(first.correct);
    assert_eq!(first.correct_answer, None);

    let progress = h
        .state
        .answer_service
        .track_progress("STUDENT-1")
        .await
        .expect("progress should load");
    assert_eq!(progress.len(), 1);
    assert_eq!(progress[0].chosen_option, "A");
    assert!(progress[0].status);
    let record_id = progress[0].id.clone();

    let second = h
        .state
        .answer_service
        .answer_question(answer("STUDENT-1", question.id(), "B"))
        .await
        .expect("second answer should be accepted");
    assert!(!second.correct);
    assert_eq!(second.correct_answer.as_deref(), Some("Paris"));

    let progress = h
        .state
        .answer_service
        .track_progress("STUDENT-1")
        .await
        .expect("progress should load");
    assert_eq!(progress.len(), 1);
    assert_eq!(progress[0].id, record_id);
    assert_eq!(progress[0].chosen_option, "B");
    assert!(!progress[0].status);
    assert_eq!(h.progress.record_count().await, 1);

    let snapshot = progress[0].question.as_ref().expect("question summary");
    assert_eq!(snapshot.title, "What is the capital of France?");
    assert_eq!(snapshot.theme.as_deref(), Some("geography"));
    assert_eq!(snapshot.cefr.as_deref(), Some("A1"));
    assert_eq!(snapshot.question_type.as_deref(), Some("multiple-choice"));
}

#[tokio::test]
async fn out_of_range_response_letter_is_rejected() {
    let h = harness();

    let result = h
        .state
        .question_service
        .create_question(capital_of_france("D"))
        .await;

    assert!(matches!(
        result,
        Err(AppError::ValidationError { ref field, .. }) if field == "response"
    ));
}

#[tokio::test]
async fn answering_deleted_question_records_nothing() {
    let h = harness();
    let question = h
        .state
        .question_service
        .create_question(capital_of_france("A"))
        .await
        .expect("question should be created");
    let deleted = h
        .state
        .question_service
        .delete_question(question.id())
        .await
        .expect("question should be deleted");
    let view = QuestionResponse::from(&deleted);
    assert!(view.deleted_at.is_some());
    assert_eq!(view.response.as_deref(), Some("A"));

    let result = h
        .state
        .answer_service
        .answer_question(answer("STUDENT-1", question.id(), "A"))
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert_eq!(h.progress.record_count().await, 0);
}

#[tokio::test]
async fn progress_is_kept_per_user() {
    let h = harness();
    let question = h
        .state
        .question_service
        .create_question(capital_of_france("C"))
        .await
        .expect("question should be created");

    for user in ["STUDENT-1", "STUDENT-2"] {
        h.state
            .answer_service
            .answer_question(answer(user, question.id(), "c"))
            .await
            .expect("answer should be accepted");
    }

    assert_eq!(h.progress.record_count().await, 2);
    let mine = h
        .state
        .answer_service
        .track_progress("STUDENT-2")
        .await
        .expect("progress should load");
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].user_id, "STUDENT-2");
}

#[tokio::test]
async fn registered_student_accumulates_study_time() {
    let h = harness();
    let users = &h.state.user_service;

    let user = users
        .register(CreateUserRequest {
            name: "Lucas Prado".to_string(),
            email: "lucas@example.com".to_string(),
            password: "Aa1!aaaa".to_string(),
            cefr: "B1".to_string(),
            role: "student".to_string(),
        })
        .await
        .expect("registration should succeed");
    assert!(user.id().starts_with("STUDENT-"));
    assert_eq!(user.password_hash(), "hashed::8");

    users.add_study_time(user.id(), 300).await.expect("time should be added");
    let user = users.add_study_time(user.id(), 45).await.expect("time should be added");
    assert_eq!(user.time_spent_seconds(), 345);

    let view = serde_json::to_value(UserResponse::from(&user)).expect("view should serialize");
    assert_eq!(view["timeSpentSeconds"], 345);
    assert_eq!(view["role"], "student");
    assert!(view.get("passwordHash").is_none());
    assert!(!view.to_string().contains("hashed::8"));

    let negative = users.add_study_time(user.id(), -5).await;
    assert_eq!(negative, Err(AppError::InvalidDuration(-5)));
}

#[test]
fn password_strength_rules() {
    assert!(User::is_strong_password("Aa1!aaaa"));
    assert!(!User::is_strong_password("aa1!aaaa"));
    assert!(!User::is_strong_password("AA1!AAAA"));
    assert!(!User::is_strong_password("Aaa!aaaa"));
    assert!(!User::is_strong_password("Aa1aaaaa"));
    assert!(!User::is_strong_password("Aa1!aaa"));
}
