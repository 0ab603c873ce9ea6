use std::{sync::Arc, time::Duration};

use chrono::Utc;

use english_coach::{
    errors::AppError,
    models::domain::{NewQuestion, NewUser, Question, User, UserQuestionProgress},
    repositories::{
        InMemoryProgressRepository, InMemoryQuestionRepository, InMemoryUserRepository,
        ProgressAnswer, ProgressRepository, QuestionRepository, UpsertOutcome, UserRepository,
    },
};

fn make_question(id: &str, title: &str) -> Question {
    Question::new(NewQuestion {
        id: id.to_string(),
        title: title.to_string(),
        cefr: Some("B1".to_string()),
        question_type: Some("multiple-choice".to_string()),
        theme: Some("travel".to_string()),
        option_a: Some("platform".to_string()),
        option_b: Some("ticket".to_string()),
        option_c: Some("luggage".to_string()),
        response: Some("B".to_string()),
    })
    .expect("question should be valid")
}

fn make_user(id: &str, email: &str) -> User {
    User::new(NewUser {
        id: id.to_string(),
        name: "Carla Mendes".to_string(),
        email: email.to_string(),
        password_hash: "hash".to_string(),
        cefr: "A2".to_string(),
        role: "student".to_string(),
        time_spent_seconds: None,
        timeline: 1,
        first_access: true,
    })
    .expect("user should be valid")
}

fn answer(user_id: &str, question_id: &str, status: bool, chosen: &str) -> ProgressAnswer {
    ProgressAnswer {
        user_id: user_id.to_string(),
        question_id: question_id.to_string(),
        status,
        chosen_option: chosen.to_string(),
    }
}

#[tokio::test]
async fn question_repository_crud_soft_delete_and_error_paths() {
    let repo = InMemoryQuestionRepository::new();

    repo.create(make_question("Q-1", "What do you buy before boarding?"))
        .await
        .expect("create q1");
    repo.create(make_question("Q-2", "Where do you wait for the train?"))
        .await
        .expect("create q2");

    let duplicate = repo.create(make_question("Q-1", "Duplicate")).await;
    assert!(matches!(duplicate, Err(AppError::AlreadyExists(_))));

    let found = repo.find_active_by_id("Q-1").await.expect("find should work");
    assert!(found.is_some());

    let updated = found
        .expect("question exists")
        .with_title("What must you buy before boarding?")
        .expect("title should be valid");
    let updated = repo.update(updated).await.expect("update should work");
    assert_eq!(updated.title(), "What must you buy before boarding?");

    let missing_update = repo.update(make_question("Q-404", "Missing")).await;
    assert!(matches!(missing_update, Err(AppError::NotFound(_))));

    let deleted = repo.soft_delete("Q-1", Utc::now()).await.expect("delete should work");
    assert!(!deleted.is_active());
    assert!(deleted.lifecycle().deleted_at().is_some());

    assert!(repo.find_active_by_id("Q-1").await.expect("find should work").is_none());
    assert!(repo.find_by_id("Q-1", true).await.expect("find should work").is_some());
    assert_eq!(repo.list_active().await.expect("list should work").len(), 1);
    assert_eq!(repo.list_deleted().await.expect("list should work").len(), 1);

    let update_deleted = repo.update(deleted.clone()).await;
    assert!(matches!(update_deleted, Err(AppError::NotFound(_))));

    let delete_again = repo.soft_delete("Q-1", Utc::now()).await;
    assert!(matches!(delete_again, Err(AppError::NotFound(_))));

    let restored = repo.restore("Q-1").await.expect("restore should work");
    assert!(restored.is_active());
    assert!(restored.lifecycle().deleted_at().is_none());

    let restore_active = repo.restore("Q-2").await;
    assert!(matches!(restore_active, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn user_repository_email_uniqueness_and_soft_delete() {
    let repo = InMemoryUserRepository::new();

    repo.create(make_user("STUDENT-aaaaaa", "carla@example.com"))
        .await
        .expect("create user1");
    repo.create(make_user("STUDENT-bbbbbb", "davi@example.com"))
        .await
        .expect("create user2");

    let duplicate_email = repo.create(make_user("STUDENT-cccccc", "CARLA@example.com")).await;
    assert!(matches!(duplicate_email, Err(AppError::AlreadyExists(_))));

    let duplicate_id = repo.create(make_user("STUDENT-aaaaaa", "other@example.com")).await;
    assert!(matches!(duplicate_id, Err(AppError::AlreadyExists(_))));

    let by_email = repo
        .find_by_email(" Carla@Example.com ")
        .await
        .expect("find by email should work");
    assert_eq!(by_email.map(|u| u.id().to_string()).as_deref(), Some("STUDENT-aaaaaa"));

    let davi = repo
        .find_by_id("STUDENT-bbbbbb")
        .await
        .expect("find should work")
        .expect("user exists");
    let taken = davi.with_email("carla@example.com").expect("email should be valid");
    let conflict = repo.update(taken).await;
    assert!(matches!(conflict, Err(AppError::AlreadyExists(_))));

    repo.soft_delete("STUDENT-aaaaaa", Utc::now())
        .await
        .expect("delete should work");
    assert!(repo.find_by_id("STUDENT-aaaaaa").await.expect("find should work").is_none());
    assert_eq!(repo.list_active().await.expect("list should work").len(), 1);
    assert!(repo
        .find_by_email("carla@example.com")
        .await
        .expect("find should work")
        .is_some());

    let missing_delete = repo.soft_delete("STUDENT-zzzzzz", Utc::now()).await;
    assert!(matches!(missing_delete, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn progress_upsert_creates_then_updates_in_place() {
    let repo = InMemoryProgressRepository::new();

    let (created, outcome) = repo
        .upsert("PROGRESS-1", answer("STUDENT-1", "Q-1", true, "a"))
        .await
        .expect("upsert should work");
    assert_eq!(outcome, UpsertOutcome::Created);
    assert_eq!(created.id, "PROGRESS-1");
    assert_eq!(created.chosen_option, "A");

    let (updated, outcome) = repo
        .upsert("PROGRESS-2", answer("STUDENT-1", "Q-1", false, "B"))
        .await
        .expect("upsert should work");
    assert_eq!(outcome, UpsertOutcome::Updated);
    assert_eq!(updated.id, "PROGRESS-1");
    assert!(!updated.status);
    assert_eq!(updated.chosen_option, "B");
    assert_eq!(repo.record_count().await, 1);

    let stored = repo
        .find_by_user_and_question("STUDENT-1", "Q-1")
        .await
        .expect("find should work")
        .expect("record exists");
    assert_eq!(stored, updated);

    let blank = repo.upsert("PROGRESS-3", answer("STUDENT-1", "Q-2", true, "  ")).await;
    assert!(matches!(blank, Err(AppError::ValidationError { .. })));
    assert_eq!(repo.record_count().await, 1);
}

#[tokio::test]
async fn progress_concurrent_upserts_keep_one_record_per_pair() {
    let repo = Arc::new(InMemoryProgressRepository::new());

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let repo = repo.clone();
            tokio::spawn(async move {
                repo.upsert(
                    &format!("PROGRESS-{}", i),
                    answer("STUDENT-1", "Q-1", i % 2 == 0, "C"),
                )
                .await
            })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        let (_, outcome) = handle
            .await
            .expect("task should join")
            .expect("upsert should work");
        if outcome == UpsertOutcome::Created {
            created += 1;
        }
    }

    assert_eq!(created, 1);
    assert_eq!(repo.record_count().await, 1);
}

#[tokio::test]
async fn progress_create_update_and_listing_order() {
    let repo = InMemoryProgressRepository::new();

    let first = UserQuestionProgress::new("PROGRESS-1", "STUDENT-1", "Q-1", true, "A")
        .expect("progress should be valid");
    repo.create(first.clone()).await.expect("create should work");

    let same_pair = UserQuestionProgress::new("PROGRESS-9", "STUDENT-1", "Q-1", false, "B")
        .expect("progress should be valid");
    let duplicate = repo.create(same_pair).await;
    assert!(matches!(duplicate, Err(AppError::AlreadyExists(_))));

    repo.upsert("PROGRESS-2", answer("STUDENT-1", "Q-2", false, "C"))
        .await
        .expect("upsert should work");
    repo.upsert("PROGRESS-3", answer("STUDENT-2", "Q-1", true, "A"))
        .await
        .expect("upsert should work");

    tokio::time::sleep(Duration::from_millis(5)).await;
    let mut changed = first.clone();
    changed.record_answer(false, "c").expect("answer should be valid");
    let changed = repo.update(changed).await.expect("update should work");
    assert_eq!(changed.chosen_option, "C");

    let missing = UserQuestionProgress::new("PROGRESS-404", "STUDENT-3", "Q-3", true, "A")
        .expect("progress should be valid");
    assert!(matches!(repo.update(missing).await, Err(AppError::NotFound(_))));

    let listed = repo.find_by_user("STUDENT-1").await.expect("list should work");
    let ids: Vec<_> = listed.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["PROGRESS-1", "PROGRESS-2"]);
    assert!(listed.windows(2).all(|w| w[0].answered_at >= w[1].answered_at));

    assert!(repo.find_by_user("STUDENT-9").await.expect("list should work").is_empty());
}
