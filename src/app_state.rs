use std::sync::Arc;

use crate::{
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{
        InMemoryProgressRepository, InMemoryQuestionRepository, InMemoryUserRepository,
        MongoProgressRepository, MongoQuestionRepository, MongoUserRepository, ProgressRepository,
        QuestionRepository, UserRepository,
    },
    services::{
        AnswerService, CredentialHasher, IdGenerator, ProgressTracker, QuestionService,
        UserService, UuidIdGenerator,
    },
};

/// The storage backends the services run on.
#[derive(Clone)]
pub struct Repositories {
    pub questions: Arc<dyn QuestionRepository>,
    pub users: Arc<dyn UserRepository>,
    pub progress: Arc<dyn ProgressRepository>,
}

impl Repositories {
    pub fn mongo(db: &Database, config: &Config) -> Self {
        Self {
            questions: Arc::new(MongoQuestionRepository::new(db, &config.questions_collection)),
            users: Arc::new(MongoUserRepository::new(db, &config.users_collection)),
            progress: Arc::new(MongoProgressRepository::new(db, &config.progress_collection)),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            questions: Arc::new(InMemoryQuestionRepository::new()),
            users: Arc::new(InMemoryUserRepository::new()),
            progress: Arc::new(InMemoryProgressRepository::new()),
        }
    }

    /// Creates every index the repositories rely on, including the unique
    /// (user_id, question_id) index behind the progress upsert.
    pub async fn ensure_indexes(&self) -> AppResult<()> {
        self.questions.ensure_indexes().await?;
        self.users.ensure_indexes().await?;
        self.progress.ensure_indexes().await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct AppState {
    pub question_service: Arc<QuestionService>,
    pub answer_service: Arc<AnswerService>,
    pub user_service: Arc<UserService>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Connects to MongoDB, provisions indexes and wires the services.
    pub async fn new(config: Config, hasher: Arc<dyn CredentialHasher>) -> AppResult<Self> {
        config.validate()?;

        let db = Database::connect(&config).await?;
        let repositories = Repositories::mongo(&db, &config);
        repositories.ensure_indexes().await?;

        Ok(Self::with_repositories(
            config,
            repositories,
            Arc::new(UuidIdGenerator),
            hasher,
        ))
    }

    pub fn with_repositories(
        config: Config,
        repositories: Repositories,
        ids: Arc<dyn IdGenerator>,
        hasher: Arc<dyn CredentialHasher>,
    ) -> Self {
        let tracker = ProgressTracker::new(repositories.progress.clone(), ids.clone());

        let question_service = Arc::new(QuestionService::new(
            repositories.questions.clone(),
            ids.clone(),
        ));
        let answer_service = Arc::new(AnswerService::new(repositories.questions.clone(), tracker));
        let user_service = Arc::new(UserService::new(repositories.users.clone(), ids, hasher));

        Self {
            question_service,
            answer_service,
            user_service,
            config: Arc::new(config),
        }
    }
}
