use english_coach::{
    app_state::Repositories,
    config::Config,
    db::Database,
    errors::AppResult,
};

/// Prepares the database for the English learning backend: checks the
/// configuration, connects, and provisions every collection index.
#[tokio::main]
async fn main() -> AppResult<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env();
    config.validate()?;

    let db = Database::connect(&config).await?;
    db.health_check().await?;

    Repositories::mongo(&db, &config).ensure_indexes().await?;

    log::info!("Database '{}' is ready", db.db_name());
    Ok(())
}
