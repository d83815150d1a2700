pub mod entities;
mod comment_repository;
mod config_repository;
mod post_repository;
mod rating_repository;
mod season_zip_repository;
mod user_repository;
mod vote_repository;

pub use comment_repository::CommentRepository;
pub use config_repository::ConfigRepository;
pub use post_repository::{to_post, PostRepository};
pub use rating_repository::RatingRepository;
pub use season_zip_repository::SeasonZipRepository;
pub use user_repository::{NewUser, UserChanges, UserRepository};
pub use vote_repository::VoteRepository;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};
use std::time::Duration;

pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(database_url);
    opt.max_connections(10)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .sqlx_logging(false);

    Database::connect(opt).await
}

pub async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    let migration = include_str!("../../../../migrations/001_initial.sql");

    for statement in migration.split(';') {
        let statement = statement.trim();
        if statement.is_empty() {
            continue;
        }
        // Statements are idempotent (IF NOT EXISTS), so a failure is a real problem.
        db.execute(Statement::from_string(
            db.get_database_backend(),
            statement.to_string(),
        ))
        .await?;
    }

    tracing::info!("Database migrations applied");
    Ok(())
}

/// In-memory SQLite database with every table created from the entities.
#[cfg(any(test, feature = "testing"))]
pub async fn memory_db() -> Result<DatabaseConnection, DbErr> {
    use sea_orm::{DbBackend, Schema};

    // One pooled connection: every SQLite `:memory:` connection is its own database.
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await?;

    let schema = Schema::new(DbBackend::Sqlite);
    let backend = db.get_database_backend();
    let tables = [
        schema.create_table_from_entity(entities::User),
        schema.create_table_from_entity(entities::Post),
        schema.create_table_from_entity(entities::Comment),
        schema.create_table_from_entity(entities::Vote),
        schema.create_table_from_entity(entities::Rating),
        schema.create_table_from_entity(entities::SeasonZip),
        schema.create_table_from_entity(entities::AdminConfig),
    ];
    for table in &tables {
        db.execute(backend.build(table)).await?;
    }

    Ok(db)
}
