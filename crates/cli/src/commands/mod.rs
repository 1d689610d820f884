//! Command implementations.

pub mod account;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use flowrite_core::ValidationErrors;
use flowrite_server::db::{PgStore, RepositoryError};
use flowrite_server::services::AuthError;

/// Errors shared by every command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Account registration failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Store operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Seed data failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// No account with this email.
    #[error("No account registered with email: {0}")]
    AccountNotFound(String),
}

fn database_url() -> Result<SecretString, CommandError> {
    std::env::var("FLOWRITE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("FLOWRITE_DATABASE_URL"))
}

async fn connect() -> Result<PgPool, CommandError> {
    let url = database_url()?;
    tracing::info!("Connecting to database...");
    Ok(flowrite_server::db::create_pool(&url).await?)
}

async fn connect_store() -> Result<PgStore, CommandError> {
    Ok(PgStore::new(connect().await?))
}
