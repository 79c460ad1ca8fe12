//! Embedded schema migrations applied at startup.

use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Errors raised while applying migrations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MigrationError {
    #[error("failed to connect for migrations: {message}")]
    Connect { message: String },
    #[error("failed to apply migrations: {message}")]
    Apply { message: String },
}

/// Run all pending migrations over a dedicated blocking connection.
///
/// # Errors
/// Returns [`MigrationError`] when the database is unreachable or a
/// migration fails.
pub fn run_migrations(database_url: &str) -> Result<(), MigrationError> {
    let mut conn = PgConnection::establish(database_url).map_err(|err| MigrationError::Connect {
        message: err.to_string(),
    })?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| MigrationError::Apply {
            message: err.to_string(),
        })?;
    info!(count = applied.len(), "database migrations applied");
    Ok(())
}

/// Async wrapper that keeps the blocking connection off the runtime workers.
///
/// # Errors
/// As [`run_migrations`]; a panicked blocking task is reported as
/// [`MigrationError::Apply`].
pub async fn run_migrations_async(database_url: String) -> Result<(), MigrationError> {
    tokio::task::spawn_blocking(move || run_migrations(&database_url))
        .await
        .map_err(|err| MigrationError::Apply {
            message: err.to_string(),
        })?
}
