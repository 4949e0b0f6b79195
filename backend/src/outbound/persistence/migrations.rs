//! Embedded schema migrations applied at startup.

use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

use crate::domain::ports::RepositoryError;

/// Migrations from the `backend/migrations` directory.
const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

fn migrate(url: &str) -> Result<usize, RepositoryError> {
    let mut conn = PgConnection::establish(url)
        .map_err(|err| RepositoryError::connection(format!("{err}")))?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| RepositoryError::query(format!("migration: {err}")))?;
    Ok(applied.len())
}

/// Apply all pending migrations against `database_url`.
///
/// Diesel's migration harness is synchronous, so the work runs on the
/// blocking pool.
pub async fn run_migrations(database_url: &str) -> Result<(), RepositoryError> {
    let url = database_url.to_owned();
    let applied = tokio::task::spawn_blocking(move || migrate(&url))
        .await
        .map_err(|err| RepositoryError::query(format!("migration task failed: {err}")))??;
    info!(applied, "database migrations complete");
    Ok(())
}
