//! Shared helpers for Diesel repository implementations.
//!
//! - Error mapping from pool and Diesel errors to [`RepositoryError`]
//! - [`bounded`], which applies the pool's query timeout to a whole call
//! - Integer conversions between Postgres `BIGINT`/`SMALLINT` and domain types

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::domain::ports::RepositoryError;

use super::pool::PoolError;

/// Map pool errors to repository connection errors.
pub(crate) fn map_pool_error(error: PoolError) -> RepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            RepositoryError::connection(message)
        }
    }
}

/// Map Diesel errors to repository errors.
///
/// Unique violations that reach this point are unexpected: guarded writes
/// use `ON CONFLICT DO NOTHING` and report rejection through row counts.
pub(crate) fn map_diesel_error(error: diesel::result::Error) -> RepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => RepositoryError::query("record not found"),
        DieselError::QueryBuilderError(_) => RepositoryError::query("database query error"),
        DieselError::DatabaseError(kind, info) => match kind {
            DatabaseErrorKind::ClosedConnection => {
                RepositoryError::connection("database connection error")
            }
            DatabaseErrorKind::UniqueViolation => {
                warn!(
                    constraint = ?info.constraint_name(),
                    "unguarded unique violation"
                );
                RepositoryError::query("unique constraint violated")
            }
            DatabaseErrorKind::ForeignKeyViolation => {
                RepositoryError::query("foreign key violation")
            }
            _ => RepositoryError::query("database error"),
        },
        _ => RepositoryError::query("database error"),
    }
}

/// Run a repository call under `limit`, mapping elapsed time to
/// [`RepositoryError::Timeout`].
pub(crate) async fn bounded<T, F>(
    limit: Duration,
    operation: &'static str,
    call: F,
) -> Result<T, RepositoryError>
where
    F: Future<Output = Result<T, RepositoryError>>,
{
    if let Ok(result) = tokio::time::timeout(limit, call).await {
        result
    } else {
        warn!(operation, limit_ms = limit.as_millis(), "repository call timed out");
        Err(RepositoryError::timeout(operation))
    }
}

/// Convert a stored `BIGINT` counter into a domain count.
pub(crate) fn count_from_db(value: i64, column: &'static str) -> Result<u64, RepositoryError> {
    u64::try_from(value)
        .map_err(|_| RepositoryError::corrupt(format!("{column} is negative: {value}")))
}

/// Convert a domain amount into a `BIGINT` column value.
pub(crate) fn amount_to_db(value: u64, column: &'static str) -> Result<i64, RepositoryError> {
    i64::try_from(value)
        .map_err(|_| RepositoryError::query(format!("{column} exceeds storage range: {value}")))
}

/// Convert a stored `SMALLINT` into a `u8` domain value.
pub(crate) fn small_from_db(value: i16, column: &'static str) -> Result<u8, RepositoryError> {
    u8::try_from(value)
        .map_err(|_| RepositoryError::corrupt(format!("{column} out of range: {value}")))
}
