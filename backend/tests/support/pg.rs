//! Embedded PostgreSQL for the Diesel adapter suites.
//!
//! Each context gets a fresh database on the shared cluster with the
//! embedded migrations applied. Set `SKIP_TEST_CLUSTER=1` where the cluster
//! cannot start; suites then report a skip instead of failing.

use hunt_backend::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use pg_embedded_setup_unpriv::TemporaryDatabase;
use pg_embedded_setup_unpriv::test_support::shared_cluster_handle;
use tokio::runtime::Runtime;

/// A migrated database, its pool, and the runtime that drives them.
pub struct PgContext {
    pub runtime: Runtime,
    pub pool: DbPool,
    _database: TemporaryDatabase,
}

fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn setup(max_connections: u32) -> Result<PgContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = shared_cluster_handle().map_err(|err| err.to_string())?;
    let database = cluster
        .temporary_database(format!("test_{}", uuid::Uuid::new_v4().simple()))
        .map_err(|err| format!("{err:?}"))?;
    let url = database.url().to_owned();

    runtime
        .block_on(run_migrations(&url))
        .map_err(|err| err.to_string())?;
    let config = PoolConfig::new(url)
        .with_max_size(max_connections)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(DbPool::new(config))
        .map_err(|err| err.to_string())?;

    Ok(PgContext {
        runtime,
        pool,
        _database: database,
    })
}

/// Provision a database, or `None` when the cluster is unavailable and
/// skipping is allowed.
///
/// # Panics
/// When setup fails and `SKIP_TEST_CLUSTER` is not set.
pub fn pg_context(max_connections: u32) -> Option<PgContext> {
    match setup(max_connections) {
        Ok(context) => Some(context),
        Err(reason) if should_skip_test_cluster() => {
            eprintln!("SKIP-TEST-CLUSTER: {reason}");
            None
        }
        Err(reason) => {
            panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.")
        }
    }
}
