//! PostgreSQL-backed `IdentityRepository` implementation using Diesel ORM.
//!
//! Registration relies on the primary key over the normalised email: a
//! second insert for the same address affects no rows and is reported as
//! [`Guarded::Rejected`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::{Page, PageRequest};

use crate::domain::ports::{IdentityRepository, RepositoryError};
use crate::domain::{Email, Guarded, Identity, Role, Tier};

use super::diesel_helpers::{bounded, count_from_db, map_diesel_error, map_pool_error};
use super::models::{IdentityRow, convert_rows};
use super::pool::DbPool;
use super::schema::identities;

/// Diesel-backed implementation of the identity repository port.
#[derive(Clone)]
pub struct DieselIdentityRepository {
    pool: DbPool,
}

impl DieselIdentityRepository {
    /// Create a new repository with the given connection pool.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use hunt_backend::outbound::persistence::{DbPool, DieselIdentityRepository, PoolConfig};
    ///
    /// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
    /// let pool = DbPool::new(PoolConfig::new("postgres://localhost/hunt")).await?;
    /// let repository = DieselIdentityRepository::new(pool);
    /// # let _ = repository;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityRepository for DieselIdentityRepository {
    async fn insert(&self, identity: &Identity) -> Result<Guarded<()>, RepositoryError> {
        let row = IdentityRow::from(identity);
        bounded(self.pool.query_timeout(), "identities.insert", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let inserted = diesel::insert_into(identities::table)
                .values(&row)
                .on_conflict(identities::email)
                .do_nothing()
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            Ok(Guarded::from_rows_affected(inserted))
        })
        .await
    }

    async fn find(&self, email: &Email) -> Result<Option<Identity>, RepositoryError> {
        let row = bounded(self.pool.query_timeout(), "identities.find", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            identities::table
                .filter(identities::email.eq(email.as_ref()))
                .select(IdentityRow::as_select())
                .first(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)
        })
        .await?;
        row.map(Identity::try_from).transpose()
    }

    async fn list(&self, page: PageRequest) -> Result<Page<Identity>, RepositoryError> {
        let (total, rows) = bounded(self.pool.query_timeout(), "identities.list", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let total: i64 = identities::table
                .count()
                .get_result(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            let rows: Vec<IdentityRow> = identities::table
                .order(identities::email.asc())
                .limit(i64::from(page.limit()))
                .offset(i64::try_from(page.offset()).unwrap_or(i64::MAX))
                .select(IdentityRow::as_select())
                .load(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            Ok((total, rows))
        })
        .await?;
        Ok(Page::new(
            convert_rows(rows)?,
            count_from_db(total, "identities.count")?,
            page,
        ))
    }

    async fn set_role(
        &self,
        email: &Email,
        role: Role,
    ) -> Result<Option<Identity>, RepositoryError> {
        let row = bounded(self.pool.query_timeout(), "identities.set_role", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            diesel::update(identities::table.filter(identities::email.eq(email.as_ref())))
                .set(identities::role.eq(role.as_str()))
                .returning(IdentityRow::as_returning())
                .get_result(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)
        })
        .await?;
        row.map(Identity::try_from).transpose()
    }

    async fn set_tier(
        &self,
        email: &Email,
        tier: Tier,
    ) -> Result<Option<Identity>, RepositoryError> {
        let row = bounded(self.pool.query_timeout(), "identities.set_tier", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            diesel::update(identities::table.filter(identities::email.eq(email.as_ref())))
                .set(identities::tier.eq(tier.as_str()))
                .returning(IdentityRow::as_returning())
                .get_result(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)
        })
        .await?;
        row.map(Identity::try_from).transpose()
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let total: i64 = bounded(self.pool.query_timeout(), "identities.count", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            identities::table
                .count()
                .get_result(&mut conn)
                .await
                .map_err(map_diesel_error)
        })
        .await?;
        count_from_db(total, "identities.count")
    }
}
