//! PostgreSQL-backed `ReviewRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::RunQueryDsl;

use crate::domain::ports::{RepositoryError, ReviewRepository};
use crate::domain::{ListingId, Review};

use super::diesel_helpers::{bounded, count_from_db, map_diesel_error, map_pool_error};
use super::models::{ReviewRow, convert_rows};
use super::pool::DbPool;
use super::schema::reviews;

/// Diesel-backed implementation of the review repository port.
#[derive(Clone)]
pub struct DieselReviewRepository {
    pool: DbPool,
}

impl DieselReviewRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewRepository for DieselReviewRepository {
    async fn insert(&self, review: &Review) -> Result<bool, RepositoryError> {
        let row = ReviewRow::from(review);
        bounded(self.pool.query_timeout(), "reviews.insert", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            match diesel::insert_into(reviews::table)
                .values(&row)
                .execute(&mut conn)
                .await
            {
                Ok(_) => Ok(true),
                // The listing vanished between lookup and insert.
                Err(DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)) => {
                    Ok(false)
                }
                Err(err) => Err(map_diesel_error(err)),
            }
        })
        .await
    }

    async fn list_all(&self) -> Result<Vec<Review>, RepositoryError> {
        let rows: Vec<ReviewRow> = bounded(self.pool.query_timeout(), "reviews.list_all", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            reviews::table
                .order((reviews::created_at.desc(), reviews::id.asc()))
                .select(ReviewRow::as_select())
                .load(&mut conn)
                .await
                .map_err(map_diesel_error)
        })
        .await?;
        convert_rows(rows)
    }

    async fn for_listing(&self, listing: &ListingId) -> Result<Vec<Review>, RepositoryError> {
        let rows: Vec<ReviewRow> =
            bounded(self.pool.query_timeout(), "reviews.for_listing", async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                reviews::table
                    .filter(reviews::listing_id.eq(listing.as_uuid()))
                    .order((reviews::created_at.desc(), reviews::id.asc()))
                    .select(ReviewRow::as_select())
                    .load(&mut conn)
                    .await
                    .map_err(map_diesel_error)
            })
            .await?;
        convert_rows(rows)
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let total: i64 = bounded(self.pool.query_timeout(), "reviews.count", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            reviews::table
                .count()
                .get_result(&mut conn)
                .await
                .map_err(map_diesel_error)
        })
        .await?;
        count_from_db(total, "reviews.count")
    }
}
