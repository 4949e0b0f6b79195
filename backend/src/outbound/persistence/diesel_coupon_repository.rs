//! PostgreSQL-backed `CouponRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{CouponRepository, RepositoryError};
use crate::domain::{Coupon, CouponCode, CouponId, Guarded};

use super::diesel_helpers::{bounded, map_diesel_error, map_pool_error};
use super::models::{CouponRow, CouponUpdate, convert_rows};
use super::pool::DbPool;
use super::schema::coupons;

/// Diesel-backed implementation of the coupon repository port.
#[derive(Clone)]
pub struct DieselCouponRepository {
    pool: DbPool,
}

impl DieselCouponRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CouponRepository for DieselCouponRepository {
    async fn insert(&self, coupon: &Coupon) -> Result<Guarded<()>, RepositoryError> {
        let row = CouponRow::from(coupon);
        bounded(self.pool.query_timeout(), "coupons.insert", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let inserted = diesel::insert_into(coupons::table)
                .values(&row)
                .on_conflict(coupons::code)
                .do_nothing()
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            Ok(Guarded::from_rows_affected(inserted))
        })
        .await
    }

    async fn list(&self) -> Result<Vec<Coupon>, RepositoryError> {
        let rows: Vec<CouponRow> = bounded(self.pool.query_timeout(), "coupons.list", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            coupons::table
                .order((coupons::expires_at.asc(), coupons::id.asc()))
                .select(CouponRow::as_select())
                .load(&mut conn)
                .await
                .map_err(map_diesel_error)
        })
        .await?;
        convert_rows(rows)
    }

    async fn find(&self, id: &CouponId) -> Result<Option<Coupon>, RepositoryError> {
        let row = bounded(self.pool.query_timeout(), "coupons.find", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            coupons::table
                .find(id.as_uuid())
                .select(CouponRow::as_select())
                .first(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)
        })
        .await?;
        row.map(Coupon::try_from).transpose()
    }

    async fn find_by_code(&self, code: &CouponCode) -> Result<Option<Coupon>, RepositoryError> {
        let row = bounded(self.pool.query_timeout(), "coupons.find_by_code", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            coupons::table
                .filter(coupons::code.eq(code.as_ref()))
                .select(CouponRow::as_select())
                .first(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)
        })
        .await?;
        row.map(Coupon::try_from).transpose()
    }

    async fn save(&self, coupon: &Coupon) -> Result<Option<Coupon>, RepositoryError> {
        let row = bounded(self.pool.query_timeout(), "coupons.save", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            diesel::update(coupons::table.find(coupon.id.as_uuid()))
                .set(CouponUpdate::from(coupon))
                .returning(CouponRow::as_returning())
                .get_result(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)
        })
        .await?;
        row.map(Coupon::try_from).transpose()
    }

    async fn delete(&self, id: &CouponId) -> Result<bool, RepositoryError> {
        let removed = bounded(self.pool.query_timeout(), "coupons.delete", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            diesel::delete(coupons::table.find(id.as_uuid()))
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)
        })
        .await?;
        Ok(removed > 0)
    }
}
