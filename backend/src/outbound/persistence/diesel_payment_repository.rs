//! PostgreSQL-backed `PaymentRepository` implementation using Diesel ORM.
//!
//! Recording a payment and upgrading the payer's tier happen in one
//! transaction keyed by the provider's transaction id: a replayed
//! confirmation inserts nothing and leaves the tier untouched.

use async_trait::async_trait;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{PaymentRepository, PaymentTotals, RepositoryError};
use crate::domain::{Email, Guarded, PaymentRecord, Tier};

use super::diesel_helpers::{bounded, count_from_db, map_diesel_error, map_pool_error};
use super::models::{PaymentRow, convert_rows};
use super::pool::DbPool;
use super::schema::{identities, payments};

/// Diesel-backed implementation of the payment repository port.
#[derive(Clone)]
pub struct DieselPaymentRepository {
    pool: DbPool,
}

impl DieselPaymentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentRepository for DieselPaymentRepository {
    async fn record_and_upgrade(
        &self,
        record: &PaymentRecord,
    ) -> Result<Guarded<()>, RepositoryError> {
        let row = PaymentRow::try_from_record(record)?;
        bounded(self.pool.query_timeout(), "payments.record_and_upgrade", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            conn.transaction(|conn| {
                async move {
                    let inserted = diesel::insert_into(payments::table)
                        .values(&row)
                        .on_conflict(payments::transaction_id)
                        .do_nothing()
                        .execute(conn)
                        .await?;
                    if inserted == 0 {
                        return Ok(Guarded::Rejected);
                    }
                    diesel::update(identities::table.find(&row.email))
                        .set(identities::tier.eq(Tier::Premium.as_str()))
                        .execute(conn)
                        .await?;
                    Ok(Guarded::Applied(()))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)
        })
        .await
    }

    async fn for_payer(&self, email: &Email) -> Result<Vec<PaymentRecord>, RepositoryError> {
        let rows: Vec<PaymentRow> = bounded(self.pool.query_timeout(), "payments.for_payer", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            payments::table
                .filter(payments::email.eq(email.as_ref()))
                .order(payments::created_at.desc())
                .select(PaymentRow::as_select())
                .load(&mut conn)
                .await
                .map_err(map_diesel_error)
        })
        .await?;
        convert_rows(rows)
    }

    async fn totals(&self) -> Result<PaymentTotals, RepositoryError> {
        let (count, revenue): (i64, i64) =
            bounded(self.pool.query_timeout(), "payments.totals", async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let count: i64 = payments::table
                    .count()
                    .get_result(&mut conn)
                    .await
                    .map_err(map_diesel_error)?;
                // SUM(bigint) yields NUMERIC; cast back to stay within i64.
                let revenue = payments::table
                    .select(sql::<BigInt>("COALESCE(SUM(amount_minor), 0)::BIGINT"))
                    .first::<i64>(&mut conn)
                    .await
                    .map_err(map_diesel_error)?;
                Ok((count, revenue))
            })
            .await?;
        Ok(PaymentTotals {
            count: count_from_db(count, "payments.count")?,
            revenue_minor: count_from_db(revenue, "payments.revenue")?,
        })
    }
}
