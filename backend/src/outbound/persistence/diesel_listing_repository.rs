//! PostgreSQL-backed `ListingRepository` implementation using Diesel ORM.
//!
//! Two writes are guarded inside a transaction:
//!
//! - Capped submissions lock the owner's identity row (`FOR UPDATE`) before
//!   counting their listings, so concurrent submissions from one owner are
//!   serialised and at most `cap` rows exist afterwards.
//! - Votes insert into `votes` with `ON CONFLICT DO NOTHING` and bump the
//!   denormalised counter in the same transaction, so the counter always
//!   equals the number of vote rows.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use pagination::{Page, PageRequest};
use tracing::debug;
use uuid::Uuid;

use crate::domain::listing::triage_order;
use crate::domain::ports::{ListingRepository, RepositoryError, StatusCounts, VoteOutcome};
use crate::domain::{Email, Guarded, Listing, ListingFilter, ListingId, ListingStatus};

use super::diesel_helpers::{bounded, count_from_db, map_diesel_error, map_pool_error};
use super::models::{ListingDetailsUpdate, ListingRow, NewVoteRow, convert_rows};
use super::pool::DbPool;
use super::schema::{identities, listings, votes};

/// Diesel-backed implementation of the listing repository port.
#[derive(Clone)]
pub struct DieselListingRepository {
    pool: DbPool,
}

impl DieselListingRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn filtered(filter: &ListingFilter) -> listings::BoxedQuery<'static, Pg> {
    let mut query = listings::table.into_boxed();
    if let Some(tag) = &filter.tag {
        query = query.filter(listings::tags.contains(vec![tag.clone()]));
    }
    if let Some(status) = filter.status {
        query = query.filter(listings::status.eq(status.as_str()));
    }
    query
}

enum RawVote {
    Missing,
    Duplicate,
    Counted(i64),
}

#[async_trait]
impl ListingRepository for DieselListingRepository {
    async fn insert(
        &self,
        listing: &Listing,
        owner_cap: Option<u64>,
    ) -> Result<Guarded<()>, RepositoryError> {
        let row = ListingRow::try_from_listing(listing)?;
        let cap = owner_cap.map(|cap| i64::try_from(cap).unwrap_or(i64::MAX));
        bounded(self.pool.query_timeout(), "listings.insert", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            conn.transaction(|conn| {
                async move {
                    if let Some(cap) = cap {
                        identities::table
                            .filter(identities::email.eq(&row.owner_email))
                            .select(identities::email)
                            .for_update()
                            .first::<String>(conn)
                            .await
                            .optional()?;
                        let owned: i64 = listings::table
                            .filter(listings::owner_email.eq(&row.owner_email))
                            .count()
                            .get_result(conn)
                            .await?;
                        if owned >= cap {
                            debug!(owned, cap, "listing cap reached");
                            return Ok(Guarded::Rejected);
                        }
                    }
                    diesel::insert_into(listings::table)
                        .values(&row)
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

    async fn find(&self, id: &ListingId) -> Result<Option<Listing>, RepositoryError> {
        let row = bounded(self.pool.query_timeout(), "listings.find", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            listings::table
                .find(id.as_uuid())
                .select(ListingRow::as_select())
                .first(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)
        })
        .await?;
        row.map(Listing::try_from).transpose()
    }

    async fn list(
        &self,
        filter: &ListingFilter,
        page: PageRequest,
    ) -> Result<Page<Listing>, RepositoryError> {
        let (total, rows) = bounded(self.pool.query_timeout(), "listings.list", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let total: i64 = filtered(filter)
                .count()
                .get_result(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            let rows: Vec<ListingRow> = filtered(filter)
                .order((listings::created_at.desc(), listings::id.asc()))
                .limit(i64::from(page.limit()))
                .offset(i64::try_from(page.offset()).unwrap_or(i64::MAX))
                .select(ListingRow::as_select())
                .load(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            Ok((total, rows))
        })
        .await?;
        Ok(Page::new(
            convert_rows(rows)?,
            count_from_db(total, "listings.count")?,
            page,
        ))
    }

    async fn featured(&self, limit: u32) -> Result<Vec<Listing>, RepositoryError> {
        let rows: Vec<ListingRow> = bounded(self.pool.query_timeout(), "listings.featured", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            // Featured flag or accepted status; never raw pending rows.
            listings::table
                .filter(
                    listings::featured
                        .eq(true)
                        .or(listings::status.eq(ListingStatus::Accepted.as_str())),
                )
                .order((listings::created_at.desc(), listings::id.asc()))
                .limit(i64::from(limit))
                .select(ListingRow::as_select())
                .load(&mut conn)
                .await
                .map_err(map_diesel_error)
        })
        .await?;
        convert_rows(rows)
    }

    async fn trending(&self, limit: u32) -> Result<Vec<Listing>, RepositoryError> {
        let rows: Vec<ListingRow> = bounded(self.pool.query_timeout(), "listings.trending", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            // Moderated listings only; votes on pending rows do not rank.
            listings::table
                .filter(listings::status.eq(ListingStatus::Accepted.as_str()))
                .order((
                    listings::vote_count.desc(),
                    listings::created_at.desc(),
                    listings::id.asc(),
                ))
                .limit(i64::from(limit))
                .select(ListingRow::as_select())
                .load(&mut conn)
                .await
                .map_err(map_diesel_error)
        })
        .await?;
        convert_rows(rows)
    }

    async fn review_queue(&self) -> Result<Vec<Listing>, RepositoryError> {
        let rows: Vec<ListingRow> =
            bounded(self.pool.query_timeout(), "listings.review_queue", async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                listings::table
                    .order((listings::created_at.asc(), listings::id.asc()))
                    .select(ListingRow::as_select())
                    .load(&mut conn)
                    .await
                    .map_err(map_diesel_error)
            })
            .await?;
        let mut queue: Vec<Listing> = convert_rows(rows)?;
        queue.sort_by(triage_order);
        Ok(queue)
    }

    async fn reported(&self) -> Result<Vec<Listing>, RepositoryError> {
        let rows: Vec<ListingRow> = bounded(self.pool.query_timeout(), "listings.reported", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            listings::table
                .filter(listings::reported.eq(true))
                .order((listings::created_at.desc(), listings::id.asc()))
                .select(ListingRow::as_select())
                .load(&mut conn)
                .await
                .map_err(map_diesel_error)
        })
        .await?;
        convert_rows(rows)
    }

    async fn save_details(&self, listing: &Listing) -> Result<Option<Listing>, RepositoryError> {
        let row = bounded(self.pool.query_timeout(), "listings.save_details", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            diesel::update(listings::table.find(listing.id.as_uuid()))
                .set(ListingDetailsUpdate::from(listing))
                .returning(ListingRow::as_returning())
                .get_result(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)
        })
        .await?;
        row.map(Listing::try_from).transpose()
    }

    async fn set_status(
        &self,
        id: &ListingId,
        status: ListingStatus,
    ) -> Result<Option<Listing>, RepositoryError> {
        let row = bounded(self.pool.query_timeout(), "listings.set_status", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            diesel::update(listings::table.find(id.as_uuid()))
                .set(listings::status.eq(status.as_str()))
                .returning(ListingRow::as_returning())
                .get_result(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)
        })
        .await?;
        row.map(Listing::try_from).transpose()
    }

    async fn set_featured(
        &self,
        id: &ListingId,
        featured: bool,
    ) -> Result<Option<Listing>, RepositoryError> {
        let row = bounded(self.pool.query_timeout(), "listings.set_featured", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            diesel::update(listings::table.find(id.as_uuid()))
                .set(listings::featured.eq(featured))
                .returning(ListingRow::as_returning())
                .get_result(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)
        })
        .await?;
        row.map(Listing::try_from).transpose()
    }

    async fn mark_reported(&self, id: &ListingId) -> Result<Option<Listing>, RepositoryError> {
        let row = bounded(self.pool.query_timeout(), "listings.mark_reported", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            diesel::update(listings::table.find(id.as_uuid()))
                .set(listings::reported.eq(true))
                .returning(ListingRow::as_returning())
                .get_result(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)
        })
        .await?;
        row.map(Listing::try_from).transpose()
    }

    async fn delete(&self, id: &ListingId) -> Result<bool, RepositoryError> {
        // Votes and reviews go with the listing through ON DELETE CASCADE.
        let removed = bounded(self.pool.query_timeout(), "listings.delete", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            diesel::delete(listings::table.find(id.as_uuid()))
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)
        })
        .await?;
        Ok(removed > 0)
    }

    async fn cast_vote(
        &self,
        voter: &Email,
        listing: &ListingId,
        at: DateTime<Utc>,
    ) -> Result<VoteOutcome, RepositoryError> {
        let listing_id = *listing.as_uuid();
        let raw = bounded(self.pool.query_timeout(), "listings.cast_vote", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            conn.transaction(|conn| {
                async move {
                    let exists = listings::table
                        .find(listing_id)
                        .select(listings::id)
                        .for_no_key_update()
                        .first::<Uuid>(conn)
                        .await
                        .optional()?;
                    if exists.is_none() {
                        return Ok(RawVote::Missing);
                    }
                    let inserted = diesel::insert_into(votes::table)
                        .values(NewVoteRow {
                            voter_email: voter.as_ref(),
                            listing_id,
                            created_at: at,
                        })
                        .on_conflict((votes::voter_email, votes::listing_id))
                        .do_nothing()
                        .execute(conn)
                        .await?;
                    if inserted == 0 {
                        return Ok(RawVote::Duplicate);
                    }
                    let count = diesel::update(listings::table.find(listing_id))
                        .set(listings::vote_count.eq(listings::vote_count + 1))
                        .returning(listings::vote_count)
                        .get_result::<i64>(conn)
                        .await?;
                    Ok(RawVote::Counted(count))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)
        })
        .await?;
        Ok(match raw {
            RawVote::Missing => VoteOutcome::ListingMissing,
            RawVote::Duplicate => VoteOutcome::AlreadyVoted,
            RawVote::Counted(count) => {
                VoteOutcome::Counted(count_from_db(count, "listings.vote_count")?)
            }
        })
    }

    async fn status_counts(&self) -> Result<StatusCounts, RepositoryError> {
        let rows: Vec<(String, i64)> =
            bounded(self.pool.query_timeout(), "listings.status_counts", async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                listings::table
                    .group_by(listings::status)
                    .select((listings::status, diesel::dsl::count_star()))
                    .load(&mut conn)
                    .await
                    .map_err(map_diesel_error)
            })
            .await?;
        let mut counts = StatusCounts::default();
        for (status, count) in rows {
            let status: ListingStatus = status
                .parse()
                .map_err(|_| RepositoryError::corrupt(format!("listings.status: {status}")))?;
            counts.add(status, count_from_db(count, "listings.status_count")?);
        }
        Ok(counts)
    }

    async fn vote_total(&self) -> Result<u64, RepositoryError> {
        let total: i64 = bounded(self.pool.query_timeout(), "votes.count", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            votes::table
                .count()
                .get_result(&mut conn)
                .await
                .map_err(map_diesel_error)
        })
        .await?;
        count_from_db(total, "votes.count")
    }
}
