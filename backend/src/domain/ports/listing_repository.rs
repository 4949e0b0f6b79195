//! Port abstraction for listing and vote persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Email, Guarded, Listing, ListingFilter, ListingId, ListingStatus};

use super::RepositoryError;

/// Result of an atomic vote attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    /// The vote was stored; carries the listing's new vote count.
    Counted(u64),
    /// This voter already voted on this listing.
    AlreadyVoted,
    /// The listing does not exist.
    ListingMissing,
}

/// Listing totals per moderation state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    /// Listings awaiting moderation.
    pub pending: u64,
    /// Accepted listings.
    pub accepted: u64,
    /// Rejected listings.
    pub rejected: u64,
}

impl StatusCounts {
    /// Increment the bucket for `status` by `by`.
    pub fn add(&mut self, status: ListingStatus, by: u64) {
        match status {
            ListingStatus::Pending => self.pending += by,
            ListingStatus::Accepted => self.accepted += by,
            ListingStatus::Rejected => self.rejected += by,
        }
    }

    /// Sum over every state.
    pub fn total(&self) -> u64 {
        self.pending + self.accepted + self.rejected
    }
}

/// Persistence for listings and their votes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// Insert a listing.
    ///
    /// With `owner_cap = Some(n)` the insert only happens when the owner
    /// holds fewer than `n` listings, checked under a lock on the owner so
    /// concurrent submissions cannot both pass.
    async fn insert(
        &self,
        listing: &Listing,
        owner_cap: Option<u64>,
    ) -> Result<Guarded<()>, RepositoryError>;

    /// Fetch a listing by id.
    async fn find(&self, id: &ListingId) -> Result<Option<Listing>, RepositoryError>;

    /// Page through listings matching `filter`, newest first.
    async fn list(
        &self,
        filter: &ListingFilter,
        page: PageRequest,
    ) -> Result<Page<Listing>, RepositoryError>;

    /// Latest featured or accepted listings, newest first.
    ///
    /// Pending and rejected listings only appear here once an admin has
    /// featured them; unmoderated submissions stay off the public home page.
    async fn featured(&self, limit: u32) -> Result<Vec<Listing>, RepositoryError>;

    /// Accepted listings with the most votes.
    ///
    /// Only accepted listings rank, whatever their vote count.
    async fn trending(&self, limit: u32) -> Result<Vec<Listing>, RepositoryError>;

    /// Every listing in review-queue order.
    async fn review_queue(&self) -> Result<Vec<Listing>, RepositoryError>;

    /// Listings flagged as reported, newest first.
    async fn reported(&self) -> Result<Vec<Listing>, RepositoryError>;

    /// Persist the descriptive fields of `listing`; `None` when it is gone.
    async fn save_details(&self, listing: &Listing) -> Result<Option<Listing>, RepositoryError>;

    /// Set the moderation state.
    async fn set_status(
        &self,
        id: &ListingId,
        status: ListingStatus,
    ) -> Result<Option<Listing>, RepositoryError>;

    /// Set the featured flag.
    async fn set_featured(
        &self,
        id: &ListingId,
        featured: bool,
    ) -> Result<Option<Listing>, RepositoryError>;

    /// Flag the listing as reported.
    async fn mark_reported(&self, id: &ListingId) -> Result<Option<Listing>, RepositoryError>;

    /// Delete the listing together with its votes and reviews.
    async fn delete(&self, id: &ListingId) -> Result<bool, RepositoryError>;

    /// Record a vote and increment the count in one atomic step.
    async fn cast_vote(
        &self,
        voter: &Email,
        listing: &ListingId,
        at: DateTime<Utc>,
    ) -> Result<VoteOutcome, RepositoryError>;

    /// Listing totals per moderation state.
    async fn status_counts(&self) -> Result<StatusCounts, RepositoryError>;

    /// Total stored votes.
    async fn vote_total(&self) -> Result<u64, RepositoryError>;
}
