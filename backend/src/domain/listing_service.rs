//! Listing submission, voting, moderation, and public reads.

use std::sync::Arc;

use mockable::Clock;
use pagination::{Page, PageRequest};
use tracing::info;

use super::ports::{ListingRepository, VoteOutcome};
use super::{
    Capability, Error, Guarded, IdentityClaim, Listing, ListingDraft, ListingEdit, ListingFilter,
    ListingId, ListingStatus, RoleGate, Tier, UniquenessKey, enforce,
};

/// Listings a free-tier owner may hold.
pub const FREE_TIER_LISTING_CAP: u64 = 1;
/// Size of the featured section.
pub const FEATURED_LIMIT: u32 = 4;
/// Size of the trending section.
pub const TRENDING_LIMIT: u32 = 6;

fn listing_not_found() -> Error {
    Error::not_found("product not found")
}

/// Use-cases over listings and votes.
#[derive(Clone)]
pub struct ListingService {
    listings: Arc<dyn ListingRepository>,
    gate: RoleGate,
    clock: Arc<dyn Clock>,
}

impl ListingService {
    /// Build the service.
    pub fn new(listings: Arc<dyn ListingRepository>, gate: RoleGate, clock: Arc<dyn Clock>) -> Self {
        Self {
            listings,
            gate,
            clock,
        }
    }

    /// Submit a listing. Free-tier owners are capped at one listing.
    pub async fn submit(&self, claim: &IdentityClaim, draft: ListingDraft) -> Result<Listing, Error> {
        let owner = self.gate.identity(claim).await?;
        let cap = match owner.tier {
            Tier::Free => Some(FREE_TIER_LISTING_CAP),
            Tier::Premium => None,
        };
        let listing = Listing::submit(ListingId::random(), owner.email.clone(), draft, self.clock.utc());
        let outcome = self.listings.insert(&listing, cap).await?;
        enforce(&UniquenessKey::FreeTierOwner(owner.email), outcome)?;
        info!(listing_id = %listing.id, owner = %listing.owner, "listing submitted");
        Ok(listing)
    }

    /// Listing details.
    pub async fn details(&self, id: &ListingId) -> Result<Listing, Error> {
        self.listings.find(id).await?.ok_or_else(listing_not_found)
    }

    /// Public paginated listing query.
    pub async fn list(&self, filter: &ListingFilter, page: PageRequest) -> Result<Page<Listing>, Error> {
        Ok(self.listings.list(filter, page).await?)
    }

    /// Featured section.
    pub async fn featured(&self) -> Result<Vec<Listing>, Error> {
        Ok(self.listings.featured(FEATURED_LIMIT).await?)
    }

    /// Trending section.
    pub async fn trending(&self) -> Result<Vec<Listing>, Error> {
        Ok(self.listings.trending(TRENDING_LIMIT).await?)
    }

    /// Moderator triage view.
    pub async fn review_queue(&self, claim: &IdentityClaim) -> Result<Vec<Listing>, Error> {
        self.gate.authorize(claim, Capability::Moderator).await?;
        Ok(self.listings.review_queue().await?)
    }

    /// Moderator view of reported listings.
    pub async fn reported(&self, claim: &IdentityClaim) -> Result<Vec<Listing>, Error> {
        self.gate.authorize(claim, Capability::Moderator).await?;
        Ok(self.listings.reported().await?)
    }

    /// Owner edit of descriptive fields.
    pub async fn edit(
        &self,
        claim: &IdentityClaim,
        id: &ListingId,
        edit: ListingEdit,
    ) -> Result<Listing, Error> {
        let mut listing = self.details(id).await?;
        if &listing.owner != claim.email() {
            return Err(Error::forbidden(super::FORBIDDEN_MESSAGE));
        }
        listing.apply(edit);
        self.listings
            .save_details(&listing)
            .await?
            .ok_or_else(listing_not_found)
    }

    /// Vote once per voter and listing; returns the new vote count.
    pub async fn vote(&self, claim: &IdentityClaim, id: &ListingId) -> Result<u64, Error> {
        let listing = self.details(id).await?;
        if &listing.owner == claim.email() {
            return Err(Error::invalid_request("You cannot vote on your own product"));
        }
        let key = UniquenessKey::Vote {
            voter: claim.email().clone(),
            listing: *id,
        };
        let outcome = match self.listings.cast_vote(claim.email(), id, self.clock.utc()).await? {
            VoteOutcome::Counted(count) => Guarded::Applied(count),
            VoteOutcome::AlreadyVoted => Guarded::Rejected,
            VoteOutcome::ListingMissing => return Err(listing_not_found()),
        };
        let count = enforce(&key, outcome)?;
        info!(listing_id = %id, voter = %claim.email(), vote_count = count, "vote counted");
        Ok(count)
    }

    /// Accept or reject a listing.
    pub async fn moderate(
        &self,
        claim: &IdentityClaim,
        id: &ListingId,
        status: ListingStatus,
    ) -> Result<Listing, Error> {
        let moderator = self.gate.authorize(claim, Capability::Moderator).await?;
        let listing = self
            .listings
            .set_status(id, status)
            .await?
            .ok_or_else(listing_not_found)?;
        info!(listing_id = %id, moderator = %moderator.email, %status, "listing moderated");
        Ok(listing)
    }

    /// Set or clear the featured flag.
    pub async fn feature(
        &self,
        claim: &IdentityClaim,
        id: &ListingId,
        featured: bool,
    ) -> Result<Listing, Error> {
        self.gate.authorize(claim, Capability::Moderator).await?;
        self.listings
            .set_featured(id, featured)
            .await?
            .ok_or_else(listing_not_found)
    }

    /// Flag a listing for moderator attention.
    pub async fn report(&self, claim: &IdentityClaim, id: &ListingId) -> Result<Listing, Error> {
        let listing = self
            .listings
            .mark_reported(id)
            .await?
            .ok_or_else(listing_not_found)?;
        info!(listing_id = %id, reporter = %claim.email(), "listing reported");
        Ok(listing)
    }

    /// Delete a listing; allowed for its owner or an admin.
    pub async fn delete(&self, claim: &IdentityClaim, id: &ListingId) -> Result<(), Error> {
        let listing = self.details(id).await?;
        if &listing.owner != claim.email() {
            self.gate.authorize(claim, Capability::Admin).await?;
        }
        if !self.listings.delete(id).await? {
            return Err(listing_not_found());
        }
        info!(listing_id = %id, actor = %claim.email(), "listing deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "listing_service_tests.rs"]
mod tests;
