//! Listing reviews.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use super::ports::{ListingRepository, ReviewRepository};
use super::{Error, IdentityClaim, ListingId, Review, ReviewDraft, ReviewId, RoleGate};

/// Use-cases over reviews.
#[derive(Clone)]
pub struct ReviewService {
    reviews: Arc<dyn ReviewRepository>,
    listings: Arc<dyn ListingRepository>,
    gate: RoleGate,
    clock: Arc<dyn Clock>,
}

impl ReviewService {
    /// Build the service.
    pub fn new(
        reviews: Arc<dyn ReviewRepository>,
        listings: Arc<dyn ListingRepository>,
        gate: RoleGate,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            reviews,
            listings,
            gate,
            clock,
        }
    }

    /// Post a review on an existing listing.
    pub async fn post(&self, claim: &IdentityClaim, draft: ReviewDraft) -> Result<Review, Error> {
        let reviewer = self.gate.identity(claim).await?;
        if self.listings.find(&draft.listing_id).await?.is_none() {
            return Err(Error::not_found("product not found"));
        }
        let review = Review {
            id: ReviewId::random(),
            listing_id: draft.listing_id,
            reviewer: reviewer.email,
            reviewer_name: reviewer.name,
            rating: draft.rating,
            comment: draft.comment,
            created_at: self.clock.utc(),
        };
        if !self.reviews.insert(&review).await? {
            return Err(Error::not_found("product not found"));
        }
        info!(review_id = %review.id, listing_id = %review.listing_id, "review posted");
        Ok(review)
    }

    /// Every review, newest first.
    pub async fn list_all(&self) -> Result<Vec<Review>, Error> {
        Ok(self.reviews.list_all().await?)
    }

    /// Reviews of one listing, newest first.
    pub async fn for_listing(&self, listing: &ListingId) -> Result<Vec<Review>, Error> {
        Ok(self.reviews.for_listing(listing).await?)
    }
}
