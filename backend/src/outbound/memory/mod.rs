//! In-memory adapter implementing every repository port.
//!
//! All tables sit behind one `tokio::sync::Mutex`, so each compound write
//! (vote plus counter, payment plus tier upgrade, cap check plus insert) is
//! atomic with respect to concurrent requests. Used when no database is
//! configured and by HTTP integration tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};
use tokio::sync::Mutex;

use crate::domain::listing::{most_voted, newest_first, triage_order};
use crate::domain::ports::{
    CouponRepository, IdentityRepository, ListingRepository, PaymentRepository, PaymentTotals,
    RepositoryError, ReviewRepository, StatusCounts, VoteOutcome,
};
use crate::domain::{
    Coupon, CouponCode, CouponId, Email, Guarded, Identity, Listing, ListingFilter, ListingId,
    ListingStatus, PaymentRecord, Review, Role, Tier,
};

#[derive(Default)]
struct Tables {
    identities: BTreeMap<Email, Identity>,
    listings: HashMap<ListingId, Listing>,
    votes: HashSet<(Email, ListingId)>,
    reviews: Vec<Review>,
    payments: Vec<PaymentRecord>,
    coupons: HashMap<CouponId, Coupon>,
}

impl Tables {
    fn sorted_listings(
        &self,
        keep: impl Fn(&Listing) -> bool,
        order: fn(&Listing, &Listing) -> std::cmp::Ordering,
    ) -> Vec<Listing> {
        let mut rows: Vec<Listing> = self.listings.values().filter(|l| keep(l)).cloned().collect();
        rows.sort_by(order);
        rows
    }

    fn update_listing(
        &mut self,
        id: &ListingId,
        change: impl FnOnce(&mut Listing),
    ) -> Option<Listing> {
        let listing = self.listings.get_mut(id)?;
        change(listing);
        Some(listing.clone())
    }

    fn update_identity(
        &mut self,
        email: &Email,
        change: impl FnOnce(&mut Identity),
    ) -> Option<Identity> {
        let identity = self.identities.get_mut(email)?;
        change(identity);
        Some(identity.clone())
    }
}

/// Shared in-memory store; clones share the same tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an identity, bypassing the uniqueness guard. Tests
    /// use it to stage fixtures with a chosen role.
    pub async fn seed_identity(&self, identity: Identity) {
        let mut tables = self.tables.lock().await;
        tables.identities.insert(identity.email.clone(), identity);
    }
}

fn as_u64(n: usize) -> u64 {
    u64::try_from(n).unwrap_or(u64::MAX)
}

#[async_trait]
impl IdentityRepository for MemoryStore {
    async fn insert(&self, identity: &Identity) -> Result<Guarded<()>, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if tables.identities.contains_key(&identity.email) {
            return Ok(Guarded::Rejected);
        }
        tables
            .identities
            .insert(identity.email.clone(), identity.clone());
        Ok(Guarded::Applied(()))
    }

    async fn find(&self, email: &Email) -> Result<Option<Identity>, RepositoryError> {
        Ok(self.tables.lock().await.identities.get(email).cloned())
    }

    async fn list(&self, page: PageRequest) -> Result<Page<Identity>, RepositoryError> {
        let tables = self.tables.lock().await;
        let all: Vec<Identity> = tables.identities.values().cloned().collect();
        Ok(Page::from_ordered(all, page))
    }

    async fn set_role(
        &self,
        email: &Email,
        role: Role,
    ) -> Result<Option<Identity>, RepositoryError> {
        let mut tables = self.tables.lock().await;
        Ok(tables.update_identity(email, |identity| identity.role = role))
    }

    async fn set_tier(
        &self,
        email: &Email,
        tier: Tier,
    ) -> Result<Option<Identity>, RepositoryError> {
        let mut tables = self.tables.lock().await;
        Ok(tables.update_identity(email, |identity| identity.tier = tier))
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(as_u64(self.tables.lock().await.identities.len()))
    }
}

#[async_trait]
impl ListingRepository for MemoryStore {
    async fn insert(
        &self,
        listing: &Listing,
        owner_cap: Option<u64>,
    ) -> Result<Guarded<()>, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if let Some(cap) = owner_cap {
            let owned = tables
                .listings
                .values()
                .filter(|l| l.owner == listing.owner)
                .count();
            if as_u64(owned) >= cap {
                return Ok(Guarded::Rejected);
            }
        }
        tables.listings.insert(listing.id, listing.clone());
        Ok(Guarded::Applied(()))
    }

    async fn find(&self, id: &ListingId) -> Result<Option<Listing>, RepositoryError> {
        Ok(self.tables.lock().await.listings.get(id).cloned())
    }

    async fn list(
        &self,
        filter: &ListingFilter,
        page: PageRequest,
    ) -> Result<Page<Listing>, RepositoryError> {
        let tables = self.tables.lock().await;
        let rows = tables.sorted_listings(|l| filter.matches(l), newest_first);
        Ok(Page::from_ordered(rows, page))
    }

    async fn featured(&self, limit: u32) -> Result<Vec<Listing>, RepositoryError> {
        let tables = self.tables.lock().await;
        // Same visibility rule as the SQL adapter.
        let mut rows = tables.sorted_listings(
            |l| l.featured || l.status == ListingStatus::Accepted,
            newest_first,
        );
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn trending(&self, limit: u32) -> Result<Vec<Listing>, RepositoryError> {
        let tables = self.tables.lock().await;
        let mut rows = tables.sorted_listings(|l| l.status == ListingStatus::Accepted, most_voted);
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn review_queue(&self) -> Result<Vec<Listing>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables.sorted_listings(|_| true, triage_order))
    }

    async fn reported(&self) -> Result<Vec<Listing>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables.sorted_listings(|l| l.reported, newest_first))
    }

    async fn save_details(&self, listing: &Listing) -> Result<Option<Listing>, RepositoryError> {
        let mut tables = self.tables.lock().await;
        Ok(tables.update_listing(&listing.id, |stored| {
            stored.name.clone_from(&listing.name);
            stored.image_url.clone_from(&listing.image_url);
            stored.description.clone_from(&listing.description);
            stored.external_link.clone_from(&listing.external_link);
            stored.tags.clone_from(&listing.tags);
        }))
    }

    async fn set_status(
        &self,
        id: &ListingId,
        status: ListingStatus,
    ) -> Result<Option<Listing>, RepositoryError> {
        let mut tables = self.tables.lock().await;
        Ok(tables.update_listing(id, |listing| listing.status = status))
    }

    async fn set_featured(
        &self,
        id: &ListingId,
        featured: bool,
    ) -> Result<Option<Listing>, RepositoryError> {
        let mut tables = self.tables.lock().await;
        Ok(tables.update_listing(id, |listing| listing.featured = featured))
    }

    async fn mark_reported(&self, id: &ListingId) -> Result<Option<Listing>, RepositoryError> {
        let mut tables = self.tables.lock().await;
        Ok(tables.update_listing(id, |listing| listing.reported = true))
    }

    async fn delete(&self, id: &ListingId) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if tables.listings.remove(id).is_none() {
            return Ok(false);
        }
        tables.votes.retain(|(_, listing)| listing != id);
        tables.reviews.retain(|review| review.listing_id != *id);
        Ok(true)
    }

    async fn cast_vote(
        &self,
        voter: &Email,
        listing: &ListingId,
        _at: DateTime<Utc>,
    ) -> Result<VoteOutcome, RepositoryError> {
        let mut guard = self.tables.lock().await;
        let tables = &mut *guard;
        let Some(stored) = tables.listings.get_mut(listing) else {
            return Ok(VoteOutcome::ListingMissing);
        };
        if !tables.votes.insert((voter.clone(), *listing)) {
            return Ok(VoteOutcome::AlreadyVoted);
        }
        stored.vote_count += 1;
        Ok(VoteOutcome::Counted(stored.vote_count))
    }

    async fn status_counts(&self) -> Result<StatusCounts, RepositoryError> {
        let tables = self.tables.lock().await;
        let mut counts = StatusCounts::default();
        for listing in tables.listings.values() {
            counts.add(listing.status, 1);
        }
        Ok(counts)
    }

    async fn vote_total(&self) -> Result<u64, RepositoryError> {
        Ok(as_u64(self.tables.lock().await.votes.len()))
    }
}

#[async_trait]
impl ReviewRepository for MemoryStore {
    async fn insert(&self, review: &Review) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if !tables.listings.contains_key(&review.listing_id) {
            return Ok(false);
        }
        tables.reviews.push(review.clone());
        Ok(true)
    }

    async fn list_all(&self) -> Result<Vec<Review>, RepositoryError> {
        let tables = self.tables.lock().await;
        let mut rows = tables.reviews.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn for_listing(&self, listing: &ListingId) -> Result<Vec<Review>, RepositoryError> {
        let mut rows = ReviewRepository::list_all(self).await?;
        rows.retain(|review| review.listing_id == *listing);
        Ok(rows)
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(as_u64(self.tables.lock().await.reviews.len()))
    }
}

#[async_trait]
impl PaymentRepository for MemoryStore {
    async fn record_and_upgrade(
        &self,
        record: &PaymentRecord,
    ) -> Result<Guarded<()>, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if tables
            .payments
            .iter()
            .any(|p| p.transaction_id == record.transaction_id)
        {
            return Ok(Guarded::Rejected);
        }
        tables.payments.push(record.clone());
        tables.update_identity(&record.email, |identity| identity.tier = Tier::Premium);
        Ok(Guarded::Applied(()))
    }

    async fn for_payer(&self, email: &Email) -> Result<Vec<PaymentRecord>, RepositoryError> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<PaymentRecord> = tables
            .payments
            .iter()
            .filter(|p| p.email == *email)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn totals(&self) -> Result<PaymentTotals, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(PaymentTotals {
            count: as_u64(tables.payments.len()),
            revenue_minor: tables
                .payments
                .iter()
                .map(|p| p.amount_minor)
                .fold(0, u64::saturating_add),
        })
    }
}

#[async_trait]
impl CouponRepository for MemoryStore {
    async fn insert(&self, coupon: &Coupon) -> Result<Guarded<()>, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if tables.coupons.values().any(|c| c.code == coupon.code) {
            return Ok(Guarded::Rejected);
        }
        tables.coupons.insert(coupon.id, coupon.clone());
        Ok(Guarded::Applied(()))
    }

    async fn list(&self) -> Result<Vec<Coupon>, RepositoryError> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<Coupon> = tables.coupons.values().cloned().collect();
        rows.sort_by(|a, b| a.expires_at.cmp(&b.expires_at).then_with(|| a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn find(&self, id: &CouponId) -> Result<Option<Coupon>, RepositoryError> {
        Ok(self.tables.lock().await.coupons.get(id).cloned())
    }

    async fn find_by_code(&self, code: &CouponCode) -> Result<Option<Coupon>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables.coupons.values().find(|c| c.code == *code).cloned())
    }

    async fn save(&self, coupon: &Coupon) -> Result<Option<Coupon>, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let Some(stored) = tables.coupons.get_mut(&coupon.id) else {
            return Ok(None);
        };
        stored.discount_percent = coupon.discount_percent;
        stored.description.clone_from(&coupon.description);
        stored.expires_at = coupon.expires_at;
        Ok(Some(stored.clone()))
    }

    async fn delete(&self, id: &CouponId) -> Result<bool, RepositoryError> {
        Ok(self.tables.lock().await.coupons.remove(id).is_some())
    }
}
