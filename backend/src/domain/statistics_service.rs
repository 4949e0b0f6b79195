//! Administrator statistics.

use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use super::ports::{
    IdentityRepository, ListingRepository, PaymentRepository, PaymentTotals, ReviewRepository,
    StatusCounts,
};
use super::{Capability, Error, IdentityClaim, RoleGate};

/// Site-wide counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    /// Registered identities.
    pub identities: u64,
    /// Listings overall.
    pub listings: u64,
    /// Listings per moderation state.
    pub listings_by_status: StatusCounts,
    /// Votes cast.
    pub votes: u64,
    /// Reviews posted.
    pub reviews: u64,
    /// Payment figures.
    pub payments: PaymentTotals,
}

/// Read-only aggregation over every store.
#[derive(Clone)]
pub struct StatisticsService {
    identities: Arc<dyn IdentityRepository>,
    listings: Arc<dyn ListingRepository>,
    reviews: Arc<dyn ReviewRepository>,
    payments: Arc<dyn PaymentRepository>,
    gate: RoleGate,
}

impl StatisticsService {
    /// Build the service.
    pub fn new(
        identities: Arc<dyn IdentityRepository>,
        listings: Arc<dyn ListingRepository>,
        reviews: Arc<dyn ReviewRepository>,
        payments: Arc<dyn PaymentRepository>,
        gate: RoleGate,
    ) -> Self {
        Self {
            identities,
            listings,
            reviews,
            payments,
            gate,
        }
    }

    /// Collect every counter; admin only.
    pub async fn collect(&self, claim: &IdentityClaim) -> Result<Statistics, Error> {
        self.gate.authorize(claim, Capability::Admin).await?;
        let (identities, by_status, votes, reviews, payments) = tokio::try_join!(
            self.identities.count(),
            self.listings.status_counts(),
            self.listings.vote_total(),
            self.reviews.count(),
            self.payments.totals(),
        )?;
        Ok(Statistics {
            identities,
            listings: by_status.total(),
            listings_by_status: by_status,
            votes,
            reviews,
            payments,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::{
        MockIdentityRepository, MockListingRepository, MockPaymentRepository,
        MockReviewRepository,
    };
    use crate::domain::test_support::{claim, identity};
    use crate::domain::{ErrorCode, ListingStatus, Role, Tier};
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn admin_collects_counters() {
        let mut identities = MockIdentityRepository::new();
        identities
            .expect_find()
            .return_once(|_| Ok(Some(identity("root@x.com", Role::Admin, Tier::Free))));
        identities.expect_count().return_once(|| Ok(3));
        let identities: Arc<dyn IdentityRepository> = Arc::new(identities);

        let mut listings = MockListingRepository::new();
        listings.expect_status_counts().return_once(|| {
            let mut counts = StatusCounts::default();
            counts.add(ListingStatus::Pending, 2);
            counts.add(ListingStatus::Accepted, 1);
            Ok(counts)
        });
        listings.expect_vote_total().return_once(|| Ok(7));
        let mut reviews = MockReviewRepository::new();
        reviews.expect_count().return_once(|| Ok(4));
        let mut payments = MockPaymentRepository::new();
        payments.expect_totals().return_once(|| {
            Ok(PaymentTotals {
                count: 1,
                revenue_minor: 999,
            })
        });

        let service = StatisticsService::new(
            identities.clone(),
            Arc::new(listings),
            Arc::new(reviews),
            Arc::new(payments),
            RoleGate::new(identities),
        );
        let stats = service
            .collect(&claim("root@x.com"))
            .await
            .expect("admin collects");
        assert_eq!(stats.identities, 3);
        assert_eq!(stats.listings, 3);
        assert_eq!(stats.votes, 7);
        assert_eq!(stats.payments.revenue_minor, 999);
    }

    #[rstest]
    #[tokio::test]
    async fn moderator_is_forbidden() {
        let mut identities = MockIdentityRepository::new();
        identities
            .expect_find()
            .return_once(|_| Ok(Some(identity("mod@x.com", Role::Moderator, Tier::Free))));
        identities.expect_count().times(0);
        let identities: Arc<dyn IdentityRepository> = Arc::new(identities);

        let service = StatisticsService::new(
            identities.clone(),
            Arc::new(MockListingRepository::new()),
            Arc::new(MockReviewRepository::new()),
            Arc::new(MockPaymentRepository::new()),
            RoleGate::new(identities),
        );
        let err = service
            .collect(&claim("mod@x.com"))
            .await
            .expect_err("not admin");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }
}
