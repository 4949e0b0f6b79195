//! Port abstraction for coupon persistence.

use async_trait::async_trait;

use crate::domain::{Coupon, CouponCode, CouponId, Guarded};

use super::RepositoryError;

/// Persistence for discount coupons.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CouponRepository: Send + Sync {
    /// Insert a coupon unless its code is taken.
    async fn insert(&self, coupon: &Coupon) -> Result<Guarded<()>, RepositoryError>;

    /// Every coupon, soonest expiry first.
    async fn list(&self) -> Result<Vec<Coupon>, RepositoryError>;

    /// Fetch by id.
    async fn find(&self, id: &CouponId) -> Result<Option<Coupon>, RepositoryError>;

    /// Fetch by code.
    async fn find_by_code(&self, code: &CouponCode) -> Result<Option<Coupon>, RepositoryError>;

    /// Persist the mutable fields; `None` when the coupon is gone.
    async fn save(&self, coupon: &Coupon) -> Result<Option<Coupon>, RepositoryError>;

    /// Delete by id; `false` when nothing was deleted.
    async fn delete(&self, id: &CouponId) -> Result<bool, RepositoryError>;
}
