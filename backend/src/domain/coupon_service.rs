//! Coupon administration and redemption checks.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use super::ports::CouponRepository;
use super::{
    Capability, Coupon, CouponCode, CouponDraft, CouponEdit, CouponId, Error, IdentityClaim,
    RoleGate, UniquenessKey, enforce,
};

fn coupon_not_found() -> Error {
    Error::not_found("coupon not found")
}

/// Use-cases over coupons.
#[derive(Clone)]
pub struct CouponService {
    coupons: Arc<dyn CouponRepository>,
    gate: RoleGate,
    clock: Arc<dyn Clock>,
}

impl CouponService {
    /// Build the service.
    pub fn new(coupons: Arc<dyn CouponRepository>, gate: RoleGate, clock: Arc<dyn Clock>) -> Self {
        Self {
            coupons,
            gate,
            clock,
        }
    }

    /// Current time according to the service clock.
    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.utc()
    }

    /// Create a coupon; a repeated code is a conflict.
    pub async fn create(&self, claim: &IdentityClaim, draft: CouponDraft) -> Result<Coupon, Error> {
        self.gate.authorize(claim, Capability::Admin).await?;
        let key = UniquenessKey::CouponCode(draft.code.to_string());
        let now = self.clock.utc();
        let coupon = draft.into_coupon(CouponId::random(), now);
        enforce(&key, self.coupons.insert(&coupon).await?)?;
        info!(coupon_id = %coupon.id, code = %coupon.code, "coupon created");
        Ok(coupon)
    }

    /// Every coupon.
    pub async fn list(&self, claim: &IdentityClaim) -> Result<Vec<Coupon>, Error> {
        self.gate.authorize(claim, Capability::Admin).await?;
        Ok(self.coupons.list().await?)
    }

    /// Edit discount, description, or expiry.
    pub async fn edit(
        &self,
        claim: &IdentityClaim,
        id: &CouponId,
        edit: CouponEdit,
    ) -> Result<Coupon, Error> {
        self.gate.authorize(claim, Capability::Admin).await?;
        let mut coupon = self.coupons.find(id).await?.ok_or_else(coupon_not_found)?;
        coupon.apply(edit);
        self.coupons.save(&coupon).await?.ok_or_else(coupon_not_found)
    }

    /// Delete a coupon.
    pub async fn delete(&self, claim: &IdentityClaim, id: &CouponId) -> Result<(), Error> {
        self.gate.authorize(claim, Capability::Admin).await?;
        if !self.coupons.delete(id).await? {
            return Err(coupon_not_found());
        }
        info!(coupon_id = %id, "coupon deleted");
        Ok(())
    }

    /// Look up a redeemable coupon by code; unknown or expired is not found.
    pub async fn validate(&self, code: &CouponCode) -> Result<Coupon, Error> {
        self.coupons
            .find_by_code(code)
            .await?
            .filter(|coupon| coupon.is_active(self.clock.utc()))
            .ok_or_else(|| Error::not_found("coupon not found or expired"))
    }
}
