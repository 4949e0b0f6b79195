//! Domain primitives, aggregates, and use-case services.
//!
//! Purpose: define strongly typed entities for the launch board (identities,
//! listings, reviews, coupons, payments) and the services that mutate them.
//! Services depend only on the traits in [`ports`]; adapters live under
//! `outbound` and transport concerns under `inbound`.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable identifier.
//! - CredentialVerifier: bearer credential issue and verification.
//! - RoleGate / Capability: authorization against the stored identity.
//! - Guarded / UniquenessKey: outcome of a mutation that may be rejected by a
//!   uniqueness rule, and the conflict it maps to.

pub mod capability;
pub mod coupon;
pub mod coupon_service;
pub mod credential;
pub mod error;
pub mod guard;
pub mod identity;
pub mod identity_service;
pub mod ids;
pub mod listing;
pub mod listing_service;
pub mod payment;
pub mod payment_service;
pub mod ports;
pub mod review;
pub mod review_service;
pub mod role_gate;
pub mod statistics_service;
pub mod trace_id;

#[cfg(test)]
pub(crate) mod test_support;

pub use self::capability::Capability;
pub use self::coupon::{
    Coupon, CouponCode, CouponDraft, CouponEdit, CouponValidationError, DiscountPercent,
};
pub use self::coupon_service::CouponService;
pub use self::credential::{
    CredentialClaims, CredentialVerifier, DEFAULT_CREDENTIAL_TTL, IdentityClaim,
    IssuedCredential, bearer_token,
};
pub use self::error::{Error, ErrorCode};
pub use self::guard::{Guarded, UniquenessKey, enforce};
pub use self::identity::{Email, Identity, IdentityValidationError, NewIdentity, Role, Tier};
pub use self::identity_service::IdentityService;
pub use self::ids::{CouponId, InvalidId, ListingId, ReviewId};
pub use self::listing::{
    Listing, ListingDraft, ListingEdit, ListingFilter, ListingStatus, ListingValidationError,
};
pub use self::listing_service::{
    FEATURED_LIMIT, FREE_TIER_LISTING_CAP, ListingService, TRENDING_LIMIT,
};
pub use self::payment::{
    CURRENCY, MIN_CHARGE_MINOR, PaymentConfirmation, PaymentIntent, PaymentQuote, PaymentRecord,
    PaymentValidationError, TransactionId,
};
pub use self::payment_service::{PaymentPorts, PaymentService};
pub use self::review::{Rating, Review, ReviewDraft, ReviewValidationError};
pub use self::review_service::ReviewService;
pub use self::role_gate::{FORBIDDEN_MESSAGE, RoleGate};
pub use self::statistics_service::{Statistics, StatisticsService};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use hunt_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
