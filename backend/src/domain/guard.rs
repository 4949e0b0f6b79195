//! Idempotent mutation guard.
//!
//! Writes that carry a uniqueness key report whether storage applied them.
//! The check happens inside the write itself (a unique constraint with
//! `ON CONFLICT DO NOTHING`, or a row lock plus count inside one
//! transaction), never through a prior read, so concurrent requests for the
//! same key produce exactly one [`Guarded::Applied`].

use std::fmt;

use serde_json::json;

use super::{Email, Error, ListingId};

/// Outcome of a write guarded by a uniqueness key.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Guarded<T> {
    /// Storage performed the write and returned its result.
    Applied(T),
    /// The key already held a value; nothing was written.
    Rejected,
}

impl<T> Guarded<T> {
    /// Transform the applied value, leaving rejections untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Guarded<U> {
        match self {
            Self::Applied(value) => Guarded::Applied(f(value)),
            Self::Rejected => Guarded::Rejected,
        }
    }

    /// Whether the write happened.
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

impl Guarded<()> {
    /// Interpret the affected-row count of an `ON CONFLICT DO NOTHING` insert.
    pub fn from_rows_affected(rows: usize) -> Self {
        if rows == 0 {
            Self::Rejected
        } else {
            Self::Applied(())
        }
    }
}

/// Field(s) whose prior existence blocks a repeat mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UniquenessKey {
    /// One identity per email.
    Email(Email),
    /// One vote per voter and listing.
    Vote {
        /// Voting identity.
        voter: Email,
        /// Listing voted on.
        listing: ListingId,
    },
    /// One listing per free-tier owner.
    FreeTierOwner(Email),
    /// One payment record per provider transaction.
    PaymentTransaction(String),
    /// One coupon per code.
    CouponCode(String),
}

impl UniquenessKey {
    /// Stable identifier of the key kind, exposed in conflict details.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Email(_) => "email",
            Self::Vote { .. } => "vote",
            Self::FreeTierOwner(_) => "free_tier_owner",
            Self::PaymentTransaction(_) => "payment_transaction",
            Self::CouponCode(_) => "coupon_code",
        }
    }

    /// Client-facing message returned when the key is already taken.
    pub const fn conflict_message(&self) -> &'static str {
        match self {
            Self::Email(_) => "User already exists",
            Self::Vote { .. } => "You have already voted this product",
            Self::FreeTierOwner(_) => {
                "You have exceeded your post limit. Upgrade to premium to post more products."
            }
            Self::PaymentTransaction(_) => "Payment already recorded",
            Self::CouponCode(_) => "Coupon code already exists",
        }
    }
}

impl fmt::Display for UniquenessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email(email) | Self::FreeTierOwner(email) => {
                write!(f, "{}:{email}", self.kind())
            }
            Self::Vote { voter, listing } => write!(f, "vote:{voter}:{listing}"),
            Self::PaymentTransaction(id) | Self::CouponCode(id) => {
                write!(f, "{}:{id}", self.kind())
            }
        }
    }
}

/// Turn a guarded outcome into the applied value or a conflict error.
///
/// # Examples
/// ```
/// use hunt_backend::domain::{enforce, Email, ErrorCode, Guarded, UniquenessKey};
///
/// let key = UniquenessKey::Email(Email::new("a@x.com").unwrap());
/// assert_eq!(enforce(&key, Guarded::Applied(7)).unwrap(), 7);
///
/// let err = enforce::<()>(&key, Guarded::Rejected).unwrap_err();
/// assert_eq!(err.code(), ErrorCode::Conflict);
/// assert_eq!(err.message(), "User already exists");
/// ```
pub fn enforce<T>(key: &UniquenessKey, outcome: Guarded<T>) -> Result<T, Error> {
    match outcome {
        Guarded::Applied(value) => Ok(value),
        Guarded::Rejected => {
            tracing::info!(key = %key, "guarded mutation rejected");
            Err(Error::conflict(key.conflict_message()).with_details(json!({ "key": key.kind() })))
        }
    }
}
