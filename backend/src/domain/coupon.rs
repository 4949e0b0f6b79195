//! Discount coupons managed by administrators and applied to payments.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::CouponId;

/// Validation errors raised by coupon payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CouponValidationError {
    /// Code is not 3 to 32 letters, digits, `-` or `_`.
    #[error("coupon code must be 3-32 letters, digits, '-' or '_'")]
    InvalidCode,
    /// Discount outside 1..=100.
    #[error("discount must be between 1 and 100 percent")]
    DiscountOutOfRange,
    /// Expiry does not lie in the future.
    #[error("expiry must be in the future")]
    ExpiryInPast,
    /// An edit carried no fields.
    #[error("edit must change at least one field")]
    EmptyEdit,
}

static CODE_RE: OnceLock<Regex> = OnceLock::new();

fn code_regex() -> &'static Regex {
    CODE_RE.get_or_init(|| {
        Regex::new("^[A-Z0-9_-]{3,32}$")
            .unwrap_or_else(|error| panic!("coupon code regex failed to compile: {error}"))
    })
}

/// Upper-cased coupon code; unique across coupons.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CouponCode(String);

impl CouponCode {
    /// Validate and upper-case a code.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, CouponValidationError> {
        let code = raw.as_ref().trim().to_uppercase();
        if !code_regex().is_match(&code) {
            return Err(CouponValidationError::InvalidCode);
        }
        Ok(Self(code))
    }
}

impl AsRef<str> for CouponCode {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CouponCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<CouponCode> for String {
    fn from(value: CouponCode) -> Self {
        value.0
    }
}

impl TryFrom<String> for CouponCode {
    type Error = CouponValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Whole-number discount percentage between 1 and 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DiscountPercent(u8);

impl DiscountPercent {
    /// Validate a percentage.
    pub const fn new(value: u8) -> Result<Self, CouponValidationError> {
        if value >= 1 && value <= 100 {
            Ok(Self(value))
        } else {
            Err(CouponValidationError::DiscountOutOfRange)
        }
    }

    /// Raw percentage.
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Amount left after the discount, rounding the discount down.
    pub const fn apply(self, amount_minor: u64) -> u64 {
        let discount = amount_minor.saturating_mul(self.0 as u64) / 100;
        amount_minor - discount
    }
}

impl TryFrom<u8> for DiscountPercent {
    type Error = CouponValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DiscountPercent> for u8 {
    fn from(value: DiscountPercent) -> Self {
        value.0
    }
}

/// Stored coupon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    /// Coupon identifier.
    #[schema(value_type = String)]
    pub id: CouponId,
    /// Unique upper-cased code.
    #[schema(value_type = String, example = "LAUNCH20")]
    pub code: CouponCode,
    /// Discount applied to payment intents.
    #[schema(value_type = u8, minimum = 1, maximum = 100)]
    pub discount_percent: DiscountPercent,
    /// Free-form description.
    pub description: String,
    /// Instant after which the coupon no longer applies.
    pub expires_at: DateTime<Utc>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Coupon {
    /// Whether the coupon can be redeemed at `now`.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }

    /// Apply an administrator edit.
    pub fn apply(&mut self, edit: CouponEdit) {
        if let Some(discount) = edit.discount_percent {
            self.discount_percent = discount;
        }
        if let Some(description) = edit.description {
            self.description = description;
        }
        if let Some(expires_at) = edit.expires_at {
            self.expires_at = expires_at;
        }
    }
}

/// Validated coupon creation payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponDraft {
    /// Unique code.
    pub code: CouponCode,
    /// Discount percentage.
    pub discount_percent: DiscountPercent,
    /// Free-form description.
    pub description: String,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
}

impl CouponDraft {
    /// Validate a creation payload against the current time.
    pub fn new(
        code: &str,
        discount_percent: u8,
        description: Option<&str>,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Self, CouponValidationError> {
        if expires_at <= now {
            return Err(CouponValidationError::ExpiryInPast);
        }
        Ok(Self {
            code: CouponCode::new(code)?,
            discount_percent: DiscountPercent::new(discount_percent)?,
            description: description.map(str::trim).unwrap_or_default().to_owned(),
            expires_at,
        })
    }

    /// Stored form of the draft.
    pub fn into_coupon(self, id: CouponId, now: DateTime<Utc>) -> Coupon {
        Coupon {
            id,
            code: self.code,
            discount_percent: self.discount_percent,
            description: self.description,
            expires_at: self.expires_at,
            created_at: now,
        }
    }
}

/// Validated coupon edit; the code itself is immutable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CouponEdit {
    discount_percent: Option<DiscountPercent>,
    description: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

impl CouponEdit {
    /// Validate an edit payload, requiring at least one field.
    pub fn new(
        discount_percent: Option<u8>,
        description: Option<&str>,
        expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<Self, CouponValidationError> {
        if expires_at.is_some_and(|at| at <= now) {
            return Err(CouponValidationError::ExpiryInPast);
        }
        let edit = Self {
            discount_percent: discount_percent.map(DiscountPercent::new).transpose()?,
            description: description.map(|d| d.trim().to_owned()),
            expires_at,
        };
        if edit == Self::default() {
            return Err(CouponValidationError::EmptyEdit);
        }
        Ok(edit)
    }
}
