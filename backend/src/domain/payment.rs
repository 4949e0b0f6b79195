//! Premium payments: intent quotes and recorded transactions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Coupon, Email};

/// Currency every intent is created in.
pub const CURRENCY: &str = "usd";
/// Smallest chargeable amount in minor units after discounts.
pub const MIN_CHARGE_MINOR: u64 = 50;
/// Maximum transaction identifier length.
pub const TRANSACTION_ID_MAX: usize = 255;

/// Validation errors raised by payment payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentValidationError {
    /// Requested amount was zero.
    #[error("amount must be greater than zero")]
    ZeroAmount,
    /// Amount after discounts falls below [`MIN_CHARGE_MINOR`].
    #[error("amount after discount must be at least {min} minor units")]
    BelowMinimumCharge {
        /// Minimum chargeable amount.
        min: u64,
    },
    /// Transaction identifier blank or too long.
    #[error("transaction id must be between 1 and {max} characters")]
    InvalidTransactionId {
        /// Maximum accepted length.
        max: usize,
    },
}

/// Payment provider transaction identifier; unique across payment records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TransactionId(String);

impl TransactionId {
    /// Validate a provider transaction identifier.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, PaymentValidationError> {
        let id = raw.as_ref().trim();
        if id.is_empty() || id.chars().count() > TRANSACTION_ID_MAX {
            return Err(PaymentValidationError::InvalidTransactionId {
                max: TRANSACTION_ID_MAX,
            });
        }
        Ok(Self(id.to_owned()))
    }
}

impl AsRef<str> for TransactionId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<TransactionId> for String {
    fn from(value: TransactionId) -> Self {
        value.0
    }
}

impl TryFrom<String> for TransactionId {
    type Error = PaymentValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Amounts for a payment intent after applying an optional coupon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentQuote {
    /// Amount requested by the client, in minor units.
    pub requested_minor: u64,
    /// Discount applied, if a coupon was redeemed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percent: Option<u8>,
    /// Amount to charge, in minor units.
    pub amount_minor: u64,
    /// ISO currency code.
    pub currency: String,
}

impl PaymentQuote {
    /// Price a requested amount with an optional active coupon.
    ///
    /// # Examples
    /// ```
    /// use hunt_backend::domain::PaymentQuote;
    ///
    /// let quote = PaymentQuote::price(1000, None).expect("valid amount");
    /// assert_eq!(quote.amount_minor, 1000);
    /// assert_eq!(quote.currency, "usd");
    /// ```
    pub fn price(requested_minor: u64, coupon: Option<&Coupon>) -> Result<Self, PaymentValidationError> {
        if requested_minor == 0 {
            return Err(PaymentValidationError::ZeroAmount);
        }
        let discount = coupon.map(|c| c.discount_percent);
        let amount_minor = discount.map_or(requested_minor, |d| d.apply(requested_minor));
        if amount_minor < MIN_CHARGE_MINOR {
            return Err(PaymentValidationError::BelowMinimumCharge {
                min: MIN_CHARGE_MINOR,
            });
        }
        Ok(Self {
            requested_minor,
            discount_percent: discount.map(|d| d.get()),
            amount_minor,
            currency: CURRENCY.to_owned(),
        })
    }
}

/// Payment intent created with the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    /// Secret the client uses to complete the payment.
    pub client_secret: String,
    /// Priced amounts.
    #[serde(flatten)]
    pub quote: PaymentQuote,
}

/// Confirmed payment to record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentConfirmation {
    /// Provider transaction identifier.
    pub transaction_id: TransactionId,
    /// Amount paid, in minor units.
    pub amount_minor: u64,
}

/// Stored payment record. Its existence makes the payer premium.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    /// Provider transaction identifier.
    #[schema(value_type = String, example = "pi_3Nx...")]
    pub transaction_id: TransactionId,
    /// Payer email.
    #[schema(value_type = String)]
    pub email: Email,
    /// Amount paid, in minor units.
    pub amount_minor: u64,
    /// ISO currency code.
    pub currency: String,
    /// Recording time.
    pub created_at: DateTime<Utc>,
}
