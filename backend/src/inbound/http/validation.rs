//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every failure becomes `invalid_request` with `details.field` and
//! `details.code`, so clients can highlight the offending input.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::domain::{
    CouponValidationError, Email, Error, IdentityValidationError, InvalidId,
    ListingValidationError, PaymentValidationError, ReviewValidationError,
};

// Values of `details.code`.
const MISSING_FIELD: &str = "missing_field";
const INVALID_UUID: &str = "invalid_uuid";
const INVALID_TIMESTAMP: &str = "invalid_timestamp";
const INVALID_VALUE: &str = "invalid_value";

/// Wire name of a request field, as the client spelled it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }
}

fn reject(field: FieldName, code: &'static str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({ "field": field.0, "code": code }))
}

fn reject_value(field: FieldName, code: &'static str, message: String, value: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.0,
        "code": code,
        "value": value,
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    reject(field, MISSING_FIELD, format!("missing required field: {}", field.0))
}

/// Parse a UUID-backed identifier from a path or body value.
pub(crate) fn parse_id<T>(value: &str, field: FieldName) -> Result<T, Error>
where
    T: FromStr<Err = InvalidId>,
{
    value
        .parse()
        .map_err(|err: InvalidId| reject_value(field, INVALID_UUID, err.to_string(), value))
}

pub(crate) fn parse_email(value: &str, field: FieldName) -> Result<Email, Error> {
    Email::new(value).map_err(|err| invalid_value(field, &err))
}

pub(crate) fn parse_rfc3339_timestamp(
    value: &str,
    field: FieldName,
) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| {
            let message = format!("{} must be an RFC 3339 timestamp", field.0);
            reject_value(field, INVALID_TIMESTAMP, message, value)
        })
}

pub(crate) fn parse_optional_rfc3339_timestamp(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<DateTime<Utc>>, Error> {
    value
        .map(|raw| parse_rfc3339_timestamp(raw, field))
        .transpose()
}

/// A present field whose value the domain rejected.
pub(crate) fn invalid_value(field: FieldName, err: &dyn std::fmt::Display) -> Error {
    reject(field, INVALID_VALUE, err.to_string())
}

pub(crate) fn identity_error(err: IdentityValidationError) -> Error {
    let field = match err {
        IdentityValidationError::UnknownRole(_) => "role",
        IdentityValidationError::UnknownTier(_) => "tier",
        _ => "email",
    };
    invalid_value(FieldName::new(field), &err)
}

pub(crate) fn listing_error(err: ListingValidationError) -> Error {
    let field = match &err {
        ListingValidationError::EmptyName | ListingValidationError::NameTooLong { .. } => "name",
        ListingValidationError::DescriptionTooLong { .. } => "description",
        ListingValidationError::TooManyTags { .. } | ListingValidationError::InvalidTag { .. } => {
            "tags"
        }
        ListingValidationError::InvalidLink { field } => field,
        ListingValidationError::UnknownStatus(_) => "status",
        ListingValidationError::EmptyEdit => "body",
    };
    invalid_value(FieldName::new(field), &err)
}

pub(crate) fn review_error(err: ReviewValidationError) -> Error {
    let field = match err {
        ReviewValidationError::RatingOutOfRange => "rating",
        ReviewValidationError::EmptyComment | ReviewValidationError::CommentTooLong { .. } => {
            "comment"
        }
    };
    invalid_value(FieldName::new(field), &err)
}

pub(crate) fn coupon_error(err: CouponValidationError) -> Error {
    let field = match err {
        CouponValidationError::InvalidCode => "code",
        CouponValidationError::DiscountOutOfRange => "discountPercent",
        CouponValidationError::ExpiryInPast => "expiresAt",
        CouponValidationError::EmptyEdit => "body",
    };
    invalid_value(FieldName::new(field), &err)
}

pub(crate) fn payment_error(err: PaymentValidationError) -> Error {
    let field = match err {
        PaymentValidationError::InvalidTransactionId { .. } => "transactionId",
        _ => "amount",
    };
    invalid_value(FieldName::new(field), &err)
}
