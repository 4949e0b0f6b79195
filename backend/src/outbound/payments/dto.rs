//! Wire shapes for the payment provider's intent endpoint.

use serde::{Deserialize, Serialize};

/// Form body for `POST /v1/payment_intents`.
#[derive(Debug, Serialize)]
pub(super) struct CreateIntentForm<'a> {
    pub(super) amount: u64,
    pub(super) currency: &'a str,
    pub(super) receipt_email: &'a str,
    #[serde(rename = "payment_method_types[]")]
    pub(super) payment_method_types: &'a str,
    #[serde(rename = "metadata[discount_percent]", skip_serializing_if = "Option::is_none")]
    pub(super) discount_percent: Option<u8>,
}

/// The subset of the intent object the backend reads.
#[derive(Debug, Deserialize)]
pub(super) struct IntentResponseDto {
    pub(super) client_secret: Option<String>,
}
