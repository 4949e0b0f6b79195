//! Payment API handlers.
//!
//! ```text
//! POST /api/v1/payment-intent       {"amount":1000,"couponCode":"LAUNCH20"}
//! POST /api/v1/payment-confirmation {"transactionId":"pi_123","amount":800}
//! GET  /api/v1/payments/mine
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{
    CouponCode, Error, PaymentConfirmation, PaymentIntent, PaymentRecord, PaymentValidationError,
    TransactionId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, coupon_error, missing_field_error, payment_error,
};

/// Body for `POST /api/v1/payment-intent`. Amounts are in minor units.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentRequest {
    pub amount: u64,
    #[serde(default)]
    pub coupon_code: Option<String>,
}

/// Body for `POST /api/v1/payment-confirmation`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfirmationRequest {
    #[serde(default)]
    pub transaction_id: Option<String>,
    pub amount: u64,
}

impl TryFrom<&PaymentConfirmationRequest> for PaymentConfirmation {
    type Error = Error;

    fn try_from(value: &PaymentConfirmationRequest) -> Result<Self, Self::Error> {
        let raw = value
            .transaction_id
            .as_deref()
            .ok_or_else(|| missing_field_error(FieldName::new("transactionId")))?;
        if value.amount == 0 {
            return Err(payment_error(PaymentValidationError::ZeroAmount));
        }
        Ok(Self {
            transaction_id: TransactionId::new(raw).map_err(payment_error)?,
            amount_minor: value.amount,
        })
    }
}

/// Open a payment intent for premium access.
#[utoipa::path(
    post,
    path = "/api/v1/payment-intent",
    request_body = PaymentIntentRequest,
    responses(
        (status = 200, description = "Intent created", body = PaymentIntent),
        (status = 400, description = "Invalid amount or coupon code", body = Error),
        (status = 404, description = "Coupon unknown or expired", body = Error),
        (status = 503, description = "Payment provider unavailable", body = Error)
    ),
    tags = ["payments"],
    operation_id = "createPaymentIntent"
)]
#[post("/payment-intent")]
pub async fn create_payment_intent(
    state: web::Data<HttpState>,
    caller: Authenticated,
    payload: web::Json<PaymentIntentRequest>,
) -> ApiResult<web::Json<PaymentIntent>> {
    if payload.amount == 0 {
        return Err(payment_error(PaymentValidationError::ZeroAmount));
    }
    let coupon = payload
        .coupon_code
        .as_deref()
        .map(CouponCode::new)
        .transpose()
        .map_err(coupon_error)?;
    let intent = state
        .payments
        .create_intent(caller.claim(), payload.amount, coupon)
        .await?;
    Ok(web::Json(intent))
}

/// Record a confirmed payment and upgrade the caller to premium.
///
/// The transaction id and amount come from the client after it completes
/// the provider's checkout; they are not re-fetched from the provider.
/// Only the payer is server-derived, from the bearer credential. Replays of
/// a transaction id are rejected.
#[utoipa::path(
    post,
    path = "/api/v1/payment-confirmation",
    description = "Trusts the client-reported transaction id and amount; \
                   the payer is always the authenticated caller.",
    request_body = PaymentConfirmationRequest,
    responses(
        (status = 200, description = "Payment recorded", body = PaymentRecord),
        (status = 400, description = "Invalid confirmation", body = Error),
        (status = 401, description = "Missing or invalid credential", body = Error),
        (status = 409, description = "Transaction already recorded", body = Error)
    ),
    tags = ["payments"],
    operation_id = "confirmPayment"
)]
#[post("/payment-confirmation")]
pub async fn confirm_payment(
    state: web::Data<HttpState>,
    caller: Authenticated,
    payload: web::Json<PaymentConfirmationRequest>,
) -> ApiResult<web::Json<PaymentRecord>> {
    let confirmation = PaymentConfirmation::try_from(&*payload)?;
    let record = state.payments.confirm(caller.claim(), confirmation).await?;
    Ok(web::Json(record))
}

/// The caller's payments, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/payments/mine",
    responses(
        (status = 200, description = "Own payments", body = [PaymentRecord]),
        (status = 401, description = "Missing or invalid credential", body = Error)
    ),
    tags = ["payments"],
    operation_id = "myPayments"
)]
#[get("/payments/mine")]
pub async fn my_payments(
    state: web::Data<HttpState>,
    caller: Authenticated,
) -> ApiResult<web::Json<Vec<PaymentRecord>>> {
    Ok(web::Json(state.payments.mine(caller.claim()).await?))
}
