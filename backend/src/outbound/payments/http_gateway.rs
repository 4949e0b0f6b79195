//! Reqwest-backed payment gateway for a Stripe-compatible API.
//!
//! This adapter owns transport details only: form encoding, bearer
//! authentication, timeout and HTTP error mapping, and decoding the
//! `client_secret` from the created intent.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use zeroize::Zeroizing;

use super::dto::{CreateIntentForm, IntentResponseDto};
use crate::domain::ports::{PaymentGateway, PaymentGatewayError};
use crate::domain::{Email, PaymentQuote};
use crate::outbound::http_preview::status_message;

const INTENTS_PATH: &str = "v1/payment_intents";

/// Payment gateway adapter posting intents to one provider base URL.
pub struct HttpPaymentGateway {
    client: Client,
    endpoint: Url,
    secret_key: Zeroizing<String>,
}

impl HttpPaymentGateway {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the base URL cannot be joined with the intents
    /// path or the reqwest client cannot be constructed.
    pub fn new(
        base_url: &Url,
        secret_key: Zeroizing<String>,
        timeout: Duration,
    ) -> Result<Self, PaymentGatewayError> {
        let endpoint = base_url
            .join(INTENTS_PATH)
            .map_err(|err| PaymentGatewayError::transport(format!("invalid base url: {err}")))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| PaymentGatewayError::transport(err.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            secret_key,
        })
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn create_intent(
        &self,
        quote: &PaymentQuote,
        payer: &Email,
    ) -> Result<String, PaymentGatewayError> {
        let form = CreateIntentForm {
            amount: quote.amount_minor,
            currency: &quote.currency,
            receipt_email: payer.as_ref(),
            payment_method_types: "card",
            discount_percent: quote.discount_percent,
        };
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(self.secret_key.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&form)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_client_secret(body.as_ref())
    }
}

fn parse_client_secret(body: &[u8]) -> Result<String, PaymentGatewayError> {
    let decoded: IntentResponseDto = serde_json::from_slice(body).map_err(|error| {
        PaymentGatewayError::decode(format!("invalid payment intent JSON: {error}"))
    })?;
    decoded
        .client_secret
        .filter(|secret| !secret.is_empty())
        .ok_or_else(|| PaymentGatewayError::decode("payment intent has no client_secret"))
}

fn map_transport_error(error: reqwest::Error) -> PaymentGatewayError {
    if error.is_timeout() {
        PaymentGatewayError::timeout(error.to_string())
    } else {
        PaymentGatewayError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> PaymentGatewayError {
    let message = status_message(status, body);
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            PaymentGatewayError::timeout(message)
        }
        StatusCode::TOO_MANY_REQUESTS => PaymentGatewayError::transport(message),
        _ if status.is_server_error() => PaymentGatewayError::transport(message),
        _ => PaymentGatewayError::rejected(status.as_u16(), message),
    }
}
