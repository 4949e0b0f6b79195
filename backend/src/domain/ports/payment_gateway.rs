//! Port for the external payment provider.

use async_trait::async_trait;

use crate::domain::{Email, PaymentQuote};

use super::define_port_error;

define_port_error! {
    /// Failures raised by payment gateway adapters.
    pub enum PaymentGatewayError {
        /// The provider could not be reached.
        Transport { message: String } => "payment provider unreachable: {message}" as unavailable,
        /// The provider did not answer in time.
        Timeout { message: String } => "payment provider timed out: {message}" as unavailable,
        /// The provider refused the request.
        Rejected { status: u16, message: String } => "payment provider rejected request ({status}): {message}" as internal,
        /// The provider answered with an unexpected body.
        Decode { message: String } => "payment provider response invalid: {message}" as internal,
    }
}

/// Creates payment intents with the provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create an intent for the quoted amount; returns the client secret.
    async fn create_intent(
        &self,
        quote: &PaymentQuote,
        payer: &Email,
    ) -> Result<String, PaymentGatewayError>;
}

/// Gateway used when no provider is configured.
///
/// Returns a deterministic secret derived from the payer and amount.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePaymentGateway;

#[async_trait]
impl PaymentGateway for FixturePaymentGateway {
    async fn create_intent(
        &self,
        quote: &PaymentQuote,
        payer: &Email,
    ) -> Result<String, PaymentGatewayError> {
        Ok(format!("fixture_secret_{}_{}", quote.amount_minor, payer))
    }
}
