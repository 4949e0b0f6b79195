//! Payment intents, confirmation, and premium upgrades.

use std::sync::Arc;

use mockable::Clock;
use tracing::{info, warn};

use super::ports::{CouponRepository, MailMessage, Mailer, PaymentGateway, PaymentRepository};
use super::{
    CURRENCY, CouponCode, Error, IdentityClaim, PaymentConfirmation, PaymentIntent, PaymentQuote,
    PaymentRecord, RoleGate, TraceId, UniquenessKey, enforce,
};

/// Collaborators of [`PaymentService`].
#[derive(Clone)]
pub struct PaymentPorts {
    /// Payment record store.
    pub payments: Arc<dyn PaymentRepository>,
    /// Coupon store, for discounts.
    pub coupons: Arc<dyn CouponRepository>,
    /// External payment provider.
    pub gateway: Arc<dyn PaymentGateway>,
    /// Transactional mail.
    pub mailer: Arc<dyn Mailer>,
}

/// Use-cases over payments.
#[derive(Clone)]
pub struct PaymentService {
    ports: PaymentPorts,
    gate: RoleGate,
    clock: Arc<dyn Clock>,
}

impl PaymentService {
    /// Build the service.
    pub fn new(ports: PaymentPorts, gate: RoleGate, clock: Arc<dyn Clock>) -> Self {
        Self { ports, gate, clock }
    }

    /// Price the request, apply an optional coupon, and open an intent.
    pub async fn create_intent(
        &self,
        claim: &IdentityClaim,
        amount_minor: u64,
        coupon: Option<CouponCode>,
    ) -> Result<PaymentIntent, Error> {
        let payer = self.gate.identity(claim).await?;
        let coupon = match coupon {
            Some(code) => Some(
                self.ports
                    .coupons
                    .find_by_code(&code)
                    .await?
                    .filter(|c| c.is_active(self.clock.utc()))
                    .ok_or_else(|| Error::not_found("coupon not found or expired"))?,
            ),
            None => None,
        };
        let quote = PaymentQuote::price(amount_minor, coupon.as_ref())
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let client_secret = self.ports.gateway.create_intent(&quote, &payer.email).await?;
        info!(payer = %payer.email, amount_minor = quote.amount_minor, "payment intent created");
        Ok(PaymentIntent {
            client_secret,
            quote,
        })
    }

    /// Record a confirmed payment and upgrade the payer to premium.
    ///
    /// The transaction id and amount are taken as reported by the client and
    /// are not verified against the payment provider; the payer is the claim
    /// holder. A transaction id is recorded at most once. The confirmation
    /// mail is sent in the background; failures are logged and never fail
    /// the call.
    pub async fn confirm(
        &self,
        claim: &IdentityClaim,
        confirmation: PaymentConfirmation,
    ) -> Result<PaymentRecord, Error> {
        let payer = self.gate.identity(claim).await?;
        let record = PaymentRecord {
            transaction_id: confirmation.transaction_id,
            email: payer.email,
            amount_minor: confirmation.amount_minor,
            currency: CURRENCY.to_owned(),
            created_at: self.clock.utc(),
        };
        let key = UniquenessKey::PaymentTransaction(record.transaction_id.to_string());
        enforce(&key, self.ports.payments.record_and_upgrade(&record).await?)?;
        info!(payer = %record.email, transaction_id = %record.transaction_id, "payment recorded");
        self.send_receipt(&record);
        Ok(record)
    }

    /// The caller's payments, newest first.
    pub async fn mine(&self, claim: &IdentityClaim) -> Result<Vec<PaymentRecord>, Error> {
        Ok(self.ports.payments.for_payer(claim.email()).await?)
    }

    fn send_receipt(&self, record: &PaymentRecord) {
        let mailer = Arc::clone(&self.ports.mailer);
        let message = MailMessage {
            to: record.email.clone(),
            subject: "Your premium membership is active".to_owned(),
            text: format!(
                "Thanks for your payment of {} {} (transaction {}). Your account is now premium.",
                format_minor(record.amount_minor),
                record.currency.to_uppercase(),
                record.transaction_id
            ),
        };
        TraceId::spawn_scoped(async move {
            if let Err(error) = mailer.send(&message).await {
                warn!(%error, to = %message.to, "payment receipt not delivered");
            }
        });
    }
}

fn format_minor(amount_minor: u64) -> String {
    format!("{}.{:02}", amount_minor / 100, amount_minor % 100)
}

#[cfg(test)]
#[path = "payment_service_tests.rs"]
mod tests;
