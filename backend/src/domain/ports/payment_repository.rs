//! Port abstraction for payment persistence.

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Email, Guarded, PaymentRecord};

use super::RepositoryError;

/// Aggregate payment figures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentTotals {
    /// Number of recorded payments.
    pub count: u64,
    /// Sum of recorded amounts, in minor units.
    pub revenue_minor: u64,
}

/// Persistence for payment records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Store the record and upgrade the payer to premium in one transaction,
    /// unless the transaction id was already recorded.
    async fn record_and_upgrade(
        &self,
        record: &PaymentRecord,
    ) -> Result<Guarded<()>, RepositoryError>;

    /// Payments made by `email`, newest first.
    async fn for_payer(&self, email: &Email) -> Result<Vec<PaymentRecord>, RepositoryError>;

    /// Aggregate figures over every payment.
    async fn totals(&self) -> Result<PaymentTotals, RepositoryError>;
}
