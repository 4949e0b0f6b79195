//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (persistence, credential codec, payment provider, mail) are
//! traits implemented by `outbound` adapters. Each trait carries a mockall
//! double in tests.

mod macros;
pub(crate) use macros::define_port_error;
pub use macros::FailureClass;

mod coupon_repository;
mod credential_codec;
mod identity_repository;
mod listing_repository;
mod mailer;
mod payment_gateway;
mod payment_repository;
mod repository_error;
mod review_repository;

#[cfg(test)]
pub use coupon_repository::MockCouponRepository;
pub use coupon_repository::CouponRepository;
#[cfg(test)]
pub use credential_codec::MockCredentialCodec;
pub use credential_codec::{CredentialCodec, CredentialCodecError};
#[cfg(test)]
pub use identity_repository::MockIdentityRepository;
pub use identity_repository::IdentityRepository;
#[cfg(test)]
pub use listing_repository::MockListingRepository;
pub use listing_repository::{ListingRepository, StatusCounts, VoteOutcome};
#[cfg(test)]
pub use mailer::MockMailer;
pub use mailer::{LoggingMailer, MailMessage, Mailer, MailerError};
#[cfg(test)]
pub use payment_gateway::MockPaymentGateway;
pub use payment_gateway::{FixturePaymentGateway, PaymentGateway, PaymentGatewayError};
#[cfg(test)]
pub use payment_repository::MockPaymentRepository;
pub use payment_repository::{PaymentRepository, PaymentTotals};
pub use repository_error::RepositoryError;
#[cfg(test)]
pub use review_repository::MockReviewRepository;
pub use review_repository::ReviewRepository;
