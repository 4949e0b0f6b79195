//! Payment provider outbound adapters.
//!
//! A thin HTTP implementation of the `PaymentGateway` port for
//! Stripe-compatible providers.

mod dto;
mod http_gateway;

pub use http_gateway::HttpPaymentGateway;
