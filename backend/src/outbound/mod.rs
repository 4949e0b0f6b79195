//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **memory**: in-process repositories for development and tests
//! - **credentials**: HS256 JWT credential codec
//! - **payments**: Stripe-compatible payment intent client
//! - **mail**: JSON mail API client
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod credentials;
mod http_preview;
pub mod mail;
pub mod memory;
pub mod payments;
pub mod persistence;
