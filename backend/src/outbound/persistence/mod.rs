//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of domain repository ports
//! backed by PostgreSQL via the Diesel ORM with async support through
//! `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: Repository implementations only translate between
//!   Diesel models and domain types. Business rules stay in the domain.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) are never exposed to the domain layer.
//! - **Guarded writes**: Uniqueness is enforced by constraints and
//!   `ON CONFLICT DO NOTHING`, or by row locks inside a transaction.
//! - **Bounded calls**: Every repository call, including connection
//!   checkout, runs under the pool's query timeout.
//!
//! # Example
//!
//! ```ignore
//! use hunt_backend::outbound::persistence::{DbPool, DieselListingRepository, PoolConfig};
//!
//! let config = PoolConfig::new("postgres://localhost/hunt");
//! let pool = DbPool::new(config).await?;
//! let repo = DieselListingRepository::new(pool);
//! ```

pub(crate) mod diesel_helpers;
mod diesel_coupon_repository;
mod diesel_identity_repository;
mod diesel_listing_repository;
mod diesel_payment_repository;
mod diesel_review_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_coupon_repository::DieselCouponRepository;
pub use diesel_identity_repository::DieselIdentityRepository;
pub use diesel_listing_repository::DieselListingRepository;
pub use diesel_payment_repository::DieselPaymentRepository;
pub use diesel_review_repository::DieselReviewRepository;
pub use migrations::run_migrations;
pub use pool::{DEFAULT_QUERY_TIMEOUT, DbPool, PoolConfig, PoolError};
