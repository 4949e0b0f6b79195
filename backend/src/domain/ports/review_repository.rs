//! Port abstraction for review persistence.

use async_trait::async_trait;

use crate::domain::{ListingId, Review};

use super::RepositoryError;

/// Persistence for listing reviews.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Store a review; `false` when the listing no longer exists.
    async fn insert(&self, review: &Review) -> Result<bool, RepositoryError>;

    /// Every review, newest first.
    async fn list_all(&self) -> Result<Vec<Review>, RepositoryError>;

    /// Reviews of one listing, newest first.
    async fn for_listing(&self, listing: &ListingId) -> Result<Vec<Review>, RepositoryError>;

    /// Number of stored reviews.
    async fn count(&self) -> Result<u64, RepositoryError>;
}
