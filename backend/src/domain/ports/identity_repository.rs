//! Port abstraction for identity persistence.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{Email, Guarded, Identity, Role, Tier};

use super::RepositoryError;

/// Persistence for identities, keyed by email.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    /// Insert an identity unless its email is already registered.
    async fn insert(&self, identity: &Identity) -> Result<Guarded<()>, RepositoryError>;

    /// Fetch an identity by email.
    async fn find(&self, email: &Email) -> Result<Option<Identity>, RepositoryError>;

    /// List identities, oldest registration first.
    async fn list(&self, page: PageRequest) -> Result<Page<Identity>, RepositoryError>;

    /// Set the role; `None` when no identity has that email.
    async fn set_role(&self, email: &Email, role: Role)
    -> Result<Option<Identity>, RepositoryError>;

    /// Set the tier; `None` when no identity has that email.
    async fn set_tier(&self, email: &Email, tier: Tier)
    -> Result<Option<Identity>, RepositoryError>;

    /// Number of stored identities.
    async fn count(&self) -> Result<u64, RepositoryError>;
}
