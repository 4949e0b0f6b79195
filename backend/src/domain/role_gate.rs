//! Capability checks against the stored identity.
//!
//! The gate performs one read by the claim's email. A missing identity or a
//! capability mismatch stops the operation with `forbidden`.

use std::sync::Arc;

use tracing::{debug, warn};

use super::ports::IdentityRepository;
use super::{Capability, Error, Identity, IdentityClaim};

/// Message returned for every authorization denial.
pub const FORBIDDEN_MESSAGE: &str = "unauthorized access";

/// Gate consulted by handlers before privileged operations.
#[derive(Clone)]
pub struct RoleGate {
    identities: Arc<dyn IdentityRepository>,
}

impl RoleGate {
    /// Build a gate over the identity store.
    pub fn new(identities: Arc<dyn IdentityRepository>) -> Self {
        Self { identities }
    }

    /// Load the caller's identity, failing with `forbidden` when absent.
    pub async fn identity(&self, claim: &IdentityClaim) -> Result<Identity, Error> {
        match self.identities.find(claim.email()).await? {
            Some(identity) => Ok(identity),
            None => {
                debug!(email = %claim.email(), "credential subject has no identity");
                Err(Error::forbidden(FORBIDDEN_MESSAGE))
            }
        }
    }

    /// Require `capability`, returning the caller's identity when held.
    pub async fn authorize(
        &self,
        claim: &IdentityClaim,
        capability: Capability,
    ) -> Result<Identity, Error> {
        let identity = self.identity(claim).await?;
        if capability.is_held_by(&identity) {
            return Ok(identity);
        }
        warn!(
            email = %identity.email,
            role = %identity.role,
            required = %capability,
            "capability check failed"
        );
        Err(Error::forbidden(FORBIDDEN_MESSAGE))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::{MockIdentityRepository, RepositoryError};
    use crate::domain::{Email, ErrorCode, NewIdentity, Role, Tier};
    use chrono::Utc;
    use rstest::rstest;

    fn claim() -> IdentityClaim {
        IdentityClaim::new(Email::new("a@x.com").expect("valid email"))
    }

    fn stored(role: Role, tier: Tier) -> Identity {
        let mut identity = Identity::register(
            NewIdentity {
                email: Email::new("a@x.com").expect("valid email"),
                name: None,
                photo_url: None,
            },
            Utc::now(),
        );
        identity.role = role;
        identity.tier = tier;
        identity
    }

    fn gate_with(found: Option<Identity>) -> RoleGate {
        let mut repo = MockIdentityRepository::new();
        repo.expect_find().times(1).return_once(move |_| Ok(found));
        RoleGate::new(Arc::new(repo))
    }

    #[rstest]
    #[case(Role::Moderator, Capability::Moderator)]
    #[case(Role::Admin, Capability::Admin)]
    #[tokio::test]
    async fn matching_role_is_admitted(#[case] role: Role, #[case] capability: Capability) {
        let identity = gate_with(Some(stored(role, Tier::Free)))
            .authorize(&claim(), capability)
            .await
            .expect("capability held");
        assert_eq!(identity.role, role);
    }

    #[rstest]
    #[case(Role::User, Capability::Moderator)]
    #[case(Role::Admin, Capability::Moderator)]
    #[case(Role::Moderator, Capability::Admin)]
    #[case(Role::Unset, Capability::User)]
    #[tokio::test]
    async fn mismatched_role_is_forbidden(#[case] role: Role, #[case] capability: Capability) {
        let err = gate_with(Some(stored(role, Tier::Premium)))
            .authorize(&claim(), capability)
            .await
            .expect_err("capability missing");
        assert_eq!(err.code(), ErrorCode::Forbidden);
        assert_eq!(err.message(), FORBIDDEN_MESSAGE);
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_identity_is_forbidden() {
        let err = gate_with(None)
            .authorize(&claim(), Capability::User)
            .await
            .expect_err("no identity");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn storage_outage_is_unavailable() {
        let mut repo = MockIdentityRepository::new();
        repo.expect_find()
            .return_once(|_| Err(RepositoryError::timeout("find identity")));
        let err = RoleGate::new(Arc::new(repo))
            .authorize(&claim(), Capability::Admin)
            .await
            .expect_err("storage down");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
}
