//! Identity registration, credential issuing, and administration.

use std::sync::Arc;

use mockable::Clock;
use pagination::{Page, PageRequest};
use tracing::info;

use super::ports::IdentityRepository;
use super::{
    Capability, CredentialVerifier, Email, Error, Identity, IdentityClaim, IssuedCredential,
    NewIdentity, Role, RoleGate, Tier, UniquenessKey, enforce,
};

/// Use-cases over identities.
#[derive(Clone)]
pub struct IdentityService {
    identities: Arc<dyn IdentityRepository>,
    gate: RoleGate,
    verifier: CredentialVerifier,
    clock: Arc<dyn Clock>,
}

impl IdentityService {
    /// Build the service.
    pub fn new(
        identities: Arc<dyn IdentityRepository>,
        gate: RoleGate,
        verifier: CredentialVerifier,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            identities,
            gate,
            verifier,
            clock,
        }
    }

    /// Register a new identity; a repeat email is a conflict.
    pub async fn register(&self, new: NewIdentity) -> Result<Identity, Error> {
        let key = UniquenessKey::Email(new.email.clone());
        let identity = Identity::register(new, self.clock.utc());
        enforce(&key, self.identities.insert(&identity).await?)?;
        info!(email = %identity.email, "identity registered");
        Ok(identity)
    }

    /// Issue a credential for a registered email.
    pub async fn issue_credential(&self, email: Email) -> Result<IssuedCredential, Error> {
        if self.identities.find(&email).await?.is_none() {
            return Err(Error::not_found("identity not found"));
        }
        self.verifier.issue(&IdentityClaim::new(email))
    }

    /// The caller's own identity.
    pub async fn current(&self, claim: &IdentityClaim) -> Result<Identity, Error> {
        self.gate.identity(claim).await
    }

    /// Page through every identity.
    pub async fn list(&self, claim: &IdentityClaim, page: PageRequest) -> Result<Page<Identity>, Error> {
        self.gate.authorize(claim, Capability::Admin).await?;
        Ok(self.identities.list(page).await?)
    }

    /// Change the role of `email`.
    pub async fn change_role(
        &self,
        claim: &IdentityClaim,
        email: &Email,
        role: Role,
    ) -> Result<Identity, Error> {
        let admin = self.gate.authorize(claim, Capability::Admin).await?;
        let updated = self
            .identities
            .set_role(email, role)
            .await?
            .ok_or_else(|| Error::not_found("identity not found"))?;
        info!(admin = %admin.email, email = %email, role = %role, "role changed");
        Ok(updated)
    }

    /// Change the tier of `email`.
    pub async fn change_tier(
        &self,
        claim: &IdentityClaim,
        email: &Email,
        tier: Tier,
    ) -> Result<Identity, Error> {
        let admin = self.gate.authorize(claim, Capability::Admin).await?;
        let updated = self
            .identities
            .set_tier(email, tier)
            .await?
            .ok_or_else(|| Error::not_found("identity not found"))?;
        info!(admin = %admin.email, email = %email, tier = %tier, "tier changed");
        Ok(updated)
    }
}

#[cfg(test)]
#[path = "identity_service_tests.rs"]
mod tests;
