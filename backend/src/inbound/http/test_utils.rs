//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::http::header::{AUTHORIZATION, HeaderName};
use actix_web::web;
use zeroize::Zeroizing;

use crate::domain::ports::{FixturePaymentGateway, LoggingMailer};
use crate::domain::test_support::{email, fixture_clock, identity};
use crate::domain::{DEFAULT_CREDENTIAL_TTL, IdentityClaim, Role, Tier};
use crate::outbound::credentials::JwtCredentialCodec;
use crate::outbound::memory::MemoryStore;

use super::state::{HttpState, HttpStatePorts};

/// In-memory wiring of every HTTP dependency with a pinned clock.
pub struct TestContext {
    pub store: MemoryStore,
    state: web::Data<HttpState>,
}

impl TestContext {
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let shared = Arc::new(store.clone());
        let state = HttpState::new(HttpStatePorts {
            identities: shared.clone(),
            listings: shared.clone(),
            reviews: shared.clone(),
            payments: shared.clone(),
            coupons: shared,
            codec: Arc::new(JwtCredentialCodec::new(Zeroizing::new(
                b"http-test-secret".to_vec(),
            ))),
            gateway: Arc::new(FixturePaymentGateway),
            mailer: Arc::new(LoggingMailer),
            clock: fixture_clock(),
            credential_ttl: DEFAULT_CREDENTIAL_TTL,
        });
        Self {
            store,
            state: web::Data::new(state),
        }
    }

    pub fn state(&self) -> web::Data<HttpState> {
        self.state.clone()
    }

    /// Sign a credential for `raw` without touching storage.
    pub fn token_for(&self, raw: &str) -> String {
        self.state
            .verifier
            .issue(&IdentityClaim::new(email(raw)))
            .expect("fixture credential")
            .token
    }

    /// Store an identity with the given role and tier and return its token.
    pub async fn seed(&self, raw: &str, role: Role, tier: Tier) -> String {
        self.store.seed_identity(identity(raw, role, tier)).await;
        self.token_for(raw)
    }
}

/// `Authorization: Bearer <token>` header pair.
pub fn bearer(token: &str) -> (HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {token}"))
}
