//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and remain testable without I/O.

use std::sync::Arc;

use chrono::Duration;
use mockable::Clock;

use crate::domain::ports::{
    CouponRepository, CredentialCodec, IdentityRepository, ListingRepository, Mailer,
    PaymentGateway, PaymentRepository, ReviewRepository,
};
use crate::domain::{
    CouponService, CredentialVerifier, IdentityService, ListingService, PaymentPorts,
    PaymentService, ReviewService, RoleGate, StatisticsService,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub identities: Arc<dyn IdentityRepository>,
    pub listings: Arc<dyn ListingRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
    pub payments: Arc<dyn PaymentRepository>,
    pub coupons: Arc<dyn CouponRepository>,
    pub codec: Arc<dyn CredentialCodec>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub mailer: Arc<dyn Mailer>,
    pub clock: Arc<dyn Clock>,
    /// Lifetime of issued credentials.
    pub credential_ttl: Duration,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub verifier: CredentialVerifier,
    pub identities: IdentityService,
    pub listings: ListingService,
    pub reviews: ReviewService,
    pub payments: PaymentService,
    pub coupons: CouponService,
    pub statistics: StatisticsService,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Wire every service over one set of ports.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use hunt_backend::domain::DEFAULT_CREDENTIAL_TTL;
    /// use hunt_backend::domain::ports::{FixturePaymentGateway, LoggingMailer};
    /// use hunt_backend::inbound::http::state::{HttpState, HttpStatePorts};
    /// use hunt_backend::outbound::credentials::JwtCredentialCodec;
    /// use hunt_backend::outbound::memory::MemoryStore;
    /// use mockable::DefaultClock;
    /// use zeroize::Zeroizing;
    ///
    /// let store = Arc::new(MemoryStore::new());
    /// let state = HttpState::new(HttpStatePorts {
    ///     identities: store.clone(),
    ///     listings: store.clone(),
    ///     reviews: store.clone(),
    ///     payments: store.clone(),
    ///     coupons: store,
    ///     codec: Arc::new(JwtCredentialCodec::new(Zeroizing::new(b"secret".to_vec()))),
    ///     gateway: Arc::new(FixturePaymentGateway),
    ///     mailer: Arc::new(LoggingMailer),
    ///     clock: Arc::new(DefaultClock),
    ///     credential_ttl: DEFAULT_CREDENTIAL_TTL,
    /// });
    /// let _verifier = state.verifier.clone();
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            identities,
            listings,
            reviews,
            payments,
            coupons,
            codec,
            gateway,
            mailer,
            clock,
            credential_ttl,
        } = ports;
        let gate = RoleGate::new(Arc::clone(&identities));
        let verifier = CredentialVerifier::new(codec, Arc::clone(&clock), credential_ttl);
        Self {
            identities: IdentityService::new(
                Arc::clone(&identities),
                gate.clone(),
                verifier.clone(),
                Arc::clone(&clock),
            ),
            listings: ListingService::new(Arc::clone(&listings), gate.clone(), Arc::clone(&clock)),
            reviews: ReviewService::new(
                Arc::clone(&reviews),
                Arc::clone(&listings),
                gate.clone(),
                Arc::clone(&clock),
            ),
            payments: PaymentService::new(
                PaymentPorts {
                    payments: Arc::clone(&payments),
                    coupons: Arc::clone(&coupons),
                    gateway,
                    mailer,
                },
                gate.clone(),
                Arc::clone(&clock),
            ),
            coupons: CouponService::new(coupons, gate.clone(), clock),
            statistics: StatisticsService::new(identities, listings, reviews, payments, gate),
            verifier,
        }
    }
}
