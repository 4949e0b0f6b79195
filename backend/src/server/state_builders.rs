//! Builders for HTTP state ports from resolved settings.
//!
//! Each port picks its real adapter when the matching setting is present and
//! falls back to an in-process implementation otherwise: PostgreSQL or the
//! memory store, the HTTP payment gateway or the fixture, the HTTP mailer or
//! the logging mailer.

use std::io;
use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::info;

use hunt_backend::domain::ports::{
    CouponRepository, FixturePaymentGateway, IdentityRepository, ListingRepository,
    LoggingMailer, Mailer, PaymentGateway, PaymentRepository, ReviewRepository,
};
use hunt_backend::domain::{Email, Guarded, Identity, NewIdentity, Role};
use hunt_backend::inbound::http::state::HttpStatePorts;
use hunt_backend::outbound::credentials::JwtCredentialCodec;
use hunt_backend::outbound::mail::HttpMailer;
use hunt_backend::outbound::memory::MemoryStore;
use hunt_backend::outbound::payments::HttpPaymentGateway;
use hunt_backend::outbound::persistence::{
    DbPool, DieselCouponRepository, DieselIdentityRepository, DieselListingRepository,
    DieselPaymentRepository, DieselReviewRepository, PoolConfig, run_migrations,
};
use hunt_backend::settings::{AppSettings, BuildMode};

/// Storage ports, all backed by the same store.
#[derive(Clone)]
struct Repositories {
    identities: Arc<dyn IdentityRepository>,
    listings: Arc<dyn ListingRepository>,
    reviews: Arc<dyn ReviewRepository>,
    payments: Arc<dyn PaymentRepository>,
    coupons: Arc<dyn CouponRepository>,
}

fn build_repositories(pool: Option<&DbPool>) -> Repositories {
    match pool {
        Some(pool) => Repositories {
            identities: Arc::new(DieselIdentityRepository::new(pool.clone())),
            listings: Arc::new(DieselListingRepository::new(pool.clone())),
            reviews: Arc::new(DieselReviewRepository::new(pool.clone())),
            payments: Arc::new(DieselPaymentRepository::new(pool.clone())),
            coupons: Arc::new(DieselCouponRepository::new(pool.clone())),
        },
        None => {
            let store = Arc::new(MemoryStore::new());
            Repositories {
                identities: store.clone(),
                listings: store.clone(),
                reviews: store.clone(),
                payments: store.clone(),
                coupons: store,
            }
        }
    }
}

/// Run migrations and open the pool when a database URL is configured.
///
/// # Errors
/// Migration or pool construction failures.
pub(crate) async fn build_pool(settings: &AppSettings) -> io::Result<Option<DbPool>> {
    let Some(url) = settings.database_url.as_deref() else {
        info!("no database configured; using in-memory storage");
        return Ok(None);
    };
    run_migrations(url)
        .await
        .map_err(|err| io::Error::other(format!("database migration failed: {err}")))?;
    let config = PoolConfig::new(url)
        .with_max_size(settings.database_max_connections())
        .with_query_timeout(settings.query_timeout());
    let pool = DbPool::new(config)
        .await
        .map_err(|err| io::Error::other(format!("database pool failed: {err}")))?;
    info!("database pool ready");
    Ok(Some(pool))
}

fn build_gateway(settings: &AppSettings) -> io::Result<Arc<dyn PaymentGateway>> {
    let resolved = settings.payment_settings().map_err(io::Error::other)?;
    match resolved {
        Some(payment) => {
            let gateway = HttpPaymentGateway::new(
                &payment.base_url,
                payment.secret,
                settings.outbound_timeout(),
            )
            .map_err(io::Error::other)?;
            info!(base_url = %payment.base_url, "payment gateway configured");
            Ok(Arc::new(gateway))
        }
        None => {
            info!("no payment provider configured; using fixture gateway");
            Ok(Arc::new(FixturePaymentGateway))
        }
    }
}

fn build_mailer(settings: &AppSettings) -> io::Result<Arc<dyn Mailer>> {
    let resolved = settings.mail_settings().map_err(io::Error::other)?;
    match resolved {
        Some(mail) => {
            let mailer = HttpMailer::new(
                &mail.base_url,
                mail.secret,
                settings.mail_sender(),
                settings.outbound_timeout(),
            )
            .map_err(io::Error::other)?;
            info!(base_url = %mail.base_url, "mail API configured");
            Ok(Arc::new(mailer))
        }
        None => {
            info!("no mail API configured; mail is logged only");
            Ok(Arc::new(LoggingMailer))
        }
    }
}

/// Register `raw` as an admin, or promote the existing identity.
async fn bootstrap_admin(
    identities: &dyn IdentityRepository,
    raw: &str,
    clock: &dyn Clock,
) -> io::Result<()> {
    let email = Email::new(raw)
        .map_err(|err| io::Error::other(format!("invalid bootstrap admin email: {err}")))?;
    let mut admin = Identity::register(
        NewIdentity {
            email: email.clone(),
            name: None,
            photo_url: None,
        },
        clock.utc(),
    );
    admin.role = Role::Admin;

    let outcome = identities
        .insert(&admin)
        .await
        .map_err(|err| io::Error::other(format!("bootstrap admin insert failed: {err}")))?;
    match outcome {
        Guarded::Applied(()) => info!(email = %email, "registered bootstrap admin"),
        Guarded::Rejected => {
            identities
                .set_role(&email, Role::Admin)
                .await
                .map_err(|err| io::Error::other(format!("bootstrap admin promotion failed: {err}")))?;
            info!(email = %email, "promoted bootstrap admin");
        }
    }
    Ok(())
}

/// Build every port the HTTP state needs.
///
/// # Errors
/// Invalid secrets or endpoints, or a failed admin bootstrap.
pub(crate) async fn build_http_ports(
    settings: &AppSettings,
    pool: Option<&DbPool>,
    mode: BuildMode,
) -> io::Result<HttpStatePorts> {
    let credentials = settings
        .credential_settings(mode)
        .map_err(io::Error::other)?;
    info!(
        fingerprint = %credentials.fingerprint(),
        ttl_minutes = credentials.ttl.num_minutes(),
        "credential secret loaded"
    );

    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let repositories = build_repositories(pool);
    if let Some(raw) = settings.bootstrap_admin.as_deref() {
        bootstrap_admin(repositories.identities.as_ref(), raw, clock.as_ref()).await?;
    }

    let Repositories {
        identities,
        listings,
        reviews,
        payments,
        coupons,
    } = repositories;
    Ok(HttpStatePorts {
        identities,
        listings,
        reviews,
        payments,
        coupons,
        codec: Arc::new(JwtCredentialCodec::new(credentials.secret)),
        gateway: build_gateway(settings)?,
        mailer: build_mailer(settings)?,
        clock,
        credential_ttl: credentials.ttl,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use hunt_backend::domain::Tier;
    use rstest::rstest;

    struct FixedClock;

    impl Clock for FixedClock {
        fn local(&self) -> DateTime<chrono::Local> {
            self.utc().with_timezone(&chrono::Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
                .single()
                .expect("valid fixture time")
        }
    }

    fn email(raw: &str) -> Email {
        Email::new(raw).expect("fixture email")
    }

    #[rstest]
    #[tokio::test]
    async fn bootstrap_registers_missing_admin() {
        let store = MemoryStore::new();
        bootstrap_admin(&store, "Root@X.com", &FixedClock)
            .await
            .expect("bootstrap");

        let stored = IdentityRepository::find(&store, &email("root@x.com"))
            .await
            .expect("lookup")
            .expect("registered");
        assert_eq!(stored.role, Role::Admin);
        assert_eq!(stored.tier, Tier::Free);
    }

    #[rstest]
    #[tokio::test]
    async fn bootstrap_promotes_existing_identity() {
        let store = MemoryStore::new();
        let existing = Identity::register(
            NewIdentity {
                email: email("ops@x.com"),
                name: Some("Ops".to_owned()),
                photo_url: None,
            },
            FixedClock.utc(),
        );
        IdentityRepository::insert(&store, &existing)
            .await
            .expect("insert");

        bootstrap_admin(&store, "ops@x.com", &FixedClock)
            .await
            .expect("bootstrap");

        let stored = IdentityRepository::find(&store, &email("ops@x.com"))
            .await
            .expect("lookup")
            .expect("present");
        assert_eq!(stored.role, Role::Admin);
        assert_eq!(stored.name.as_deref(), Some("Ops"));
    }

    #[rstest]
    #[tokio::test]
    async fn bootstrap_rejects_malformed_email() {
        let store = MemoryStore::new();
        let err = bootstrap_admin(&store, "not-an-email", &FixedClock)
            .await
            .expect_err("invalid email");
        assert!(err.to_string().contains("bootstrap admin"));
    }

    #[rstest]
    #[tokio::test]
    async fn memory_fallback_accepts_writes() {
        let repositories = build_repositories(None);
        let identity = Identity::register(
            NewIdentity {
                email: email("a@x.com"),
                name: None,
                photo_url: None,
            },
            FixedClock.utc(),
        );
        repositories
            .identities
            .insert(&identity)
            .await
            .expect("insert");
        assert_eq!(repositories.identities.count().await.expect("count"), 1);
    }
}
