//! Shared wiring for HTTP integration suites.
//!
//! Suites drive the real `/api/v1` routes over the in-memory store with the
//! system clock, the fixture payment gateway, and the logging mailer.

#![allow(dead_code)]

use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::{AUTHORIZATION, HeaderName};
use actix_web::{test, web};
use hunt_backend::domain::ports::{FixturePaymentGateway, IdentityRepository, LoggingMailer};
use hunt_backend::domain::{DEFAULT_CREDENTIAL_TTL, Email, Role};
use hunt_backend::inbound::http::state::{HttpState, HttpStatePorts};
use hunt_backend::outbound::credentials::JwtCredentialCodec;
use hunt_backend::outbound::memory::MemoryStore;
use mockable::DefaultClock;
use serde_json::{Value, json};
use zeroize::Zeroizing;

/// Build an Actix app serving the API over `$state`.
#[macro_export]
macro_rules! api_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($state)
                .wrap(hunt_backend::Trace)
                .service(
                    actix_web::web::scope("/api/v1")
                        .configure(hunt_backend::inbound::http::configure_api),
                ),
        )
        .await
    };
}

/// In-memory state plus a handle on the store behind it.
pub struct Harness {
    pub store: MemoryStore,
    pub state: web::Data<HttpState>,
}

impl Harness {
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
                b"integration-suite-credential-secret".to_vec(),
            ))),
            gateway: Arc::new(FixturePaymentGateway),
            mailer: Arc::new(LoggingMailer),
            clock: Arc::new(DefaultClock),
            credential_ttl: DEFAULT_CREDENTIAL_TTL,
        });
        Self {
            store,
            state: web::Data::new(state),
        }
    }

    /// Change the role of an already registered identity.
    pub async fn grant(&self, raw: &str, role: Role) {
        let email = Email::new(raw).expect("valid email");
        IdentityRepository::set_role(&self.store, &email, role)
            .await
            .expect("role update")
            .expect("identity registered");
    }
}

/// `Authorization: Bearer <token>` header pair.
pub fn bearer(token: &str) -> (HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {token}"))
}

/// Call `app` and decode the body as JSON; empty bodies decode to `Null`.
pub async fn send<S, B>(app: &S, req: actix_http::Request) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = test::call_service(app, req).await;
    let status = res.status();
    let bytes = test::read_body(res).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

/// Register `email` and return a freshly issued credential.
pub async fn sign_up<S, B>(app: &S, email: &str) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, _) = send(
        app,
        test::TestRequest::post()
            .uri("/api/v1/register-identity")
            .set_json(json!({ "email": email }))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register {email}");
    credential(app, email).await
}

/// Issue a credential for a registered `email`.
pub async fn credential<S, B>(app: &S, email: &str) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body) = send(
        app,
        test::TestRequest::post()
            .uri("/api/v1/issue-credential")
            .set_json(json!({ "email": email }))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "credential for {email}");
    body["token"].as_str().expect("token").to_owned()
}

/// Submit a listing named `name` and return the response.
pub async fn submit<S, B>(app: &S, token: &str, name: &str) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    send(
        app,
        test::TestRequest::post()
            .uri("/api/v1/listings")
            .insert_header(bearer(token))
            .set_json(json!({
                "name": name,
                "description": format!("{name} helps teams ship faster"),
                "tags": ["Tools"],
            }))
            .to_request(),
    )
    .await
}
