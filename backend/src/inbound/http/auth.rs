//! Bearer credential extraction for HTTP handlers.
//!
//! Handlers that need a caller take [`Authenticated`] as an argument; the
//! extractor verifies the `Authorization` header before the handler body
//! runs, so a missing or bad credential never reaches domain code.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};
use tracing::debug;

use crate::domain::{Error, IdentityClaim};

use super::state::HttpState;

/// Verified identity claim of the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated(pub IdentityClaim);

impl Authenticated {
    /// The verified claim.
    pub fn claim(&self) -> &IdentityClaim {
        &self.0
    }
}

fn authenticate(req: &HttpRequest) -> Result<Authenticated, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("HTTP state is not configured"))?;
    let header = match req.headers().get(AUTHORIZATION) {
        Some(value) => Some(value.to_str().map_err(|_| {
            debug!("authorization header is not visible ASCII");
            Error::invalid_credential()
        })?),
        None => None,
    };
    state.verifier.verify(header).map(Authenticated)
}

impl FromRequest for Authenticated {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}
