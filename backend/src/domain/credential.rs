//! Bearer credential issuing and verification.
//!
//! The verifier is pure: it parses the `Authorization` header, asks the
//! codec to check the signature, and checks expiry against the injected
//! clock with zero leeway. It never touches storage.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use super::ports::CredentialCodec;
use super::{Email, Error};

/// Default credential lifetime.
pub const DEFAULT_CREDENTIAL_TTL: Duration = Duration::days(1);

/// Decoded payload of a verified credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityClaim {
    email: Email,
}

impl IdentityClaim {
    /// Claim for the given identity.
    pub fn new(email: Email) -> Self {
        Self { email }
    }

    /// Email the credential was issued to.
    pub fn email(&self) -> &Email {
        &self.email
    }
}

/// Signed fields carried by a credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialClaims {
    /// Subject email.
    pub email: String,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// Credential handed to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssuedCredential {
    /// Signed bearer token.
    pub token: String,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
}

/// Extract the token from an `Authorization` header value.
///
/// Accepts `Bearer <token>` (scheme case-insensitive) and a bare token.
///
/// # Examples
/// ```
/// use hunt_backend::domain::bearer_token;
///
/// assert_eq!(bearer_token("Bearer abc").unwrap(), "abc");
/// assert_eq!(bearer_token("abc").unwrap(), "abc");
/// assert!(bearer_token("Bearer ").is_err());
/// ```
pub fn bearer_token(header: &str) -> Result<&str, Error> {
    let trimmed = header.trim();
    let token = match trimmed.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        Some(_) => return Err(Error::invalid_credential()),
        None if trimmed.eq_ignore_ascii_case("bearer") => "",
        None => trimmed,
    };
    if token.is_empty() {
        return Err(Error::invalid_credential());
    }
    Ok(token)
}

/// Issues and verifies bearer credentials.
#[derive(Clone)]
pub struct CredentialVerifier {
    codec: Arc<dyn CredentialCodec>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl CredentialVerifier {
    /// Build a verifier over a codec, clock, and credential lifetime.
    pub fn new(codec: Arc<dyn CredentialCodec>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self { codec, clock, ttl }
    }

    /// Verify an optional raw `Authorization` header.
    pub fn verify(&self, raw_header: Option<&str>) -> Result<IdentityClaim, Error> {
        let header = raw_header.ok_or_else(Error::missing_credential)?;
        let token = bearer_token(header)?;
        let claims = self.codec.open(token).map_err(|error| {
            debug!(%error, "credential rejected by codec");
            Error::invalid_credential()
        })?;
        if self.clock.utc().timestamp() >= claims.exp {
            debug!(exp = claims.exp, "credential expired");
            return Err(Error::invalid_credential());
        }
        let email = Email::new(&claims.email).map_err(|error| {
            debug!(%error, "credential subject is not an email");
            Error::invalid_credential()
        })?;
        Ok(IdentityClaim::new(email))
    }

    /// Sign a credential for `claim` valid for the configured lifetime.
    pub fn issue(&self, claim: &IdentityClaim) -> Result<IssuedCredential, Error> {
        let now = self.clock.utc();
        let expires_at = now + self.ttl;
        let claims = CredentialClaims {
            email: claim.email().to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = self.codec.seal(&claims)?;
        // Report the second-granular expiry the token actually carries.
        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .unwrap_or(expires_at);
        Ok(IssuedCredential { token, expires_at })
    }
}
