//! Shared builders for domain service tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use super::ports::{CredentialCodec, CredentialCodecError};
use super::{
    CredentialClaims, CredentialVerifier, DEFAULT_CREDENTIAL_TTL, Email, Identity, IdentityClaim,
    NewIdentity, Role, Tier,
};

pub(crate) struct FixtureClock(pub DateTime<Utc>);

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

pub(crate) fn fixture_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock(fixture_now()))
}

pub(crate) fn email(raw: &str) -> Email {
    Email::new(raw).expect("valid fixture email")
}

pub(crate) fn claim(raw: &str) -> IdentityClaim {
    IdentityClaim::new(email(raw))
}

pub(crate) fn identity(raw: &str, role: Role, tier: Tier) -> Identity {
    let mut identity = Identity::register(
        NewIdentity {
            email: email(raw),
            name: Some("Fixture".to_owned()),
            photo_url: None,
        },
        fixture_now(),
    );
    identity.role = role;
    identity.tier = tier;
    identity
}

/// Codec that "signs" by prefixing the subject; never rejects its own output.
pub(crate) struct PlainCodec;

impl CredentialCodec for PlainCodec {
    fn seal(&self, claims: &CredentialClaims) -> Result<String, CredentialCodecError> {
        Ok(format!("plain:{}:{}", claims.email, claims.exp))
    }

    fn open(&self, token: &str) -> Result<CredentialClaims, CredentialCodecError> {
        let rest = token
            .strip_prefix("plain:")
            .ok_or_else(|| CredentialCodecError::rejected("not a plain token"))?;
        let (email, exp) = rest
            .rsplit_once(':')
            .ok_or_else(|| CredentialCodecError::rejected("missing expiry"))?;
        let exp = exp
            .parse()
            .map_err(|_| CredentialCodecError::rejected("bad expiry"))?;
        Ok(CredentialClaims {
            email: email.to_owned(),
            iat: 0,
            exp,
        })
    }
}

pub(crate) fn plain_verifier() -> CredentialVerifier {
    CredentialVerifier::new(Arc::new(PlainCodec), fixture_clock(), DEFAULT_CREDENTIAL_TTL)
}
