//! Port for signing and opening bearer credentials.

use crate::domain::CredentialClaims;

use super::define_port_error;

define_port_error! {
    /// Failures raised by credential codecs.
    pub enum CredentialCodecError {
        /// The token is malformed or its signature does not verify.
        Rejected { message: String } => "credential rejected: {message}" as internal,
        /// The codec could not sign the claims.
        Signing { message: String } => "credential signing failed: {message}" as internal,
    }
}

/// Signs claims into a token and verifies tokens back into claims.
///
/// Implementations check the signature only; expiry is checked by the
/// caller against its own clock.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialCodec: Send + Sync {
    /// Sign `claims` into a token.
    fn seal(&self, claims: &CredentialClaims) -> Result<String, CredentialCodecError>;

    /// Verify `token` and return its claims.
    fn open(&self, token: &str) -> Result<CredentialClaims, CredentialCodecError>;
}
