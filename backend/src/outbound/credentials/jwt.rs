//! HS256 JSON Web Token codec.
//!
//! The codec checks the signature and claim shape only. Expiry is judged by
//! `CredentialVerifier` against the injected clock, so `exp` validation is
//! disabled here.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use zeroize::Zeroizing;

use crate::domain::CredentialClaims;
use crate::domain::ports::{CredentialCodec, CredentialCodecError};

/// Credential codec signing claims with a shared HMAC secret.
#[derive(Clone)]
pub struct JwtCredentialCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtCredentialCodec {
    /// Build a codec from the shared secret.
    ///
    /// # Examples
    /// ```
    /// use hunt_backend::outbound::credentials::JwtCredentialCodec;
    /// use zeroize::Zeroizing;
    ///
    /// let codec = JwtCredentialCodec::new(Zeroizing::new(b"local-secret".to_vec()));
    /// # let _ = codec;
    /// ```
    pub fn new(secret: Zeroizing<Vec<u8>>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);
        Self {
            encoding_key: EncodingKey::from_secret(&secret),
            decoding_key: DecodingKey::from_secret(&secret),
            validation,
        }
    }
}

impl std::fmt::Debug for JwtCredentialCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtCredentialCodec").finish_non_exhaustive()
    }
}

impl CredentialCodec for JwtCredentialCodec {
    fn seal(&self, claims: &CredentialClaims) -> Result<String, CredentialCodecError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|err| CredentialCodecError::signing(err.to_string()))
    }

    fn open(&self, token: &str) -> Result<CredentialClaims, CredentialCodecError> {
        decode::<CredentialClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| {
                let reason = match err.kind() {
                    ErrorKind::InvalidSignature => "signature mismatch".to_owned(),
                    ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) => {
                        "malformed token".to_owned()
                    }
                    ErrorKind::InvalidAlgorithm => "unexpected algorithm".to_owned(),
                    _ => err.to_string(),
                };
                CredentialCodecError::rejected(reason)
            })
    }
}
