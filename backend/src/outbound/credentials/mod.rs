//! Credential codec adapters.

mod jwt;

pub use jwt::JwtCredentialCodec;
