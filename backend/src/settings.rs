//! Application settings loaded via OrthoConfig.
//!
//! Every value may come from `HUNT_*` environment variables, the command line,
//! or a configuration file. Secrets can be given inline or as a path to a
//! file; the file wins when both are present. Debug builds tolerate a missing
//! credential secret and fall back to a development value with a warning.
//! Release builds refuse to start without one.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ortho_config::OrthoConfig;
use reqwest::Url;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::warn;
use zeroize::Zeroizing;

use crate::domain::DEFAULT_CREDENTIAL_TTL;
use crate::outbound::persistence::DEFAULT_QUERY_TIMEOUT;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAIL_SENDER: &str = "noreply@hunt.local";
const DEFAULT_OUTBOUND_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEVELOPMENT_SECRET: &[u8] = b"hunt-development-credential-secret-not-for-production";
/// Shortest credential secret accepted by release builds.
pub const CREDENTIAL_SECRET_MIN_LEN: usize = 32;
const FINGERPRINT_BYTES: usize = 8;

/// Build mode for settings validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate defaults and emit warnings.
    Debug,
    /// Release builds require explicit secrets.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hunt_backend::settings::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// assert_eq!(mode == BuildMode::Debug, cfg!(debug_assertions));
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Errors raised while resolving settings.
#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    /// OrthoConfig could not merge the configuration layers.
    #[error("failed to load settings: {0}")]
    Load(String),
    /// A required secret is absent.
    #[error("missing required setting: {name}")]
    Missing { name: &'static str },
    /// A value is present but malformed.
    #[error("invalid value for {name}='{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
    /// Reading a secret file failed.
    #[error("failed to read secret at {path}: {source}")]
    SecretRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The credential secret is too short for release builds.
    #[error("credential secret too short: need >= {min_len} bytes, got {length}")]
    SecretTooShort { length: usize, min_len: usize },
}

/// Raw configuration values as merged from env, CLI, and file.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "HUNT")]
pub struct AppSettings {
    /// Listen address, `host:port`.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; in-memory storage when unset.
    pub database_url: Option<String>,
    /// Pool size.
    pub database_max_connections: Option<u32>,
    /// Bound on each repository call, pool checkout included.
    pub query_timeout_ms: Option<u64>,
    /// HS256 signing secret for credentials.
    pub credential_secret: Option<String>,
    pub credential_secret_file: Option<PathBuf>,
    /// Lifetime of issued credentials.
    pub credential_ttl_minutes: Option<i64>,
    /// Base URL of the Stripe-compatible provider; fixture gateway when unset.
    pub payment_api_base: Option<String>,
    pub payment_secret_key: Option<String>,
    pub payment_secret_key_file: Option<PathBuf>,
    /// Base URL of the mail API; logging mailer when unset.
    pub mail_api_base: Option<String>,
    pub mail_api_key: Option<String>,
    pub mail_api_key_file: Option<PathBuf>,
    /// `From` address for outgoing mail.
    pub mail_sender: Option<String>,
    /// Request timeout for the payment and mail clients.
    pub outbound_timeout_ms: Option<u64>,
    /// Email promoted to admin at startup, registered if absent.
    pub bootstrap_admin: Option<String>,
}

/// Resolved credential signing settings.
pub struct CredentialSettings {
    pub secret: Zeroizing<Vec<u8>>,
    pub ttl: chrono::Duration,
}

impl CredentialSettings {
    /// Log-safe fingerprint of the signing secret.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        secret_fingerprint(&self.secret)
    }
}

/// Resolved endpoint and key for an outbound HTTP integration.
pub struct OutboundSettings {
    pub base_url: Url,
    pub secret: Zeroizing<String>,
}

impl AppSettings {
    /// Load settings from the process environment and arguments.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Load`] when a layer cannot be parsed.
    pub fn load_from_env() -> Result<Self, SettingsError> {
        Self::load().map_err(|err| SettingsError::Load(err.to_string()))
    }

    /// Socket address to listen on.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Invalid`] for an unparsable address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError::Invalid {
            name: "bind_addr",
            value: raw.to_owned(),
            reason: err.to_string(),
        })
    }

    pub fn database_max_connections(&self) -> u32 {
        self.database_max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS)
    }

    pub fn query_timeout(&self) -> Duration {
        self.query_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_QUERY_TIMEOUT)
    }

    pub fn outbound_timeout(&self) -> Duration {
        self.outbound_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_OUTBOUND_TIMEOUT)
    }

    pub fn mail_sender(&self) -> &str {
        self.mail_sender.as_deref().unwrap_or(DEFAULT_MAIL_SENDER)
    }

    /// Signing secret and lifetime for credentials.
    ///
    /// # Errors
    ///
    /// In release builds a missing or short secret is an error. Debug builds
    /// substitute a development secret and warn.
    pub fn credential_settings(&self, mode: BuildMode) -> Result<CredentialSettings, SettingsError> {
        let ttl = match self.credential_ttl_minutes {
            Some(minutes) if minutes > 0 => chrono::Duration::minutes(minutes),
            Some(minutes) => {
                return Err(SettingsError::Invalid {
                    name: "credential_ttl_minutes",
                    value: minutes.to_string(),
                    reason: "must be positive".to_owned(),
                });
            }
            None => DEFAULT_CREDENTIAL_TTL,
        };

        let secret = read_secret(
            self.credential_secret.as_deref(),
            self.credential_secret_file.as_deref(),
        )?;
        let secret = match secret {
            Some(secret) => Zeroizing::new(secret.as_bytes().to_vec()),
            None if mode.is_debug() => {
                warn!("credential secret not set; using development secret");
                Zeroizing::new(DEVELOPMENT_SECRET.to_vec())
            }
            None => {
                return Err(SettingsError::Missing {
                    name: "credential_secret",
                });
            }
        };

        if secret.len() < CREDENTIAL_SECRET_MIN_LEN {
            if mode.is_debug() {
                warn!(
                    length = secret.len(),
                    min_len = CREDENTIAL_SECRET_MIN_LEN,
                    "credential secret shorter than recommended"
                );
            } else {
                return Err(SettingsError::SecretTooShort {
                    length: secret.len(),
                    min_len: CREDENTIAL_SECRET_MIN_LEN,
                });
            }
        }

        Ok(CredentialSettings { secret, ttl })
    }

    /// Payment provider endpoint; `None` selects the fixture gateway.
    ///
    /// # Errors
    ///
    /// A configured base URL without a secret key, or a malformed URL.
    pub fn payment_settings(&self) -> Result<Option<OutboundSettings>, SettingsError> {
        outbound(
            ("payment_api_base", self.payment_api_base.as_deref()),
            (
                "payment_secret_key",
                self.payment_secret_key.as_deref(),
                self.payment_secret_key_file.as_deref(),
            ),
        )
    }

    /// Mail API endpoint; `None` selects the logging mailer.
    ///
    /// # Errors
    ///
    /// A configured base URL without an API key, or a malformed URL.
    pub fn mail_settings(&self) -> Result<Option<OutboundSettings>, SettingsError> {
        outbound(
            ("mail_api_base", self.mail_api_base.as_deref()),
            (
                "mail_api_key",
                self.mail_api_key.as_deref(),
                self.mail_api_key_file.as_deref(),
            ),
        )
    }
}

fn outbound(
    (base_name, base): (&'static str, Option<&str>),
    (secret_name, inline, file): (&'static str, Option<&str>, Option<&Path>),
) -> Result<Option<OutboundSettings>, SettingsError> {
    let Some(raw) = base else {
        return Ok(None);
    };
    let base_url = parse_base_url(base_name, raw)?;
    let secret = read_secret(inline, file)?.ok_or(SettingsError::Missing { name: secret_name })?;
    Ok(Some(OutboundSettings { base_url, secret }))
}

/// Parse a base URL, appending the trailing slash `Url::join` needs to keep
/// the last path segment.
fn parse_base_url(name: &'static str, raw: &str) -> Result<Url, SettingsError> {
    let normalised = if raw.ends_with('/') {
        raw.to_owned()
    } else {
        format!("{raw}/")
    };
    Url::parse(&normalised).map_err(|err| SettingsError::Invalid {
        name,
        value: raw.to_owned(),
        reason: err.to_string(),
    })
}

fn read_secret(
    inline: Option<&str>,
    file: Option<&Path>,
) -> Result<Option<Zeroizing<String>>, SettingsError> {
    if let Some(path) = file {
        let contents =
            std::fs::read_to_string(path).map_err(|source| SettingsError::SecretRead {
                path: path.to_path_buf(),
                source,
            })?;
        let contents = Zeroizing::new(contents);
        let trimmed = contents.trim();
        if !trimmed.is_empty() {
            return Ok(Some(Zeroizing::new(trimmed.to_owned())));
        }
    }
    Ok(inline
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| Zeroizing::new(value.to_owned())))
}

/// Truncated SHA-256 fingerprint of a secret, 16 lowercase hex characters.
///
/// Identifies which secret is active in logs without exposing it.
///
/// # Examples
///
/// ```rust
/// use hunt_backend::settings::secret_fingerprint;
///
/// let fp = secret_fingerprint(b"an example secret");
/// assert_eq!(fp.len(), 16);
/// assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
/// ```
#[must_use]
pub fn secret_fingerprint(secret: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret);
    let result = hasher.finalize();
    hex::encode(&result[..FINGERPRINT_BYTES])
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing and secret resolution.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 8] = [
        "HUNT_BIND_ADDR",
        "HUNT_DATABASE_URL",
        "HUNT_QUERY_TIMEOUT_MS",
        "HUNT_CREDENTIAL_SECRET",
        "HUNT_CREDENTIAL_SECRET_FILE",
        "HUNT_CREDENTIAL_TTL_MINUTES",
        "HUNT_PAYMENT_API_BASE",
        "HUNT_PAYMENT_SECRET_KEY",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("hunt-backend")]).expect("config should load")
    }

    fn cleared() -> Vec<(&'static str, Option<String>)> {
        VARS.iter().map(|name| (*name, None)).collect()
    }

    fn with(overrides: &[(&'static str, &str)]) -> Vec<(&'static str, Option<String>)> {
        let mut vars = cleared();
        for (name, value) in overrides {
            if let Some(slot) = vars.iter_mut().find(|(n, _)| n == name) {
                slot.1 = Some((*value).to_owned());
            }
        }
        vars
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(cleared());
        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("default addr"),
            DEFAULT_BIND_ADDR.parse::<SocketAddr>().expect("literal addr")
        );
        assert!(settings.database_url.is_none());
        assert_eq!(settings.query_timeout(), DEFAULT_QUERY_TIMEOUT);
        assert!(settings.payment_settings().expect("no gateway").is_none());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(with(&[
            ("HUNT_BIND_ADDR", "127.0.0.1:9000"),
            ("HUNT_DATABASE_URL", "postgres://localhost/hunt"),
            ("HUNT_QUERY_TIMEOUT_MS", "250"),
            ("HUNT_CREDENTIAL_TTL_MINUTES", "30"),
        ]));
        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr().expect("addr").port(), 9000);
        assert_eq!(
            settings.database_url.as_deref(),
            Some("postgres://localhost/hunt")
        );
        assert_eq!(settings.query_timeout(), Duration::from_millis(250));
        let credentials = settings
            .credential_settings(BuildMode::Debug)
            .expect("debug credentials");
        assert_eq!(credentials.ttl, chrono::Duration::minutes(30));
    }

    #[rstest]
    fn release_requires_a_credential_secret() {
        let _guard = lock_env(cleared());
        let settings = load_from_empty_args();
        let err = settings
            .credential_settings(BuildMode::Release)
            .err()
            .expect("missing secret");
        assert!(matches!(
            err,
            SettingsError::Missing {
                name: "credential_secret"
            }
        ));
    }

    #[rstest]
    fn debug_falls_back_to_development_secret() {
        let _guard = lock_env(cleared());
        let settings = load_from_empty_args();
        let credentials = settings
            .credential_settings(BuildMode::Debug)
            .expect("debug fallback");
        assert_eq!(credentials.secret.as_slice(), DEVELOPMENT_SECRET);
        assert_eq!(credentials.ttl, DEFAULT_CREDENTIAL_TTL);
    }

    #[rstest]
    #[case(BuildMode::Debug, true)]
    #[case(BuildMode::Release, false)]
    fn short_secrets_only_pass_in_debug(#[case] mode: BuildMode, #[case] accepted: bool) {
        let _guard = lock_env(with(&[("HUNT_CREDENTIAL_SECRET", "short")]));
        let settings = load_from_empty_args();
        assert_eq!(settings.credential_settings(mode).is_ok(), accepted);
    }

    #[rstest]
    fn secret_file_takes_precedence() {
        let path = std::env::temp_dir().join(format!(
            "hunt_credential_secret_{}",
            std::process::id()
        ));
        let file_secret = "f".repeat(CREDENTIAL_SECRET_MIN_LEN);
        std::fs::write(&path, format!("{file_secret}\n")).expect("write secret");
        let path_str = path.to_str().expect("utf-8 path").to_owned();

        let settings = {
            let _guard = lock_env(with(&[
                ("HUNT_CREDENTIAL_SECRET", "inline-secret-that-is-long-enough-xx"),
                ("HUNT_CREDENTIAL_SECRET_FILE", &path_str),
            ]));
            load_from_empty_args()
        };
        let credentials = settings
            .credential_settings(BuildMode::Release)
            .expect("file secret");
        assert_eq!(credentials.secret.as_slice(), file_secret.as_bytes());
        std::fs::remove_file(&path).expect("remove secret");
    }

    #[rstest]
    fn payment_base_without_key_is_rejected() {
        let _guard = lock_env(with(&[(
            "HUNT_PAYMENT_API_BASE",
            "https://payments.example.com",
        )]));
        let settings = load_from_empty_args();
        assert!(matches!(
            settings.payment_settings(),
            Err(SettingsError::Missing {
                name: "payment_secret_key"
            })
        ));
    }

    #[rstest]
    fn payment_base_gains_trailing_slash() {
        let _guard = lock_env(with(&[
            ("HUNT_PAYMENT_API_BASE", "https://payments.example.com/stripe"),
            ("HUNT_PAYMENT_SECRET_KEY", "sk_test"),
        ]));
        let settings = load_from_empty_args();
        let payment = settings
            .payment_settings()
            .expect("payment settings")
            .expect("configured");
        assert_eq!(
            payment
                .base_url
                .join("v1/payment_intents")
                .expect("join")
                .as_str(),
            "https://payments.example.com/stripe/v1/payment_intents"
        );
        assert_eq!(payment.secret.as_str(), "sk_test");
    }

    #[rstest]
    fn unparsable_bind_addr_names_the_setting() {
        let _guard = lock_env(with(&[("HUNT_BIND_ADDR", "nowhere")]));
        let settings = load_from_empty_args();
        assert!(matches!(
            settings.bind_addr(),
            Err(SettingsError::Invalid {
                name: "bind_addr",
                ..
            })
        ));
    }

    #[rstest]
    fn fingerprint_is_stable_and_short() {
        let first = secret_fingerprint(b"abc");
        assert_eq!(first, secret_fingerprint(b"abc"));
        assert_eq!(first.len(), 16);
        assert_ne!(first, secret_fingerprint(b"abd"));
    }
}
