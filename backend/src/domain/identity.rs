//! Identity data model: who a caller is, their role, and their tier.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Validation errors raised by identity value types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityValidationError {
    /// The email was blank.
    #[error("email must not be empty")]
    EmptyEmail,
    /// The email exceeds the storage limit.
    #[error("email must be at most {max} characters")]
    EmailTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// The email does not look like `local@domain.tld`.
    #[error("email must be a valid address")]
    InvalidEmail,
    /// The role name is not one of the closed set.
    #[error("unknown role: {0}")]
    UnknownRole(String),
    /// The tier name is not one of the closed set.
    #[error("unknown tier: {0}")]
    UnknownTier(String),
}

/// Maximum accepted email length.
pub const EMAIL_MAX: usize = 254;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Normalised email address; the identity's unique key.
///
/// Input is trimmed and lower-cased so `A@X.com` and `a@x.com` name the
/// same identity.
///
/// # Examples
/// ```
/// use hunt_backend::domain::Email;
///
/// let email = Email::new(" Ada@Example.COM ").expect("valid email");
/// assert_eq!(email.as_ref(), "ada@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and normalise an email address.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, IdentityValidationError> {
        let normalised = raw.as_ref().trim().to_lowercase();
        if normalised.is_empty() {
            return Err(IdentityValidationError::EmptyEmail);
        }
        if normalised.chars().count() > EMAIL_MAX {
            return Err(IdentityValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        if !email_regex().is_match(&normalised) {
            return Err(IdentityValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = IdentityValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Closed set of roles an identity can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full administrative access.
    Admin,
    /// Listing triage access.
    Moderator,
    /// Regular registered user.
    User,
    /// Stored identity without an assigned role.
    Unset,
}

impl Role {
    /// Stable lower-case name used in storage and on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Moderator => "moderator",
            Self::User => "user",
            Self::Unset => "unset",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = IdentityValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "moderator" => Ok(Self::Moderator),
            "user" => Ok(Self::User),
            "unset" => Ok(Self::Unset),
            other => Err(IdentityValidationError::UnknownRole(other.to_owned())),
        }
    }
}

/// Subscription tier of an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Default tier, capped at one listing.
    Free,
    /// Paid tier without a listing cap.
    Premium,
}

impl Tier {
    /// Stable lower-case name used in storage and on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Premium => "premium",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = IdentityValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Self::Free),
            "premium" => Ok(Self::Premium),
            other => Err(IdentityValidationError::UnknownTier(other.to_owned())),
        }
    }
}

/// Registration payload before it is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIdentity {
    /// Unique key of the identity.
    pub email: Email,
    /// Optional display name.
    pub name: Option<String>,
    /// Optional avatar URL.
    pub photo_url: Option<String>,
}

/// Stored identity.
///
/// ## Invariants
/// - At most one identity exists per [`Email`].
/// - New identities start with [`Role::User`] and [`Tier::Free`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Unique key of the identity.
    #[schema(value_type = String, example = "ada@example.com")]
    pub email: Email,
    /// Optional display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Optional avatar URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// Current role.
    pub role: Role,
    /// Current subscription tier.
    pub tier: Tier,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

impl Identity {
    /// Build the stored form of a fresh registration.
    pub fn register(new: NewIdentity, now: DateTime<Utc>) -> Self {
        Self {
            email: new.email,
            name: new.name,
            photo_url: new.photo_url,
            role: Role::User,
            tier: Tier::Free,
            created_at: now,
        }
    }
}
