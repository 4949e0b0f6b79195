//! Named permission levels checked by the role gate.
//!
//! Capabilities match exactly; there is no hierarchy. An admin does not
//! satisfy a moderator-only operation.

use std::fmt;

use super::{Identity, Role, Tier};

/// Permission level required by a guarded operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Requires [`Role::Admin`].
    Admin,
    /// Requires [`Role::Moderator`].
    Moderator,
    /// Requires [`Role::User`].
    User,
    /// Requires [`Tier::Premium`].
    Premium,
}

impl Capability {
    /// Whether `identity` holds this capability.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use hunt_backend::domain::{Capability, Email, Identity, NewIdentity, Role};
    ///
    /// let mut identity = Identity::register(
    ///     NewIdentity { email: Email::new("a@x.com").unwrap(), name: None, photo_url: None },
    ///     Utc::now(),
    /// );
    /// identity.role = Role::Admin;
    /// assert!(Capability::Admin.is_held_by(&identity));
    /// assert!(!Capability::Moderator.is_held_by(&identity));
    /// ```
    pub fn is_held_by(self, identity: &Identity) -> bool {
        match self {
            Self::Admin => identity.role == Role::Admin,
            Self::Moderator => identity.role == Role::Moderator,
            Self::User => identity.role == Role::User,
            Self::Premium => identity.tier == Tier::Premium,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Admin => "admin",
            Self::Moderator => "moderator",
            Self::User => "user",
            Self::Premium => "premium",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::{Email, NewIdentity};
    use chrono::Utc;
    use rstest::rstest;

    fn identity(role: Role, tier: Tier) -> Identity {
        let mut identity = Identity::register(
            NewIdentity {
                email: Email::new("a@x.com").expect("valid email"),
                name: None,
                photo_url: None,
            },
            Utc::now(),
        );
        identity.role = role;
        identity.tier = tier;
        identity
    }

    #[rstest]
    #[case(Capability::Admin, Role::Admin, Tier::Free, true)]
    #[case(Capability::Admin, Role::Moderator, Tier::Premium, false)]
    #[case(Capability::Moderator, Role::Moderator, Tier::Free, true)]
    #[case(Capability::Moderator, Role::Admin, Tier::Free, false)]
    #[case(Capability::User, Role::User, Tier::Free, true)]
    #[case(Capability::User, Role::Unset, Tier::Free, false)]
    #[case(Capability::Premium, Role::User, Tier::Premium, true)]
    #[case(Capability::Premium, Role::Admin, Tier::Free, false)]
    fn capabilities_match_exactly(
        #[case] capability: Capability,
        #[case] role: Role,
        #[case] tier: Tier,
        #[case] expected: bool,
    ) {
        assert_eq!(capability.is_held_by(&identity(role, tier)), expected);
    }
}
