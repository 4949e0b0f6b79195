//! Helper macro for declaring port error enums.
//!
//! Each variant names its message and the failure class it maps to when it
//! reaches the domain: `unavailable` becomes `service_unavailable`, `internal`
//! becomes `internal_error`. Snake-case constructors accept `impl Into<_>`
//! for every field.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            #[allow(dead_code, reason = "not every port constructs every variant")]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            #[allow(dead_code, reason = "not every port constructs every variant")]
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };

    (@class unavailable) => { $crate::domain::ports::FailureClass::Unavailable };
    (@class internal) => { $crate::domain::ports::FailureClass::Internal };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:literal as $class:ident
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*

            /// Failure class used when the error crosses into the domain.
            pub fn class(&self) -> $crate::domain::ports::FailureClass {
                match self {
                    $( Self::$variant { .. } => define_port_error!(@class $class), )*
                }
            }
        }

        impl From<$name> for $crate::domain::Error {
            fn from(error: $name) -> Self {
                error.class().into_domain_error(&error)
            }
        }
    };
}

pub(crate) use define_port_error;

/// How a port failure surfaces to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// The dependency is down or slow; the caller may retry.
    Unavailable,
    /// The dependency misbehaved in a way retrying will not fix.
    Internal,
}

impl FailureClass {
    /// Convert a port error into the domain error for this class.
    ///
    /// The port message is logged and kept on internal errors (which are
    /// redacted at the HTTP boundary); unavailable errors get a generic
    /// client-facing message.
    pub fn into_domain_error(self, error: &dyn std::error::Error) -> crate::domain::Error {
        match self {
            Self::Unavailable => {
                tracing::warn!(%error, "dependency unavailable");
                crate::domain::Error::service_unavailable("service temporarily unavailable")
            }
            Self::Internal => {
                tracing::error!(%error, "dependency failed");
                crate::domain::Error::internal(error.to_string())
            }
        }
    }
}
