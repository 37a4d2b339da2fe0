//! Strongly typed record identifiers.
//!
//! Every persisted record is keyed by a UUID. Separate newtypes keep a
//! service id from being passed where an event id is expected.

use thiserror::Error;

/// Errors raised when parsing an identifier from caller input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IdValidationError {
    /// The identifier was blank.
    #[error("{kind} id must not be empty")]
    Empty {
        /// Record kind the identifier refers to.
        kind: &'static str,
    },
    /// The identifier is not a hyphenated UUID.
    #[error("{kind} id must be a valid UUID")]
    Invalid {
        /// Record kind the identifier refers to.
        kind: &'static str,
    },
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident => $kind:literal) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize,
            ::utoipa::ToSchema,
        )]
        #[serde(transparent)]
        pub struct $name(::uuid::Uuid);

        impl $name {
            /// Parse an identifier from caller-supplied text.
            pub fn new(raw: impl AsRef<str>) -> Result<Self, IdValidationError> {
                let raw = raw.as_ref();
                if raw.trim().is_empty() {
                    return Err(IdValidationError::Empty { kind: $kind });
                }
                ::uuid::Uuid::parse_str(raw)
                    .map(Self)
                    .map_err(|_| IdValidationError::Invalid { kind: $kind })
            }

            /// Generate a new random identifier.
            #[must_use]
            pub fn random() -> Self {
                Self(::uuid::Uuid::new_v4())
            }

            /// Wrap a UUID loaded from storage.
            #[must_use]
            pub const fn from_uuid(uuid: ::uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Borrow the inner UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &::uuid::Uuid {
                &self.0
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = IdValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

define_id! {
    /// Identifier of a registered user.
    UserId => "user"
}

define_id! {
    /// Identifier of a catalog service listing.
    ServiceId => "service"
}

define_id! {
    /// Identifier of a booked event.
    EventId => "event"
}
