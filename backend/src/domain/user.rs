//! User records, profile patches and the public profile view.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::domain::{EventId, Role, ServiceId, UserId};

/// Maximum length of a user's display name.
pub const USER_NAME_MAX: usize = 100;

/// Validation failures for user value objects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserValidationError {
    /// Name was blank once trimmed.
    #[error("name must not be empty")]
    EmptyName,
    /// Name exceeds [`USER_NAME_MAX`] characters.
    #[error("name must be at most {max} characters")]
    NameTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Email was blank once trimmed.
    #[error("email must not be empty")]
    EmptyEmail,
    /// Email lacks a local part, an `@` or a domain.
    #[error("email must be a valid address")]
    InvalidEmail,
}

/// Display name of a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "Alice Smith")]
pub struct UserName(String);

impl UserName {
    /// Trim and validate a display name.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if trimmed.chars().count() > USER_NAME_MAX {
            return Err(UserValidationError::NameTooLong {
                max: USER_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<UserName> for String {
    fn from(value: UserName) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Login email, unique across users.
///
/// Stored trimmed and lowercased so uniqueness is case-insensitive.
///
/// # Examples
/// ```
/// use backend::domain::Email;
///
/// let email = Email::new("  Alice@Example.COM ").expect("valid email");
/// assert_eq!(email.as_ref(), "alice@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "alice@example.com")]
pub struct Email(String);

impl Email {
    /// Normalise and validate an email address.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalised = raw.as_ref().trim().to_lowercase();
        if normalised.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if !email_regex().is_match(&normalised) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Persisted marketplace user.
///
/// ## Invariants
/// - `email` is unique across users.
/// - `role` never changes after registration; [`UserPatch`] has no role.
/// - `password_hash` never leaves the backend; use [`PublicProfile`].
/// - `bookings` is a denormalised cache of event references, not the source
///   of truth for a client's events.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub name: UserName,
    pub email: Email,
    pub password_hash: String,
    pub role: Role,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub services_offered: Vec<ServiceId>,
    pub bookings: Vec<EventId>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Apply a sparse patch; absent fields are left untouched.
    pub fn apply(&mut self, patch: &UserPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(hash) = &patch.password_hash {
            self.password_hash = hash.clone();
        }
        if let Some(phone) = &patch.phone {
            self.phone = Some(phone.clone());
        }
        if let Some(city) = &patch.city {
            self.city = Some(city.clone());
        }
    }
}

/// Sparse update of self-editable user fields, with the password already hashed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub name: Option<UserName>,
    pub password_hash: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
}

impl UserPatch {
    /// `true` when the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.password_hash.is_none()
            && self.phone.is_none()
            && self.city.is_none()
    }
}

/// User record with the credential hash removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub id: UserId,
    pub name: UserName,
    pub email: Email,
    pub role: Role,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub services_offered: Vec<ServiceId>,
    pub bookings: Vec<EventId>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for PublicProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            phone: user.phone.clone(),
            city: user.city.clone(),
            services_offered: user.services_offered.clone(),
            bookings: user.bookings.clone(),
            created_at: user.created_at,
        }
    }
}

impl From<User> for PublicProfile {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn user() -> User {
        User {
            id: UserId::random(),
            name: UserName::new("Alice").expect("valid name"),
            email: Email::new("alice@example.com").expect("valid email"),
            password_hash: "$argon2id$stub".to_owned(),
            role: Role::Client,
            phone: None,
            city: Some("Pune".to_owned()),
            services_offered: Vec::new(),
            bookings: Vec::new(),
            created_at: Utc::now(),
        }
    }

    #[rstest]
    #[case("", UserValidationError::EmptyEmail)]
    #[case("alice", UserValidationError::InvalidEmail)]
    #[case("alice@", UserValidationError::InvalidEmail)]
    #[case("a b@example.com", UserValidationError::InvalidEmail)]
    fn rejects_bad_emails(#[case] raw: &str, #[case] expected: UserValidationError) {
        assert_eq!(Email::new(raw), Err(expected));
    }

    #[rstest]
    fn name_is_trimmed_and_bounded() {
        assert_eq!(UserName::new("  Bob ").expect("valid").as_ref(), "Bob");
        assert_eq!(UserName::new(" "), Err(UserValidationError::EmptyName));
        assert!(matches!(
            UserName::new("x".repeat(USER_NAME_MAX + 1)),
            Err(UserValidationError::NameTooLong { .. })
        ));
    }

    #[rstest]
    fn sparse_patch_leaves_absent_fields(mut user: User) {
        let patch = UserPatch {
            phone: Some("555-0100".to_owned()),
            ..UserPatch::default()
        };
        user.apply(&patch);
        assert_eq!(user.phone.as_deref(), Some("555-0100"));
        assert_eq!(user.city.as_deref(), Some("Pune"));
        assert_eq!(user.name.as_ref(), "Alice");
    }

    #[rstest]
    fn applying_patch_twice_is_idempotent(mut user: User) {
        let patch = UserPatch {
            name: Some(UserName::new("Alicia").expect("valid name")),
            city: Some("Goa".to_owned()),
            ..UserPatch::default()
        };
        user.apply(&patch);
        let once = user.clone();
        user.apply(&patch);
        assert_eq!(user, once);
    }

    #[rstest]
    fn public_profile_omits_password_hash(user: User) {
        let value = serde_json::to_value(PublicProfile::from(&user)).expect("serialise profile");
        assert!(value.get("passwordHash").is_none());
        assert_eq!(value["role"], "client");
        assert_eq!(value["servicesOffered"], serde_json::json!([]));
    }
}
