//! Authentication inputs and the session identity issued at login.
//!
//! Inbound adapters convert raw payloads into these types before calling a
//! driving port, so services only ever see validated values.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use zeroize::Zeroizing;

use crate::domain::{Email, PublicProfile, Role, UserId, UserName, UserValidationError};

/// Fixed validity window of a session credential.
pub const SESSION_VALIDITY_HOURS: i64 = 24;

/// Validation failures for login and registration payloads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthValidationError {
    /// Password was empty.
    #[error("password must not be empty")]
    EmptyPassword,
    /// A user field failed validation.
    #[error(transparent)]
    User(#[from] UserValidationError),
}

fn require_password(password: &str) -> Result<Zeroizing<String>, AuthValidationError> {
    if password.is_empty() {
        return Err(AuthValidationError::EmptyPassword);
    }
    Ok(Zeroizing::new(password.to_owned()))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|trimmed| !trimmed.is_empty())
}

/// Validated login credentials.
///
/// The password keeps caller-supplied whitespace and is zeroed on drop.
///
/// # Examples
/// ```
/// use backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("Alice@Example.com", "s3cret")
///     .expect("valid credentials");
/// assert_eq!(creds.email().as_ref(), "alice@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: Email,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Validate raw email and password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, AuthValidationError> {
        Ok(Self {
            email: Email::new(email)?,
            password: require_password(password)?,
        })
    }

    /// Normalised email used for the lookup.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: UserName,
    pub email: Email,
    pub password: Zeroizing<String>,
    pub role: Role,
    pub phone: Option<String>,
    pub city: Option<String>,
}

impl Registration {
    /// Validate a registration payload. `role` defaults to [`Role::Client`].
    pub fn try_new(
        name: &str,
        email: &str,
        password: &str,
        role: Option<Role>,
        phone: Option<String>,
        city: Option<String>,
    ) -> Result<Self, AuthValidationError> {
        Ok(Self {
            name: UserName::new(name)?,
            email: Email::new(email)?,
            password: require_password(password)?,
            role: role.unwrap_or_default(),
            phone: non_blank(phone),
            city: non_blank(city),
        })
    }
}

/// Sparse self-update request carrying a plaintext password, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<UserName>,
    pub password: Option<Zeroizing<String>>,
    pub phone: Option<String>,
    pub city: Option<String>,
}

impl ProfileUpdate {
    /// Validate optional fields; absent fields stay untouched downstream.
    pub fn try_new(
        name: Option<&str>,
        password: Option<&str>,
        phone: Option<String>,
        city: Option<String>,
    ) -> Result<Self, AuthValidationError> {
        Ok(Self {
            name: name.map(UserName::new).transpose()?,
            password: password.map(require_password).transpose()?,
            phone: non_blank(phone),
            city: non_blank(city),
        })
    }
}

/// Identity carried by the session credential.
///
/// `expires_at` is fixed when the credential is issued, so activity never
/// extends it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionIdentity {
    pub user_id: UserId,
    pub email: Email,
    pub name: UserName,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
}

impl SessionIdentity {
    /// Issue an identity for `profile` valid for [`SESSION_VALIDITY_HOURS`].
    #[must_use]
    pub fn issue(profile: &PublicProfile, now: DateTime<Utc>) -> Self {
        Self {
            user_id: profile.id,
            email: profile.email.clone(),
            name: profile.name.clone(),
            role: profile.role,
            expires_at: now + Duration::hours(SESSION_VALIDITY_HOURS),
        }
    }

    /// `true` once `now` has reached the expiry instant.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
