//! Driving port for credential authentication.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, PublicProfile};

/// Authenticate an email and password pair.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Return the caller's public profile on success.
    ///
    /// Fails with `not_found` for an unknown email and
    /// `invalid_credentials` for a password mismatch.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<PublicProfile, Error>;
}
