//! Driving port for reading public profiles.

use async_trait::async_trait;

use crate::domain::{Error, PublicProfile, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserProfileQuery: Send + Sync {
    /// Fetch a user's profile with the credential hash removed.
    async fn profile(&self, user_id: &UserId) -> Result<PublicProfile, Error>;
}
