//! Driving port for registration and self-service account changes.

use async_trait::async_trait;

use crate::domain::{Error, EventId, ProfileUpdate, PublicProfile, Registration, UserId};

/// Mutations a user performs on their own account.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAccountCommand: Send + Sync {
    /// Create a user. A taken email yields a `conflict` error.
    async fn register(&self, registration: Registration) -> Result<PublicProfile, Error>;

    /// Apply a sparse update to the caller's own record.
    async fn update_profile(
        &self,
        user_id: &UserId,
        update: ProfileUpdate,
    ) -> Result<PublicProfile, Error>;

    /// Add an event to the caller's booking references.
    async fn add_booking(
        &self,
        user_id: &UserId,
        event_id: &EventId,
    ) -> Result<PublicProfile, Error>;

    /// Remove an event from the caller's booking references.
    async fn remove_booking(
        &self,
        user_id: &UserId,
        event_id: &EventId,
    ) -> Result<PublicProfile, Error>;
}
