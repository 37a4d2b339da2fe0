//! Driven port for user persistence.
//!
//! Booking references and offered services are maintained with atomic
//! add-to-set/remove primitives so concurrent requests never lose updates.

use async_trait::async_trait;

use crate::domain::{Email, EventId, ServiceId, User, UserId, UserPatch};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another user already registered this email.
        DuplicateEmail { email: String } => "email already registered: {email}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user, failing with `DuplicateEmail` on a taken address.
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by normalised email.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch every user in `ids` that still exists, in no particular order.
    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError>;

    /// Apply a sparse patch, returning the updated user when it exists.
    async fn update_profile(
        &self,
        id: &UserId,
        patch: &UserPatch,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Append `event_id` to the user's bookings unless already present.
    async fn add_booking(
        &self,
        id: &UserId,
        event_id: &EventId,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Remove every occurrence of `event_id` from the user's bookings.
    async fn remove_booking(
        &self,
        id: &UserId,
        event_id: &EventId,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Record that `id` offers `service_id`.
    async fn link_service(
        &self,
        id: &UserId,
        service_id: &ServiceId,
    ) -> Result<(), UserPersistenceError>;

    /// Drop `service_id` from the offered services of `id`.
    async fn unlink_service(
        &self,
        id: &UserId,
        service_id: &ServiceId,
    ) -> Result<(), UserPersistenceError>;
}
