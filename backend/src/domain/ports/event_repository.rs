//! Driven port for event persistence.

use async_trait::async_trait;

use crate::domain::{Event, EventId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by event repository adapters.
    pub enum EventRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "event repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "event repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Persist a new event.
    async fn insert(&self, event: &Event) -> Result<(), EventRepositoryError>;

    /// Fetch one event.
    async fn find_by_id(&self, id: &EventId) -> Result<Option<Event>, EventRepositoryError>;

    /// Events booked by a client, newest first.
    async fn list_by_client(&self, client_id: &UserId) -> Result<Vec<Event>, EventRepositoryError>;

    /// Overwrite a stored event. Returns `false` when it no longer exists.
    async fn update(&self, event: &Event) -> Result<bool, EventRepositoryError>;

    /// Delete an event. Returns `false` when nothing was deleted.
    async fn delete(&self, id: &EventId) -> Result<bool, EventRepositoryError>;
}
