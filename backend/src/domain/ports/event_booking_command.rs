//! Driving port for event booking mutations.

use async_trait::async_trait;

use crate::domain::{Actor, Error, Event, EventDraft, EventId, EventPatch};

/// Book, update and remove events.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventBookingCommand: Send + Sync {
    /// Book a pending event after validating every requested service.
    async fn create_event(&self, actor: &Actor, draft: EventDraft) -> Result<Event, Error>;

    /// Apply a status, coordinator or final cost change.
    async fn update_event(
        &self,
        actor: &Actor,
        event_id: &EventId,
        patch: EventPatch,
    ) -> Result<Event, Error>;

    /// Remove an event.
    async fn delete_event(&self, actor: &Actor, event_id: &EventId) -> Result<(), Error>;
}
