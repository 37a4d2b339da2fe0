//! Driving port for event reads.

use async_trait::async_trait;

use crate::domain::{Error, EventDetail, EventId, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventBookingQuery: Send + Sync {
    /// One event with services, client and coordinator resolved.
    async fn get_event(&self, event_id: &EventId) -> Result<EventDetail, Error>;

    /// Every event booked by `client_id`, newest first, joined.
    async fn list_for_client(&self, client_id: &UserId) -> Result<Vec<EventDetail>, Error>;
}
