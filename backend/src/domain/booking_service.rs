//! Event booking engine.
//!
//! Validates requested services against the catalog, enforces the status
//! state machine and resolves joined event views. Validation and insertion
//! are not transactional: a service deleted between the two leaves a
//! dangling reference, which readers tolerate.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::catalog_service::{map_service_error, map_user_lookup_error};
use crate::domain::ports::{
    EventBookingCommand, EventBookingQuery, EventRepository, EventRepositoryError,
    ServiceRepository, UserRepository,
};
use crate::domain::{
    Action, Actor, ClientSummary, CoordinatorSummary, Error, Event, EventDetail, EventDraft,
    EventId, EventPatch, Role, Service, ServiceId, User, UserId, ensure_allowed,
};

fn map_event_error(error: EventRepositoryError) -> Error {
    match error {
        EventRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("event repository unavailable: {message}"))
        }
        EventRepositoryError::Query { message } => {
            Error::internal(format!("event repository error: {message}"))
        }
    }
}

fn event_not_found(id: &EventId) -> Error {
    Error::not_found(format!("event {id} not found"))
}

/// Booking service implementing the event command and query ports.
#[derive(Clone)]
pub struct BookingService<E, S, U> {
    events: Arc<E>,
    services: Arc<S>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<E, S, U> BookingService<E, S, U> {
    /// Create the service from its repositories and a clock.
    pub fn new(events: Arc<E>, services: Arc<S>, users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self {
            events,
            services,
            users,
            clock,
        }
    }
}

impl<E, S, U> BookingService<E, S, U>
where
    E: EventRepository,
    S: ServiceRepository,
    U: UserRepository,
{
    async fn load(&self, id: &EventId) -> Result<Event, Error> {
        self.events
            .find_by_id(id)
            .await
            .map_err(map_event_error)?
            .ok_or_else(|| event_not_found(id))
    }

    async fn ensure_coordinator(&self, id: &UserId) -> Result<(), Error> {
        let user = self
            .users
            .find_by_id(id)
            .await
            .map_err(map_user_lookup_error)?;
        match user {
            Some(user) if user.role == Role::Coordinator => Ok(()),
            Some(_) => Err(Error::invalid_request(format!(
                "user {id} is not a coordinator"
            ))),
            None => Err(Error::invalid_request(format!("coordinator {id} not found"))),
        }
    }

    /// Resolve services, clients and coordinators for a batch of events.
    async fn join(&self, events: Vec<Event>) -> Result<Vec<EventDetail>, Error> {
        let mut service_ids: Vec<ServiceId> = events
            .iter()
            .flat_map(|event| event.service_ids.iter().copied())
            .collect();
        service_ids.sort_unstable();
        service_ids.dedup();

        let mut user_ids: Vec<UserId> = events
            .iter()
            .flat_map(|event| std::iter::once(event.client_id).chain(event.coordinator_id))
            .collect();
        user_ids.sort_unstable();
        user_ids.dedup();

        let services: HashMap<ServiceId, Service> = if service_ids.is_empty() {
            HashMap::new()
        } else {
            self.services
                .find_by_ids(&service_ids)
                .await
                .map_err(map_service_error)?
                .into_iter()
                .map(|service| (service.id, service))
                .collect()
        };
        let users: HashMap<UserId, User> = if user_ids.is_empty() {
            HashMap::new()
        } else {
            self.users
                .find_by_ids(&user_ids)
                .await
                .map_err(map_user_lookup_error)?
                .into_iter()
                .map(|user| (user.id, user))
                .collect()
        };

        Ok(events
            .into_iter()
            .map(|event| EventDetail {
                services: event
                    .service_ids
                    .iter()
                    .filter_map(|id| services.get(id).cloned())
                    .collect(),
                client: users.get(&event.client_id).map(ClientSummary::from),
                coordinator: event
                    .coordinator_id
                    .and_then(|id| users.get(&id))
                    .map(CoordinatorSummary::from),
                event,
            })
            .collect())
    }
}

#[async_trait]
impl<E, S, U> EventBookingCommand for BookingService<E, S, U>
where
    E: EventRepository,
    S: ServiceRepository,
    U: UserRepository,
{
    async fn create_event(&self, actor: &Actor, draft: EventDraft) -> Result<Event, Error> {
        ensure_allowed(actor, Action::CreateEvent, true)?;

        let requested = draft.service_ids();
        let resolved = self
            .services
            .find_by_ids(requested)
            .await
            .map_err(map_service_error)?;
        if resolved.len() != requested.len() {
            let missing: Vec<String> = requested
                .iter()
                .filter(|id| !resolved.iter().any(|service| service.id == **id))
                .map(ToString::to_string)
                .collect();
            return Err(Error::invalid_request("one or more services invalid")
                .with_details(json!({ "field": "services", "missing": missing })));
        }

        let event = Event::create(EventId::random(), actor.user_id, draft, self.clock.utc());
        self.events.insert(&event).await.map_err(map_event_error)?;

        info!(user_id = %actor.user_id, event_id = %event.id, "event booked");
        Ok(event)
    }

    async fn update_event(
        &self,
        actor: &Actor,
        event_id: &EventId,
        patch: EventPatch,
    ) -> Result<Event, Error> {
        ensure_allowed(actor, Action::ModifyEvent, false)?;
        if let Some(coordinator) = &patch.coordinator_id {
            self.ensure_coordinator(coordinator).await?;
        }

        let mut event = self.load(event_id).await?;
        event
            .apply(&patch)
            .map_err(|err| Error::invalid_transition(err.to_string()))?;

        let updated = self.events.update(&event).await.map_err(map_event_error)?;
        if !updated {
            return Err(event_not_found(event_id));
        }

        info!(
            user_id = %actor.user_id,
            event_id = %event_id,
            status = %event.status,
            "event updated"
        );
        Ok(event)
    }

    async fn delete_event(&self, actor: &Actor, event_id: &EventId) -> Result<(), Error> {
        let event = self.load(event_id).await?;
        ensure_allowed(actor, Action::DeleteEvent, event.client_id == actor.user_id)?;

        let deleted = self.events.delete(event_id).await.map_err(map_event_error)?;
        if !deleted {
            return Err(event_not_found(event_id));
        }

        info!(user_id = %actor.user_id, event_id = %event_id, "event deleted");
        Ok(())
    }
}

#[async_trait]
impl<E, S, U> EventBookingQuery for BookingService<E, S, U>
where
    E: EventRepository,
    S: ServiceRepository,
    U: UserRepository,
{
    async fn get_event(&self, event_id: &EventId) -> Result<EventDetail, Error> {
        let event = self.load(event_id).await?;
        let mut joined = self.join(vec![event]).await?;
        joined.pop().ok_or_else(|| event_not_found(event_id))
    }

    async fn list_for_client(&self, client_id: &UserId) -> Result<Vec<EventDetail>, Error> {
        let events = self
            .events
            .list_by_client(client_id)
            .await
            .map_err(map_event_error)?;
        self.join(events).await
    }
}

#[cfg(test)]
#[path = "booking_service_tests.rs"]
mod tests;
