//! Event bookings and the status state machine.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::domain::{Amount, EventId, Service, ServiceId, User, UserId};

/// Validation failures for event payloads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventValidationError {
    /// Event date was blank.
    #[error("eventDate must not be empty")]
    EmptyDate,
    /// No services were requested.
    #[error("at least one service must be booked")]
    NoServices,
    /// Event type label is not recognised.
    #[error("unknown event type: {0}")]
    UnknownType(String),
    /// Status label is not recognised.
    #[error("unknown event status: {0}")]
    UnknownStatus(String),
}

/// Kind of occasion being planned.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Marriage,
    Engagement,
    Birthday,
    Meeting,
    GetTogether,
    #[default]
    Other,
}

impl EventType {
    /// Stable lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Marriage => "marriage",
            Self::Engagement => "engagement",
            Self::Birthday => "birthday",
            Self::Meeting => "meeting",
            Self::GetTogether => "get_together",
            Self::Other => "other",
        }
    }
}

impl FromStr for EventType {
    type Err = EventValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "marriage" => Ok(Self::Marriage),
            "engagement" => Ok(Self::Engagement),
            "birthday" => Ok(Self::Birthday),
            "meeting" => Ok(Self::Meeting),
            "get_together" => Ok(Self::GetTogether),
            "other" => Ok(Self::Other),
            other => Err(EventValidationError::UnknownType(other.to_owned())),
        }
    }
}

/// Lifecycle status of an event.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    #[default]
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

/// Every legal status change. Anything absent is rejected.
const TRANSITIONS: &[(EventStatus, EventStatus)] = &[
    (EventStatus::Pending, EventStatus::Confirmed),
    (EventStatus::Pending, EventStatus::Cancelled),
    (EventStatus::Confirmed, EventStatus::Completed),
    (EventStatus::Confirmed, EventStatus::Cancelled),
];

/// Rejected status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot move event from {from} to {to}")]
pub struct InvalidTransition {
    /// Current status.
    pub from: EventStatus,
    /// Requested status.
    pub to: EventStatus,
}

impl EventStatus {
    /// Stable lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// `true` for statuses with no outgoing transitions.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !TRANSITIONS.iter().any(|(from, _)| *from == self)
    }

    /// Check a requested change against the transition table.
    ///
    /// Re-asserting the current status is a no-op and always accepted, so
    /// repeating a patch is idempotent.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::EventStatus;
    ///
    /// assert!(EventStatus::Pending.transition_to(EventStatus::Confirmed).is_ok());
    /// assert!(EventStatus::Cancelled.transition_to(EventStatus::Confirmed).is_err());
    /// ```
    pub fn transition_to(self, next: Self) -> Result<Self, InvalidTransition> {
        if self == next || TRANSITIONS.contains(&(self, next)) {
            Ok(next)
        } else {
            Err(InvalidTransition {
                from: self,
                to: next,
            })
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = EventValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(EventValidationError::UnknownStatus(other.to_owned())),
        }
    }
}

/// Booked event.
///
/// ## Invariants
/// - `client_id` is the creating client and never changes.
/// - `service_ids` were all resolvable when the event was created; later
///   deletions may leave dangling references.
/// - `status` only changes along the transition table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub client_id: UserId,
    pub service_ids: Vec<ServiceId>,
    pub event_type: EventType,
    pub event_date: String,
    pub venue_address: String,
    pub budget: Amount,
    pub final_cost: Option<Amount>,
    pub number_of_guests: u32,
    pub coordinator_id: Option<UserId>,
    pub status: EventStatus,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Materialise a pending event for `client_id`.
    #[must_use]
    pub fn create(
        id: EventId,
        client_id: UserId,
        draft: EventDraft,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            client_id,
            service_ids: draft.service_ids,
            event_type: draft.event_type,
            event_date: draft.event_date,
            venue_address: draft.venue_address,
            budget: draft.budget,
            final_cost: None,
            number_of_guests: draft.number_of_guests,
            coordinator_id: None,
            status: EventStatus::Pending,
            notes: draft.notes,
            created_at,
        }
    }

    /// Apply a sparse patch after validating any status change.
    ///
    /// Nothing is modified when the transition is rejected. A zero final
    /// cost counts as absent and leaves any recorded cost in place.
    pub fn apply(&mut self, patch: &EventPatch) -> Result<(), InvalidTransition> {
        let status = match patch.status {
            Some(next) => self.status.transition_to(next)?,
            None => self.status,
        };
        self.status = status;
        if let Some(coordinator) = patch.coordinator_id {
            self.coordinator_id = Some(coordinator);
        }
        if let Some(cost) = patch.final_cost.filter(|cost| cost.value() > 0.0) {
            self.final_cost = Some(cost);
        }
        Ok(())
    }
}

/// Fields a client supplies when booking.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub event_type: EventType,
    pub event_date: String,
    pub venue_address: String,
    pub budget: Amount,
    pub number_of_guests: u32,
    pub notes: String,
    service_ids: Vec<ServiceId>,
}

impl EventDraft {
    /// Validate a booking request.
    ///
    /// Service ids form an ordered set: duplicates are dropped, keeping the
    /// first occurrence.
    pub fn try_new(
        event_date: &str,
        budget: Amount,
        service_ids: Vec<ServiceId>,
    ) -> Result<Self, EventValidationError> {
        let event_date = event_date.trim();
        if event_date.is_empty() {
            return Err(EventValidationError::EmptyDate);
        }
        let mut unique = Vec::with_capacity(service_ids.len());
        for id in service_ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        if unique.is_empty() {
            return Err(EventValidationError::NoServices);
        }
        Ok(Self {
            event_type: EventType::default(),
            event_date: event_date.to_owned(),
            venue_address: String::new(),
            budget,
            number_of_guests: 0,
            notes: String::new(),
            service_ids: unique,
        })
    }

    /// Requested services, de-duplicated in request order.
    pub fn service_ids(&self) -> &[ServiceId] {
        &self.service_ids
    }
}

/// Sparse event update applied by coordinators and admins.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EventPatch {
    pub status: Option<EventStatus>,
    pub coordinator_id: Option<UserId>,
    pub final_cost: Option<Amount>,
}

/// Client fields joined into an event view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl From<&User> for ClientSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.to_string(),
            email: user.email.to_string(),
        }
    }
}

/// Coordinator fields joined into an event view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CoordinatorSummary {
    pub id: UserId,
    pub name: String,
    pub phone: Option<String>,
}

impl From<&User> for CoordinatorSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.to_string(),
            phone: user.phone.clone(),
        }
    }
}

/// Event with its references resolved.
///
/// Missing services are omitted from `services`; a missing client or
/// coordinator yields `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: Event,
    pub services: Vec<Service>,
    pub client: Option<ClientSummary>,
    pub coordinator: Option<CoordinatorSummary>,
}
