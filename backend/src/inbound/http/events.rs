//! Event booking handlers.
//!
//! ```text
//! POST   /api/event           client books services
//! PUT    /api/event           {"id","status"?,"coordinatorId"?,"finalCost"?}
//! DELETE /api/event           {"eventId"}
//! GET    /api/event/account   caller's events, newest first
//! GET    /api/event/{id}      one event with references resolved
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Error, Event, EventDetail, EventDraft, EventId, EventPatch, EventStatus, EventType,
    EventValidationError, ServiceId, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, ValidationCode, field_error, parse_amount, parse_id, parse_id_list, parse_label,
    parse_optional_amount,
};

/// Booking request.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    /// Identifiers of the services to book; duplicates are ignored.
    #[serde(default)]
    pub services: Vec<String>,
    #[schema(example = "birthday")]
    pub event_type: Option<String>,
    #[schema(example = "2025-06-01")]
    pub event_date: String,
    #[serde(default)]
    pub venue_address: String,
    pub budget: f64,
    #[serde(default)]
    pub number_of_guests: u32,
    #[serde(default)]
    pub notes: String,
}

/// Coordinator or admin update.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    #[serde(alias = "eventId")]
    pub id: String,
    #[schema(example = "confirmed")]
    pub status: Option<String>,
    pub coordinator_id: Option<String>,
    pub final_cost: Option<f64>,
}

/// Delete body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteEventRequest {
    pub event_id: String,
}

fn map_event_validation_error(err: EventValidationError) -> Error {
    let field = match &err {
        EventValidationError::EmptyDate => "eventDate",
        EventValidationError::NoServices => "services",
        EventValidationError::UnknownType(_) => "eventType",
        EventValidationError::UnknownStatus(_) => "status",
    };
    field_error(FieldName::new(field), ValidationCode::InvalidValue, err)
}

impl CreateEventRequest {
    fn into_draft(self) -> Result<EventDraft, Error> {
        let services: Vec<ServiceId> = parse_id_list(&self.services, FieldName::new("services"))?;
        let budget = parse_amount(self.budget, FieldName::new("budget"))?;
        let mut draft = EventDraft::try_new(&self.event_date, budget, services)
            .map_err(map_event_validation_error)?;
        if let Some(event_type) =
            parse_label::<EventType>(self.event_type.as_deref(), FieldName::new("eventType"))?
        {
            draft.event_type = event_type;
        }
        draft.venue_address = self.venue_address;
        draft.number_of_guests = self.number_of_guests;
        draft.notes = self.notes;
        Ok(draft)
    }
}

impl UpdateEventRequest {
    fn into_parts(self) -> Result<(EventId, EventPatch), Error> {
        let id = parse_id(&self.id, FieldName::new("id"))?;
        let coordinator_id = self
            .coordinator_id
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| parse_id::<UserId>(raw, FieldName::new("coordinatorId")))
            .transpose()?;
        let patch = EventPatch {
            status: parse_label::<EventStatus>(self.status.as_deref(), FieldName::new("status"))?,
            coordinator_id,
            final_cost: parse_optional_amount(self.final_cost, FieldName::new("finalCost"))?,
        };
        Ok((id, patch))
    }
}

/// Book a pending event for the calling client.
#[utoipa::path(
    post,
    path = "/api/event",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event booked", body = Event),
        (status = 400, description = "Invalid request or unknown services", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Caller is not a client", body = Error)
    ),
    tags = ["events"],
    operation_id = "createEvent"
)]
#[post("/event")]
pub async fn create_event(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateEventRequest>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor(state.clock.utc())?;
    let draft = payload.into_inner().into_draft()?;
    let event = state.bookings.create_event(&actor, draft).await?;
    Ok(HttpResponse::Created().json(event))
}

/// Change status, coordinator or final cost.
#[utoipa::path(
    put,
    path = "/api/event",
    request_body = UpdateEventRequest,
    responses(
        (status = 200, description = "Updated event", body = Event),
        (status = 400, description = "Invalid request or coordinator", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Caller may not manage events", body = Error),
        (status = 404, description = "Unknown event", body = Error),
        (status = 422, description = "Status change not allowed", body = Error)
    ),
    tags = ["events"],
    operation_id = "updateEvent"
)]
#[put("/event")]
pub async fn update_event(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<UpdateEventRequest>,
) -> ApiResult<web::Json<Event>> {
    let actor = session.require_actor(state.clock.utc())?;
    let (id, patch) = payload.into_inner().into_parts()?;
    let event = state.bookings.update_event(&actor, &id, patch).await?;
    Ok(web::Json(event))
}

/// Remove an event. Owning client or admin only.
#[utoipa::path(
    delete,
    path = "/api/event",
    request_body = DeleteEventRequest,
    responses(
        (status = 200, description = "Event deleted", body = String),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Not the owner", body = Error),
        (status = 404, description = "Unknown event", body = Error)
    ),
    tags = ["events"],
    operation_id = "deleteEvent"
)]
#[delete("/event")]
pub async fn delete_event(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<DeleteEventRequest>,
) -> ApiResult<web::Json<&'static str>> {
    let actor = session.require_actor(state.clock.utc())?;
    let id: EventId = parse_id(&payload.event_id, FieldName::new("eventId"))?;
    state.bookings.delete_event(&actor, &id).await?;
    Ok(web::Json("Event deleted"))
}

/// Events booked by the caller, newest first.
#[utoipa::path(
    get,
    path = "/api/event/account",
    responses(
        (status = 200, description = "Caller's events", body = [EventDetail]),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["events"],
    operation_id = "listOwnEvents"
)]
#[get("/event/account")]
pub async fn list_own_events(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<EventDetail>>> {
    let identity = session.require_identity(state.clock.utc())?;
    let events = state
        .bookings_query
        .list_for_client(&identity.user_id)
        .await?;
    Ok(web::Json(events))
}

/// One event with services, client and coordinator resolved.
#[utoipa::path(
    get,
    path = "/api/event/{id}",
    params(("id" = String, Path, description = "Event identifier")),
    responses(
        (status = 200, description = "Event", body = EventDetail),
        (status = 400, description = "Malformed identifier", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Unknown event", body = Error)
    ),
    tags = ["events"],
    operation_id = "getEvent"
)]
#[get("/event/{id}")]
pub async fn get_event(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<EventDetail>> {
    session.require_identity(state.clock.utc())?;
    let id: EventId = parse_id(&path, FieldName::new("id"))?;
    let detail = state.bookings_query.get_event(&id).await?;
    Ok(web::Json(detail))
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
