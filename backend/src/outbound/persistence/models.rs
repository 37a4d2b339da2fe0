//! Internal Diesel row structs and their conversions to domain records.
//!
//! Rows never leave the persistence module. Conversions from rows validate
//! every stored label and value through the domain constructors.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Amount, Email, Event, EventId, Review, Service, ServiceId, Title, User, UserId, UserName,
    UserPatch,
};

use super::schema::{events, services, users};

/// Failure to rebuild a domain record from a stored row.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("stored {table} row {id} is invalid: {message}")]
pub(crate) struct RowDecodeError {
    table: &'static str,
    id: Uuid,
    message: String,
}

impl RowDecodeError {
    fn new(table: &'static str, id: Uuid, message: impl std::fmt::Display) -> Self {
        Self {
            table,
            id,
            message: message.to_string(),
        }
    }
}

fn uuids_to<T>(values: Vec<Uuid>, wrap: fn(Uuid) -> T) -> Vec<T> {
    values.into_iter().map(wrap).collect()
}

fn ids_to_uuids<T>(values: &[T], unwrap: fn(&T) -> &Uuid) -> Vec<Uuid> {
    values.iter().map(|value| *unwrap(value)).collect()
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Full users row, used for reads and inserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub services_offered: Vec<Uuid>,
    pub bookings: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            id: *user.id.as_uuid(),
            name: user.name.to_string(),
            email: user.email.to_string(),
            password_hash: user.password_hash.clone(),
            role: user.role.as_str().to_owned(),
            phone: user.phone.clone(),
            city: user.city.clone(),
            services_offered: ids_to_uuids(&user.services_offered, ServiceId::as_uuid),
            bookings: ids_to_uuids(&user.bookings, EventId::as_uuid),
            created_at: user.created_at,
        }
    }
}

impl TryFrom<UserRow> for User {
    type Error = RowDecodeError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let invalid = |message: &dyn std::fmt::Display| RowDecodeError::new("users", id, message);
        Ok(Self {
            id: UserId::from_uuid(row.id),
            name: UserName::new(&row.name).map_err(|err| invalid(&err))?,
            email: Email::new(&row.email).map_err(|err| invalid(&err))?,
            password_hash: row.password_hash,
            role: row.role.parse().map_err(|err| invalid(&err))?,
            phone: row.phone,
            city: row.city,
            services_offered: uuids_to(row.services_offered, ServiceId::from_uuid),
            bookings: uuids_to(row.bookings, EventId::from_uuid),
            created_at: row.created_at,
        })
    }
}

/// Sparse changeset; `None` fields are left untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserChangeset<'a> {
    pub name: Option<&'a str>,
    pub password_hash: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub city: Option<&'a str>,
}

impl<'a> From<&'a UserPatch> for UserChangeset<'a> {
    fn from(patch: &'a UserPatch) -> Self {
        Self {
            name: patch.name.as_ref().map(AsRef::as_ref),
            password_hash: patch.password_hash.as_deref(),
            phone: patch.phone.as_deref(),
            city: patch.city.as_deref(),
        }
    }
}

// ---------------------------------------------------------------------------
// Services
// ---------------------------------------------------------------------------

/// Full services row. As a changeset it overwrites every non-key column.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = services)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ServiceRow {
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub title: String,
    pub category: String,
    pub description: String,
    pub photos: Vec<String>,
    pub price: f64,
    pub price_type: String,
    pub availability: Vec<String>,
    pub perks: Vec<String>,
    pub rating: f64,
    pub reviews: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<&Service> for ServiceRow {
    type Error = RowDecodeError;

    fn try_from(service: &Service) -> Result<Self, Self::Error> {
        let reviews = serde_json::to_value(&service.reviews)
            .map_err(|err| RowDecodeError::new("services", *service.id.as_uuid(), err))?;
        Ok(Self {
            id: *service.id.as_uuid(),
            vendor_id: *service.vendor_id.as_uuid(),
            title: service.title.as_ref().to_owned(),
            category: service.category.as_str().to_owned(),
            description: service.description.clone(),
            photos: service.photos.clone(),
            price: service.price.value(),
            price_type: service.price_type.as_str().to_owned(),
            availability: service.availability.clone(),
            perks: service.perks.clone(),
            rating: service.rating,
            reviews,
            created_at: service.created_at,
        })
    }
}

impl TryFrom<ServiceRow> for Service {
    type Error = RowDecodeError;

    fn try_from(row: ServiceRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let invalid =
            |message: &dyn std::fmt::Display| RowDecodeError::new("services", id, message);
        let reviews: Vec<Review> =
            serde_json::from_value(row.reviews).map_err(|err| invalid(&err))?;
        Ok(Self {
            id: ServiceId::from_uuid(row.id),
            vendor_id: UserId::from_uuid(row.vendor_id),
            title: Title::new(&row.title).map_err(|err| invalid(&err))?,
            category: row.category.parse().map_err(|err| invalid(&err))?,
            description: row.description,
            photos: row.photos,
            price: Amount::new(row.price).map_err(|err| invalid(&err))?,
            price_type: row.price_type.parse().map_err(|err| invalid(&err))?,
            availability: row.availability,
            perks: row.perks,
            rating: row.rating,
            reviews,
            created_at: row.created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Full events row. As a changeset it overwrites every non-key column.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct EventRow {
    pub id: Uuid,
    pub client_id: Uuid,
    pub service_ids: Vec<Uuid>,
    pub event_type: String,
    pub event_date: String,
    pub venue_address: String,
    pub budget: f64,
    pub final_cost: Option<f64>,
    pub number_of_guests: i32,
    pub coordinator_id: Option<Uuid>,
    pub status: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<&Event> for EventRow {
    type Error = RowDecodeError;

    fn try_from(event: &Event) -> Result<Self, Self::Error> {
        let number_of_guests = i32::try_from(event.number_of_guests)
            .map_err(|err| RowDecodeError::new("events", *event.id.as_uuid(), err))?;
        Ok(Self {
            id: *event.id.as_uuid(),
            client_id: *event.client_id.as_uuid(),
            service_ids: ids_to_uuids(&event.service_ids, ServiceId::as_uuid),
            event_type: event.event_type.as_str().to_owned(),
            event_date: event.event_date.clone(),
            venue_address: event.venue_address.clone(),
            budget: event.budget.value(),
            final_cost: event.final_cost.map(Amount::value),
            number_of_guests,
            coordinator_id: event.coordinator_id.map(|id| *id.as_uuid()),
            status: event.status.as_str().to_owned(),
            notes: event.notes.clone(),
            created_at: event.created_at,
        })
    }
}

impl TryFrom<EventRow> for Event {
    type Error = RowDecodeError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let invalid = |message: &dyn std::fmt::Display| RowDecodeError::new("events", id, message);
        Ok(Self {
            id: EventId::from_uuid(row.id),
            client_id: UserId::from_uuid(row.client_id),
            service_ids: uuids_to(row.service_ids, ServiceId::from_uuid),
            event_type: row.event_type.parse().map_err(|err| invalid(&err))?,
            event_date: row.event_date,
            venue_address: row.venue_address,
            budget: Amount::new(row.budget).map_err(|err| invalid(&err))?,
            final_cost: row
                .final_cost
                .map(Amount::new)
                .transpose()
                .map_err(|err| invalid(&err))?,
            number_of_guests: u32::try_from(row.number_of_guests).map_err(|err| invalid(&err))?,
            coordinator_id: row.coordinator_id.map(UserId::from_uuid),
            status: row.status.parse().map_err(|err| invalid(&err))?,
            notes: row.notes,
            created_at: row.created_at,
        })
    }
}
