//! PostgreSQL-backed `EventRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{EventRepository, EventRepositoryError};
use crate::domain::{Event, EventId, UserId};

use super::diesel_error_mapping::{diesel_failure, pool_failure};
use super::models::EventRow;
use super::pool::{DbPool, PoolError};
use super::schema::events;

/// Diesel-backed implementation of the event repository port.
#[derive(Clone)]
pub struct DieselEventRepository {
    pool: DbPool,
}

impl DieselEventRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> EventRepositoryError {
    pool_failure(error)
}

fn map_diesel_error(error: DieselError) -> EventRepositoryError {
    diesel_failure(error)
}

fn encode(event: &Event) -> Result<EventRow, EventRepositoryError> {
    EventRow::try_from(event).map_err(|err| EventRepositoryError::query(err.to_string()))
}

fn decode(row: EventRow) -> Result<Event, EventRepositoryError> {
    Event::try_from(row).map_err(|err| EventRepositoryError::query(err.to_string()))
}

#[async_trait]
impl EventRepository for DieselEventRepository {
    async fn insert(&self, event: &Event) -> Result<(), EventRepositoryError> {
        let row = encode(event)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(events::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &EventId) -> Result<Option<Event>, EventRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = events::table
            .filter(events::id.eq(id.as_uuid()))
            .select(EventRow::as_select())
            .first::<EventRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(decode).transpose()
    }

    async fn list_by_client(&self, client_id: &UserId) -> Result<Vec<Event>, EventRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = events::table
            .filter(events::client_id.eq(client_id.as_uuid()))
            .order((events::created_at.desc(), events::id.desc()))
            .select(EventRow::as_select())
            .load::<EventRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(decode).collect()
    }

    async fn update(&self, event: &Event) -> Result<bool, EventRepositoryError> {
        let row = encode(event)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::update(events::table.filter(events::id.eq(row.id)))
            .set(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }

    async fn delete(&self, id: &EventId) -> Result<bool, EventRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::delete(events::table.filter(events::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }
}
