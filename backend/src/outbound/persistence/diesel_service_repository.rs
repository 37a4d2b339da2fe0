//! PostgreSQL-backed `ServiceRepository`.
//!
//! Search pushes every filter into a single query. The vendor city filter
//! needs the `users` table, so listings are selected through a left join.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::RunQueryDsl;
use pagination::PageRequest;
use uuid::Uuid;

use crate::domain::ports::{ServiceRepository, ServiceRepositoryError};
use crate::domain::{Service, ServiceId, ServiceSearch, UserId};

use super::diesel_error_mapping::{diesel_failure, pool_failure};
use super::models::ServiceRow;
use super::pool::{DbPool, PoolError};
use super::schema::{services, users};

/// Diesel-backed implementation of the service catalog repository port.
#[derive(Clone)]
pub struct DieselServiceRepository {
    pool: DbPool,
}

impl DieselServiceRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ServiceRepositoryError {
    pool_failure(error)
}

fn map_diesel_error(error: DieselError) -> ServiceRepositoryError {
    diesel_failure(error)
}

fn encode(service: &Service) -> Result<ServiceRow, ServiceRepositoryError> {
    ServiceRow::try_from(service).map_err(|err| ServiceRepositoryError::query(err.to_string()))
}

fn decode(row: ServiceRow) -> Result<Service, ServiceRepositoryError> {
    Service::try_from(row).map_err(|err| ServiceRepositoryError::query(err.to_string()))
}

fn rows_to_services(rows: Vec<ServiceRow>) -> Result<Vec<Service>, ServiceRepositoryError> {
    rows.into_iter().map(decode).collect()
}

/// Escape `LIKE` metacharacters so user text only matches literally.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn contains_pattern(raw: &str) -> String {
    format!("%{}%", escape_like(raw))
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[async_trait]
impl ServiceRepository for DieselServiceRepository {
    async fn insert(&self, service: &Service) -> Result<(), ServiceRepositoryError> {
        let row = encode(service)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(services::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &ServiceId) -> Result<Option<Service>, ServiceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = services::table
            .filter(services::id.eq(id.as_uuid()))
            .select(ServiceRow::as_select())
            .first::<ServiceRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(decode).transpose()
    }

    async fn find_by_ids(&self, ids: &[ServiceId]) -> Result<Vec<Service>, ServiceRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows = services::table
            .filter(services::id.eq_any(uuids))
            .select(ServiceRow::as_select())
            .load::<ServiceRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_services(rows)
    }

    async fn update(&self, service: &Service) -> Result<bool, ServiceRepositoryError> {
        let row = encode(service)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::update(services::table.filter(services::id.eq(row.id)))
            .set(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }

    async fn delete(&self, id: &ServiceId) -> Result<bool, ServiceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::delete(services::table.filter(services::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }

    async fn search(
        &self,
        filter: &ServiceSearch,
        page: &PageRequest,
    ) -> Result<Vec<Service>, ServiceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = services::table
            .left_join(users::table.on(users::id.eq(services::vendor_id)))
            .select(ServiceRow::as_select())
            .into_boxed();

        if let Some(text) = filter.query() {
            let pattern = contains_pattern(text);
            query = query.filter(
                services::title
                    .ilike(pattern.clone())
                    .or(services::description.ilike(pattern)),
            );
        }
        if let Some(category) = filter.category() {
            query = query.filter(services::category.eq(category.as_str()));
        }
        if let Some(min) = filter.min_price() {
            query = query.filter(services::price.ge(min.value()));
        }
        if let Some(max) = filter.max_price() {
            query = query.filter(services::price.le(max.value()));
        }
        if let Some(city) = filter.city() {
            query = query.filter(users::city.ilike(escape_like(city)));
        }

        let rows = query
            .order((services::created_at.desc(), services::id.desc()))
            .offset(to_i64(page.offset()))
            .limit(to_i64(page.lookahead_limit()))
            .load::<ServiceRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_services(rows)
    }

    async fn list_by_vendor(
        &self,
        vendor_id: &UserId,
    ) -> Result<Vec<Service>, ServiceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = services::table
            .filter(services::vendor_id.eq(vendor_id.as_uuid()))
            .order((services::created_at.desc(), services::id.desc()))
            .select(ServiceRow::as_select())
            .load::<ServiceRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_services(rows)
    }
}
