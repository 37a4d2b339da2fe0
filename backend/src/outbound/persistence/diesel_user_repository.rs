//! PostgreSQL-backed `UserRepository`.
//!
//! Booking and service references live in `UUID[]` columns and are edited
//! with single `UPDATE` statements so concurrent writers never overwrite
//! each other's additions.

use async_trait::async_trait;
use diesel::dsl::not;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel::sql_types::{Array, Uuid as SqlUuid};
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Email, EventId, ServiceId, User, UserId, UserPatch};

use super::diesel_error_mapping::{DieselFailure, diesel_failure, pool_failure};
use super::models::{UserChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

diesel::define_sql_function! {
    /// PostgreSQL `array_append` over UUID arrays.
    fn array_append(array: Array<SqlUuid>, element: SqlUuid) -> Array<SqlUuid>;
}

diesel::define_sql_function! {
    /// PostgreSQL `array_remove`; drops every occurrence of `element`.
    fn array_remove(array: Array<SqlUuid>, element: SqlUuid) -> Array<SqlUuid>;
}

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    pool_failure(error)
}

fn map_diesel_error(error: DieselError) -> UserPersistenceError {
    diesel_failure(error)
}

/// Inserts additionally recognise the unique index on `email`.
fn map_insert_error(error: DieselError, email: &Email) -> UserPersistenceError {
    match DieselFailure::from(error) {
        DieselFailure::UniqueViolation { .. } => {
            UserPersistenceError::duplicate_email(email.as_ref())
        }
        other => other.into_port(),
    }
}

fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    User::try_from(row).map_err(|err| UserPersistenceError::query(err.to_string()))
}

fn rows_to_users(rows: Vec<UserRow>) -> Result<Vec<User>, UserPersistenceError> {
    rows.into_iter().map(row_to_user).collect()
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(users::table)
            .values(UserRow::from(user))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_insert_error(err, &user.email))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows = users::table
            .filter(users::id.eq_any(uuids))
            .select(UserRow::as_select())
            .load::<UserRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_users(rows)
    }

    async fn update_profile(
        &self,
        id: &UserId,
        patch: &UserPatch,
    ) -> Result<Option<User>, UserPersistenceError> {
        // Diesel rejects a changeset with no columns.
        if patch.is_empty() {
            return self.find_by_id(id).await;
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
            .set(UserChangeset::from(patch))
            .returning(UserRow::as_returning())
            .get_result::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn add_booking(
        &self,
        id: &UserId,
        event_id: &EventId,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let event_uuid = *event_id.as_uuid();
        let row = diesel::update(
            users::table
                .filter(users::id.eq(id.as_uuid()))
                .filter(not(users::bookings.contains(vec![event_uuid]))),
        )
        .set(users::bookings.eq(array_append(users::bookings, event_uuid)))
        .returning(UserRow::as_returning())
        .get_result::<UserRow>(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;
        drop(conn);

        match row {
            Some(row) => row_to_user(row).map(Some),
            // Either the user is missing or the booking was already present.
            None => self.find_by_id(id).await,
        }
    }

    async fn remove_booking(
        &self,
        id: &UserId,
        event_id: &EventId,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
            .set(users::bookings.eq(array_remove(users::bookings, *event_id.as_uuid())))
            .returning(UserRow::as_returning())
            .get_result::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn link_service(
        &self,
        id: &UserId,
        service_id: &ServiceId,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let service_uuid = *service_id.as_uuid();
        diesel::update(
            users::table
                .filter(users::id.eq(id.as_uuid()))
                .filter(not(users::services_offered.contains(vec![service_uuid]))),
        )
        .set(users::services_offered.eq(array_append(users::services_offered, service_uuid)))
        .execute(&mut conn)
        .await
        .map(|_| ())
        .map_err(map_diesel_error)
    }

    async fn unlink_service(
        &self,
        id: &UserId,
        service_id: &ServiceId,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
            .set(
                users::services_offered
                    .eq(array_remove(users::services_offered, *service_id.as_uuid())),
            )
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outbound::persistence::diesel_error_mapping::tests::database_error;
    use diesel::result::DatabaseErrorKind;
    use rstest::rstest;

    #[rstest]
    fn unique_violation_on_insert_is_duplicate_email() {
        let email = Email::new("alice@example.com").expect("valid email");
        let error = database_error(DatabaseErrorKind::UniqueViolation, "users_email_key");
        assert_eq!(
            map_insert_error(error, &email),
            UserPersistenceError::duplicate_email("alice@example.com")
        );
    }

    #[rstest]
    #[case(DieselError::NotFound, UserPersistenceError::query("record not found"))]
    #[case(
        database_error(DatabaseErrorKind::ClosedConnection, "n/a"),
        UserPersistenceError::connection("database connection error")
    )]
    #[case(
        database_error(DatabaseErrorKind::CheckViolation, "users_role_check"),
        UserPersistenceError::query("row rejected by users_role_check")
    )]
    fn other_insert_failures_use_generic_mapping(
        #[case] error: DieselError,
        #[case] expected: UserPersistenceError,
    ) {
        let email = Email::new("alice@example.com").expect("valid email");
        assert_eq!(map_insert_error(error, &email), expected);
    }

    #[rstest]
    fn pool_failures_are_connection_errors() {
        let error = map_pool_error(PoolError::checkout("timed out"));
        assert_eq!(error, UserPersistenceError::connection("timed out"));
    }
}
