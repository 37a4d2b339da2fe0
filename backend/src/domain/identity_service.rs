//! Identity and role directory service.
//!
//! Implements registration, authentication, self-service profile updates and
//! the booking cross-reference on top of the user repository and a password
//! hasher.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    CredentialHasher, CredentialHasherError, LoginService, UserAccountCommand,
    UserPersistenceError, UserProfileQuery, UserRepository,
};
use crate::domain::{
    Error, EventId, LoginCredentials, ProfileUpdate, PublicProfile, Registration, User, UserId,
    UserPatch,
};

fn map_repository_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail { email } => {
            Error::conflict(format!("email {email} is already registered"))
        }
    }
}

fn map_hasher_error(error: CredentialHasherError) -> Error {
    Error::internal(error.to_string())
}

fn user_not_found(id: &UserId) -> Error {
    Error::not_found(format!("user {id} not found"))
}

/// Identity service implementing the account, login and profile ports.
#[derive(Clone)]
pub struct IdentityService<U, H> {
    users: Arc<U>,
    hasher: Arc<H>,
    clock: Arc<dyn Clock>,
}

impl<U, H> IdentityService<U, H> {
    /// Create the service.
    ///
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use backend::domain::IdentityService;
    /// # use backend::outbound::credentials::Argon2CredentialHasher;
    /// # use backend::outbound::memory::InMemoryStore;
    /// # use mockable::DefaultClock;
    /// let service = IdentityService::new(
    ///     Arc::new(InMemoryStore::default()),
    ///     Arc::new(Argon2CredentialHasher),
    ///     Arc::new(DefaultClock),
    /// );
    /// # let _ = service;
    /// ```
    pub fn new(users: Arc<U>, hasher: Arc<H>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            hasher,
            clock,
        }
    }
}

impl<U, H> IdentityService<U, H>
where
    U: UserRepository,
    H: CredentialHasher,
{
    async fn load(&self, id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| user_not_found(id))
    }
}

#[async_trait]
impl<U, H> LoginService for IdentityService<U, H>
where
    U: UserRepository,
    H: CredentialHasher,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<PublicProfile, Error> {
        let user = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found("user does not exist"))?;

        let matches = self
            .hasher
            .verify(credentials.password(), &user.password_hash)
            .map_err(map_hasher_error)?;
        if !matches {
            return Err(Error::invalid_credentials("wrong password"));
        }

        info!(user_id = %user.id, "user authenticated");
        Ok(PublicProfile::from(user))
    }
}

#[async_trait]
impl<U, H> UserAccountCommand for IdentityService<U, H>
where
    U: UserRepository,
    H: CredentialHasher,
{
    async fn register(&self, registration: Registration) -> Result<PublicProfile, Error> {
        let password_hash = self
            .hasher
            .hash(registration.password.as_str())
            .map_err(map_hasher_error)?;
        let user = User {
            id: UserId::random(),
            name: registration.name,
            email: registration.email,
            password_hash,
            role: registration.role,
            phone: registration.phone,
            city: registration.city,
            services_offered: Vec::new(),
            bookings: Vec::new(),
            created_at: self.clock.utc(),
        };

        self.users
            .insert(&user)
            .await
            .map_err(map_repository_error)?;

        info!(user_id = %user.id, role = %user.role, "user registered");
        Ok(PublicProfile::from(user))
    }

    async fn update_profile(
        &self,
        user_id: &UserId,
        update: ProfileUpdate,
    ) -> Result<PublicProfile, Error> {
        let password_hash = update
            .password
            .as_deref()
            .map(|password| self.hasher.hash(password))
            .transpose()
            .map_err(map_hasher_error)?;
        let patch = UserPatch {
            name: update.name,
            password_hash,
            phone: update.phone,
            city: update.city,
        };
        if patch.is_empty() {
            return self.load(user_id).await.map(PublicProfile::from);
        }

        let user = self
            .users
            .update_profile(user_id, &patch)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| user_not_found(user_id))?;

        info!(user_id = %user_id, "user profile updated");
        Ok(PublicProfile::from(user))
    }

    async fn add_booking(
        &self,
        user_id: &UserId,
        event_id: &EventId,
    ) -> Result<PublicProfile, Error> {
        let user = self
            .users
            .add_booking(user_id, event_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| user_not_found(user_id))?;
        info!(user_id = %user_id, event_id = %event_id, "booking reference added");
        Ok(PublicProfile::from(user))
    }

    async fn remove_booking(
        &self,
        user_id: &UserId,
        event_id: &EventId,
    ) -> Result<PublicProfile, Error> {
        let user = self
            .users
            .remove_booking(user_id, event_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| user_not_found(user_id))?;
        info!(user_id = %user_id, event_id = %event_id, "booking reference removed");
        Ok(PublicProfile::from(user))
    }
}

#[async_trait]
impl<U, H> UserProfileQuery for IdentityService<U, H>
where
    U: UserRepository,
    H: CredentialHasher,
{
    async fn profile(&self, user_id: &UserId) -> Result<PublicProfile, Error> {
        self.load(user_id).await.map(PublicProfile::from)
    }
}

#[cfg(test)]
#[path = "identity_service_tests.rs"]
mod tests;
