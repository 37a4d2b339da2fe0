//! Domain ports for the hexagonal boundary.
//!
//! Driving ports are called by inbound adapters; driven ports are
//! implemented by outbound adapters and injected into domain services.

mod macros;
pub(crate) use macros::define_port_error;

mod credential_hasher;
mod event_booking_command;
mod event_booking_query;
mod event_repository;
mod login_service;
mod service_catalog_command;
mod service_catalog_query;
mod service_repository;
mod user_account_command;
mod user_profile_query;
mod user_repository;

#[cfg(test)]
pub use credential_hasher::MockCredentialHasher;
pub use credential_hasher::{CredentialHasher, CredentialHasherError};
#[cfg(test)]
pub use event_booking_command::MockEventBookingCommand;
pub use event_booking_command::EventBookingCommand;
#[cfg(test)]
pub use event_booking_query::MockEventBookingQuery;
pub use event_booking_query::EventBookingQuery;
#[cfg(test)]
pub use event_repository::MockEventRepository;
pub use event_repository::{EventRepository, EventRepositoryError};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
#[cfg(test)]
pub use service_catalog_command::MockServiceCatalogCommand;
pub use service_catalog_command::ServiceCatalogCommand;
#[cfg(test)]
pub use service_catalog_query::MockServiceCatalogQuery;
pub use service_catalog_query::ServiceCatalogQuery;
#[cfg(test)]
pub use service_repository::MockServiceRepository;
pub use service_repository::{ServiceRepository, ServiceRepositoryError};
#[cfg(test)]
pub use user_account_command::MockUserAccountCommand;
pub use user_account_command::UserAccountCommand;
#[cfg(test)]
pub use user_profile_query::MockUserProfileQuery;
pub use user_profile_query::UserProfileQuery;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
