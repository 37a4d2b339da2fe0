//! Domain entities, value objects, policies and services.
//!
//! Nothing in this module depends on actix, diesel or argon2. Inbound
//! adapters call the driving ports in [`ports`]; outbound adapters implement
//! the driven ones.
//!
//! Public surface:
//! - `Error`/`ErrorKind`: transport-agnostic failure payload.
//! - `Role`, `Action`, `authorize`: the capability matrix.
//! - `User`, `Service`, `Event` with their drafts, patches and joined views.
//! - `IdentityService`, `CatalogService`, `BookingService`: port implementations.

pub mod amount;
pub mod auth;
pub mod booking_service;
pub mod catalog_service;
pub mod error;
pub mod event;
pub mod identity_service;
pub mod ids;
pub mod ports;
pub mod role;
pub mod service;
pub mod trace_id;
pub mod user;

pub use self::amount::{Amount, AmountError};
pub use self::auth::{
    AuthValidationError, LoginCredentials, ProfileUpdate, Registration, SESSION_VALIDITY_HOURS,
    SessionIdentity,
};
pub use self::booking_service::BookingService;
pub use self::catalog_service::CatalogService;
pub use self::error::{Error, ErrorKind, ErrorValidationError};
pub use self::event::{
    ClientSummary, CoordinatorSummary, Event, EventDetail, EventDraft, EventPatch, EventStatus,
    EventType, EventValidationError, InvalidTransition,
};
pub use self::identity_service::IdentityService;
pub use self::ids::{EventId, IdValidationError, ServiceId, UserId};
pub use self::role::{Action, Actor, Decision, Role, UnknownRole, authorize, ensure_allowed};
pub use self::service::{
    PriceType, Review, Service, ServiceCategory, ServiceDetail, ServiceDraft, ServiceListing,
    ServicePatch, ServiceSearch, ServiceValidationError, Title, VendorContact, VendorSummary,
};
pub use self::trace_id::TraceId;
pub use self::user::{Email, PublicProfile, User, UserName, UserPatch, UserValidationError};

/// Result alias for handlers returning domain errors.
///
/// # Examples
/// ```
/// use backend::domain::{ApiResult, Error, ErrorKind};
///
/// fn lookup(found: bool) -> ApiResult<u32> {
///     found.then_some(7).ok_or_else(|| Error::not_found("nothing here"))
/// }
///
/// assert_eq!(lookup(false).unwrap_err().kind(), ErrorKind::NotFound);
/// ```
pub type ApiResult<T> = Result<T, Error>;
