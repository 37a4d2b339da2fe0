//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see driving ports, so
//! they can be exercised against any storage backend.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    EventBookingCommand, EventBookingQuery, LoginService, ServiceCatalogCommand,
    ServiceCatalogQuery, UserAccountCommand, UserProfileQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub accounts: Arc<dyn UserAccountCommand>,
    pub profiles: Arc<dyn UserProfileQuery>,
    pub catalog: Arc<dyn ServiceCatalogCommand>,
    pub catalog_query: Arc<dyn ServiceCatalogQuery>,
    pub bookings: Arc<dyn EventBookingCommand>,
    pub bookings_query: Arc<dyn EventBookingQuery>,
    /// Source of "now" for session issue and expiry checks.
    pub clock: Arc<dyn Clock>,
}
