//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every `/api` handler, the health endpoints, the domain
//! schemas they exchange and the session cookie security scheme. Swagger UI
//! serves it in debug builds and `cargo run --bin openapi-dump` prints it.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{
    Error, ErrorKind, Event, EventDetail, EventStatus, EventType, PriceType, PublicProfile,
    Service, ServiceCategory, ServiceDetail, ServiceListing, SessionIdentity,
};
use crate::inbound::http::{events, health, services, users};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/user/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Eventora API",
        description = "Event-planning marketplace: accounts, service catalog and event bookings."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        users::register,
        users::login,
        users::logout,
        users::current_user,
        users::session_profile,
        users::update_user,
        users::user_details,
        users::add_booking,
        users::remove_booking,
        services::create_service,
        services::update_service,
        services::delete_service,
        services::list_own_services,
        services::get_service,
        services::search_services,
        events::create_event,
        events::update_event,
        events::delete_event,
        events::list_own_events,
        events::get_event,
        health::ready,
        health::live,
    ),
    components(schemas(
        Error,
        ErrorKind,
        PublicProfile,
        SessionIdentity,
        Service,
        ServiceCategory,
        PriceType,
        ServiceListing,
        ServiceDetail,
        Event,
        EventType,
        EventStatus,
        EventDetail,
    )),
    tags(
        (name = "users", description = "Accounts and sessions"),
        (name = "services", description = "Vendor service catalog"),
        (name = "events", description = "Event bookings"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
