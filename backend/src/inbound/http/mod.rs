//! HTTP inbound adapter exposing the `/api` REST endpoints.

pub mod error;
pub mod events;
pub mod health;
pub mod services;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

use actix_web::web;

pub use error::ApiResult;
pub use validation::{json_config, query_config};

/// Mount every `/api` route.
///
/// Fixed segments such as `/service/account` are registered before their
/// `/{id}` siblings so they are matched first.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(users::register)
            .service(users::login)
            .service(users::logout)
            .service(users::session_profile)
            .service(users::user_details)
            .service(users::add_booking)
            .service(users::remove_booking)
            .service(users::current_user)
            .service(users::update_user)
            .service(services::list_own_services)
            .service(services::search_services)
            .service(services::create_service)
            .service(services::update_service)
            .service(services::delete_service)
            .service(services::get_service)
            .route("/services", web::get().to(services::search_services_legacy))
            .service(events::list_own_events)
            .service(events::create_event)
            .service(events::update_event)
            .service(events::delete_event)
            .service(events::get_event),
    );
}
