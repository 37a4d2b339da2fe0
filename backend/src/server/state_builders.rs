//! Builders wiring repositories into the domain services behind `HttpState`.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::warn;

use backend::domain::ports::{EventRepository, ServiceRepository, UserRepository};
use backend::domain::{BookingService, CatalogService, IdentityService};
use backend::inbound::http::state::HttpState;
use backend::outbound::credentials::Argon2CredentialHasher;
use backend::outbound::memory::InMemoryStore;
use backend::outbound::persistence::{
    DieselEventRepository, DieselServiceRepository, DieselUserRepository,
};

use super::ServerConfig;

/// Assemble the domain services over one set of repositories.
fn wire<U, S, E>(users: Arc<U>, services: Arc<S>, events: Arc<E>) -> HttpState
where
    U: UserRepository + 'static,
    S: ServiceRepository + 'static,
    E: EventRepository + 'static,
{
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let identity = Arc::new(IdentityService::new(
        users.clone(),
        Arc::new(Argon2CredentialHasher),
        clock.clone(),
    ));
    let catalog = Arc::new(CatalogService::new(
        services.clone(),
        users.clone(),
        clock.clone(),
    ));
    let bookings = Arc::new(BookingService::new(events, services, users, clock.clone()));
    HttpState {
        login: identity.clone(),
        accounts: identity.clone(),
        profiles: identity,
        catalog: catalog.clone(),
        catalog_query: catalog,
        bookings: bookings.clone(),
        bookings_query: bookings,
        clock,
    }
}

/// Build handler state: Diesel repositories when a pool is configured,
/// otherwise one shared in-memory store.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let state = match &config.db_pool {
        Some(pool) => wire(
            Arc::new(DieselUserRepository::new(pool.clone())),
            Arc::new(DieselServiceRepository::new(pool.clone())),
            Arc::new(DieselEventRepository::new(pool.clone())),
        ),
        None => {
            warn!("no database configured; records live in memory and vanish on exit");
            let store = Arc::new(InMemoryStore::default());
            wire(store.clone(), store.clone(), store)
        }
    };
    web::Data::new(state)
}
