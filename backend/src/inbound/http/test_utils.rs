//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test, web};
use mockable::{Clock, DefaultClock};
use serde_json::{Value, json};

use crate::Trace;
use crate::domain::ports::{CredentialHasher, CredentialHasherError};
use crate::domain::{BookingService, CatalogService, IdentityService};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{configure_api, json_config, query_config};
use crate::outbound::memory::InMemoryStore;

/// Session middleware with a fresh key and an insecure `session` cookie.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Extract the `session` cookie set by a response.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie set")
}

/// Reversible hasher so handler tests skip the Argon2 work factor.
pub struct PlainHasher;

impl CredentialHasher for PlainHasher {
    fn hash(&self, password: &str) -> Result<String, CredentialHasherError> {
        Ok(format!("plain:{password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, CredentialHasherError> {
        Ok(hash.strip_prefix("plain:") == Some(password))
    }
}

/// Handler state backed by one fresh in-memory store.
pub fn memory_state() -> HttpState {
    let store = Arc::new(InMemoryStore::default());
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let identity = Arc::new(IdentityService::new(
        store.clone(),
        Arc::new(PlainHasher),
        clock.clone(),
    ));
    let catalog = Arc::new(CatalogService::new(store.clone(), store.clone(), clock.clone()));
    let bookings = Arc::new(BookingService::new(
        store.clone(),
        store.clone(),
        store,
        clock.clone(),
    ));
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

/// Full `/api` application over `state`.
pub fn api_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .app_data(json_config())
        .app_data(query_config())
        .wrap(test_session_middleware())
        .wrap(Trace)
        .configure(configure_api)
}

/// Register `name` with `role`; the password is always `pw-{name}`.
pub async fn register_user(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = ServiceResponse,
        Error = actix_web::Error,
    >,
    name: &str,
    role: &str,
) -> Value {
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/user/register")
            .set_json(json!({
                "name": name,
                "email": format!("{}@example.com", name.to_lowercase()),
                "password": format!("pw-{name}"),
                "role": role,
            }))
            .to_request(),
    )
    .await;
    assert!(res.status().is_success(), "register {name}: {}", res.status());
    test::read_body_json(res).await
}

/// Log in a user created by [`register_user`] and return its session cookie.
pub async fn login_cookie(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = ServiceResponse,
        Error = actix_web::Error,
    >,
    name: &str,
) -> Cookie<'static> {
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/user/login")
            .set_json(json!({
                "email": format!("{}@example.com", name.to_lowercase()),
                "password": format!("pw-{name}"),
            }))
            .to_request(),
    )
    .await;
    assert!(res.status().is_success(), "login {name}: {}", res.status());
    session_cookie(&res)
}
