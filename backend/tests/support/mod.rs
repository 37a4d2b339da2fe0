//! Shared harness for integration tests: the full `/api` application over a
//! fresh in-memory store, plus JSON request helpers.

use std::sync::Arc;

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use mockable::{Clock, DefaultClock};
use serde_json::{Value, json};

use backend::Trace;
use backend::domain::{BookingService, CatalogService, IdentityService};
use backend::inbound::http::state::HttpState;
use backend::inbound::http::{configure_api, json_config, query_config};
use backend::outbound::credentials::Argon2CredentialHasher;
use backend::outbound::memory::InMemoryStore;

/// Initialised application service.
pub async fn app()
-> impl Service<Request, Response = ServiceResponse, Error = actix_web::Error> {
    let store = Arc::new(InMemoryStore::default());
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let identity = Arc::new(IdentityService::new(
        store.clone(),
        Arc::new(Argon2CredentialHasher),
        clock.clone(),
    ));
    let catalog = Arc::new(CatalogService::new(store.clone(), store.clone(), clock.clone()));
    let bookings = Arc::new(BookingService::new(
        store.clone(),
        store.clone(),
        store,
        clock.clone(),
    ));
    let state = HttpState {
        login: identity.clone(),
        accounts: identity.clone(),
        profiles: identity,
        catalog: catalog.clone(),
        catalog_query: catalog,
        bookings: bookings.clone(),
        bookings_query: bookings,
        clock,
    };
    let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build();
    test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .app_data(json_config())
            .app_data(query_config())
            .wrap(session)
            .wrap(Trace)
            .configure(configure_api),
    )
    .await
}

/// Send `req`, returning the status and the JSON body (`Null` when empty).
pub async fn send(
    app: &impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    req: test::TestRequest,
) -> (StatusCode, Value) {
    let res = test::call_service(app, req.to_request()).await;
    let status = res.status();
    let body = test::read_body(res).await;
    if body.is_empty() {
        return (status, Value::Null);
    }
    (status, serde_json::from_slice(&body).expect("JSON body"))
}

/// A registered, logged-in user.
pub struct Member {
    pub id: String,
    pub cookie: Cookie<'static>,
}

/// Register `name` with `role` and log in.
pub async fn member(
    app: &impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    name: &str,
    role: &str,
) -> Member {
    let email = format!("{}@example.com", name.to_lowercase());
    let password = format!("{name}-secret");
    let (status, profile) = send(
        app,
        test::TestRequest::post().uri("/api/user/register").set_json(json!({
            "name": name,
            "email": email,
            "password": password,
            "role": role,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register {name}");

    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/user/login")
            .set_json(json!({"email": email, "password": password}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK, "login {name}");
    let cookie = res
        .response()
        .cookies()
        .find(|c| c.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie");

    Member {
        id: profile["id"].as_str().expect("profile id").to_owned(),
        cookie,
    }
}

/// Publish a listing as `vendor`, returning its JSON.
pub async fn publish(
    app: &impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    vendor: &Member,
    body: Value,
) -> Value {
    let (status, service) = send(
        app,
        test::TestRequest::post()
            .uri("/api/service")
            .cookie(vendor.cookie.clone())
            .set_json(body),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "publish: {service}");
    service
}
