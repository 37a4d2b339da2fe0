//! Tests for event booking handlers.

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::test;
use rstest::rstest;
use serde_json::{Value, json};

use crate::inbound::http::test_utils::{api_app, login_cookie, memory_state, register_user};

async fn send(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = ServiceResponse,
        Error = actix_web::Error,
    >,
    req: test::TestRequest,
) -> (StatusCode, Value) {
    let res = test::call_service(app, req.to_request()).await;
    let status = res.status();
    let body = test::read_body(res).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("json body")
    };
    (status, value)
}

struct Cast {
    client: Cookie<'static>,
    coordinator: Cookie<'static>,
    coordinator_id: String,
    service_id: String,
}

async fn cast(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = ServiceResponse,
        Error = actix_web::Error,
    >,
) -> Cast {
    register_user(app, "Vera", "vendor").await;
    register_user(app, "Cleo", "client").await;
    let coordinator = register_user(app, "Coby", "coordinator").await;
    let vendor = login_cookie(app, "Vera").await;
    let (_, service) = send(
        app,
        test::TestRequest::post()
            .uri("/api/service")
            .cookie(vendor)
            .set_json(json!({"title": "Hall", "price": 500.0})),
    )
    .await;
    Cast {
        client: login_cookie(app, "Cleo").await,
        coordinator: login_cookie(app, "Coby").await,
        coordinator_id: coordinator["id"].as_str().expect("id").to_owned(),
        service_id: service["id"].as_str().expect("id").to_owned(),
    }
}

fn booking(service_id: &str) -> Value {
    json!({
        "services": [service_id, service_id],
        "eventType": "birthday",
        "eventDate": "2025-06-01",
        "venueAddress": "1 Main St",
        "budget": 2000.0,
        "numberOfGuests": 40,
        "notes": "outdoor"
    })
}

#[actix_web::test]
async fn client_books_pending_event_with_unique_services() {
    let app = test::init_service(api_app(memory_state())).await;
    let cast = cast(&app).await;

    let (status, event) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/event")
            .cookie(cast.client)
            .set_json(booking(&cast.service_id)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(event["status"], "pending");
    assert_eq!(event["serviceIds"], json!([cast.service_id]));
    assert_eq!(event["eventType"], "birthday");
    assert_eq!(event["numberOfGuests"], json!(40));
    assert!(event["coordinatorId"].is_null());
}

#[actix_web::test]
async fn unknown_services_are_reported() {
    let app = test::init_service(api_app(memory_state())).await;
    let cast = cast(&app).await;
    let missing = uuid::Uuid::new_v4().to_string();

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/event")
            .cookie(cast.client)
            .set_json(booking(&missing)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["missing"], json!([missing]));
}

#[rstest]
#[case(json!({"services": [], "eventDate": "2025-06-01", "budget": 1.0}), "services")]
#[case(json!({"services": ["nonexistent-id"], "eventDate": "2025-06-01", "budget": 1.0}), "services")]
#[case(json!({"services": ["00000000-0000-4000-8000-000000000000"], "eventDate": " ", "budget": 1.0}), "eventDate")]
#[case(json!({"services": ["00000000-0000-4000-8000-000000000000"], "eventDate": "2025-06-01", "budget": -5.0}), "budget")]
#[case(json!({"services": ["00000000-0000-4000-8000-000000000000"], "eventDate": "2025-06-01", "budget": 1.0, "eventType": "rave"}), "eventType")]
#[actix_web::test]
async fn invalid_bookings_name_the_field(#[case] payload: Value, #[case] field: &str) {
    let app = test::init_service(api_app(memory_state())).await;
    register_user(&app, "Cleo", "client").await;
    let client = login_cookie(&app, "Cleo").await;

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/event")
            .cookie(client)
            .set_json(payload),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], field);
}

#[actix_web::test]
async fn vendors_cannot_book() {
    let app = test::init_service(api_app(memory_state())).await;
    let cast = cast(&app).await;
    let vendor = login_cookie(&app, "Vera").await;

    let (status, _) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/event")
            .cookie(vendor)
            .set_json(booking(&cast.service_id)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn coordinator_drives_the_lifecycle() {
    let app = test::init_service(api_app(memory_state())).await;
    let cast = cast(&app).await;
    let (_, event) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/event")
            .cookie(cast.client.clone())
            .set_json(booking(&cast.service_id)),
    )
    .await;
    let id = event["id"].as_str().expect("id").to_owned();

    let (status, _) = send(
        &app,
        test::TestRequest::put()
            .uri("/api/event")
            .cookie(cast.client.clone())
            .set_json(json!({"id": id, "status": "confirmed"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        test::TestRequest::put()
            .uri("/api/event")
            .cookie(cast.coordinator.clone())
            .set_json(json!({"id": id, "status": "completed"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "invalid_transition");

    let (status, body) = send(
        &app,
        test::TestRequest::put()
            .uri("/api/event")
            .cookie(cast.coordinator.clone())
            .set_json(json!({
                "id": id,
                "status": "confirmed",
                "coordinatorId": cast.coordinator_id,
                "finalCost": 1800.0
            })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "confirmed");
    assert_eq!(body["coordinatorId"], json!(cast.coordinator_id));
    assert_eq!(body["finalCost"], json!(1800.0));

    let (status, detail) = send(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/event/{id}"))
            .cookie(cast.client),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["coordinator"]["name"], "Coby");
    assert_eq!(detail["client"]["email"], "cleo@example.com");
    assert_eq!(detail["services"][0]["title"], "Hall");
}

#[actix_web::test]
async fn coordinator_assignment_must_name_a_coordinator() {
    let app = test::init_service(api_app(memory_state())).await;
    let cast = cast(&app).await;
    let (_, event) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/event")
            .cookie(cast.client)
            .set_json(booking(&cast.service_id)),
    )
    .await;

    let (status, _) = send(
        &app,
        test::TestRequest::put()
            .uri("/api/event")
            .cookie(cast.coordinator)
            .set_json(json!({"id": event["id"], "coordinatorId": event["clientId"]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn account_lists_only_the_callers_events() {
    let app = test::init_service(api_app(memory_state())).await;
    let cast = cast(&app).await;
    register_user(&app, "Dana", "client").await;
    let other = login_cookie(&app, "Dana").await;

    for cookie in [&cast.client, &cast.client, &other] {
        send(
            &app,
            test::TestRequest::post()
                .uri("/api/event")
                .cookie(cookie.clone())
                .set_json(booking(&cast.service_id)),
        )
        .await;
    }

    let (status, body) = send(
        &app,
        test::TestRequest::get()
            .uri("/api/event/account")
            .cookie(cast.client),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(2));
}

#[actix_web::test]
async fn only_the_owner_deletes_an_event() {
    let app = test::init_service(api_app(memory_state())).await;
    let cast = cast(&app).await;
    let (_, event) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/event")
            .cookie(cast.client.clone())
            .set_json(booking(&cast.service_id)),
    )
    .await;
    let body = json!({"eventId": event["id"]});

    let (status, _) = send(
        &app,
        test::TestRequest::delete()
            .uri("/api/event")
            .cookie(cast.coordinator)
            .set_json(body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, deleted) = send(
        &app,
        test::TestRequest::delete()
            .uri("/api/event")
            .cookie(cast.client.clone())
            .set_json(body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted, json!("Event deleted"));

    let (status, _) = send(
        &app,
        test::TestRequest::delete()
            .uri("/api/event")
            .cookie(cast.client)
            .set_json(body),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn reading_an_event_requires_login() {
    let app = test::init_service(api_app(memory_state())).await;
    let (status, _) = send(
        &app,
        test::TestRequest::get().uri(&format!("/api/event/{}", uuid::Uuid::new_v4())),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
