//! End-to-end booking scenarios over the in-memory application.

mod support;

use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::json;

use support::{app, member, publish, send};

#[actix_web::test]
async fn client_books_a_caterer_and_sees_it_resolved() {
    let app = app().await;
    let alice = member(&app, "Alice", "client").await;
    let bob = member(&app, "Bob", "vendor").await;
    let s1 = publish(
        &app,
        &bob,
        json!({"title": "Feast", "category": "caterer", "price": 1000.0}),
    )
    .await;

    let (status, event) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/event")
            .cookie(alice.cookie.clone())
            .set_json(json!({
                "services": [s1["id"]],
                "eventType": "birthday",
                "eventDate": "2025-09-14",
                "budget": 2000.0,
                "numberOfGuests": 50
            })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(event["status"], "pending");
    assert_eq!(event["clientId"], json!(alice.id));
    assert_eq!(event["serviceIds"], json!([s1["id"]]));

    let (status, detail) = send(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/event/{}", event["id"].as_str().expect("id")))
            .cookie(alice.cookie.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["services"][0]["title"], "Feast");
    assert_eq!(detail["services"][0]["price"], json!(1000.0));
    assert_eq!(detail["client"]["name"], "Alice");
    assert!(detail["coordinator"].is_null());
}

#[actix_web::test]
async fn unknown_service_books_nothing() {
    let app = app().await;
    let alice = member(&app, "Alice", "client").await;

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/event")
            .cookie(alice.cookie.clone())
            .set_json(json!({
                "services": ["nonexistent-id"],
                "eventDate": "2025-09-14",
                "budget": 100.0
            })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_request");

    let (_, events) = send(
        &app,
        test::TestRequest::get()
            .uri("/api/event/account")
            .cookie(alice.cookie),
    )
    .await;
    assert_eq!(events, json!([]));
}

#[actix_web::test]
async fn coordinator_patch_is_idempotent_and_admin_can_cancel() {
    let app = app().await;
    let alice = member(&app, "Alice", "client").await;
    let bob = member(&app, "Bob", "vendor").await;
    let cora = member(&app, "Cora", "coordinator").await;
    let root = member(&app, "Root", "admin").await;
    let s1 = publish(&app, &bob, json!({"title": "Band", "category": "musician", "price": 300.0})).await;

    let (_, event) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/event")
            .cookie(alice.cookie.clone())
            .set_json(json!({"services": [s1["id"]], "eventDate": "2025-10-01", "budget": 900.0})),
    )
    .await;
    let patch = json!({
        "id": event["id"],
        "status": "confirmed",
        "coordinatorId": cora.id,
        "finalCost": 850.0
    });

    let mut results = Vec::new();
    for _ in 0..2 {
        let (status, body) = send(
            &app,
            test::TestRequest::put()
                .uri("/api/event")
                .cookie(cora.cookie.clone())
                .set_json(patch.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        results.push(body);
    }
    assert_eq!(results[0], results[1]);

    let (status, body) = send(
        &app,
        test::TestRequest::put()
            .uri("/api/event")
            .cookie(root.cookie)
            .set_json(json!({"id": event["id"], "status": "cancelled"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled");

    let (status, body) = send(
        &app,
        test::TestRequest::put()
            .uri("/api/event")
            .cookie(cora.cookie)
            .set_json(json!({"id": event["id"], "status": "confirmed"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "invalid_transition");
}

#[actix_web::test]
async fn booking_reference_round_trip_on_the_profile() {
    let app = app().await;
    let alice = member(&app, "Alice", "client").await;
    let bob = member(&app, "Bob", "vendor").await;
    let s1 = publish(&app, &bob, json!({"title": "Hall", "category": "venue", "price": 50.0})).await;
    let (_, event) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/event")
            .cookie(alice.cookie.clone())
            .set_json(json!({"services": [s1["id"]], "eventDate": "2025-12-24", "budget": 60.0})),
    )
    .await;

    let (status, profile) = send(
        &app,
        test::TestRequest::put()
            .uri("/api/user/bookings")
            .cookie(alice.cookie.clone())
            .set_json(json!({"bookingId": event["id"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["bookings"], json!([event["id"]]));

    let (status, _) = send(
        &app,
        test::TestRequest::delete()
            .uri("/api/event")
            .cookie(alice.cookie.clone())
            .set_json(json!({"eventId": event["id"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, profile) = send(
        &app,
        test::TestRequest::delete()
            .uri("/api/user/bookings")
            .cookie(alice.cookie)
            .set_json(json!({"bookingId": event["id"]})),
    )
    .await;
    assert_eq!(profile["bookings"], json!([]));
}

#[actix_web::test]
async fn every_response_carries_a_trace_id() {
    let app = app().await;
    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/user").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let header = res
        .headers()
        .get("trace-id")
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .expect("trace-id header");
    let body: serde_json::Value = test::read_body_json(res).await;
    assert_eq!(body["traceId"], json!(header));
}
