use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{NaiveDate, NaiveTime};
use greenline_api::{app, payment_dev::DevPaymentAdapter, AppState};
use greenline_catalog::{BusCategory, SeatLayout, Trip, TripCatalog};
use greenline_core::TripId;
use greenline_store::BusinessRules;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn rules() -> BusinessRules {
    BusinessRules {
        default_hold_seconds: 300,
        min_hold_seconds: 1,
        max_hold_seconds: 900,
        sweep_interval_seconds: 30,
        max_seats_per_reservation: 3,
    }
}

fn trip() -> Trip {
    Trip {
        id: TripId::from("KL-EKM-CLT-01"),
        origin: "Kochi".to_string(),
        destination: "Kozhikode".to_string(),
        category: BusCategory::AcScania,
        departure: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        arrival: NaiveTime::from_hms_opt(15, 30, 0).unwrap(),
        base_fare_minor: 85000,
        total_seats: 4,
        layout: SeatLayout::new(2, 2, vec![1]),
        amenities: vec![],
        active_from: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        active_until: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
    }
}

fn router() -> Router {
    let catalog = Arc::new(TripCatalog::new());
    catalog.publish(trip()).unwrap();
    app(AppState::new(catalog, Arc::new(DevPaymentAdapter), rules()))
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_as(uri: &str, requester: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-requester-id", requester)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, requester: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(requester) = requester {
        builder = builder.header("x-requester-id", requester);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn hold_body(seats: &[&str]) -> Value {
    json!({
        "trip_id": "KL-EKM-CLT-01",
        "date": "2025-06-01",
        "seats": seats,
        "ttl_seconds": 60
    })
}

async fn place_hold(router: &Router, seats: &[&str], requester: &str) -> Value {
    let (status, body) = send(
        router,
        post_json("/v1/reservations/hold", Some(requester), hold_body(seats)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "hold failed: {}", body);
    body
}

#[tokio::test]
async fn test_health() {
    let router = router();
    let (status, body) = send(&router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("ok".to_string()));
}

#[tokio::test]
async fn test_trip_search_filters_and_misses() {
    let router = router();

    let (status, body) = send(
        &router,
        get("/v1/trips/search?origin=kochi&destination=KOZHIKODE&date=2025-06-01"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], "KL-EKM-CLT-01");
    assert_eq!(body[0]["category"], "AC_SCANIA");

    let (status, body) = send(
        &router,
        get("/v1/trips/search?origin=Kochi&destination=Thrissur&date=2025-06-01"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_get_unknown_trip_is_404() {
    let router = router();
    let (status, _) = send(&router, get("/v1/trips/NOPE-01")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_seat_map_materializes_available() {
    let router = router();
    let (status, body) = send(
        &router,
        get("/v1/trips/KL-EKM-CLT-01/seatmap?date=2025-06-01"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let seats = body["seats"].as_array().unwrap();
    assert_eq!(seats.len(), 4);
    assert!(seats.iter().all(|s| s["state"] == "AVAILABLE"));
}

#[tokio::test]
async fn test_hold_requires_identity() {
    let router = router();
    let (status, _) = send(
        &router,
        post_json("/v1/reservations/hold", None, hold_body(&["A1"])),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_hold_marks_seats_held() {
    let router = router();
    let reservation = place_hold(&router, &["A1", "A2"], "user-1").await;
    assert_eq!(reservation["status"], "HELD");
    assert_eq!(reservation["total_fare_minor"], 170000);

    let (_, map) = send(
        &router,
        get("/v1/trips/KL-EKM-CLT-01/seatmap?date=2025-06-01"),
    )
    .await;
    let held: Vec<&str> = map["seats"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|s| s["state"] == "HELD")
        .map(|s| s["label"].as_str().unwrap())
        .collect();
    assert_eq!(held, vec!["A1", "A2"]);
}

#[tokio::test]
async fn test_conflicting_hold_names_taken_seats() {
    let router = router();
    place_hold(&router, &["A1", "A2"], "user-1").await;

    let (status, body) = send(
        &router,
        post_json(
            "/v1/reservations/hold",
            Some("user-2"),
            hold_body(&["A2", "B1"]),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["seats"], json!(["A2"]));

    // All-or-nothing: B1 must still be available for user-2.
    let retry = place_hold(&router, &["B1"], "user-2").await;
    assert_eq!(retry["status"], "HELD");
}

#[tokio::test]
async fn test_hold_rejects_unknown_seat_label() {
    let router = router();
    let (status, body) = send(
        &router,
        post_json(
            "/v1/reservations/hold",
            Some("user-1"),
            hold_body(&["A1", "Z9"]),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["seats"], json!(["Z9"]));
}

#[tokio::test]
async fn test_hold_rejects_out_of_policy_requests() {
    let router = router();

    // Over the per-reservation seat cap.
    let (status, _) = send(
        &router,
        post_json(
            "/v1/reservations/hold",
            Some("user-1"),
            hold_body(&["A1", "A2", "B1", "B2"]),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // TTL beyond the configured maximum.
    let mut body = hold_body(&["A1"]);
    body["ttl_seconds"] = json!(3600);
    let (status, _) = send(
        &router,
        post_json("/v1/reservations/hold", Some("user-1"), body),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_confirm_books_seats() {
    let router = router();
    let reservation = place_hold(&router, &["A1"], "user-1").await;
    let id = reservation["id"].as_str().unwrap();

    let (status, confirmed) = send(
        &router,
        post_json(
            &format!("/v1/reservations/{}/confirm", id),
            Some("user-1"),
            json!({ "payment_token": "tok-ok" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(confirmed["status"], "CONFIRMED");

    let (_, map) = send(
        &router,
        get("/v1/trips/KL-EKM-CLT-01/seatmap?date=2025-06-01"),
    )
    .await;
    let a1 = map["seats"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["label"] == "A1")
        .unwrap();
    assert_eq!(a1["state"], "BOOKED");
}

#[tokio::test]
async fn test_declined_payment_allows_retry() {
    let router = router();
    let reservation = place_hold(&router, &["A1"], "user-1").await;
    let id = reservation["id"].as_str().unwrap();
    let uri = format!("/v1/reservations/{}/confirm", id);

    let (status, _) = send(
        &router,
        post_json(&uri, Some("user-1"), json!({ "payment_token": "fail-1" })),
    )
    .await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);

    let (status, confirmed) = send(
        &router,
        post_json(&uri, Some("user-1"), json!({ "payment_token": "tok-ok" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(confirmed["status"], "CONFIRMED");
}

#[tokio::test]
async fn test_confirm_by_other_requester_is_forbidden() {
    let router = router();
    let reservation = place_hold(&router, &["A1"], "user-1").await;
    let id = reservation["id"].as_str().unwrap();

    let (status, _) = send(
        &router,
        post_json(
            &format!("/v1/reservations/{}/confirm", id),
            Some("someone-else"),
            json!({ "payment_token": "tok-ok" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_cancel_confirmed_reservation() {
    let router = router();
    let reservation = place_hold(&router, &["A1"], "user-1").await;
    let id = reservation["id"].as_str().unwrap();

    send(
        &router,
        post_json(
            &format!("/v1/reservations/{}/confirm", id),
            Some("user-1"),
            json!({ "payment_token": "tok-ok" }),
        ),
    )
    .await;

    let (status, cancelled) = send(
        &router,
        post_json(
            &format!("/v1/reservations/{}/cancel", id),
            Some("user-1"),
            json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], "CANCELLED");

    let (_, map) = send(
        &router,
        get("/v1/trips/KL-EKM-CLT-01/seatmap?date=2025-06-01"),
    )
    .await;
    assert!(map["seats"]
        .as_array()
        .unwrap()
        .iter()
        .all(|s| s["state"] == "AVAILABLE"));
}

#[tokio::test]
async fn test_cancel_held_reservation_is_conflict() {
    let router = router();
    let reservation = place_hold(&router, &["A1"], "user-1").await;
    let id = reservation["id"].as_str().unwrap();

    let (status, _) = send(
        &router,
        post_json(
            &format!("/v1/reservations/{}/cancel", id),
            Some("user-1"),
            json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_reservation_history_is_scoped_to_requester() {
    let router = router();
    place_hold(&router, &["A1"], "user-1").await;
    place_hold(&router, &["A2"], "user-2").await;

    let (status, body) = send(&router, get_as("/v1/reservations", "user-1")).await;
    assert_eq!(status, StatusCode::OK);
    let mine = body.as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["requester"], "user-1");
}

#[tokio::test]
async fn test_metrics_exposition() {
    let router = router();
    place_hold(&router, &["A1"], "user-1").await;

    let response = router.clone().oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("greenline_seat_holds_total 1"));
}
