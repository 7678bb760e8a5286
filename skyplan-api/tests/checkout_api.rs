use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use skyplan_api::{app, AppState};
use skyplan_checkout::CheckoutConfig;
use skyplan_core::OfflineBackend;
use skyplan_store::MemoryStores;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

fn test_app() -> Router {
    let state = AppState::new(
        Arc::new(MemoryStores::default()),
        Arc::new(OfflineBackend),
        CheckoutConfig::default(),
    );
    app(state)
}

async fn send(app: &Router, method: Method, uri: &str, session: Option<Uuid>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(id) = session {
        builder = builder.header("x-checkout-session", id.to_string());
    }
    let req = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn open_session(app: &Router) -> Uuid {
    let (status, body) = send(app, Method::POST, "/v1/checkout/sessions", None, None).await;
    assert_eq!(status, StatusCode::CREATED);
    Uuid::parse_str(body["session_id"].as_str().unwrap()).unwrap()
}

fn trip_json() -> Value {
    json!({
        "fromCode": "HAN",
        "toCode": "SGN",
        "tripType": "one-way",
        "departDateISO": "2025-12-20",
        "outbound_flight_id": 3803,
        "outbound_price": 1200000
    })
}

#[tokio::test]
async fn test_requires_session_header() {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/v1/checkout/booking-data", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("x-checkout-session"));

    let req = Request::builder()
        .uri("/v1/checkout/booking-data")
        .header("x-checkout-session", "not-a-uuid")
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_booking_data_totals() {
    let app = test_app();
    let id = open_session(&app).await;

    let (status, _) = send(&app, Method::PUT, "/v1/checkout/trip", Some(id), Some(trip_json())).await;
    assert_eq!(status, StatusCode::OK);

    let extras = json!({ "baggage": { "weight_kg": 20, "price": 150000 }, "total": 1 });
    let (status, stored) = send(&app, Method::PUT, "/v1/checkout/extras", Some(id), Some(extras)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored["total"], 150000);

    let (status, data) = send(&app, Method::GET, "/v1/checkout/booking-data", Some(id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(data["totals"]["base_fare"], 1200000);
    assert_eq!(data["totals"]["extras_subtotal"], 150000);
    assert_eq!(data["totals"]["tax"], 120000);
    assert_eq!(data["totals"]["grand_total"], 1470000);
    assert_eq!(data["base_fare_source"], "trip_leg_prices");
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let app = test_app();
    let a = open_session(&app).await;
    let b = open_session(&app).await;

    send(&app, Method::PUT, "/v1/checkout/trip", Some(a), Some(trip_json())).await;
    let (_, data) = send(&app, Method::GET, "/v1/checkout/booking-data", Some(b), None).await;
    assert!(data["trip"].is_null());
}

#[tokio::test]
async fn test_invalid_trip_rejected() {
    let app = test_app();
    let id = open_session(&app).await;
    let mut trip = trip_json();
    trip["tripType"] = json!("round-trip");

    let (status, _) = send(&app, Method::PUT, "/v1/checkout/trip", Some(id), Some(trip)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_fare_quotes_and_selection() {
    let app = test_app();
    let id = open_session(&app).await;
    send(&app, Method::PUT, "/v1/checkout/trip", Some(id), Some(trip_json())).await;

    let (status, quotes) = send(&app, Method::GET, "/v1/checkout/fares", Some(id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(quotes["base"], 1200000);
    assert_eq!(quotes["quotes"][2]["fare_class"], "business");
    assert_eq!(quotes["quotes"][2]["price"], 3000000);

    let (status, fare) = send(
        &app,
        Method::PUT,
        "/v1/checkout/fare",
        Some(id),
        Some(json!({ "fare_class": "Premium" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fare["fare_class"], "premium-economy");
    assert_eq!(fare["price"], 1680000);
}

#[tokio::test]
async fn test_pending_payload_reports_missing_passenger() {
    let app = test_app();
    let id = open_session(&app).await;
    send(&app, Method::PUT, "/v1/checkout/trip", Some(id), Some(trip_json())).await;

    let (status, body) = send(&app, Method::POST, "/v1/checkout/pending-payload", Some(id), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["missing"], "passenger");
}

#[tokio::test]
async fn test_offline_checkout_flow() {
    let app = test_app();
    let id = open_session(&app).await;
    send(&app, Method::PUT, "/v1/checkout/trip", Some(id), Some(trip_json())).await;
    let passenger = json!({ "firstName": "An", "lastName": "Nguyen", "dob": "25/12/1995" });
    let (status, _) = send(&app, Method::PUT, "/v1/checkout/passenger", Some(id), Some(passenger)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, pending) = send(&app, Method::POST, "/v1/checkout/pending-payload", Some(id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pending["request"]["trip_type"], "one-way");
    assert_eq!(pending["request"]["guest_passenger"]["dob"], "1995-12-25");
    assert_eq!(pending["request"]["guest_passenger"]["email"], "guest@skyplan.com");
    assert_eq!(pending["identifier"]["provenance"], "client_synthesized");
    let code = pending["identifier"]["code"].as_str().unwrap().to_string();
    assert!(code.starts_with("SP"));

    let (status, ready) = send(
        &app,
        Method::GET,
        "/v1/checkout/payment-ready?mode=returning",
        Some(id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ready["ready"], true);
    assert_eq!(ready["action"], "show");

    let (status, outcome) = send(&app, Method::POST, "/v1/checkout/proceed", Some(id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["outcome"], "ready_to_pay");
    assert_eq!(outcome["redirect"], format!("payment.html?booking_code={}", code));

    let (status, _) = send(&app, Method::POST, "/v1/checkout/payment-redirect", Some(id), None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_cancel_without_booking() {
    let app = test_app();
    let id = open_session(&app).await;
    let (status, _) = send(&app, Method::POST, "/v1/checkout/cancel", Some(id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_abandon_clears_session() {
    let app = test_app();
    let id = open_session(&app).await;
    send(&app, Method::PUT, "/v1/checkout/trip", Some(id), Some(trip_json())).await;
    let (status, ident) = send(&app, Method::POST, "/v1/checkout/identifier", Some(id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ident["state"], "client_synthesized");

    let (status, _) = send(&app, Method::DELETE, "/v1/checkout", Some(id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, data) = send(&app, Method::GET, "/v1/checkout/booking-data", Some(id), None).await;
    assert!(data["trip"].is_null());
    assert!(data["booking_identifier"].is_null());
    assert_eq!(data["totals"]["grand_total"], 0);
}
