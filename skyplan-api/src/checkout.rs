use axum::{
    extract::{FromRequestParts, Query, State},
    http::{request::Parts, StatusCode},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use skyplan_checkout::fares::FareQuotes;
use skyplan_checkout::identifier::IdentifierState;
use skyplan_checkout::{
    BookingData, CheckoutMode, CheckoutSession, PaymentAction, PendingPayload, ProceedOutcome,
};
use skyplan_core::{
    BookingIdentifier, BookingStatus, ExtrasSelection, FareClass, FareSelection, PassengerRecord, PaymentRedirect,
    SeatSelection, TripSelection,
};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

pub const SESSION_HEADER: &str = "x-checkout-session";

/// The checkout session named by the `x-checkout-session` header.
pub struct CurrentSession(pub CheckoutSession);

impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::ValidationError(format!("missing {} header", SESSION_HEADER)))?;
        let session_id = Uuid::parse_str(raw.trim())
            .map_err(|_| AppError::ValidationError(format!("invalid {} header", SESSION_HEADER)))?;
        Ok(CurrentSession(state.session(session_id).await))
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/checkout/sessions", post(create_session))
        .route("/v1/checkout", delete(abandon))
        .route("/v1/checkout/trip", put(put_trip))
        .route("/v1/checkout/fare", put(put_fare))
        .route("/v1/checkout/passenger", put(put_passenger))
        .route("/v1/checkout/passenger-id", put(put_passenger_id))
        .route("/v1/checkout/seats", put(put_seats))
        .route("/v1/checkout/extras", put(put_extras))
        .route("/v1/checkout/auth", put(put_auth))
        .route("/v1/checkout/fares", get(get_fares))
        .route("/v1/checkout/booking-data", get(get_booking_data))
        .route("/v1/checkout/pending-payload", post(build_pending_payload))
        .route("/v1/checkout/identifier", post(resolve_identifier))
        .route("/v1/checkout/payment-ready", get(payment_ready))
        .route("/v1/checkout/proceed", post(proceed))
        .route("/v1/checkout/cancel", post(cancel))
        .route("/v1/checkout/payment-redirect", post(payment_redirect))
}

/// Submits the pending booking in the background; the page already has the
/// provisional code and picks up the confirmed one on its next read.
fn spawn_confirmation(state: &AppState, session: CheckoutSession) {
    let checkout = state.checkout.clone();
    tokio::spawn(async move {
        if let Some(id) = checkout.confirm_with_backend(&session).await {
            tracing::debug!("booking confirmed in background: {}", id.code);
        }
    });
}

async fn create_session() -> (StatusCode, Json<serde_json::Value>) {
    let session_id = Uuid::new_v4();
    tracing::info!("checkout session {} opened", session_id);
    (StatusCode::CREATED, Json(json!({ "session_id": session_id })))
}

async fn abandon(State(state): State<AppState>, CurrentSession(session): CurrentSession) -> StatusCode {
    state.checkout.abandon(&session).await;
    state.stores.release(session.id()).await;
    StatusCode::NO_CONTENT
}

async fn put_trip(
    CurrentSession(session): CurrentSession,
    Json(trip): Json<TripSelection>,
) -> Result<Json<TripSelection>, AppError> {
    session.set_trip(&trip).await?;
    Ok(Json(trip))
}

#[derive(Debug, Deserialize)]
pub struct FareRequest {
    pub fare_class: FareClass,
    #[serde(default)]
    pub price: Option<u64>,
}

async fn put_fare(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Json(req): Json<FareRequest>,
) -> Result<Json<FareSelection>, AppError> {
    let fare = state.checkout.select_fare(&session, req.fare_class, req.price).await?;
    Ok(Json(fare))
}

async fn put_passenger(
    CurrentSession(session): CurrentSession,
    Json(passenger): Json<PassengerRecord>,
) -> Result<StatusCode, AppError> {
    session.set_passenger(&passenger).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct PassengerIdRequest {
    pub passenger_id: u64,
}

async fn put_passenger_id(
    CurrentSession(session): CurrentSession,
    Json(req): Json<PassengerIdRequest>,
) -> Result<StatusCode, AppError> {
    session.set_passenger_id(req.passenger_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn put_seats(
    CurrentSession(session): CurrentSession,
    Json(seats): Json<SeatSelection>,
) -> Result<Json<SeatSelection>, AppError> {
    session.set_seats(&seats).await?;
    Ok(Json(seats))
}

async fn put_extras(
    CurrentSession(session): CurrentSession,
    Json(extras): Json<ExtrasSelection>,
) -> Result<Json<ExtrasSelection>, AppError> {
    let stored = session.set_extras(extras).await?;
    Ok(Json(stored))
}

#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    /// Missing or empty signs the visitor out.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub remember: bool,
}

async fn put_auth(CurrentSession(session): CurrentSession, Json(req): Json<AuthRequest>) -> StatusCode {
    match req.token.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        Some(token) => session.set_auth_token(token, req.remember).await,
        None => session.clear_auth_token().await,
    }
    StatusCode::NO_CONTENT
}

async fn get_fares(State(state): State<AppState>, CurrentSession(session): CurrentSession) -> Json<FareQuotes> {
    Json(state.checkout.fare_quotes(&session).await)
}

async fn get_booking_data(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Json<BookingData> {
    Json(state.checkout.booking_data(&session).await)
}

async fn build_pending_payload(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<PendingPayload>, AppError> {
    let pending = state.checkout.build_pending_payload(&session).await?;
    if !pending.identifier.is_authoritative() {
        spawn_confirmation(&state, session);
    }
    Ok(Json(pending))
}

#[derive(Debug, Serialize)]
pub struct IdentifierResponse {
    pub identifier: BookingIdentifier,
    pub state: IdentifierState,
}

async fn resolve_identifier(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Json<IdentifierResponse> {
    let identifier = state.checkout.resolve_booking_identifier(&session).await;
    let id_state = IdentifierState::of(Some(&identifier));
    if !identifier.is_authoritative() {
        spawn_confirmation(&state, session);
    }
    Json(IdentifierResponse {
        identifier,
        state: id_state,
    })
}

#[derive(Debug, Deserialize)]
pub struct ReadyQuery {
    #[serde(default)]
    pub mode: CheckoutMode,
}

#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    pub action: PaymentAction,
    pub status: Option<BookingStatus>,
    pub diagnostic: Option<String>,
}

async fn payment_ready(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(query): Query<ReadyQuery>,
) -> Json<ReadyResponse> {
    let decision = state.checkout.payment_action(&session, query.mode).await;
    Json(ReadyResponse {
        ready: decision.ready(),
        action: decision.action,
        status: decision.status,
        diagnostic: decision.diagnostic,
    })
}

async fn proceed(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<ProceedOutcome>, AppError> {
    Ok(Json(state.checkout.proceed_to_payment(&session).await?))
}

async fn cancel(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<serde_json::Value>, AppError> {
    let status = state.checkout.cancel_booking(&session).await?;
    Ok(Json(json!({ "status": status })))
}

async fn payment_redirect(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<PaymentRedirect>, AppError> {
    Ok(Json(state.checkout.payment_redirect(&session).await?))
}
