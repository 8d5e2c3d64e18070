use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use greenline_core::{RequesterId, ReservationError, ReservationId, TripId};
use greenline_inventory::Reservation;
use serde::Deserialize;
use uuid::Uuid;

/// Identity header populated by the upstream identity provider.
const REQUESTER_HEADER: &str = "x-requester-id";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/reservations/hold", post(hold_seats))
        .route("/v1/reservations", get(list_reservations))
        .route("/v1/reservations/{id}", get(get_reservation))
        .route("/v1/reservations/{id}/confirm", post(confirm_reservation))
        .route("/v1/reservations/{id}/cancel", post(cancel_reservation))
}

fn require_requester(headers: &HeaderMap) -> Result<RequesterId, ApiError> {
    headers
        .get(REQUESTER_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.trim().is_empty())
        .map(RequesterId::new)
        .ok_or_else(|| {
            ApiError::Unauthorized(format!("missing {} header", REQUESTER_HEADER))
        })
}

/// The caller may only act on reservations they placed.
async fn owned_reservation(
    state: &AppState,
    id: ReservationId,
    requester: &RequesterId,
) -> Result<Reservation, ApiError> {
    let reservation = state.coordinator.reservation(id).await?;
    if &reservation.requester != requester {
        return Err(ApiError::Forbidden(format!(
            "reservation {} does not belong to you",
            id
        )));
    }
    Ok(reservation)
}

#[derive(Debug, Deserialize)]
struct HoldRequest {
    trip_id: TripId,
    date: NaiveDate,
    seats: Vec<String>,
    ttl_seconds: Option<i64>,
}

/// POST /v1/reservations/hold
async fn hold_seats(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<HoldRequest>,
) -> Result<(StatusCode, Json<Reservation>), ApiError> {
    let requester = require_requester(&headers)?;
    let rules = &state.business_rules;

    if req.seats.len() > rules.max_seats_per_reservation {
        return Err(ReservationError::Validation(format!(
            "at most {} seats per reservation",
            rules.max_seats_per_reservation
        ))
        .into());
    }
    let ttl = req.ttl_seconds.unwrap_or(rules.default_hold_seconds);
    if ttl < rules.min_hold_seconds || ttl > rules.max_hold_seconds {
        return Err(ReservationError::Validation(format!(
            "hold ttl must be between {} and {} seconds",
            rules.min_hold_seconds, rules.max_hold_seconds
        ))
        .into());
    }

    let result = state
        .inventory
        .hold_seats(&req.trip_id, req.date, &req.seats, requester, ttl)
        .await;
    match result {
        Ok(reservation) => {
            state.metrics.seat_holds_total.inc();
            Ok((StatusCode::CREATED, Json(reservation)))
        }
        Err(err) => {
            if matches!(err, ReservationError::SeatUnavailable { .. }) {
                state.metrics.hold_conflicts_total.inc();
            }
            Err(err.into())
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConfirmRequest {
    payment_token: String,
}

/// POST /v1/reservations/{id}/confirm
async fn confirm_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<ConfirmRequest>,
) -> Result<Json<Reservation>, ApiError> {
    let requester = require_requester(&headers)?;
    let id = ReservationId::from(id);
    owned_reservation(&state, id, &requester).await?;

    match state.coordinator.confirm(id, &req.payment_token).await {
        Ok(reservation) => {
            state.metrics.reservations_confirmed_total.inc();
            Ok(Json(reservation))
        }
        Err(err) => {
            if matches!(err, ReservationError::PaymentFailed(_)) {
                state.metrics.payment_failures_total.inc();
            }
            Err(err.into())
        }
    }
}

/// POST /v1/reservations/{id}/cancel
async fn cancel_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Reservation>, ApiError> {
    let requester = require_requester(&headers)?;
    let id = ReservationId::from(id);
    owned_reservation(&state, id, &requester).await?;

    let reservation = state.coordinator.cancel(id).await?;
    state.metrics.reservations_cancelled_total.inc();
    Ok(Json(reservation))
}

/// GET /v1/reservations/{id}
async fn get_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Reservation>, ApiError> {
    let requester = require_requester(&headers)?;
    let reservation = owned_reservation(&state, ReservationId::from(id), &requester).await?;
    Ok(Json(reservation))
}

/// GET /v1/reservations — the caller's booking history, newest first.
async fn list_reservations(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Reservation>>, ApiError> {
    let requester = require_requester(&headers)?;
    Ok(Json(state.coordinator.reservations_for(&requester).await))
}
