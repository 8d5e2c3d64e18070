use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use greenline_catalog::Trip;
use greenline_core::TripId;
use greenline_inventory::SeatMapView;
use serde::Deserialize;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/trips/search", get(search_trips))
        .route("/v1/trips/{trip_id}", get(get_trip))
        .route("/v1/trips/{trip_id}/seatmap", get(seat_map))
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    origin: String,
    destination: String,
    date: NaiveDate,
}

/// GET /v1/trips/search?origin=..&destination=..&date=YYYY-MM-DD
async fn search_trips(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<Trip>> {
    Json(state.catalog.search(&params.origin, &params.destination, params.date))
}

/// GET /v1/trips/{trip_id}
async fn get_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<String>,
) -> Result<Json<Trip>, ApiError> {
    let trip = state.catalog.get(&TripId::new(trip_id))?;
    Ok(Json(trip))
}

#[derive(Debug, Deserialize)]
struct SeatMapParams {
    date: NaiveDate,
}

/// GET /v1/trips/{trip_id}/seatmap?date=YYYY-MM-DD
///
/// Materializes the trip instance on first access, all seats available.
async fn seat_map(
    State(state): State<AppState>,
    Path(trip_id): Path<String>,
    Query(params): Query<SeatMapParams>,
) -> Result<Json<SeatMapView>, ApiError> {
    let view = state
        .inventory
        .seat_map(&TripId::new(trip_id), params.date)
        .await?;
    Ok(Json(view))
}
