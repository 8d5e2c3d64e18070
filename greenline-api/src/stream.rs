use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use chrono::NaiveDate;
use futures_util::{Stream, StreamExt};
use greenline_core::TripId;
use greenline_inventory::SeatEventKind;
use serde::Deserialize;
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/trips/{trip_id}/events", get(seat_events))
}

#[derive(Debug, Deserialize)]
struct EventParams {
    date: NaiveDate,
}

fn event_name(kind: SeatEventKind) -> &'static str {
    match kind {
        SeatEventKind::Held => "seat_held",
        SeatEventKind::Released => "seat_released",
        SeatEventKind::Booked => "seat_booked",
    }
}

/// GET /v1/trips/{trip_id}/events?date=YYYY-MM-DD
///
/// Server-sent stream of seat-state changes for one trip instance, so a
/// seat-map client can refresh without polling.
async fn seat_events(
    State(state): State<AppState>,
    Path(trip_id): Path<String>,
    Query(params): Query<EventParams>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let trip_id = TripId::new(trip_id);
    let date = params.date;
    let rx = state.inventory.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(move |result| {
        let trip_id = trip_id.clone();
        async move {
            match result {
                Ok(event) if event.trip_id == trip_id && event.travel_date == date => {
                    let payload = serde_json::to_string(&event).unwrap_or_default();
                    Some(Ok::<_, Infallible>(
                        Event::default().event(event_name(event.kind)).data(payload),
                    ))
                }
                // Lagged receivers and other instances' events are skipped.
                _ => None,
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
