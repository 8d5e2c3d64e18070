use chrono::{DateTime, NaiveDate, Utc};
use greenline_core::{ReservationId, TripId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatEventKind {
    Held,
    Released,
    Booked,
}

/// Broadcast whenever seats of a trip instance change state, so clients
/// watching a seat map can refresh without polling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatEvent {
    pub trip_id: TripId,
    pub travel_date: NaiveDate,
    pub reservation_id: ReservationId,
    pub seats: Vec<String>,
    pub kind: SeatEventKind,
    pub at: DateTime<Utc>,
}
