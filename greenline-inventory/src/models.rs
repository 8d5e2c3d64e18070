use chrono::{DateTime, NaiveDate, Utc};
use greenline_catalog::SeatLayout;
use greenline_core::{RequesterId, ReservationId, TripId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatState {
    Available,
    Held,
    Booked,
}

/// Occupancy record for one seat of one trip instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seat {
    pub label: String,
    pub state: SeatState,
    pub holder: Option<RequesterId>,
    /// Set only while the seat is held.
    pub hold_expires_at: Option<DateTime<Utc>>,
}

impl Seat {
    pub fn available(label: String) -> Self {
        Self {
            label,
            state: SeatState::Available,
            holder: None,
            hold_expires_at: None,
        }
    }

    pub fn is_free(&self) -> bool {
        self.state == SeatState::Available
    }

    pub(crate) fn release(&mut self) {
        self.state = SeatState::Available;
        self.holder = None;
        self.hold_expires_at = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    /// Exists only inside the hold critical section; callers observe `Held`.
    Pending,
    Held,
    Confirmed,
    Expired,
    Cancelled,
}

/// One confirmation attempt grouping seats of a single trip instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub trip_id: TripId,
    pub travel_date: NaiveDate,
    pub seats: Vec<String>,
    pub requester: RequesterId,
    pub status: ReservationStatus,
    /// Seat count × per-seat fare, frozen at hold time. Never recomputed,
    /// even if the trip is re-published with a different fare.
    pub total_fare_minor: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Reservation {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.status == ReservationStatus::Held && now > self.expires_at
    }
}

/// A trip materialized for one travel date: the unit of seat locking.
/// Created lazily on first access and retained indefinitely for lookups.
#[derive(Debug)]
pub struct TripInstance {
    pub trip_id: TripId,
    pub travel_date: NaiveDate,
    /// Layout snapshot taken at materialization, so later re-publishes of
    /// the trip cannot desync the seat grid under live holds.
    pub layout: SeatLayout,
    pub(crate) seats: BTreeMap<String, Seat>,
    pub(crate) reservations: HashMap<ReservationId, Reservation>,
}

impl TripInstance {
    pub fn materialize(trip_id: TripId, travel_date: NaiveDate, layout: SeatLayout) -> Self {
        let seats = layout
            .labels()
            .into_iter()
            .map(|label| (label.clone(), Seat::available(label)))
            .collect();
        Self {
            trip_id,
            travel_date,
            layout,
            seats,
            reservations: HashMap::new(),
        }
    }

    /// Transition every due hold to `Expired` and free its seats. Invoked
    /// under the instance lock on every touch and by the periodic sweep.
    /// Returns the expired reservations with the seats they released.
    pub(crate) fn expire_due(&mut self, now: DateTime<Utc>) -> Vec<(ReservationId, Vec<String>)> {
        let due: Vec<ReservationId> = self
            .reservations
            .values()
            .filter(|r| r.is_expired_at(now))
            .map(|r| r.id)
            .collect();

        let mut released = Vec::with_capacity(due.len());
        for id in due {
            let reservation = self
                .reservations
                .get_mut(&id)
                .expect("expiring reservation id collected above");
            reservation.status = ReservationStatus::Expired;
            for label in &reservation.seats {
                if let Some(seat) = self.seats.get_mut(label) {
                    seat.release();
                }
            }
            released.push((id, reservation.seats.clone()));
        }
        released
    }

    pub(crate) fn snapshot(&self) -> SeatMapView {
        SeatMapView {
            trip_id: self.trip_id.clone(),
            travel_date: self.travel_date,
            layout: self.layout.clone(),
            seats: self
                .seats
                .values()
                .map(|s| SeatView {
                    label: s.label.clone(),
                    state: s.state,
                })
                .collect(),
        }
    }
}

/// Wire view of a trip instance's occupancy. Holder identities are not
/// exposed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatMapView {
    pub trip_id: TripId,
    pub travel_date: NaiveDate,
    pub layout: SeatLayout,
    pub seats: Vec<SeatView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatView {
    pub label: String,
    pub state: SeatState,
}

impl SeatMapView {
    pub fn state_of(&self, label: &str) -> Option<SeatState> {
        self.seats.iter().find(|s| s.label == label).map(|s| s.state)
    }
}
