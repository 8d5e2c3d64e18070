use crate::layout::SeatLayout;
use chrono::{NaiveDate, NaiveTime};
use greenline_core::{ReservationError, ReservationResult, TripId};
use serde::{Deserialize, Serialize};

/// Fleet categories offered by the operator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BusCategory {
    Ordinary,
    SuperFast,
    SuperDeluxe,
    AcVolvo,
    AcScania,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Amenity {
    Wifi,
    ChargingPoint,
    Water,
    Blanket,
    Entertainment,
}

/// A published trip definition: one scheduled departure on a route,
/// materialized per travel date by the seat inventory. Immutable once
/// published; the operator may re-publish under the same id, which never
/// touches fares already frozen into reservations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub id: TripId,
    pub origin: String,
    pub destination: String,
    pub category: BusCategory,
    pub departure: NaiveTime,
    pub arrival: NaiveTime,
    /// Per-seat fare in minor currency units.
    pub base_fare_minor: i64,
    pub total_seats: u16,
    pub layout: SeatLayout,
    #[serde(default)]
    pub amenities: Vec<Amenity>,
    /// First and last calendar dates the trip operates.
    pub active_from: NaiveDate,
    pub active_until: NaiveDate,
}

impl Trip {
    pub fn validate(&self) -> ReservationResult<()> {
        if self.origin.trim().is_empty() || self.destination.trim().is_empty() {
            return Err(ReservationError::Validation(format!(
                "trip {} must name an origin and a destination",
                self.id
            )));
        }
        if self.base_fare_minor <= 0 {
            return Err(ReservationError::Validation(format!(
                "trip {} fare must be positive, got {}",
                self.id, self.base_fare_minor
            )));
        }
        if self.active_from > self.active_until {
            return Err(ReservationError::Validation(format!(
                "trip {} schedule window is inverted ({} > {})",
                self.id, self.active_from, self.active_until
            )));
        }
        self.layout.validate()?;
        if self.layout.capacity() != self.total_seats {
            return Err(ReservationError::Validation(format!(
                "trip {} layout seats {} do not match total_seats {}",
                self.id,
                self.layout.capacity(),
                self.total_seats
            )));
        }
        Ok(())
    }

    /// Whether the trip operates on the given travel date.
    pub fn runs_on(&self, date: NaiveDate) -> bool {
        date >= self.active_from && date <= self.active_until
    }

    /// Journey duration. Arrival before departure means an overnight run.
    pub fn duration(&self) -> chrono::Duration {
        let d = self.arrival - self.departure;
        if d < chrono::Duration::zero() {
            d + chrono::Duration::hours(24)
        } else {
            d
        }
    }
}
