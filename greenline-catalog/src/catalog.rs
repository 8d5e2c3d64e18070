use crate::trip::Trip;
use chrono::NaiveDate;
use greenline_core::{ReservationError, ReservationResult, TripId};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::info;

/// Read-mostly registry of published trips. Seeded at boot from the
/// operator dataset; `publish` upserts, everything else is a snapshot read.
pub struct TripCatalog {
    trips: RwLock<HashMap<TripId, Trip>>,
}

impl TripCatalog {
    pub fn new() -> Self {
        Self {
            trips: RwLock::new(HashMap::new()),
        }
    }

    /// Publish or re-publish a trip. Re-publishing replaces the definition
    /// for future holds; fares already frozen into reservations are
    /// unaffected.
    pub fn publish(&self, trip: Trip) -> ReservationResult<()> {
        trip.validate()?;
        let mut trips = self
            .trips
            .write()
            .map_err(|_| ReservationError::Unavailable("trip catalog lock poisoned".to_string()))?;
        info!(trip_id = %trip.id, origin = %trip.origin, destination = %trip.destination, "trip published");
        trips.insert(trip.id.clone(), trip);
        Ok(())
    }

    pub fn get(&self, id: &TripId) -> ReservationResult<Trip> {
        let trips = self
            .trips
            .read()
            .map_err(|_| ReservationError::Unavailable("trip catalog lock poisoned".to_string()))?;
        trips
            .get(id)
            .cloned()
            .ok_or_else(|| ReservationError::NotFound(format!("trip {}", id)))
    }

    /// Single-snapshot search: origin/destination matched case-insensitively,
    /// travel date inside the trip's schedule window. Never fails; no match
    /// is an empty list.
    pub fn search(&self, origin: &str, destination: &str, date: NaiveDate) -> Vec<Trip> {
        let trips = match self.trips.read() {
            Ok(trips) => trips,
            Err(_) => return Vec::new(),
        };
        let mut matches: Vec<Trip> = trips
            .values()
            .filter(|t| {
                t.origin.eq_ignore_ascii_case(origin)
                    && t.destination.eq_ignore_ascii_case(destination)
                    && t.runs_on(date)
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.departure.cmp(&b.departure).then_with(|| a.id.as_str().cmp(b.id.as_str())));
        matches
    }

    pub fn len(&self) -> usize {
        self.trips.read().map(|t| t.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TripCatalog {
    fn default() -> Self {
        Self::new()
    }
}
