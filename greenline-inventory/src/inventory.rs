use crate::events::{SeatEvent, SeatEventKind};
use crate::models::{Reservation, ReservationStatus, SeatMapView, SeatState, TripInstance};
use chrono::{NaiveDate, Utc};
use greenline_catalog::{Trip, TripCatalog};
use greenline_core::{RequesterId, ReservationError, ReservationId, ReservationResult, TripId};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::{debug, info, warn};

type InstanceKey = (TripId, NaiveDate);

/// What the coordinator must charge before a held reservation can be
/// confirmed: the fare frozen at hold time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeIntent {
    pub reservation_id: ReservationId,
    pub amount_minor: i64,
}

/// Per-trip-instance seat occupancy, holds and their expiry.
///
/// Mutual exclusion is partitioned at trip-instance granularity: each
/// instance sits behind its own mutex, the registry locks are held only to
/// find or insert an entry, and no instance lock is ever held across
/// external I/O. Two hold requests against the same instance therefore
/// serialize; requests against different instances do not.
pub struct SeatInventory {
    catalog: Arc<TripCatalog>,
    instances: RwLock<HashMap<InstanceKey, Arc<Mutex<TripInstance>>>>,
    reservation_index: RwLock<HashMap<ReservationId, InstanceKey>>,
    events: broadcast::Sender<SeatEvent>,
}

impl SeatInventory {
    pub fn new(catalog: Arc<TripCatalog>) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            catalog,
            instances: RwLock::new(HashMap::new()),
            reservation_index: RwLock::new(HashMap::new()),
            events,
        }
    }

    /// Subscribe to seat-state change events.
    pub fn subscribe(&self) -> broadcast::Receiver<SeatEvent> {
        self.events.subscribe()
    }

    /// Current seat map for a trip on a travel date, materializing the
    /// instance with all seats available on first access.
    pub async fn seat_map(&self, trip_id: &TripId, date: NaiveDate) -> ReservationResult<SeatMapView> {
        let trip = self.catalog.get(trip_id)?;
        let handle = self.instance(&trip, date).await?;
        let mut instance = handle.lock().await;
        let expired = instance.expire_due(Utc::now());
        let view = instance.snapshot();
        drop(instance);
        self.emit_released(trip_id, date, expired);
        Ok(view)
    }

    /// Atomically place a hold on every requested seat, or on none of them.
    ///
    /// Duplicate labels are collapsed. Fails with `InvalidSeat` when a label
    /// is not on the trip's layout, and with `SeatUnavailable` naming
    /// exactly the conflicting seats when any of them is held or booked.
    /// `ttl_seconds` is trusted here; range policy belongs to the caller.
    pub async fn hold_seats(
        &self,
        trip_id: &TripId,
        date: NaiveDate,
        seat_labels: &[String],
        requester: RequesterId,
        ttl_seconds: i64,
    ) -> ReservationResult<Reservation> {
        let requested: BTreeSet<String> = seat_labels.iter().cloned().collect();
        if requested.is_empty() {
            return Err(ReservationError::Validation(
                "a hold must name at least one seat".to_string(),
            ));
        }

        let trip = self.catalog.get(trip_id)?;
        let handle = self.instance(&trip, date).await?;

        let mut instance = handle.lock().await;
        let now = Utc::now();
        let expired = instance.expire_due(now);

        let invalid: Vec<String> = requested
            .iter()
            .filter(|label| !instance.layout.contains(label))
            .cloned()
            .collect();
        if !invalid.is_empty() {
            drop(instance);
            self.emit_released(trip_id, date, expired);
            return Err(ReservationError::InvalidSeat { labels: invalid });
        }

        let taken: Vec<String> = requested
            .iter()
            .filter(|label| {
                instance
                    .seats
                    .get(*label)
                    .map(|seat| !seat.is_free())
                    .unwrap_or(true)
            })
            .cloned()
            .collect();
        if !taken.is_empty() {
            drop(instance);
            self.emit_released(trip_id, date, expired);
            return Err(ReservationError::SeatUnavailable { labels: taken });
        }

        let expires_at = now + chrono::Duration::seconds(ttl_seconds);
        let mut reservation = Reservation {
            id: ReservationId::generate(),
            trip_id: trip_id.clone(),
            travel_date: date,
            seats: requested.iter().cloned().collect(),
            requester: requester.clone(),
            status: ReservationStatus::Pending,
            total_fare_minor: trip.base_fare_minor * requested.len() as i64,
            created_at: now,
            expires_at,
        };

        for label in &requested {
            let seat = instance
                .seats
                .get_mut(label)
                .expect("seat labels validated against layout above");
            seat.state = SeatState::Held;
            seat.holder = Some(requester.clone());
            seat.hold_expires_at = Some(expires_at);
        }
        reservation.status = ReservationStatus::Held;
        instance
            .reservations
            .insert(reservation.id, reservation.clone());
        drop(instance);

        self.reservation_index
            .write()
            .await
            .insert(reservation.id, (trip_id.clone(), date));

        self.emit_released(trip_id, date, expired);
        let _ = self.events.send(SeatEvent {
            trip_id: trip_id.clone(),
            travel_date: date,
            reservation_id: reservation.id,
            seats: reservation.seats.clone(),
            kind: SeatEventKind::Held,
            at: now,
        });
        info!(
            reservation_id = %reservation.id,
            trip_id = %trip_id,
            %date,
            seats = reservation.seats.len(),
            requester = %requester,
            "seats held"
        );
        Ok(reservation)
    }

    /// Sweep every materialized instance for due holds. Returns the number
    /// of reservations expired.
    pub async fn release_expired_holds(&self) -> usize {
        let handles: Vec<(InstanceKey, Arc<Mutex<TripInstance>>)> = {
            let instances = self.instances.read().await;
            instances
                .iter()
                .map(|(key, handle)| (key.clone(), handle.clone()))
                .collect()
        };

        let mut total = 0;
        for ((trip_id, date), handle) in handles {
            let mut instance = handle.lock().await;
            let expired = instance.expire_due(Utc::now());
            drop(instance);
            total += expired.len();
            self.emit_released(&trip_id, date, expired);
        }
        if total > 0 {
            debug!(reservations = total, "expiry sweep released holds");
        }
        total
    }

    /// Look up a reservation by id, applying lazy expiry first.
    pub async fn reservation(&self, id: ReservationId) -> ReservationResult<Reservation> {
        let (handle, trip_id, date) = self.locate(id).await?;
        let mut instance = handle.lock().await;
        let expired = instance.expire_due(Utc::now());
        let found = instance.reservations.get(&id).cloned();
        drop(instance);
        self.emit_released(&trip_id, date, expired);
        found.ok_or_else(|| {
            ReservationError::Unavailable(format!("reservation index out of sync for {}", id))
        })
    }

    /// All reservations placed by a requester, newest first.
    pub async fn reservations_for(&self, requester: &RequesterId) -> Vec<Reservation> {
        let handles: Vec<(InstanceKey, Arc<Mutex<TripInstance>>)> = {
            let instances = self.instances.read().await;
            instances
                .iter()
                .map(|(key, handle)| (key.clone(), handle.clone()))
                .collect()
        };

        let mut found = Vec::new();
        for ((trip_id, date), handle) in handles {
            let mut instance = handle.lock().await;
            let expired = instance.expire_due(Utc::now());
            found.extend(
                instance
                    .reservations
                    .values()
                    .filter(|r| &r.requester == requester)
                    .cloned(),
            );
            drop(instance);
            self.emit_released(&trip_id, date, expired);
        }
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        found
    }

    /// First half of confirmation: verify the reservation is still held and
    /// unexpired, and return the frozen fare to charge. The caller performs
    /// payment outside any instance lock and then calls `complete_confirm`.
    pub async fn begin_confirm(&self, id: ReservationId) -> ReservationResult<ChargeIntent> {
        let (handle, trip_id, date) = self.locate(id).await?;
        let mut instance = handle.lock().await;
        let expired = instance.expire_due(Utc::now());
        let result = match instance.reservations.get(&id) {
            None => Err(ReservationError::Unavailable(format!(
                "reservation index out of sync for {}",
                id
            ))),
            Some(r) => match r.status {
                ReservationStatus::Held => Ok(ChargeIntent {
                    reservation_id: id,
                    amount_minor: r.total_fare_minor,
                }),
                ReservationStatus::Expired => Err(ReservationError::ReservationExpired(id)),
                status => Err(ReservationError::InvalidState {
                    from: format!("{:?}", status),
                    to: "Confirmed".to_string(),
                }),
            },
        };
        drop(instance);
        self.emit_released(&trip_id, date, expired);
        result
    }

    /// Second half of confirmation, after the payment collaborator approved
    /// the charge. The hold is re-checked under the lock: it may have
    /// expired while payment was in flight.
    pub async fn complete_confirm(&self, id: ReservationId) -> ReservationResult<Reservation> {
        let (handle, trip_id, date) = self.locate(id).await?;
        let mut instance = handle.lock().await;
        let now = Utc::now();
        let expired = instance.expire_due(now);

        let result = match instance.reservations.get(&id).map(|r| r.status) {
            None => Err(ReservationError::Unavailable(format!(
                "reservation index out of sync for {}",
                id
            ))),
            Some(ReservationStatus::Held) => {
                let seats = instance.reservations[&id].seats.clone();
                for label in &seats {
                    if let Some(seat) = instance.seats.get_mut(label) {
                        seat.state = SeatState::Booked;
                        seat.hold_expires_at = None;
                    }
                }
                let reservation = instance
                    .reservations
                    .get_mut(&id)
                    .expect("status matched above");
                reservation.status = ReservationStatus::Confirmed;
                Ok(reservation.clone())
            }
            Some(ReservationStatus::Expired) => {
                warn!(reservation_id = %id, "hold expired while payment was in flight");
                Err(ReservationError::ReservationExpired(id))
            }
            Some(status) => Err(ReservationError::InvalidState {
                from: format!("{:?}", status),
                to: "Confirmed".to_string(),
            }),
        };
        drop(instance);
        self.emit_released(&trip_id, date, expired);

        if let Ok(reservation) = &result {
            let _ = self.events.send(SeatEvent {
                trip_id: trip_id.clone(),
                travel_date: date,
                reservation_id: id,
                seats: reservation.seats.clone(),
                kind: SeatEventKind::Booked,
                at: now,
            });
            info!(reservation_id = %id, trip_id = %trip_id, %date, "reservation confirmed");
        }
        result
    }

    /// Cancel a confirmed reservation, returning its seats to the pool.
    pub async fn cancel_booking(&self, id: ReservationId) -> ReservationResult<Reservation> {
        let (handle, trip_id, date) = self.locate(id).await?;
        let mut instance = handle.lock().await;
        let now = Utc::now();
        let expired = instance.expire_due(now);

        let result = match instance.reservations.get(&id).map(|r| r.status) {
            None => Err(ReservationError::Unavailable(format!(
                "reservation index out of sync for {}",
                id
            ))),
            Some(ReservationStatus::Confirmed) => {
                let seats = instance.reservations[&id].seats.clone();
                for label in &seats {
                    if let Some(seat) = instance.seats.get_mut(label) {
                        seat.release();
                    }
                }
                let reservation = instance
                    .reservations
                    .get_mut(&id)
                    .expect("status matched above");
                reservation.status = ReservationStatus::Cancelled;
                Ok(reservation.clone())
            }
            Some(status) => Err(ReservationError::InvalidState {
                from: format!("{:?}", status),
                to: "Cancelled".to_string(),
            }),
        };
        drop(instance);
        self.emit_released(&trip_id, date, expired);

        if let Ok(reservation) = &result {
            let _ = self.events.send(SeatEvent {
                trip_id: trip_id.clone(),
                travel_date: date,
                reservation_id: id,
                seats: reservation.seats.clone(),
                kind: SeatEventKind::Released,
                at: now,
            });
            info!(reservation_id = %id, trip_id = %trip_id, %date, "reservation cancelled");
        }
        result
    }

    /// Get or lazily materialize the instance for (trip, date). Repeated
    /// calls return the same handle; a date outside the trip's schedule
    /// window is rejected before anything is created.
    async fn instance(
        &self,
        trip: &Trip,
        date: NaiveDate,
    ) -> ReservationResult<Arc<Mutex<TripInstance>>> {
        if !trip.runs_on(date) {
            return Err(ReservationError::Validation(format!(
                "trip {} does not run on {}",
                trip.id, date
            )));
        }

        let key = (trip.id.clone(), date);
        {
            let instances = self.instances.read().await;
            if let Some(handle) = instances.get(&key) {
                return Ok(handle.clone());
            }
        }

        let mut instances = self.instances.write().await;
        let handle = instances
            .entry(key)
            .or_insert_with(|| {
                debug!(trip_id = %trip.id, %date, "materializing trip instance");
                Arc::new(Mutex::new(TripInstance::materialize(
                    trip.id.clone(),
                    date,
                    trip.layout.clone(),
                )))
            })
            .clone();
        Ok(handle)
    }

    /// Resolve a reservation id to its owning instance via the index.
    async fn locate(
        &self,
        id: ReservationId,
    ) -> ReservationResult<(Arc<Mutex<TripInstance>>, TripId, NaiveDate)> {
        let key = {
            let index = self.reservation_index.read().await;
            index
                .get(&id)
                .cloned()
                .ok_or_else(|| ReservationError::NotFound(format!("reservation {}", id)))?
        };
        let handle = {
            let instances = self.instances.read().await;
            instances.get(&key).cloned().ok_or_else(|| {
                ReservationError::Unavailable(format!("reservation index out of sync for {}", id))
            })?
        };
        Ok((handle, key.0, key.1))
    }

    fn emit_released(
        &self,
        trip_id: &TripId,
        date: NaiveDate,
        expired: Vec<(ReservationId, Vec<String>)>,
    ) {
        let now = Utc::now();
        for (reservation_id, seats) in expired {
            debug!(%reservation_id, trip_id = %trip_id, %date, "hold expired");
            let _ = self.events.send(SeatEvent {
                trip_id: trip_id.clone(),
                travel_date: date,
                reservation_id,
                seats,
                kind: SeatEventKind::Released,
                at: now,
            });
        }
    }
}
