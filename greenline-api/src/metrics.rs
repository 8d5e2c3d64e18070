use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::State;
use prometheus::{Encoder, IntCounter, Registry, TextEncoder};

pub struct Metrics {
    registry: Registry,
    pub seat_holds_total: IntCounter,
    pub hold_conflicts_total: IntCounter,
    pub reservations_confirmed_total: IntCounter,
    pub reservations_cancelled_total: IntCounter,
    pub payment_failures_total: IntCounter,
    pub expired_holds_total: IntCounter,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let seat_holds_total =
            IntCounter::new("greenline_seat_holds_total", "Successful seat holds")
                .expect("metric definition");
        let hold_conflicts_total = IntCounter::new(
            "greenline_hold_conflicts_total",
            "Holds rejected because a requested seat was taken",
        )
        .expect("metric definition");
        let reservations_confirmed_total = IntCounter::new(
            "greenline_reservations_confirmed_total",
            "Reservations confirmed after payment",
        )
        .expect("metric definition");
        let reservations_cancelled_total = IntCounter::new(
            "greenline_reservations_cancelled_total",
            "Confirmed reservations cancelled",
        )
        .expect("metric definition");
        let payment_failures_total = IntCounter::new(
            "greenline_payment_failures_total",
            "Confirm attempts rejected by the payment provider",
        )
        .expect("metric definition");
        let expired_holds_total = IntCounter::new(
            "greenline_expired_holds_total",
            "Held reservations released by the expiry sweep",
        )
        .expect("metric definition");

        for collector in [
            &seat_holds_total,
            &hold_conflicts_total,
            &reservations_confirmed_total,
            &reservations_cancelled_total,
            &payment_failures_total,
            &expired_holds_total,
        ] {
            registry
                .register(Box::new(collector.clone()))
                .expect("metric registration");
        }

        Self {
            registry,
            seat_holds_total,
            hold_conflicts_total,
            reservations_confirmed_total,
            reservations_cancelled_total,
            payment_failures_total,
            expired_holds_total,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// GET /metrics — Prometheus text exposition.
pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, ApiError> {
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&state.metrics.registry().gather(), &mut buffer)
        .map_err(|e| ApiError::Internal(e.into()))?;
    String::from_utf8(buffer).map_err(|e| ApiError::Internal(e.into()))
}
