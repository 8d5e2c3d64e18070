pub mod ids;
pub mod payment;

pub use ids::{RequesterId, ReservationId, TripId};
pub use payment::{PaymentAdapter, PaymentError, PaymentReceipt};

/// Failure taxonomy shared by every reservation-engine operation.
///
/// All variants are returned to the caller as typed failures, never
/// swallowed. `SeatUnavailable` and `PaymentFailed` are the retryable ones;
/// the rest require the caller to restart from a fresh seat-map fetch.
#[derive(Debug, thiserror::Error)]
pub enum ReservationError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("unknown seat label(s) for this bus layout: {}", labels.join(", "))]
    InvalidSeat { labels: Vec<String> },

    #[error("seat(s) already taken: {}", labels.join(", "))]
    SeatUnavailable { labels: Vec<String> },

    #[error("reservation {0} has expired")]
    ReservationExpired(ReservationId),

    #[error("invalid state transition from {from} to {to}")]
    InvalidState { from: String, to: String },

    #[error("payment failed: {0}")]
    PaymentFailed(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("service unavailable: {0}")]
    Unavailable(String),
}

pub type ReservationResult<T> = Result<T, ReservationError>;
