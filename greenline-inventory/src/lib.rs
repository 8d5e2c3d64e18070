pub mod events;
pub mod inventory;
pub mod models;

pub use events::{SeatEvent, SeatEventKind};
pub use inventory::{ChargeIntent, SeatInventory};
pub use models::{Reservation, ReservationStatus, Seat, SeatMapView, SeatState, SeatView, TripInstance};
