pub mod catalog;
pub mod layout;
pub mod trip;

pub use catalog::TripCatalog;
pub use layout::SeatLayout;
pub use trip::{Amenity, BusCategory, Trip};
