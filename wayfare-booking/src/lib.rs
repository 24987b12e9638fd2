pub mod engine;
pub mod kinds;
pub mod payload;

pub use engine::{BookingEngine, BookingOutcome};
pub use payload::{BookCarRequest, BookFlightRequest, BookHotelRequest};
