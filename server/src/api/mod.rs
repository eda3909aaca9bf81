//! API endpoint handlers.

pub mod availability;
pub mod bookings;
pub mod providers;
