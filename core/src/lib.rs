//! # Carebook Core
//!
//! Domain types, store traits and booking logic for the Carebook appointment
//! booking service.
//!
//! The subsystem has four moving parts, leaf first:
//!
//! - **Slot generator** ([`schedule`]): populates a rolling window of
//!   bookable slots per provider from fixed daily templates, idempotently.
//! - **Slot store** ([`store`]): the persisted slot collection; the single
//!   shared mutable resource.
//! - **Booking allocator** ([`allocator`]): claims exactly one slot via one
//!   atomic conditional update and creates a durable booking record, or
//!   fails cleanly with a compensating release.
//! - **Readers** ([`availability`], [`allocator::BookingService::list_bookings`]):
//!   availability grouped by date, and a user's bookings with provider
//!   display data joined in.
//!
//! All correctness under concurrency is pushed down to the storage layer's
//! conditional-update primitive; there is no in-process coordination.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod allocator;
pub mod availability;
pub mod catalog;
pub mod clock;
pub mod error;
pub mod schedule;
pub mod store;
pub mod types;

pub use allocator::{BookingConfirmation, BookingRequest, BookingService, BOOKING_PAGE_SIZE};
pub use availability::{available_by_day, DayAvailability, DEFAULT_WINDOW_DAYS, MAX_WINDOW_DAYS};
pub use catalog::{ensure_providers, seed_catalog, SeedReport};
pub use clock::{Clock, SystemClock};
pub use error::{BookingError, StoreError};
pub use schedule::{ensure_slot_window, GeneratorReport, DAILY_TEMPLATES, WINDOW_DAYS};
pub use store::{BookingStore, ProviderStore, SlotStore, StoreFuture};
pub use types::{
    Booking, BookingId, BookingStatus, BookingView, Provider, ProviderId, SessionKind, Slot,
    SlotId, SlotStatus, UserId,
};
