//! Application state for the Carebook HTTP server.

use carebook_core::store::{BookingStore, ProviderStore, SlotStore};
use carebook_core::{BookingService, Clock};
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Stores are held as trait objects so the production Postgres
/// implementation and the in-memory test implementation plug into the same
/// router. Cloned (cheaply via Arc) for each request.
#[derive(Clone)]
pub struct AppState {
    /// Slot store (the single shared mutable resource)
    pub slots: Arc<dyn SlotStore>,
    /// Booking record store
    pub bookings: Arc<dyn BookingStore>,
    /// Provider catalog store
    pub providers: Arc<dyn ProviderStore>,
    /// Clock for "now" decisions
    pub clock: Arc<dyn Clock>,
    /// Booking allocator over the stores above
    pub booking_service: BookingService,
}

impl AppState {
    /// Create a new application state over the given stores.
    #[must_use]
    pub fn new(
        slots: Arc<dyn SlotStore>,
        bookings: Arc<dyn BookingStore>,
        providers: Arc<dyn ProviderStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let booking_service = BookingService::new(
            slots.clone(),
            bookings.clone(),
            providers.clone(),
            clock.clone(),
        );
        Self {
            slots,
            bookings,
            providers,
            clock,
            booking_service,
        }
    }
}
