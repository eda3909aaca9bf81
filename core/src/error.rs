//! Error taxonomy for the booking subsystem.
//!
//! Two layers: [`StoreError`] is what store implementations return,
//! [`BookingError`] is what the domain operations surface to callers. The
//! HTTP mapping lives in the server crate; nothing here knows about status
//! codes.

use thiserror::Error;

use crate::types::SlotId;

/// Errors produced by store implementations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database connection or query error.
    #[error("database error: {0}")]
    Database(String),

    /// A booking already exists for this slot (unique constraint on the slot
    /// reference). Typically a retried request racing its own earlier
    /// success.
    #[error("a booking already exists for slot {slot_id}")]
    DuplicateBooking {
        /// The slot the duplicate was attempted against.
        slot_id: SlotId,
    },

    /// The referenced record does not exist.
    #[error("record not found")]
    NotFound,
}

/// Errors surfaced by booking operations.
#[derive(Error, Debug)]
pub enum BookingError {
    /// Request rejected before any storage access.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The conditional claim matched no slot: already booked, taken off, or
    /// not belonging to the given provider. The caller should pick another
    /// slot; this is not retried automatically.
    #[error("slot is no longer available")]
    SlotUnavailable,

    /// Booking creation hit the one-booking-per-slot constraint after a
    /// successful claim. The claim has been rolled back.
    #[error("a booking already exists for this slot")]
    DuplicateBooking,

    /// Any other persistence failure. When it occurs after a successful
    /// claim, the claim has been rolled back (best effort).
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl BookingError {
    /// True when the failure means "pick another slot" rather than "try
    /// again later". Conflicts must stay distinguishable from outages.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::SlotUnavailable | Self::DuplicateBooking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflicts_are_distinguishable_from_outages() {
        assert!(BookingError::SlotUnavailable.is_conflict());
        assert!(BookingError::DuplicateBooking.is_conflict());
        assert!(!BookingError::Storage(StoreError::Database("down".into())).is_conflict());
        assert!(!BookingError::Validation("missing user".into()).is_conflict());
    }

    #[test]
    fn duplicate_store_error_names_the_slot() {
        let slot_id = SlotId::new();
        let err = StoreError::DuplicateBooking { slot_id };
        assert!(err.to_string().contains(&slot_id.to_string()));
    }
}
