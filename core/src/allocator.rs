//! Booking allocation: the only concurrency-sensitive operation in the
//! system.
//!
//! A booking is a two-phase operation against the stores:
//!
//! 1. **Claim** - one atomic conditional update flips the slot
//!    `Available -> Booked`. Two simultaneous requesters are serialized by
//!    the storage engine; exactly one observes success.
//! 2. **Create or revert** - a booking record is created from the claimed
//!    slot. If creation fails (duplicate booking from a retried request, or
//!    any other persistence failure) the claim is reverted, conditioned on
//!    the slot still being held by this claimant, and the original failure
//!    is surfaced.
//!
//! Net effect per call: exactly one slot transition and at most one booking
//! row; every failure path leaves storage as it was before the call.

use crate::clock::Clock;
use crate::error::{BookingError, StoreError};
use crate::store::{BookingStore, ProviderStore, SlotStore};
use crate::types::{Booking, BookingView, ProviderId, SessionKind, SlotId, UserId};
use std::collections::HashMap;
use std::sync::Arc;

/// Page size for booking listings.
pub const BOOKING_PAGE_SIZE: u32 = 20;

/// A validated booking request.
#[derive(Clone, Debug)]
pub struct BookingRequest {
    /// Requesting user
    pub user_id: UserId,
    /// Provider being booked
    pub provider_id: ProviderId,
    /// The slot to claim
    pub slot_id: SlotId,
    /// Requested session kind (already defaulted if the raw value was
    /// invalid or absent)
    pub kind: SessionKind,
}

/// A successful booking with provider display fields for the response.
#[derive(Clone, Debug)]
pub struct BookingConfirmation {
    /// The created booking
    pub booking: Booking,
    /// Provider display name
    pub provider_name: String,
    /// Provider title
    pub provider_title: String,
}

/// Coordinates slot claims and booking creation over the store traits.
#[derive(Clone)]
pub struct BookingService {
    slots: Arc<dyn SlotStore>,
    bookings: Arc<dyn BookingStore>,
    providers: Arc<dyn ProviderStore>,
    clock: Arc<dyn Clock>,
}

impl BookingService {
    /// Create a new booking service over the given stores.
    #[must_use]
    pub fn new(
        slots: Arc<dyn SlotStore>,
        bookings: Arc<dyn BookingStore>,
        providers: Arc<dyn ProviderStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            slots,
            bookings,
            providers,
            clock,
        }
    }

    /// Claim a slot and create the booking record for it.
    ///
    /// # Errors
    ///
    /// - [`BookingError::Validation`] when the provider does not exist
    /// - [`BookingError::SlotUnavailable`] when the conditional claim matched
    ///   no slot (already booked, taken off, or wrong provider)
    /// - [`BookingError::DuplicateBooking`] when a booking already exists for
    ///   the slot; the claim has been reverted
    /// - [`BookingError::Storage`] for other persistence failures; when the
    ///   failure happened after a successful claim, the claim has been
    ///   reverted
    pub async fn book(&self, request: BookingRequest) -> Result<BookingConfirmation, BookingError> {
        let provider = self
            .providers
            .get(request.provider_id)
            .await?
            .ok_or_else(|| {
                BookingError::Validation(format!("unknown provider {}", request.provider_id))
            })?;

        let now = self.clock.now();

        // Phase 1: atomic claim. No read precedes this write.
        let claimed = self
            .slots
            .claim(
                request.slot_id,
                request.provider_id,
                request.user_id.clone(),
                request.kind,
                now,
            )
            .await?;

        let Some(slot) = claimed else {
            metrics::counter!("carebook.bookings.conflict").increment(1);
            tracing::info!(
                slot_id = %request.slot_id,
                provider_id = %request.provider_id,
                "claim matched no available slot"
            );
            return Err(BookingError::SlotUnavailable);
        };

        // Phase 2: durable booking record, or compensating release.
        let booking = Booking::from_claimed_slot(&slot, request.user_id.clone(), now);
        match self.bookings.insert(booking.clone()).await {
            Ok(()) => {
                metrics::counter!("carebook.bookings.created").increment(1);
                tracing::info!(
                    booking_id = %booking.id,
                    slot_id = %slot.id,
                    provider_id = %provider.id,
                    user_id = %request.user_id,
                    "booking created"
                );
                Ok(BookingConfirmation {
                    booking,
                    provider_name: provider.name,
                    provider_title: provider.title,
                })
            }
            Err(err) => {
                self.revert_claim(request.slot_id, request.user_id).await;
                Err(match err {
                    StoreError::DuplicateBooking { .. } => BookingError::DuplicateBooking,
                    other => BookingError::Storage(other),
                })
            }
        }
    }

    /// Revert a claim after booking creation failed.
    ///
    /// Best effort: the release is conditioned on the slot still being
    /// `Booked` by this same claimant, so a slot a later request has since
    /// claimed is never touched. A failed release is logged, not propagated
    /// over the original failure.
    async fn revert_claim(&self, slot_id: SlotId, user_id: UserId) {
        match self.slots.release_claim(slot_id, user_id).await {
            Ok(true) => {
                metrics::counter!("carebook.bookings.rolled_back").increment(1);
                tracing::warn!(%slot_id, "booking creation failed, claim reverted");
            }
            Ok(false) => {
                tracing::warn!(%slot_id, "claim no longer held by this user, leaving slot as-is");
            }
            Err(e) => {
                tracing::error!(%slot_id, error = %e, "failed to revert claim");
            }
        }
    }

    /// List a user's active bookings, soonest first, capped at
    /// [`BOOKING_PAGE_SIZE`], with provider display fields joined in.
    ///
    /// Provider lookup is batched: one query for the distinct provider ids
    /// referenced by the page, never one per booking.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Storage`] if a store query fails.
    pub async fn list_bookings(&self, user_id: UserId) -> Result<Vec<BookingView>, BookingError> {
        let bookings = self
            .bookings
            .booked_for_user(user_id, BOOKING_PAGE_SIZE)
            .await?;
        if bookings.is_empty() {
            return Ok(Vec::new());
        }

        let mut ids: Vec<ProviderId> = bookings.iter().map(|b| b.provider_id).collect();
        ids.sort_unstable_by_key(|id| *id.as_uuid());
        ids.dedup();

        let providers = self.providers.get_many(ids).await?;
        let by_id: HashMap<ProviderId, _> =
            providers.into_iter().map(|p| (p.id, (p.name, p.title))).collect();

        Ok(bookings
            .into_iter()
            .map(|booking| {
                let (provider_name, provider_title) = by_id
                    .get(&booking.provider_id)
                    .cloned()
                    .unwrap_or_default();
                BookingView {
                    booking,
                    provider_name,
                    provider_title,
                }
            })
            .collect())
    }
}
