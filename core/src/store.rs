//! Store traits for the booking subsystem.
//!
//! These traits are the only seam between the domain logic and persistence.
//! The slot store is the single shared mutable resource; all correctness
//! under concurrency hangs on [`SlotStore::claim`] and
//! [`SlotStore::release_claim`] being atomic conditional updates at the
//! storage layer - never a read followed by a write.
//!
//! # Implementations
//!
//! - `PgStores` (in `carebook-postgres`): production implementation
//! - `InMemoryStores` (in `carebook-testing`): fast, deterministic testing
//!
//! # Dyn Compatibility
//!
//! The traits use explicit `Pin<Box<dyn Future>>` returns instead of
//! `async fn` to enable trait object usage (`Arc<dyn SlotStore>` in the
//! server state).

use crate::error::StoreError;
use crate::types::{Booking, Provider, ProviderId, SessionKind, Slot, SlotId, UserId};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Persistence for bookable slots.
pub trait SlotStore: Send + Sync {
    /// Insert a slot unless one already exists for the same
    /// (provider, start time) pair.
    ///
    /// Returns `true` when the slot was inserted, `false` when an existing
    /// slot (in any status) was left untouched. Re-running the generator must
    /// never clobber a claimed slot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the insert fails.
    fn insert_if_absent(&self, slot: Slot) -> StoreFuture<'_, bool>;

    /// Count all slots (any status) whose start time falls in `[from, to)`.
    ///
    /// Used by the generator's coverage short-circuit.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    fn count_in_window(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> StoreFuture<'_, u64>;

    /// List a provider's `Available` slots with start time in `[from, to)`,
    /// ascending by start time.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    fn available_for_provider(
        &self,
        provider_id: ProviderId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> StoreFuture<'_, Vec<Slot>>;

    /// Atomically claim a slot for a user.
    ///
    /// ONE conditional update: matches only when the slot exists, belongs to
    /// `provider_id` and currently has status `Available`; on match it sets
    /// status to `Booked` and records claimant, claim time and session kind.
    /// Two simultaneous claims on the same slot are serialized by the storage
    /// engine and exactly one observes `Some`.
    ///
    /// Returns the slot as claimed, or `None` when the predicate matched
    /// nothing (already booked, taken off, deleted, or wrong provider).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the update fails.
    fn claim(
        &self,
        slot_id: SlotId,
        provider_id: ProviderId,
        user_id: UserId,
        kind: SessionKind,
        now: DateTime<Utc>,
    ) -> StoreFuture<'_, Option<Slot>>;

    /// Revert a claim, conditioned on the slot still being `Booked` by this
    /// same user.
    ///
    /// The guard prevents reverting a slot that a different later request
    /// has legitimately claimed; claimant ids are compared by exact match.
    /// On match the status returns to `Available` and claimant fields are
    /// cleared. Returns `true` when a slot was reverted.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the update fails.
    fn release_claim(&self, slot_id: SlotId, user_id: UserId) -> StoreFuture<'_, bool>;

    /// Fetch a slot by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    fn get(&self, slot_id: SlotId) -> StoreFuture<'_, Option<Slot>>;
}

/// Persistence for booking records.
pub trait BookingStore: Send + Sync {
    /// Insert a booking.
    ///
    /// At most one booking may exist per slot; implementations enforce this
    /// with a uniqueness constraint on the slot reference.
    ///
    /// # Errors
    ///
    /// - [`StoreError::DuplicateBooking`] when a booking already exists for
    ///   the slot
    /// - [`StoreError::Database`] for any other persistence failure
    fn insert(&self, booking: Booking) -> StoreFuture<'_, ()>;

    /// List a user's `Booked` bookings, soonest first, capped at `limit`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    fn booked_for_user(&self, user_id: UserId, limit: u32) -> StoreFuture<'_, Vec<Booking>>;
}

/// Persistence for the provider catalog.
///
/// Read-only from the booking flow's perspective; writes happen only through
/// the idempotent seed path.
pub trait ProviderStore: Send + Sync {
    /// Insert a provider unless one with the same display name exists.
    ///
    /// Returns `true` when the provider was inserted.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the insert fails.
    fn insert_if_absent(&self, provider: Provider) -> StoreFuture<'_, bool>;

    /// Count all providers.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    fn count(&self) -> StoreFuture<'_, u64>;

    /// List providers, optionally filtered by category, name ascending.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    fn list(&self, category: Option<String>) -> StoreFuture<'_, Vec<Provider>>;

    /// Fetch a provider by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    fn get(&self, id: ProviderId) -> StoreFuture<'_, Option<Provider>>;

    /// Batched lookup of providers by id.
    ///
    /// One round trip for a whole page of bookings; never called per row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    fn get_many(&self, ids: Vec<ProviderId>) -> StoreFuture<'_, Vec<Provider>>;
}
