//! # Carebook Testing
//!
//! Testing utilities for the Carebook booking service:
//!
//! - `InMemoryStores`: deterministic in-memory twin of the production
//!   Postgres stores. The conditional claim/release are each one mutation
//!   under one mutex acquisition, preserving the atomicity contract the
//!   allocator depends on.
//! - `FailingBookingStore`: wrapper that forces booking-creation failures to
//!   exercise the compensating-release path.
//! - `FixedClock`: deterministic time.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Mock implementations for testing.
pub mod mocks {
    use carebook_core::error::StoreError;
    use carebook_core::store::{BookingStore, ProviderStore, SlotStore, StoreFuture};
    use carebook_core::types::{
        Booking, BookingStatus, Provider, ProviderId, SessionKind, Slot, SlotId, SlotStatus,
        UserId,
    };
    use carebook_core::Clock;
    use chrono::{DateTime, Utc};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex, PoisonError};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-06-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-06-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    #[derive(Default)]
    struct Inner {
        providers: Vec<Provider>,
        slots: HashMap<SlotId, Slot>,
        bookings: Vec<Booking>,
    }

    impl Inner {
        fn slot_exists_at(&self, provider_id: ProviderId, start_at: DateTime<Utc>) -> bool {
            self.slots
                .values()
                .any(|s| s.provider_id == provider_id && s.start_at == start_at)
        }

        fn booking_exists_for(&self, slot_id: SlotId) -> bool {
            self.bookings.iter().any(|b| b.slot_id == slot_id)
        }
    }

    /// In-memory implementation of all three store traits.
    ///
    /// Cheap to clone; clones share the same state.
    #[derive(Clone, Default)]
    pub struct InMemoryStores {
        inner: Arc<Mutex<Inner>>,
    }

    impl InMemoryStores {
        /// Create an empty store set.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
            self.inner.lock().unwrap_or_else(PoisonError::into_inner)
        }

        /// Snapshot of all slots, for invariant checks in tests.
        #[must_use]
        pub fn all_slots(&self) -> Vec<Slot> {
            self.lock().slots.values().cloned().collect()
        }

        /// Snapshot of all bookings, for invariant checks in tests.
        #[must_use]
        pub fn all_bookings(&self) -> Vec<Booking> {
            self.lock().bookings.clone()
        }
    }

    impl SlotStore for InMemoryStores {
        fn insert_if_absent(&self, slot: Slot) -> StoreFuture<'_, bool> {
            Box::pin(async move {
                let mut inner = self.lock();
                if inner.slot_exists_at(slot.provider_id, slot.start_at) {
                    return Ok(false);
                }
                inner.slots.insert(slot.id, slot);
                Ok(true)
            })
        }

        fn count_in_window(
            &self,
            from: DateTime<Utc>,
            to: DateTime<Utc>,
        ) -> StoreFuture<'_, u64> {
            Box::pin(async move {
                let inner = self.lock();
                Ok(inner
                    .slots
                    .values()
                    .filter(|s| s.start_at >= from && s.start_at < to)
                    .count() as u64)
            })
        }

        fn available_for_provider(
            &self,
            provider_id: ProviderId,
            from: DateTime<Utc>,
            to: DateTime<Utc>,
        ) -> StoreFuture<'_, Vec<Slot>> {
            Box::pin(async move {
                let inner = self.lock();
                let mut open: Vec<Slot> = inner
                    .slots
                    .values()
                    .filter(|s| {
                        s.provider_id == provider_id
                            && s.status == SlotStatus::Available
                            && s.start_at >= from
                            && s.start_at < to
                    })
                    .cloned()
                    .collect();
                open.sort_by_key(|s| s.start_at);
                Ok(open)
            })
        }

        fn claim(
            &self,
            slot_id: SlotId,
            provider_id: ProviderId,
            user_id: UserId,
            kind: SessionKind,
            now: DateTime<Utc>,
        ) -> StoreFuture<'_, Option<Slot>> {
            Box::pin(async move {
                // One mutation under one lock acquisition: the in-memory
                // equivalent of the single conditional UPDATE.
                let mut inner = self.lock();
                let Some(slot) = inner.slots.get_mut(&slot_id) else {
                    return Ok(None);
                };
                if slot.provider_id != provider_id || slot.status != SlotStatus::Available {
                    return Ok(None);
                }
                slot.status = SlotStatus::Booked;
                slot.booked_by = Some(user_id);
                slot.booked_at = Some(now);
                slot.kind = kind;
                Ok(Some(slot.clone()))
            })
        }

        fn release_claim(&self, slot_id: SlotId, user_id: UserId) -> StoreFuture<'_, bool> {
            Box::pin(async move {
                let mut inner = self.lock();
                let Some(slot) = inner.slots.get_mut(&slot_id) else {
                    return Ok(false);
                };
                if slot.status != SlotStatus::Booked || slot.booked_by.as_ref() != Some(&user_id) {
                    return Ok(false);
                }
                slot.status = SlotStatus::Available;
                slot.booked_by = None;
                slot.booked_at = None;
                Ok(true)
            })
        }

        fn get(&self, slot_id: SlotId) -> StoreFuture<'_, Option<Slot>> {
            Box::pin(async move { Ok(self.lock().slots.get(&slot_id).cloned()) })
        }
    }

    impl BookingStore for InMemoryStores {
        fn insert(&self, booking: Booking) -> StoreFuture<'_, ()> {
            Box::pin(async move {
                let mut inner = self.lock();
                if inner.booking_exists_for(booking.slot_id) {
                    return Err(StoreError::DuplicateBooking {
                        slot_id: booking.slot_id,
                    });
                }
                inner.bookings.push(booking);
                Ok(())
            })
        }

        fn booked_for_user(&self, user_id: UserId, limit: u32) -> StoreFuture<'_, Vec<Booking>> {
            Box::pin(async move {
                let inner = self.lock();
                let mut mine: Vec<Booking> = inner
                    .bookings
                    .iter()
                    .filter(|b| b.user_id == user_id && b.status == BookingStatus::Booked)
                    .cloned()
                    .collect();
                mine.sort_by_key(|b| b.start_at);
                mine.truncate(limit as usize);
                Ok(mine)
            })
        }
    }

    impl ProviderStore for InMemoryStores {
        fn insert_if_absent(&self, provider: Provider) -> StoreFuture<'_, bool> {
            Box::pin(async move {
                let mut inner = self.lock();
                if inner.providers.iter().any(|p| p.name == provider.name) {
                    return Ok(false);
                }
                inner.providers.push(provider);
                Ok(true)
            })
        }

        fn count(&self) -> StoreFuture<'_, u64> {
            Box::pin(async move { Ok(self.lock().providers.len() as u64) })
        }

        fn list(&self, category: Option<String>) -> StoreFuture<'_, Vec<Provider>> {
            Box::pin(async move {
                let inner = self.lock();
                let mut out: Vec<Provider> = inner
                    .providers
                    .iter()
                    .filter(|p| category.as_ref().is_none_or(|c| &p.category == c))
                    .cloned()
                    .collect();
                out.sort_by(|a, b| a.name.cmp(&b.name));
                Ok(out)
            })
        }

        fn get(&self, id: ProviderId) -> StoreFuture<'_, Option<Provider>> {
            Box::pin(async move {
                Ok(self.lock().providers.iter().find(|p| p.id == id).cloned())
            })
        }

        fn get_many(&self, ids: Vec<ProviderId>) -> StoreFuture<'_, Vec<Provider>> {
            Box::pin(async move {
                let inner = self.lock();
                Ok(inner
                    .providers
                    .iter()
                    .filter(|p| ids.contains(&p.id))
                    .cloned()
                    .collect())
            })
        }
    }

    /// Which failure `FailingBookingStore` injects on insert.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum InsertFailure {
        /// Inserts succeed (pass through)
        None,
        /// Every insert reports a duplicate booking for its slot
        Duplicate,
        /// Every insert reports a database failure
        Database,
    }

    /// Booking store wrapper that fails inserts on demand.
    ///
    /// Used to force the allocator down the compensating-release path after
    /// a successful claim.
    #[derive(Clone)]
    pub struct FailingBookingStore {
        inner: Arc<dyn BookingStore>,
        failure: Arc<Mutex<InsertFailure>>,
    }

    impl FailingBookingStore {
        /// Wrap a booking store; inserts pass through until a failure mode
        /// is set.
        #[must_use]
        pub fn new(inner: Arc<dyn BookingStore>) -> Self {
            Self {
                inner,
                failure: Arc::new(Mutex::new(InsertFailure::None)),
            }
        }

        /// Set the failure injected on subsequent inserts.
        pub fn fail_with(&self, failure: InsertFailure) {
            *self.failure.lock().unwrap_or_else(PoisonError::into_inner) = failure;
        }

        fn current(&self) -> InsertFailure {
            *self.failure.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    impl BookingStore for FailingBookingStore {
        fn insert(&self, booking: Booking) -> StoreFuture<'_, ()> {
            Box::pin(async move {
                match self.current() {
                    InsertFailure::None => self.inner.insert(booking).await,
                    InsertFailure::Duplicate => Err(StoreError::DuplicateBooking {
                        slot_id: booking.slot_id,
                    }),
                    InsertFailure::Database => {
                        Err(StoreError::Database("injected insert failure".to_string()))
                    }
                }
            })
        }

        fn booked_for_user(&self, user_id: UserId, limit: u32) -> StoreFuture<'_, Vec<Booking>> {
            self.inner.booked_for_user(user_id, limit)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::mocks::{test_clock, InMemoryStores};
    use carebook_core::store::SlotStore;
    use carebook_core::types::{ProviderId, SessionKind, Slot, SlotStatus, UserId};
    use carebook_core::Clock;
    use chrono::Duration;

    #[tokio::test]
    async fn claim_is_conditional_on_availability() {
        let stores = InMemoryStores::new();
        let clock = test_clock();
        let provider = ProviderId::new();
        let start = clock.now() + Duration::hours(1);
        let slot = Slot::available(provider, start, start + Duration::minutes(30), SessionKind::Video);
        let slot_id = slot.id;
        assert!(stores.insert_if_absent(slot).await.unwrap());

        let alice = UserId::new("alice").unwrap();
        let bob = UserId::new("bob").unwrap();

        let first = stores
            .claim(slot_id, provider, alice, SessionKind::Video, clock.now())
            .await
            .unwrap();
        assert!(first.is_some());
        assert_eq!(first.unwrap().status, SlotStatus::Booked);

        let second = stores
            .claim(slot_id, provider, bob, SessionKind::Video, clock.now())
            .await
            .unwrap();
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn release_requires_matching_claimant() {
        let stores = InMemoryStores::new();
        let clock = test_clock();
        let provider = ProviderId::new();
        let start = clock.now() + Duration::hours(1);
        let slot = Slot::available(provider, start, start + Duration::minutes(30), SessionKind::Video);
        let slot_id = slot.id;
        stores.insert_if_absent(slot).await.unwrap();

        let alice = UserId::new("alice").unwrap();
        stores
            .claim(slot_id, provider, alice.clone(), SessionKind::Video, clock.now())
            .await
            .unwrap();

        let mallory = UserId::new("mallory").unwrap();
        assert!(!stores.release_claim(slot_id, mallory).await.unwrap());
        assert!(stores.release_claim(slot_id, alice).await.unwrap());

        let slot = stores.get(slot_id).await.unwrap().unwrap();
        assert_eq!(slot.status, SlotStatus::Available);
        assert!(slot.booked_by.is_none());
        assert!(slot.booked_at.is_none());
    }

    #[tokio::test]
    async fn insert_if_absent_keys_on_provider_and_start() {
        let stores = InMemoryStores::new();
        let clock = test_clock();
        let provider = ProviderId::new();
        let start = clock.now() + Duration::hours(2);

        let a = Slot::available(provider, start, start + Duration::minutes(30), SessionKind::Video);
        let b = Slot::available(provider, start, start + Duration::minutes(45), SessionKind::Chat);
        assert!(stores.insert_if_absent(a).await.unwrap());
        assert!(!stores.insert_if_absent(b).await.unwrap());

        let other_provider = ProviderId::new();
        let c = Slot::available(other_provider, start, start + Duration::minutes(30), SessionKind::Video);
        assert!(stores.insert_if_absent(c).await.unwrap());
    }
}
