//! Compensation tests for the two-phase booking flow.
//!
//! When the booking insert fails after the slot claim has already
//! succeeded, the claim must be released so the slot is sellable again.

#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]

use carebook_core::store::{ProviderStore, SlotStore};
use carebook_core::{
    BookingError, BookingRequest, BookingService, Provider, ProviderId, SessionKind, Slot,
    SlotStatus, UserId,
};
use carebook_testing::mocks::{test_clock, FailingBookingStore, InMemoryStores, InsertFailure};
use chrono::Duration;
use std::sync::Arc;

fn test_provider() -> Provider {
    Provider {
        id: ProviderId::new(),
        name: "Dr. Fallback".to_string(),
        title: "Psychiatrist".to_string(),
        category: "mental-health".to_string(),
        specialties: vec!["depression".to_string()],
        experience_years: 12,
        rating: 4.6,
        review_count: 80,
        fee: 1500,
        languages: vec!["English".to_string()],
        bio: String::new(),
        education: String::new(),
        current_work: String::new(),
        image: String::new(),
        verified: true,
    }
}

struct Fixture {
    stores: InMemoryStores,
    bookings: FailingBookingStore,
    service: BookingService,
    provider_id: ProviderId,
    slot_id: carebook_core::SlotId,
}

async fn fixture() -> Fixture {
    let stores = InMemoryStores::new();
    let provider = test_provider();
    let provider_id = provider.id;
    ProviderStore::insert_if_absent(&stores, provider).await.unwrap();

    let start = chrono::Utc::now() + Duration::hours(1);
    let slot = Slot::available(provider_id, start, start + Duration::minutes(30), SessionKind::Video);
    let slot_id = slot.id;
    SlotStore::insert_if_absent(&stores, slot).await.unwrap();

    let bookings = FailingBookingStore::new(Arc::new(stores.clone()));
    let service = BookingService::new(
        Arc::new(stores.clone()),
        Arc::new(bookings.clone()),
        Arc::new(stores.clone()),
        Arc::new(test_clock()),
    );
    Fixture { stores, bookings, service, provider_id, slot_id }
}

fn request(fixture: &Fixture, user: &str) -> BookingRequest {
    BookingRequest {
        user_id: UserId::new(user).unwrap(),
        provider_id: fixture.provider_id,
        slot_id: fixture.slot_id,
        kind: SessionKind::Video,
    }
}

#[tokio::test]
async fn insert_failure_releases_the_claim() {
    let f = fixture().await;
    f.bookings.fail_with(InsertFailure::Database);

    let result = f.service.book(request(&f, "alice")).await;
    assert!(matches!(result, Err(BookingError::Storage(_))));

    let slot = SlotStore::get(&f.stores, f.slot_id).await.unwrap().unwrap();
    assert_eq!(slot.status, SlotStatus::Available);
    assert!(slot.booked_by.is_none(), "claimant must be cleared on rollback");
    assert!(slot.booked_at.is_none());
    assert!(f.stores.all_bookings().is_empty());
}

#[tokio::test]
async fn duplicate_insert_surfaces_conflict_and_releases_the_claim() {
    let f = fixture().await;
    f.bookings.fail_with(InsertFailure::Duplicate);

    let result = f.service.book(request(&f, "alice")).await;
    assert!(matches!(result, Err(BookingError::DuplicateBooking)));

    let slot = SlotStore::get(&f.stores, f.slot_id).await.unwrap().unwrap();
    assert_eq!(slot.status, SlotStatus::Available);
    assert!(slot.booked_by.is_none());
}

#[tokio::test]
async fn slot_is_sellable_again_after_rollback() {
    let f = fixture().await;

    f.bookings.fail_with(InsertFailure::Database);
    let failed = f.service.book(request(&f, "alice")).await;
    assert!(failed.is_err());

    f.bookings.fail_with(InsertFailure::None);
    let confirmation = f.service.book(request(&f, "bob")).await.unwrap();
    assert_eq!(confirmation.booking.slot_id, f.slot_id);
    assert_eq!(confirmation.provider_name, "Dr. Fallback");

    let slot = SlotStore::get(&f.stores, f.slot_id).await.unwrap().unwrap();
    assert_eq!(slot.status, SlotStatus::Booked);
    assert_eq!(slot.booked_by.as_ref().map(UserId::as_str), Some("bob"));
    assert_eq!(f.stores.all_bookings().len(), 1);
}

#[tokio::test]
async fn unknown_provider_is_rejected_before_any_claim() {
    let f = fixture().await;
    let req = BookingRequest {
        user_id: UserId::new("alice").unwrap(),
        provider_id: ProviderId::new(),
        slot_id: f.slot_id,
        kind: SessionKind::Video,
    };

    let result = f.service.book(req).await;
    assert!(matches!(result, Err(BookingError::Validation(_))));

    let slot = SlotStore::get(&f.stores, f.slot_id).await.unwrap().unwrap();
    assert_eq!(slot.status, SlotStatus::Available);
}
