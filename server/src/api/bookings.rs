//! Booking API endpoints.
//!
//! - POST /api/bookings - Claim a slot and create a booking
//! - GET  /api/bookings?user_id= - List a user's active bookings
//!
//! # Booking Flow
//!
//! 1. **Validate**: user id non-empty; ids are well-formed UUIDs (enforced
//!    by deserialization); unknown session kinds fall back to video.
//! 2. **Claim**: one atomic conditional update flips the slot to booked.
//! 3. **Create**: the booking record is written; on failure the claim is
//!    reverted and the original failure surfaces as 409 or 500.

use crate::error::AppError;
use crate::server::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use carebook_core::{BookingRequest, BookingView, ProviderId, SessionKind, SlotId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to create a booking.
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    /// Requesting user's subject id
    pub user_id: String,
    /// Provider to book
    pub provider_id: Uuid,
    /// Slot to claim
    pub slot_id: Uuid,
    /// Requested session kind ("video", "voice", "chat"); invalid or absent
    /// values fall back to video
    pub session_kind: Option<String>,
}

/// Response after creating a booking.
#[derive(Debug, Serialize)]
pub struct CreateBookingResponse {
    /// Created booking id
    pub booking_id: Uuid,
    /// Provider id
    pub provider_id: Uuid,
    /// Provider display name
    pub provider_name: String,
    /// Provider title
    pub provider_title: String,
    /// Session start
    pub start_at: DateTime<Utc>,
    /// Session end
    pub end_at: DateTime<Utc>,
    /// Session kind
    pub session_kind: String,
    /// Booking status
    pub status: String,
}

/// Query parameters for the booking listing.
#[derive(Debug, Deserialize)]
pub struct ListBookingsQuery {
    /// Requesting user's subject id
    pub user_id: String,
}

/// One booking in the list view.
#[derive(Debug, Serialize)]
pub struct BookingSummary {
    /// Booking id
    pub booking_id: Uuid,
    /// Provider id
    pub provider_id: Uuid,
    /// Provider display name
    pub provider_name: String,
    /// Provider title
    pub provider_title: String,
    /// Session start
    pub start_at: DateTime<Utc>,
    /// Session end
    pub end_at: DateTime<Utc>,
    /// Session kind
    pub session_kind: String,
    /// Booking status
    pub status: String,
}

/// Response for the booking listing.
#[derive(Debug, Serialize)]
pub struct ListBookingsResponse {
    /// Active bookings, soonest first
    pub bookings: Vec<BookingSummary>,
    /// Count on this page
    pub total: usize,
}

impl From<BookingView> for BookingSummary {
    fn from(view: BookingView) -> Self {
        Self {
            booking_id: *view.booking.id.as_uuid(),
            provider_id: *view.booking.provider_id.as_uuid(),
            provider_name: view.provider_name,
            provider_title: view.provider_title,
            start_at: view.booking.start_at,
            end_at: view.booking.end_at,
            session_kind: view.booking.kind.as_str().to_string(),
            status: view.booking.status.as_str().to_string(),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Create a booking: claim the slot, then write the booking record.
///
/// Returns 201 on success. A slot already claimed by someone else returns
/// 409 `SLOT_UNAVAILABLE`; a retried request racing its own earlier success
/// returns 409 `DUPLICATE_BOOKING`.
///
/// # Errors
///
/// See [`AppError`] for the mapping from [`carebook_core::BookingError`].
pub async fn create_booking(
    State(state): State<AppState>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<CreateBookingResponse>), AppError> {
    let user_id = UserId::new(request.user_id)
        .ok_or_else(|| AppError::validation("user_id must not be empty"))?;

    let confirmation = state
        .booking_service
        .book(BookingRequest {
            user_id,
            provider_id: ProviderId::from_uuid(request.provider_id),
            slot_id: SlotId::from_uuid(request.slot_id),
            kind: SessionKind::from_request(request.session_kind.as_deref()),
        })
        .await?;

    let booking = confirmation.booking;
    Ok((
        StatusCode::CREATED,
        Json(CreateBookingResponse {
            booking_id: *booking.id.as_uuid(),
            provider_id: *booking.provider_id.as_uuid(),
            provider_name: confirmation.provider_name,
            provider_title: confirmation.provider_title,
            start_at: booking.start_at,
            end_at: booking.end_at,
            session_kind: booking.kind.as_str().to_string(),
            status: booking.status.as_str().to_string(),
        }),
    ))
}

/// List a user's active bookings, soonest first, capped at one page.
///
/// # Errors
///
/// Returns 422 for an empty `user_id`, 500 for storage failures.
pub async fn list_bookings(
    State(state): State<AppState>,
    Query(query): Query<ListBookingsQuery>,
) -> Result<Json<ListBookingsResponse>, AppError> {
    let user_id = UserId::new(query.user_id)
        .ok_or_else(|| AppError::validation("user_id must not be empty"))?;

    let views = state.booking_service.list_bookings(user_id).await?;
    let bookings: Vec<BookingSummary> = views.into_iter().map(BookingSummary::from).collect();
    let total = bookings.len();

    Ok(Json(ListBookingsResponse { bookings, total }))
}
