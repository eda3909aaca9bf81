//! Slot availability query endpoints.
//!
//! - GET /api/providers/:id/slots?days=N - Open slots grouped by date
//!
//! The rolling slot window is topped up (idempotently, with a cheap coverage
//! short-circuit) before the query, so availability never goes stale just
//! because no one has booked recently.

use crate::error::AppError;
use crate::server::state::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use carebook_core::{available_by_day, ensure_slot_window, ProviderId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for the availability listing.
#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    /// Window size in days (clamped server-side; default 7)
    pub days: Option<u32>,
}

/// One open slot.
#[derive(Debug, Serialize)]
pub struct SlotView {
    /// Slot id
    pub slot_id: Uuid,
    /// Window start
    pub start_at: DateTime<Utc>,
    /// Window end
    pub end_at: DateTime<Utc>,
    /// Session kind offered
    pub session_kind: String,
}

/// Open slots for one calendar date.
#[derive(Debug, Serialize)]
pub struct DaySlots {
    /// Calendar date (UTC)
    pub date: NaiveDate,
    /// Open slots, ascending by start time
    pub slots: Vec<SlotView>,
}

/// Response for the availability listing.
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    /// Provider id
    pub provider_id: Uuid,
    /// Dates with open slots, ascending
    pub days: Vec<DaySlots>,
}

// ============================================================================
// Handlers
// ============================================================================

/// List a provider's open slots over the next N days, grouped by date.
///
/// Past slots and non-available slots are never returned.
///
/// # Errors
///
/// Returns 404 for an unknown provider, 500 for storage failures. A
/// malformed provider id is rejected by path deserialization before any
/// query runs.
pub async fn list_provider_slots(
    Path(provider_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
    State(state): State<AppState>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let id = ProviderId::from_uuid(provider_id);

    state
        .providers
        .get(id)
        .await
        .map_err(carebook_core::BookingError::from)?
        .ok_or_else(|| AppError::not_found("Provider", provider_id))?;

    // Top up the rolling window for the whole catalog, not just this
    // provider: the coverage check counts across all providers, and a
    // covered window reduces the call to that single count query. The full
    // insert loop only runs when the window has actually aged past the
    // coverage threshold.
    let all_providers = state
        .providers
        .list(None)
        .await
        .map_err(carebook_core::BookingError::from)?;
    ensure_slot_window(state.slots.as_ref(), &all_providers, state.clock.as_ref())
        .await
        .map_err(carebook_core::BookingError::from)?;

    let days = available_by_day(state.slots.as_ref(), state.clock.as_ref(), id, query.days)
        .await?
        .into_iter()
        .map(|day| DaySlots {
            date: day.date,
            slots: day
                .slots
                .into_iter()
                .map(|slot| SlotView {
                    slot_id: *slot.id.as_uuid(),
                    start_at: slot.start_at,
                    end_at: slot.end_at,
                    session_kind: slot.kind.as_str().to_string(),
                })
                .collect(),
        })
        .collect();

    Ok(Json(AvailabilityResponse {
        provider_id,
        days,
    }))
}
