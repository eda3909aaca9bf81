//! Domain types for the Carebook booking system.
//!
//! Value objects and entities for the slot-booking subsystem: providers,
//! bookable slots and booking records, plus the closed enums that drive the
//! slot state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::StoreError;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for a provider
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProviderId(Uuid);

impl ProviderId {
    /// Creates a new random `ProviderId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `ProviderId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ProviderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a bookable slot
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotId(Uuid);

impl SlotId {
    /// Creates a new random `SlotId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `SlotId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SlotId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a booking
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingId(Uuid);

impl BookingId {
    /// Creates a new random `BookingId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `BookingId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for BookingId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a requesting user.
///
/// Opaque subject id issued by the external auth provider. Carebook only
/// requires it to be non-empty; claimant comparisons are exact string
/// equality.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Create a `UserId` from a raw subject id.
    ///
    /// Returns `None` when the id is empty or whitespace-only.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    /// Get the raw subject id
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Closed enums
// ============================================================================

/// Kind of consultation session a slot is offered for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionKind {
    /// Video call
    #[default]
    Video,
    /// Voice-only call
    Voice,
    /// Text chat
    Chat,
}

impl SessionKind {
    /// Convert to the database/wire string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Voice => "voice",
            Self::Chat => "chat",
        }
    }

    /// Parse from the database string representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a known session kind.
    pub fn parse(s: &str) -> Result<Self, StoreError> {
        match s {
            "video" => Ok(Self::Video),
            "voice" => Ok(Self::Voice),
            "chat" => Ok(Self::Chat),
            _ => Err(StoreError::Database(format!("invalid session kind: {s}"))),
        }
    }

    /// Resolve a session kind from an untrusted request field.
    ///
    /// Unknown or absent values fall back to [`SessionKind::Video`]; a booking
    /// request never fails on this field alone. Matching is case-insensitive.
    #[must_use]
    pub fn from_request(raw: Option<&str>) -> Self {
        match raw.map(str::to_ascii_lowercase).as_deref() {
            Some("voice") => Self::Voice,
            Some("chat") => Self::Chat,
            _ => Self::Video,
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Availability state of a slot.
///
/// Legal transitions are `Available -> Booked` (claim) and
/// `Booked -> Available` (compensating release). Slots are never deleted by
/// the booking flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotStatus {
    /// Open for claiming
    Available,
    /// Claimed by exactly one user
    Booked,
    /// Taken out of circulation by the provider
    Off,
}

impl SlotStatus {
    /// Convert to the database string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Booked => "booked",
            Self::Off => "off",
        }
    }

    /// Parse from the database string representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a known slot status.
    pub fn parse(s: &str) -> Result<Self, StoreError> {
        match s {
            "available" => Ok(Self::Available),
            "booked" => Ok(Self::Booked),
            "off" => Ok(Self::Off),
            _ => Err(StoreError::Database(format!("invalid slot status: {s}"))),
        }
    }
}

/// Lifecycle state of a booking record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    /// Active booking
    Booked,
    /// Cancelled by the user or provider
    Cancelled,
    /// Session took place
    Completed,
}

impl BookingStatus {
    /// Convert to the database string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Booked => "booked",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }

    /// Parse from the database string representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a known booking status.
    pub fn parse(s: &str) -> Result<Self, StoreError> {
        match s {
            "booked" => Ok(Self::Booked),
            "cancelled" => Ok(Self::Cancelled),
            "completed" => Ok(Self::Completed),
            _ => Err(StoreError::Database(format!("invalid booking status: {s}"))),
        }
    }
}

// ============================================================================
// Entities
// ============================================================================

/// A bookable professional.
///
/// Read-mostly reference entity: created by the seed catalog and never
/// mutated by the booking flow.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    /// Provider id
    pub id: ProviderId,
    /// Display name
    pub name: String,
    /// Title/role (e.g. "Clinical Psychologist")
    pub title: String,
    /// Coarse category used for catalog filtering
    pub category: String,
    /// Specialty tags
    pub specialties: Vec<String>,
    /// Years of experience
    pub experience_years: i32,
    /// Average rating (0.0 - 5.0)
    pub rating: f64,
    /// Number of reviews behind the rating
    pub review_count: i32,
    /// Consultation fee in minor currency units
    pub fee: i32,
    /// Languages spoken
    pub languages: Vec<String>,
    /// Free-text bio
    pub bio: String,
    /// Free-text education summary
    pub education: String,
    /// Free-text current position
    pub current_work: String,
    /// Image reference (URL or asset key)
    pub image: String,
    /// Identity-verified flag
    pub verified: bool,
}

/// A bookable time window for one provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    /// Slot id
    pub id: SlotId,
    /// Owning provider
    pub provider_id: ProviderId,
    /// Window start (UTC)
    pub start_at: DateTime<Utc>,
    /// Window end (UTC)
    pub end_at: DateTime<Utc>,
    /// Session kind offered in this window
    pub kind: SessionKind,
    /// Availability state
    pub status: SlotStatus,
    /// Claimant, set by a successful claim
    pub booked_by: Option<UserId>,
    /// Claim timestamp, set by a successful claim
    pub booked_at: Option<DateTime<Utc>>,
}

impl Slot {
    /// Create a fresh available slot for a provider.
    #[must_use]
    pub fn available(
        provider_id: ProviderId,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
        kind: SessionKind,
    ) -> Self {
        Self {
            id: SlotId::new(),
            provider_id,
            start_at,
            end_at,
            kind,
            status: SlotStatus::Available,
            booked_by: None,
            booked_at: None,
        }
    }
}

/// A durable booking record, created only after a successful slot claim.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    /// Booking id
    pub id: BookingId,
    /// Requesting user
    pub user_id: UserId,
    /// Provider being booked
    pub provider_id: ProviderId,
    /// The slot this booking was created from (unique per slot)
    pub slot_id: SlotId,
    /// Start copied from the slot at claim time
    pub start_at: DateTime<Utc>,
    /// End copied from the slot at claim time
    pub end_at: DateTime<Utc>,
    /// Session kind recorded on the claim
    pub kind: SessionKind,
    /// Lifecycle state
    pub status: BookingStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Build a booking from a freshly claimed slot.
    ///
    /// Start, end and session kind are copied from the slot so the record
    /// stays meaningful even if the slot is later regenerated.
    #[must_use]
    pub fn from_claimed_slot(slot: &Slot, user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: BookingId::new(),
            user_id,
            provider_id: slot.provider_id,
            slot_id: slot.id,
            start_at: slot.start_at,
            end_at: slot.end_at,
            kind: slot.kind,
            status: BookingStatus::Booked,
            created_at: now,
        }
    }
}

/// A booking enriched with provider display fields for list views.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BookingView {
    /// The underlying booking
    pub booking: Booking,
    /// Provider display name
    pub provider_name: String,
    /// Provider title
    pub provider_title: String,
}
