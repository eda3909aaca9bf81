//! Availability listing: a provider's open slots grouped by calendar date.

use crate::clock::Clock;
use crate::error::BookingError;
use crate::store::SlotStore;
use crate::types::{ProviderId, Slot};
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

/// Default availability window in days.
pub const DEFAULT_WINDOW_DAYS: u32 = 7;

/// Largest availability window a caller may request.
pub const MAX_WINDOW_DAYS: u32 = 14;

/// One calendar date with its open slots, ascending by start time.
#[derive(Clone, Debug, PartialEq)]
pub struct DayAvailability {
    /// Calendar date (UTC)
    pub date: NaiveDate,
    /// Open slots starting on that date
    pub slots: Vec<Slot>,
}

/// List a provider's `Available` slots over the next `days` days, grouped by
/// date.
///
/// `days` is clamped to `1..=MAX_WINDOW_DAYS`. Slots whose start time has
/// already passed are never returned; the window opens at `now`, not at
/// midnight.
///
/// # Errors
///
/// Returns [`BookingError::Storage`] if the slot query fails.
pub async fn available_by_day(
    slots: &dyn SlotStore,
    clock: &dyn Clock,
    provider_id: ProviderId,
    days: Option<u32>,
) -> Result<Vec<DayAvailability>, BookingError> {
    let days = days.unwrap_or(DEFAULT_WINDOW_DAYS).clamp(1, MAX_WINDOW_DAYS);
    let from = clock.now();
    let to = from + Duration::days(i64::from(days));

    let open = slots.available_for_provider(provider_id, from, to).await?;
    Ok(group_by_day(open))
}

/// Group slots by their start date, dates ascending, keeping the incoming
/// (start-ascending) order within each group.
#[must_use]
pub fn group_by_day(slots: Vec<Slot>) -> Vec<DayAvailability> {
    let mut by_day: BTreeMap<NaiveDate, Vec<Slot>> = BTreeMap::new();
    for slot in slots {
        by_day.entry(slot.start_at.date_naive()).or_default().push(slot);
    }
    by_day
        .into_iter()
        .map(|(date, slots)| DayAvailability { date, slots })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use crate::types::{ProviderId, SessionKind, Slot};
    use chrono::{DateTime, Utc};

    fn slot_at(provider: ProviderId, rfc3339: &str) -> Slot {
        let start = DateTime::parse_from_rfc3339(rfc3339)
            .unwrap()
            .with_timezone(&Utc);
        Slot::available(provider, start, start + Duration::minutes(30), SessionKind::Video)
    }

    #[test]
    fn grouping_splits_on_calendar_date() {
        let provider = ProviderId::new();
        let grouped = group_by_day(vec![
            slot_at(provider, "2025-06-02T10:00:00Z"),
            slot_at(provider, "2025-06-02T14:00:00Z"),
            slot_at(provider, "2025-06-03T10:00:00Z"),
        ]);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].date, NaiveDate::from_ymd_opt(2025, 6, 2).unwrap());
        assert_eq!(grouped[0].slots.len(), 2);
        assert_eq!(grouped[1].date, NaiveDate::from_ymd_opt(2025, 6, 3).unwrap());
        assert_eq!(grouped[1].slots.len(), 1);
    }

    #[test]
    fn grouping_preserves_start_order_within_a_day() {
        let provider = ProviderId::new();
        let grouped = group_by_day(vec![
            slot_at(provider, "2025-06-02T10:00:00Z"),
            slot_at(provider, "2025-06-02T14:00:00Z"),
            slot_at(provider, "2025-06-02T18:00:00Z"),
        ]);

        let starts: Vec<_> = grouped[0].slots.iter().map(|s| s.start_at).collect();
        let mut sorted = starts.clone();
        sorted.sort();
        assert_eq!(starts, sorted);
    }

    #[test]
    fn empty_input_groups_to_nothing() {
        assert!(group_by_day(vec![]).is_empty());
    }
}
