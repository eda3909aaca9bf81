//! Slot generation: a rolling window of bookable slots per provider.
//!
//! Every provider gets the same fixed daily templates over the next
//! [`WINDOW_DAYS`] days. Generation is idempotent: inserts are keyed on
//! (provider, start time) and never overwrite an existing slot, so a re-run
//! can never clobber an in-progress booking. A count-based coverage check
//! short-circuits the bulk insert when the window is already populated;
//! there is no process-lifetime "already seeded" flag.

use crate::clock::Clock;
use crate::error::StoreError;
use crate::store::SlotStore;
use crate::types::{Provider, SessionKind, Slot};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

/// Days of slots to keep generated ahead of now.
pub const WINDOW_DAYS: i64 = 7;

/// Skip the bulk insert when existing coverage reaches this percentage of
/// the expected slot count. Below 100 so booked/off slots and partially
/// elapsed days do not force a full re-run on every call.
pub const COVERAGE_THRESHOLD_PERCENT: u64 = 90;

/// A fixed daily time template for one slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotTemplate {
    /// Start, as minutes after UTC midnight
    pub start_minute: i64,
    /// Duration in minutes
    pub duration_minutes: i64,
    /// Session kind offered in this window
    pub kind: SessionKind,
}

impl SlotTemplate {
    /// Absolute start timestamp of this template on `date`.
    #[must_use]
    pub fn start_on(&self, date: NaiveDate) -> DateTime<Utc> {
        Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)) + Duration::minutes(self.start_minute)
    }

    /// Absolute end timestamp of this template on `date`.
    #[must_use]
    pub fn end_on(&self, date: NaiveDate) -> DateTime<Utc> {
        self.start_on(date) + Duration::minutes(self.duration_minutes)
    }
}

/// The fixed daily templates: 10:00 +30min video, 14:00 +30min voice,
/// 18:00 +45min chat (UTC).
pub const DAILY_TEMPLATES: [SlotTemplate; 3] = [
    SlotTemplate {
        start_minute: 10 * 60,
        duration_minutes: 30,
        kind: SessionKind::Video,
    },
    SlotTemplate {
        start_minute: 14 * 60,
        duration_minutes: 30,
        kind: SessionKind::Voice,
    },
    SlotTemplate {
        start_minute: 18 * 60,
        duration_minutes: 45,
        kind: SessionKind::Chat,
    },
];

/// Outcome of one generator run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GeneratorReport {
    /// Slots newly inserted
    pub inserted: u64,
    /// Slots skipped because one already existed for (provider, start)
    pub skipped_existing: u64,
    /// Individual insert failures (logged, batch continued)
    pub failed: u64,
    /// The coverage check skipped the bulk insert entirely
    pub short_circuited: bool,
}

/// Number of slots the window should contain for `provider_count` providers.
#[must_use]
pub const fn expected_slot_count(provider_count: u64) -> u64 {
    provider_count * WINDOW_DAYS as u64 * DAILY_TEMPLATES.len() as u64
}

/// UTC midnight of the day containing `now`.
#[must_use]
pub fn window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(&now.date_naive().and_time(NaiveTime::MIN))
}

/// Populate the rolling slot window for every provider.
///
/// Best-effort bulk insert: individual slot failures are logged at warn and
/// do not abort the batch. Repeated runs against a populated window are a
/// cheap no-op thanks to the coverage short-circuit.
///
/// # Errors
///
/// Returns [`StoreError`] only when the coverage count itself fails; insert
/// failures are reported through [`GeneratorReport::failed`].
pub async fn ensure_slot_window(
    slots: &dyn SlotStore,
    providers: &[Provider],
    clock: &dyn Clock,
) -> Result<GeneratorReport, StoreError> {
    let now = clock.now();
    let from = window_start(now);
    let to = from + Duration::days(WINDOW_DAYS);

    let expected = expected_slot_count(providers.len() as u64);
    let existing = slots.count_in_window(from, to).await?;
    if expected > 0 && existing * 100 >= expected * COVERAGE_THRESHOLD_PERCENT {
        tracing::debug!(existing, expected, "slot window covered, skipping generation");
        return Ok(GeneratorReport {
            short_circuited: true,
            ..GeneratorReport::default()
        });
    }

    let mut report = GeneratorReport::default();
    for provider in providers {
        for day_offset in 0..WINDOW_DAYS {
            let date = (from + Duration::days(day_offset)).date_naive();
            for template in &DAILY_TEMPLATES {
                let slot = Slot::available(
                    provider.id,
                    template.start_on(date),
                    template.end_on(date),
                    template.kind,
                );
                match slots.insert_if_absent(slot).await {
                    Ok(true) => report.inserted += 1,
                    Ok(false) => report.skipped_existing += 1,
                    Err(e) => {
                        report.failed += 1;
                        tracing::warn!(
                            provider_id = %provider.id,
                            %date,
                            error = %e,
                            "slot insert failed, continuing batch"
                        );
                    }
                }
            }
        }
    }

    if report.inserted > 0 {
        metrics::counter!("carebook.slots.generated").increment(report.inserted);
    }
    tracing::info!(
        inserted = report.inserted,
        skipped = report.skipped_existing,
        failed = report.failed,
        "slot window generation complete"
    );

    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;

    #[test]
    fn templates_land_on_expected_wall_clock_times() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();

        let video = DAILY_TEMPLATES[0];
        assert_eq!(video.start_on(date).to_rfc3339(), "2025-06-02T10:00:00+00:00");
        assert_eq!(video.end_on(date).to_rfc3339(), "2025-06-02T10:30:00+00:00");

        let chat = DAILY_TEMPLATES[2];
        assert_eq!(chat.start_on(date).to_rfc3339(), "2025-06-02T18:00:00+00:00");
        assert_eq!(chat.end_on(date).to_rfc3339(), "2025-06-02T18:45:00+00:00");
    }

    #[test]
    fn expected_count_is_providers_times_days_times_templates() {
        assert_eq!(expected_slot_count(0), 0);
        assert_eq!(expected_slot_count(1), 21);
        assert_eq!(expected_slot_count(4), 84);
    }

    #[test]
    fn window_start_is_utc_midnight() {
        let now = DateTime::parse_from_rfc3339("2025-06-02T17:45:12Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(window_start(now).to_rfc3339(), "2025-06-02T00:00:00+00:00");
    }
}
