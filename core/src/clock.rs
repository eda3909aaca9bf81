//! Clock abstraction for testable time.
//!
//! Every operation that reads "now" (slot generation, claim timestamps,
//! availability windows) takes the time from a [`Clock`] so tests can pin it.
//! The deterministic `FixedClock` counterpart lives in `carebook-testing`.

use chrono::{DateTime, Utc};

/// Clock trait - abstracts time operations for testability
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
