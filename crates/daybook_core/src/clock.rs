//! Time source abstraction for store defaults and save-time stamps.
//!
//! # Responsibility
//! - Provide the single "now" read used by slice defaults, the task
//!   due-date restore rule and record `created_at` stamps.
//! - Provide the device's UTC offset, so wall-clock defaults (today's date,
//!   the alarm's time of day) match what the user sees.
//!
//! # Invariants
//! - Core code never calls `Utc::now()` or `Local::now()` directly outside
//!   `SystemClock`.
//! - Stored instants stay UTC; only calendar day and time of day are local.

use chrono::{DateTime, FixedOffset, Local, Offset, Utc};
use std::fmt::Debug;

/// Source of the current instant.
pub trait Clock: Debug + Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Offset of the device's local time zone.
    fn offset(&self) -> FixedOffset {
        Utc.fix()
    }

    /// Current instant seen from the device's time zone.
    fn now_local(&self) -> DateTime<FixedOffset> {
        self.now().with_timezone(&self.offset())
    }
}

/// Wall clock backed by the system time and time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn offset(&self) -> FixedOffset {
        Local::now().offset().fix()
    }
}

/// Clock frozen at one instant and offset. Used by tests and scripted
/// sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    instant: DateTime<Utc>,
    offset: FixedOffset,
}

impl FixedClock {
    /// Frozen at `instant`, with the device zone at UTC.
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self::with_offset(instant, Utc.fix())
    }

    pub fn with_offset(instant: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self { instant, offset }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }

    fn offset(&self) -> FixedOffset {
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, FixedClock, SystemClock};
    use chrono::{FixedOffset, NaiveDate, TimeZone, Timelike, Utc};

    #[test]
    fn fixed_clock_returns_same_instant() {
        let instant = Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap();
        let clock = FixedClock::new(instant);
        assert_eq!(clock.now(), instant);
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now_local().hour(), 9);
    }

    #[test]
    fn fixed_clock_local_view_uses_offset() {
        let instant = Utc.with_ymd_and_hms(2026, 3, 14, 22, 15, 0).unwrap();
        let clock = FixedClock::with_offset(instant, FixedOffset::east_opt(3 * 3600).unwrap());

        let local = clock.now_local();
        assert_eq!(local.hour(), 1);
        assert_eq!(
            local.date_naive(),
            NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
        );
        assert_eq!(local, instant);
    }

    #[test]
    fn system_clock_moves_forward() {
        let first = SystemClock.now();
        let second = SystemClock.now();
        assert!(second >= first);
    }
}
