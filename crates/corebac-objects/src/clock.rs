//! Injected time source.
//!
//! The Load Control machine compares wall-clock moments against its shed
//! window; it never reads time itself, so tests can drive it with a
//! [`ManualClock`].

use corebac_core::types::{Date, DateTime, Time};
use std::cell::Cell;
use std::time::{SystemTime, UNIX_EPOCH};

pub trait Clock {
    fn now(&self) -> DateTime;
}

/// Days from 1900-01-01 to the Unix epoch.
const EPOCH_DAY_NUMBER: u32 = 25_567;

/// Civil time derived from the system clock (UTC; zone handling is the
/// deployment's affair).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let date = Date::from_day_number((secs / 86_400) as u32 + EPOCH_DAY_NUMBER);
        let of_day = secs % 86_400;
        DateTime::new(
            date,
            Time::new(
                (of_day / 3_600) as u8,
                ((of_day % 3_600) / 60) as u8,
                (of_day % 60) as u8,
                0,
            ),
        )
    }
}

/// A settable clock for tests and simulations.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<DateTime>,
}

impl ManualClock {
    pub fn new(now: DateTime) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    pub fn set(&self, now: DateTime) {
        self.now.set(now);
    }

    pub fn advance_minutes(&self, minutes: u32) {
        self.now.set(self.now.get().add_minutes(minutes));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, ManualClock, SystemClock};
    use corebac_core::types::{Date, DateTime, Time};

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::new(DateTime::new(
            Date::from_ymd(2024, 6, 1),
            Time::new(11, 59, 0, 0),
        ));
        clock.advance_minutes(2);
        assert_eq!(clock.now().time, Time::new(12, 1, 0, 0));
    }

    #[test]
    fn system_clock_reports_a_plausible_year() {
        let now = SystemClock.now();
        assert!(now.date.year() >= 2024);
        assert!(!now.is_wildcard());
    }
}
