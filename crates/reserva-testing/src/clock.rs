//! Deterministic clock for scheduler tests.

use std::sync::Mutex;

use chrono::{DateTime, Duration, TimeZone, Utc};

use reserva_domain::clock::Clock;

/// Clock that only moves when the test moves it.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Clock anchored at a fixed, readable instant (2025-06-01 12:00 UTC).
    pub fn fixed() -> Self {
        Self::new(Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap())
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }

    /// Jump to `target`.
    ///
    /// # Panics
    ///
    /// Panics if `target` is before the current time.
    pub fn advance_to(&self, target: DateTime<Utc>) {
        let mut now = self.now.lock().unwrap();
        assert!(
            target >= *now,
            "cannot move clock backwards: now={now}, target={target}"
        );
        *now = target;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::fixed()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}
