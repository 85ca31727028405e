//! Wall-clock source for dates, hours and ages.
//!
//! Timers (debounce, fallback, sweeps) run on tokio's time driver; everything
//! that depends on the calendar goes through a [`Clock`] so it can be driven
//! by hand in tests.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Local};
use parking_lot::Mutex;

/// Current local instant, including the local UTC offset.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// The host's clock in the host's local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// A clock that only moves when told to. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    inner: Arc<Mutex<DateTime<FixedOffset>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<FixedOffset>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(start)),
        }
    }

    pub fn set(&self, at: DateTime<FixedOffset>) {
        *self.inner.lock() = at;
    }

    pub fn advance(&self, by: Duration) {
        let mut g = self.inner.lock();
        // Durations beyond chrono's range are not meaningful for a wall clock.
        if let Ok(delta) = chrono::TimeDelta::from_std(by) {
            *g += delta;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<FixedOffset> {
        *self.inner.lock()
    }
}

/// Non-negative elapsed time between two wall-clock instants.
///
/// A clock that stepped backwards yields zero rather than a negative age.
pub fn elapsed_between(earlier: DateTime<FixedOffset>, later: DateTime<FixedOffset>) -> Duration {
    (later - earlier).to_std().unwrap_or(Duration::ZERO)
}
