//! Detects that the host was probably asleep between two evaluations.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, FixedOffset};

use crate::clock::elapsed_between;
use crate::config::SuspensionThresholds;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SuspensionBucket {
    None,
    /// Roughly a screen lock.
    Short,
    Medium,
    /// Long enough that the host was almost certainly asleep.
    Long,
}

impl SuspensionBucket {
    pub fn classify(elapsed: Duration, thresholds: &SuspensionThresholds) -> Self {
        if elapsed >= thresholds.long {
            SuspensionBucket::Long
        } else if elapsed >= thresholds.medium {
            SuspensionBucket::Medium
        } else if elapsed >= thresholds.short {
            SuspensionBucket::Short
        } else {
            SuspensionBucket::None
        }
    }
}

impl fmt::Display for SuspensionBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SuspensionBucket::None => "none",
            SuspensionBucket::Short => "short",
            SuspensionBucket::Medium => "medium",
            SuspensionBucket::Long => "long",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Suspension {
    pub elapsed: Duration,
    pub bucket: SuspensionBucket,
}

/// Remembers the last evaluation instant.
#[derive(Debug, Clone)]
pub struct SuspensionTracker {
    last_activity_check: DateTime<FixedOffset>,
    thresholds: SuspensionThresholds,
}

impl SuspensionTracker {
    pub fn new(now: DateTime<FixedOffset>, thresholds: SuspensionThresholds) -> Self {
        Self {
            last_activity_check: now,
            thresholds,
        }
    }

    /// Measure the gap since the previous check and restart the measurement.
    pub fn observe(&mut self, now: DateTime<FixedOffset>) -> Suspension {
        let elapsed = elapsed_between(self.last_activity_check, now);
        self.last_activity_check = now;

        let bucket = SuspensionBucket::classify(elapsed, &self.thresholds);
        if bucket != SuspensionBucket::None {
            tracing::debug!(
                bucket = %bucket,
                inactive_min = elapsed.as_secs() / 60,
                "suspension detected"
            );
        }

        Suspension { elapsed, bucket }
    }

    pub fn last_activity_check(&self) -> DateTime<FixedOffset> {
        self.last_activity_check
    }
}
