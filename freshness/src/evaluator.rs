//! Decides which partitions hold data that should be refetched.
//
//  Pure: no async, no IO, no clock reads.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate, Timelike};

use crate::clock::elapsed_between;
use crate::config::FreshnessRules;
use crate::partition::{FetchStamp, Partition, PartitionCache, PartitionSet};

/// Why a partition was judged stale. Several reasons may apply at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaleReason {
    /// Older than the generic age threshold.
    Age { partition: Partition, age: Duration },
    /// Fetched on an earlier (or later) local date than today.
    CrossDay {
        partition: Partition,
        fetched_on: NaiveDate,
    },
    /// Next-period data fetched before the publication hour, now past it.
    PublicationBoundary { fetched_hour: u32, hour: u32 },
    /// Next-period data older than the tightened threshold of the critical window.
    CriticalWindow { age: Duration, hour: u32 },
}

impl StaleReason {
    pub fn partition(&self) -> Partition {
        match self {
            StaleReason::Age { partition, .. } | StaleReason::CrossDay { partition, .. } => {
                *partition
            }
            StaleReason::PublicationBoundary { .. } | StaleReason::CriticalWindow { .. } => {
                Partition::Next
            }
        }
    }
}

impl fmt::Display for StaleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaleReason::Age { partition, age } => {
                write!(f, "{partition} data is {} min old", age.as_secs() / 60)
            }
            StaleReason::CrossDay {
                partition,
                fetched_on,
            } => write!(f, "{partition} data was fetched on {fetched_on}"),
            StaleReason::PublicationBoundary { fetched_hour, hour } => write!(
                f,
                "next data fetched at {fetched_hour}:00, before publication; now {hour}:00"
            ),
            StaleReason::CriticalWindow { age, hour } => write!(
                f,
                "next data is {} min old during critical hour {hour}:00",
                age.as_secs() / 60
            ),
        }
    }
}

/// Result of one evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Staleness {
    pub current_stale: bool,
    pub next_stale: bool,
    pub reasons: Vec<StaleReason>,
}

impl Staleness {
    pub fn any(&self) -> bool {
        self.current_stale || self.next_stale
    }

    pub fn stale_set(&self) -> PartitionSet {
        PartitionSet::from_flags(self.current_stale, self.next_stale)
    }

    fn flag(&mut self, reason: StaleReason) {
        match reason.partition() {
            Partition::Current => self.current_stale = true,
            Partition::Next => self.next_stale = true,
        }
        self.reasons.push(reason);
    }
}

/// Evaluate both partitions at `now`.
///
/// A partition that was never fetched is never stale: fetching it for the
/// first time is the caller's business, not a staleness repair.
pub fn evaluate(
    now: DateTime<FixedOffset>,
    partitions: &PartitionCache,
    rules: &FreshnessRules,
) -> Staleness {
    let mut out = Staleness::default();

    for partition in Partition::ALL {
        if let Some(stamp) = partitions.get(partition) {
            for reason in partition_reasons(partition, stamp, now, rules) {
                out.flag(reason);
            }
        }
    }

    out
}

fn partition_reasons(
    partition: Partition,
    stamp: &FetchStamp,
    now: DateTime<FixedOffset>,
    rules: &FreshnessRules,
) -> Vec<StaleReason> {
    let mut reasons = Vec::new();
    let age = elapsed_between(stamp.fetched_at, now);
    let today = now.date_naive();
    let hour = now.hour();

    if age > rules.max_age {
        reasons.push(StaleReason::Age { partition, age });
    }

    // Also covered by the rollover detector; repeated here so a partially
    // applied rollover can never leave yesterday's data looking fresh.
    if stamp.fetched_on != today {
        reasons.push(StaleReason::CrossDay {
            partition,
            fetched_on: stamp.fetched_on,
        });
    }

    if partition == Partition::Next {
        if stamp.fetched_hour < rules.publication_hour && hour >= rules.publication_hour {
            reasons.push(StaleReason::PublicationBoundary {
                fetched_hour: stamp.fetched_hour,
                hour,
            });
        }

        if rules.critical_window.contains(hour) && age > rules.critical_max_age {
            reasons.push(StaleReason::CriticalWindow { age, hour });
        }
    }

    reasons
}
