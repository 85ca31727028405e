//! Turns evaluator output into a refresh decision.
//!
//! The date-rollover check runs before any of this (see the engine); these
//! functions only see days on which the partitions are still meaningful.

use std::fmt;

use crate::config::EngineConfig;
use crate::evaluator::Staleness;
use crate::partition::{Partition, PartitionCache, PartitionSet};
use crate::signal::SweepKind;
use crate::suspension::SuspensionBucket;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshReason {
    /// First fetch after the engine started.
    Initial,
    DateRollover,
    Stale,
    /// Medium suspension that ended inside key hours.
    SuspendedDuringKeyHours,
    /// Next period still missing while it should be getting published.
    NextMissingInPublicationWindow,
    /// The server announced new data.
    ServerAsserted,
    CacheRotated,
    Manual,
}

impl fmt::Display for RefreshReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RefreshReason::Initial => "initial",
            RefreshReason::DateRollover => "date-rollover",
            RefreshReason::Stale => "stale",
            RefreshReason::SuspendedDuringKeyHours => "suspended-during-key-hours",
            RefreshReason::NextMissingInPublicationWindow => "next-missing",
            RefreshReason::ServerAsserted => "server-asserted",
            RefreshReason::CacheRotated => "cache-rotated",
            RefreshReason::Manual => "manual",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Refresh {
        partitions: PartitionSet,
        reason: RefreshReason,
    },
    /// No refetch; redraw time-dependent decorations only.
    Present,
    /// Nothing to do.
    Idle,
}

/// Decision after a (debounced) resume.
///
/// Explicit staleness wins. Otherwise the suspension bucket decides: only a
/// medium suspension ending inside key hours justifies a round trip. A long
/// suspension with fresh data does not; the evaluator already proved the
/// data is current.
pub fn decide_on_resume(
    staleness: &Staleness,
    suspension: SuspensionBucket,
    hour: u32,
    cfg: &EngineConfig,
) -> Decision {
    if staleness.any() {
        return Decision::Refresh {
            partitions: staleness.stale_set(),
            reason: RefreshReason::Stale,
        };
    }

    match suspension {
        SuspensionBucket::Medium if cfg.is_key_hour(hour) => Decision::Refresh {
            partitions: PartitionSet::both(),
            reason: RefreshReason::SuspendedDuringKeyHours,
        },
        _ => Decision::Present,
    }
}

/// Decision for a periodic sweep.
pub fn decide_on_sweep(
    kind: SweepKind,
    staleness: &Staleness,
    partitions: &PartitionCache,
    hour: u32,
    cfg: &EngineConfig,
) -> Decision {
    let mut set = staleness.stale_set();
    let mut reason = RefreshReason::Stale;

    if kind == SweepKind::CriticalHour {
        if !cfg.is_key_hour(hour) {
            return Decision::Idle;
        }

        if cfg.prime_publication_window.contains(hour) && partitions.get(Partition::Next).is_none()
        {
            if set.is_empty() {
                reason = RefreshReason::NextMissingInPublicationWindow;
            }
            set.insert(Partition::Next);
        }
    }

    if set.is_empty() {
        Decision::Idle
    } else {
        Decision::Refresh {
            partitions: set,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::StaleReason;
    use crate::partition::FetchStamp;
    use chrono::{FixedOffset, TimeZone};
    use std::time::Duration;

    fn cfg() -> EngineConfig {
        EngineConfig::default()
    }

    fn stale_current() -> Staleness {
        Staleness {
            current_stale: true,
            next_stale: false,
            reasons: vec![StaleReason::Age {
                partition: Partition::Current,
                age: Duration::from_secs(45 * 60),
            }],
        }
    }

    fn fetched_both() -> PartitionCache {
        let at = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2025, 5, 5, 12, 0, 0)
            .unwrap();
        let mut cache = PartitionCache::new();
        cache.record(Partition::Current, FetchStamp::at(at));
        cache.record(Partition::Next, FetchStamp::at(at));
        cache
    }

    #[test]
    fn resume_refreshes_exactly_the_stale_partitions() {
        let out = decide_on_resume(&stale_current(), SuspensionBucket::Long, 3, &cfg());
        assert_eq!(
            out,
            Decision::Refresh {
                partitions: PartitionSet::only(Partition::Current),
                reason: RefreshReason::Stale
            }
        );
    }

    #[test]
    fn long_suspension_with_fresh_data_only_presents() {
        for hour in [3, 8, 15, 22] {
            let out = decide_on_resume(&Staleness::default(), SuspensionBucket::Long, hour, &cfg());
            assert_eq!(out, Decision::Present);
        }
    }

    #[test]
    fn medium_suspension_refreshes_only_in_key_hours() {
        let fresh = Staleness::default();

        let inside = decide_on_resume(&fresh, SuspensionBucket::Medium, 16, &cfg());
        assert_eq!(
            inside,
            Decision::Refresh {
                partitions: PartitionSet::both(),
                reason: RefreshReason::SuspendedDuringKeyHours
            }
        );

        let morning = decide_on_resume(&fresh, SuspensionBucket::Medium, 6, &cfg());
        assert!(matches!(morning, Decision::Refresh { .. }));

        let outside = decide_on_resume(&fresh, SuspensionBucket::Medium, 12, &cfg());
        assert_eq!(outside, Decision::Present);
    }

    #[test]
    fn short_or_no_suspension_never_refreshes() {
        let fresh = Staleness::default();
        for bucket in [SuspensionBucket::None, SuspensionBucket::Short] {
            for hour in 0..24 {
                assert_eq!(decide_on_resume(&fresh, bucket, hour, &cfg()), Decision::Present);
            }
        }
    }

    #[test]
    fn general_sweep_refreshes_stale_or_idles() {
        let parts = fetched_both();
        assert_eq!(
            decide_on_sweep(SweepKind::General, &Staleness::default(), &parts, 15, &cfg()),
            Decision::Idle
        );
        assert!(matches!(
            decide_on_sweep(SweepKind::General, &stale_current(), &parts, 23, &cfg()),
            Decision::Refresh { .. }
        ));
    }

    #[test]
    fn critical_sweep_is_idle_outside_key_hours() {
        let out = decide_on_sweep(
            SweepKind::CriticalHour,
            &stale_current(),
            &PartitionCache::new(),
            12,
            &cfg(),
        );
        assert_eq!(out, Decision::Idle);
    }

    #[test]
    fn critical_sweep_fetches_missing_next_during_publication() {
        let mut parts = fetched_both();
        parts.clear();

        let out = decide_on_sweep(
            SweepKind::CriticalHour,
            &Staleness::default(),
            &parts,
            15,
            &cfg(),
        );
        assert_eq!(
            out,
            Decision::Refresh {
                partitions: PartitionSet::only(Partition::Next),
                reason: RefreshReason::NextMissingInPublicationWindow
            }
        );

        // 17:00 is a key hour but past the prime publication window.
        let late = decide_on_sweep(
            SweepKind::CriticalHour,
            &Staleness::default(),
            &parts,
            17,
            &cfg(),
        );
        assert_eq!(late, Decision::Idle);
    }

    #[test]
    fn critical_sweep_merges_stale_with_missing_next() {
        let out = decide_on_sweep(
            SweepKind::CriticalHour,
            &stale_current(),
            &PartitionCache::new(),
            14,
            &cfg(),
        );
        assert_eq!(
            out,
            Decision::Refresh {
                partitions: PartitionSet::both(),
                reason: RefreshReason::Stale
            }
        );
    }
}
