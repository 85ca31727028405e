use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Minimal counters for operational visibility. Clones share the counts.
#[derive(Clone, Default, Debug)]
pub struct Counters {
    pub evaluations: Arc<AtomicU64>,
    pub sweeps: Arc<AtomicU64>,
    pub date_rollovers: Arc<AtomicU64>,
    pub presentation_ticks: Arc<AtomicU64>,

    pub refresh_started: Arc<AtomicU64>,
    pub refresh_skipped_in_flight: Arc<AtomicU64>,
    pub refresh_skipped_empty: Arc<AtomicU64>,
    pub fallback_timeouts: Arc<AtomicU64>,

    pub refetch_ok: Arc<AtomicU64>,
    pub refetch_failed: Arc<AtomicU64>,

    // signal-side
    pub push_ignored: Arc<AtomicU64>,
    pub sweeps_hidden: Arc<AtomicU64>,
}

impl Counters {
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn read(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }
}
