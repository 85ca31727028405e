#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, TimeZone};
use parking_lot::Mutex;

use freshness::{
    Partition, PartitionSet, Presenter, RefetchError, Refetcher, RefreshReason,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Succeed,
    Fail,
    /// Never completes.
    Hang,
    /// Succeeds after a delay on the tokio clock.
    Delay(Duration),
}

/// Records every refetch and answers according to `behavior`.
pub struct MockRefetcher {
    pub calls: Mutex<Vec<Partition>>,
    pub behavior: Mutex<Behavior>,
}

impl MockRefetcher {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            behavior: Mutex::new(behavior),
        })
    }

    pub fn set(&self, behavior: Behavior) {
        *self.behavior.lock() = behavior;
    }

    pub fn calls(&self) -> Vec<Partition> {
        self.calls.lock().clone()
    }

    pub fn count(&self, partition: Partition) -> usize {
        self.calls.lock().iter().filter(|p| **p == partition).count()
    }
}

#[async_trait]
impl Refetcher for MockRefetcher {
    async fn refetch(&self, partition: Partition) -> Result<(), RefetchError> {
        self.calls.lock().push(partition);
        let behavior = *self.behavior.lock();

        match behavior {
            Behavior::Succeed => Ok(()),
            Behavior::Fail => Err(RefetchError::Failed {
                partition,
                message: "upstream returned 503".into(),
            }),
            Behavior::Hang => std::future::pending().await,
            Behavior::Delay(d) => {
                tokio::time::sleep(d).await;
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Seen {
    RefreshStarted(PartitionSet, RefreshReason),
    Tick,
    Hidden,
    VersionChanged(String),
    Announced(Partition),
}

#[derive(Default)]
pub struct RecordingPresenter {
    pub seen: Mutex<Vec<Seen>>,
}

impl RecordingPresenter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().clone()
    }

    pub fn refreshes(&self) -> Vec<(PartitionSet, RefreshReason)> {
        self.seen
            .lock()
            .iter()
            .filter_map(|s| match s {
                Seen::RefreshStarted(p, r) => Some((*p, *r)),
                _ => None,
            })
            .collect()
    }

    pub fn ticks(&self) -> usize {
        self.seen.lock().iter().filter(|s| **s == Seen::Tick).count()
    }
}

impl Presenter for RecordingPresenter {
    fn refresh_started(&self, partitions: PartitionSet, reason: RefreshReason) {
        self.seen.lock().push(Seen::RefreshStarted(partitions, reason));
    }

    fn presentation_tick(&self) {
        self.seen.lock().push(Seen::Tick);
    }

    fn page_hidden(&self) {
        self.seen.lock().push(Seen::Hidden);
    }

    fn version_changed(&self, version: &str) {
        self.seen.lock().push(Seen::VersionChanged(version.to_string()));
    }

    fn partition_announced(&self, partition: Partition, _reason: Option<&str>) {
        self.seen.lock().push(Seen::Announced(partition));
    }
}

/// Local wall-clock time on `day` of March 2025 at +02:00.
pub fn local(day: u32, h: u32, m: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(2 * 3600)
        .unwrap()
        .with_ymd_and_hms(2025, 3, day, h, m, 0)
        .unwrap()
}

/// Let spawned tasks (engine, refetches) run without moving the clock.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}
