//! Single-flight execution of partition refetches.
//!
//! The coordinator is the only writer of partition metadata. It never queues:
//! a request that arrives while another refresh is in flight is dropped, and
//! the next signal after completion re-evaluates from scratch.
//!
//! Each dispatched refetch runs in its own task and reports back through the
//! completion channel returned by [`RefreshCoordinator::new`]; the owner of
//! the coordinator (the engine loop) feeds those reports into
//! [`RefreshCoordinator::on_completion`]. If reports never arrive, the
//! in-flight flag is released by [`RefreshCoordinator::expire_if_due`] once
//! the fallback deadline passes.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::{child_span, warn_if_slow};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{Instrument, debug, info, instrument, warn};

use crate::clock::Clock;
use crate::error::RefetchError;
use crate::metrics::Counters;
use crate::partition::{FetchStamp, Partition, PartitionCache, PartitionSet};
use crate::policy::RefreshReason;
use crate::presenter::Presenter;

/// The external operation that re-retrieves one partition's data.
#[async_trait]
pub trait Refetcher: Send + Sync {
    async fn refetch(&self, partition: Partition) -> Result<(), RefetchError>;
}

/// Completion report of one dispatched refetch.
#[derive(Debug)]
pub struct RefetchCompletion {
    pub generation: u64,
    pub partition: Partition,
    pub result: Result<(), RefetchError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Started { generation: u64 },
    /// Another refresh is running; nothing was dispatched.
    InFlight,
    /// The requested set was empty.
    NothingRequested,
}

#[derive(Debug, Clone)]
struct InFlight {
    generation: u64,
    pending: PartitionSet,
    deadline: Instant,
}

/// Process-wide refresh flag. Created once, reset after every refresh.
#[derive(Debug, Default)]
pub struct RefreshState {
    in_flight: Option<InFlight>,
    last_generation: u64,
    /// Generations up to this one were dispatched before the last reset.
    reset_epoch: u64,
}

impl RefreshState {
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    fn begin(&mut self, partitions: PartitionSet, deadline: Instant) -> u64 {
        self.last_generation += 1;
        self.in_flight = Some(InFlight {
            generation: self.last_generation,
            pending: partitions,
            deadline,
        });
        self.last_generation
    }

    /// Mark one partition of `generation` as done. Returns `true` when this
    /// completed the whole in-flight set.
    fn complete(&mut self, generation: u64, partition: Partition) -> bool {
        let Some(flight) = self.in_flight.as_mut() else {
            return false;
        };
        if flight.generation != generation {
            return false;
        }

        flight.pending.remove(partition);
        if flight.pending.is_empty() {
            self.in_flight = None;
            return true;
        }
        false
    }
}

pub struct RefreshCoordinator {
    cache: PartitionCache,
    state: RefreshState,
    refetcher: Arc<dyn Refetcher>,
    presenter: Arc<dyn Presenter>,
    clock: Arc<dyn Clock>,
    completions: mpsc::Sender<RefetchCompletion>,
    fallback_timeout: Duration,
    counters: Counters,
}

impl RefreshCoordinator {
    pub fn new(
        refetcher: Arc<dyn Refetcher>,
        presenter: Arc<dyn Presenter>,
        clock: Arc<dyn Clock>,
        fallback_timeout: Duration,
        counters: Counters,
    ) -> (Self, mpsc::Receiver<RefetchCompletion>) {
        let (tx, rx) = mpsc::channel(16);
        let coordinator = Self {
            cache: PartitionCache::new(),
            state: RefreshState::default(),
            refetcher,
            presenter,
            clock,
            completions: tx,
            fallback_timeout,
            counters,
        };
        (coordinator, rx)
    }

    pub fn partitions(&self) -> &PartitionCache {
        &self.cache
    }

    pub fn is_in_flight(&self) -> bool {
        self.state.is_in_flight()
    }

    pub fn fallback_deadline(&self) -> Option<Instant> {
        self.state.in_flight.as_ref().map(|f| f.deadline)
    }

    /// Forget both partitions, as if they had never been fetched.
    ///
    /// Refetches dispatched before the reset no longer stamp anything when
    /// they report back.
    pub fn reset_partitions(&mut self) {
        self.cache.clear();
        self.state.reset_epoch = self.state.last_generation;
    }

    /// Dispatch a refetch of `partitions` unless a refresh is already running.
    #[instrument(skip_all, fields(partitions = %partitions, reason = %reason))]
    pub fn request_refresh(
        &mut self,
        partitions: PartitionSet,
        reason: RefreshReason,
    ) -> RefreshOutcome {
        if self.state.is_in_flight() {
            Counters::bump(&self.counters.refresh_skipped_in_flight);
            debug!("refresh already in flight; request dropped");
            return RefreshOutcome::InFlight;
        }

        if partitions.is_empty() {
            Counters::bump(&self.counters.refresh_skipped_empty);
            debug!("nothing to refresh");
            return RefreshOutcome::NothingRequested;
        }

        let deadline = Instant::now() + self.fallback_timeout;
        let generation = self.state.begin(partitions, deadline);
        Counters::bump(&self.counters.refresh_started);
        self.presenter.refresh_started(partitions, reason);

        info!(generation, "refresh started");

        for partition in partitions.iter() {
            self.spawn_refetch(generation, partition);
        }

        RefreshOutcome::Started { generation }
    }

    fn spawn_refetch(&self, generation: u64, partition: Partition) {
        let refetcher = Arc::clone(&self.refetcher);
        let tx = self.completions.clone();
        let budget = self.fallback_timeout;

        let span = child_span("refetch");
        span.record("partition", tracing::field::display(partition));

        tokio::spawn(
            async move {
                let result =
                    warn_if_slow("refetch", budget, refetcher.refetch(partition)).await;

                let done = RefetchCompletion {
                    generation,
                    partition,
                    result,
                };
                if tx.send(done).await.is_err() {
                    debug!("engine gone; refetch completion dropped");
                }
            }
            .instrument(span),
        );
    }

    /// Apply one completion report.
    ///
    /// Successful refetches stamp the partition even when they arrive after
    /// the fallback deadline released the in-flight flag. Reports from before
    /// the last [`reset_partitions`](Self::reset_partitions) are discarded:
    /// their data belongs to the previous day.
    pub fn on_completion(&mut self, done: RefetchCompletion) {
        let RefetchCompletion {
            generation,
            partition,
            result,
        } = done;

        match result {
            Ok(()) if generation <= self.state.reset_epoch => {
                debug!(
                    %partition,
                    generation,
                    reset_epoch = self.state.reset_epoch,
                    "refetch predates the partition reset; not stamped"
                );
            }
            Ok(()) => {
                self.cache.record(partition, FetchStamp::at(self.clock.now()));
                Counters::bump(&self.counters.refetch_ok);
                debug!(%partition, generation, "partition refetched");
            }
            Err(e) => {
                Counters::bump(&self.counters.refetch_failed);
                warn!(%partition, generation, error = %e, "partition refetch failed");
            }
        }

        if self.state.complete(generation, partition) {
            info!(generation, "refresh completed");
        }
    }

    /// Release the in-flight flag if its fallback deadline has passed.
    pub fn expire_if_due(&mut self, now: Instant) -> bool {
        let due = matches!(&self.state.in_flight, Some(f) if now >= f.deadline);
        if !due {
            return false;
        }

        if let Some(flight) = self.state.in_flight.take() {
            Counters::bump(&self.counters.fallback_timeouts);
            warn!(
                generation = flight.generation,
                pending = %flight.pending,
                "refresh completion not observed; releasing in-flight flag"
            );
        }
        true
    }
}
