//! The engine task.
//!
//! One task owns all mutable state and consumes, in a single `select!` loop:
//!   1. commands from [`EngineHandle`]s (signals, snapshot requests),
//!   2. refetch completion reports,
//!   3. the debounce deadline,
//!   4. the coordinator's fallback deadline,
//!   5. the two sweep timers.
//!
//! Per debounced evaluation the order is fixed: date rollover, then the
//! freshness evaluator, then the suspension fallback. The first check that
//! resolves the decision ends the pass.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate, Timelike};
use common::{TraceId, root_span};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};
use tracing::{Span, debug, field, info};

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::coordinator::{RefetchCompletion, Refetcher, RefreshCoordinator};
use crate::debounce::Debouncer;
use crate::error::EngineError;
use crate::evaluator::evaluate;
use crate::metrics::Counters;
use crate::partition::{FetchStamp, Partition, PartitionSet};
use crate::policy::{Decision, RefreshReason, decide_on_resume, decide_on_sweep};
use crate::presenter::Presenter;
use crate::push::PushMessage;
use crate::rollover::DateRolloverDetector;
use crate::signal::{ResumeSource, Signal, SignalSource, SweepKind, Visibility};
use crate::suspension::SuspensionTracker;

const COMMAND_QUEUE: usize = 64;

/// Point-in-time view of the engine state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSnapshot {
    pub current: Option<FetchStamp>,
    pub next: Option<FetchStamp>,
    pub in_flight: bool,
    pub debounce_pending: bool,
    pub visibility: Visibility,
    pub last_known_date: NaiveDate,
    pub baseline_version: String,
}

impl EngineSnapshot {
    pub fn stamp(&self, partition: Partition) -> Option<&FetchStamp> {
        match partition {
            Partition::Current => self.current.as_ref(),
            Partition::Next => self.next.as_ref(),
        }
    }
}

enum Command {
    Signal(Signal),
    Snapshot(oneshot::Sender<EngineSnapshot>),
}

/// Cloneable sender side of the engine. The engine stops once every handle
/// has been dropped.
#[derive(Clone, Debug)]
pub struct EngineHandle {
    tx: mpsc::Sender<Command>,
    counters: Counters,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Signal(s) => f.debug_tuple("Signal").field(s).finish(),
            Command::Snapshot(_) => f.write_str("Snapshot"),
        }
    }
}

impl EngineHandle {
    /// The running engine's counters. Transports bump the signal-side ones.
    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    pub async fn signal(&self, signal: Signal) -> Result<(), EngineError> {
        self.tx
            .send(Command::Signal(signal))
            .await
            .map_err(|_| EngineError::Closed)
    }

    pub async fn resume(&self, source: ResumeSource) -> Result<(), EngineError> {
        self.signal(Signal::Resume(source)).await
    }

    pub async fn visibility_changed(&self, visibility: Visibility) -> Result<(), EngineError> {
        self.signal(Signal::VisibilityChanged(visibility)).await
    }

    /// Refresh both partitions now, bypassing the freshness evaluator.
    pub async fn manual_refresh(&self) -> Result<(), EngineError> {
        self.signal(Signal::ManualRefresh).await
    }

    pub async fn push(&self, message: PushMessage) -> Result<(), EngineError> {
        self.signal(Signal::Push(message)).await
    }

    pub async fn version_reported(&self, version: impl Into<String>) -> Result<(), EngineError> {
        self.signal(Signal::VersionReported {
            version: version.into(),
        })
        .await
    }

    pub async fn snapshot(&self) -> Result<EngineSnapshot, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Snapshot(reply))
            .await
            .map_err(|_| EngineError::Closed)?;
        rx.await.map_err(|_| EngineError::SnapshotDropped)
    }
}

enum RolloverCheck {
    /// Same day.
    None,
    /// New day; partitions cleared and a full refresh requested.
    Refreshed,
    /// New day, but a refresh is in flight; left pending for the next pass.
    Deferred,
}

pub struct Engine {
    cfg: EngineConfig,
    clock: Arc<dyn Clock>,
    presenter: Arc<dyn Presenter>,
    counters: Counters,

    coordinator: RefreshCoordinator,
    completions: mpsc::Receiver<RefetchCompletion>,
    commands: mpsc::Receiver<Command>,

    rollover: DateRolloverDetector,
    suspension: SuspensionTracker,
    debounce: Debouncer,
    debounce_trigger: SignalSource,

    visibility: Visibility,
    version_notified: bool,
    last_polled_version: Option<String>,
}

impl Engine {
    pub fn new(
        cfg: EngineConfig,
        refetcher: Arc<dyn Refetcher>,
        presenter: Arc<dyn Presenter>,
        clock: Arc<dyn Clock>,
    ) -> (Self, EngineHandle) {
        let counters = Counters::default();
        let (coordinator, completions) = RefreshCoordinator::new(
            refetcher,
            Arc::clone(&presenter),
            Arc::clone(&clock),
            cfg.fallback_timeout,
            counters.clone(),
        );
        let (tx, commands) = mpsc::channel(COMMAND_QUEUE);

        let now = clock.now();
        let engine = Self {
            rollover: DateRolloverDetector::new(now.date_naive()),
            suspension: SuspensionTracker::new(now, cfg.suspension.clone()),
            debounce: Debouncer::new(cfg.debounce),
            debounce_trigger: SignalSource::Resume,
            visibility: Visibility::Visible,
            version_notified: false,
            last_polled_version: None,
            cfg,
            clock,
            presenter,
            counters,
            coordinator,
            completions,
            commands,
        };

        let handle = EngineHandle {
            tx,
            counters: engine.counters.clone(),
        };
        (engine, handle)
    }

    pub fn counters(&self) -> Counters {
        self.counters.clone()
    }

    /// Run until every [`EngineHandle`] is dropped.
    pub async fn run(mut self) {
        let mut general = sweep_timer(self.cfg.general_sweep_every);
        let mut critical = sweep_timer(self.cfg.critical_sweep_every);

        info!(
            debounce_ms = self.cfg.debounce.as_millis() as u64,
            fallback_ms = self.cfg.fallback_timeout.as_millis() as u64,
            baseline_version = %self.cfg.baseline_version,
            "freshness engine started"
        );

        if self.cfg.initial_fetch {
            self.coordinator
                .request_refresh(PartitionSet::both(), RefreshReason::Initial);
        }

        loop {
            tokio::select! {
                cmd = self.commands.recv() => match cmd {
                    Some(Command::Signal(signal)) => self.handle_signal(signal),
                    Some(Command::Snapshot(reply)) => {
                        let _ = reply.send(self.snapshot());
                    }
                    None => break,
                },
                Some(done) = self.completions.recv() => self.coordinator.on_completion(done),
                _ = wait_until(self.debounce.deadline()) => {
                    if self.debounce.fire(Instant::now()) {
                        self.run_evaluation(self.debounce_trigger);
                    }
                }
                _ = wait_until(self.coordinator.fallback_deadline()) => {
                    self.coordinator.expire_if_due(Instant::now());
                }
                _ = general.tick() => self.sweep(SweepKind::General),
                _ = critical.tick() => self.sweep(SweepKind::CriticalHour),
            }
        }

        info!("all engine handles dropped; engine stopped");
    }

    fn handle_signal(&mut self, signal: Signal) {
        debug!(source = %signal.source(), ?signal, "signal received");

        match signal {
            Signal::Push(PushMessage::Version { version }) => {
                self.observe_version(&version);
            }
            Signal::Push(PushMessage::PartitionUpdated { partition, reason }) => {
                // The server asserts ground truth: no debounce, no evaluation.
                self.presenter
                    .partition_announced(partition, reason.as_deref());
                self.refresh_now(
                    SignalSource::Push,
                    PartitionSet::only(partition),
                    RefreshReason::ServerAsserted,
                );
            }
            Signal::Push(PushMessage::CacheRotated { .. }) => {
                self.refresh_now(
                    SignalSource::Push,
                    PartitionSet::both(),
                    RefreshReason::CacheRotated,
                );
            }
            Signal::VersionReported { version } => {
                let repeated = self.last_polled_version.as_deref() == Some(version.as_str());
                if self.observe_version(&version) && !repeated {
                    self.schedule_evaluation(SignalSource::Poll);
                }
                self.last_polled_version = Some(version);
            }
            Signal::Resume(source) => {
                debug!(%source, "resume");
                self.schedule_evaluation(SignalSource::Resume);
            }
            Signal::VisibilityChanged(Visibility::Hidden) => {
                self.visibility = Visibility::Hidden;
                self.presenter.page_hidden();
            }
            Signal::VisibilityChanged(Visibility::Visible) => {
                self.visibility = Visibility::Visible;
                self.schedule_evaluation(SignalSource::Resume);
            }
            Signal::ManualRefresh => {
                info!("manual refresh requested");
                self.refresh_now(
                    SignalSource::Manual,
                    PartitionSet::both(),
                    RefreshReason::Manual,
                );
            }
        }
    }

    /// Compare a reported server version with the session baseline. Returns
    /// `true` if they differ.
    fn observe_version(&mut self, version: &str) -> bool {
        if version == self.cfg.baseline_version {
            return false;
        }

        if !self.version_notified {
            self.version_notified = true;
            info!(
                baseline = %self.cfg.baseline_version,
                reported = %version,
                "server version changed"
            );
            self.presenter.version_changed(version);
        }
        true
    }

    /// Refresh without evaluating, in a root span of its own.
    fn refresh_now(
        &mut self,
        trigger: SignalSource,
        partitions: PartitionSet,
        reason: RefreshReason,
    ) {
        let span = root_span("refresh", &TraceId::new());
        span.record("trigger", field::display(trigger));
        span.record("partitions", field::display(partitions));
        let _guard = span.enter();

        self.coordinator.request_refresh(partitions, reason);
    }

    fn schedule_evaluation(&mut self, trigger: SignalSource) {
        if self.coordinator.is_in_flight() {
            self.debounce.cancel();
            debug!("refresh in flight; presentation update only");
            self.present();
            return;
        }

        self.debounce_trigger = trigger;
        let restarted = self.debounce.trigger(Instant::now());
        debug!(%trigger, restarted, "evaluation scheduled");
    }

    /// One debounced evaluation pass.
    fn run_evaluation(&mut self, trigger: SignalSource) {
        let span = root_span("evaluation", &TraceId::new());
        span.record("trigger", field::display(trigger));
        let _guard = span.enter();

        Counters::bump(&self.counters.evaluations);
        let now = self.clock.now();
        let suspension = self.suspension.observe(now);

        match self.check_rollover(now) {
            RolloverCheck::Refreshed => return,
            RolloverCheck::Deferred => {
                self.present();
                return;
            }
            RolloverCheck::None => {}
        }

        let staleness = evaluate(now, self.coordinator.partitions(), &self.cfg.freshness);
        for reason in &staleness.reasons {
            debug!(%reason, "stale");
        }

        let decision = decide_on_resume(&staleness, suspension.bucket, now.hour(), &self.cfg);
        debug!(bucket = %suspension.bucket, ?decision, "evaluation decided");
        self.apply(decision);
    }

    fn sweep(&mut self, kind: SweepKind) {
        if self.visibility == Visibility::Hidden {
            Counters::bump(&self.counters.sweeps_hidden);
            return;
        }

        let now = self.clock.now();
        if kind == SweepKind::CriticalHour && !self.cfg.is_key_hour(now.hour()) {
            return;
        }

        let span = root_span("sweep", &TraceId::new());
        span.record("trigger", field::display(kind));
        let _guard = span.enter();

        Counters::bump(&self.counters.sweeps);
        // A visible session ticking the general sweep is not a suspended one.
        if kind == SweepKind::General {
            self.suspension.observe(now);
        }

        match self.check_rollover(now) {
            RolloverCheck::None => {}
            RolloverCheck::Refreshed | RolloverCheck::Deferred => return,
        }

        let staleness = evaluate(now, self.coordinator.partitions(), &self.cfg.freshness);
        let decision = decide_on_sweep(
            kind,
            &staleness,
            self.coordinator.partitions(),
            now.hour(),
            &self.cfg,
        );
        debug!(?decision, "sweep decided");
        self.apply(decision);
    }

    fn check_rollover(&mut self, now: DateTime<FixedOffset>) -> RolloverCheck {
        let today = now.date_naive();
        let Some(pending) = self.rollover.peek(today) else {
            return RolloverCheck::None;
        };

        if self.coordinator.is_in_flight() {
            info!(from = %pending.from, to = %pending.to, "date rollover deferred until refresh settles");
            return RolloverCheck::Deferred;
        }

        self.rollover.check(today);
        Counters::bump(&self.counters.date_rollovers);
        info!(from = %pending.from, to = %pending.to, "date rollover; forcing full refresh");

        self.coordinator.reset_partitions();
        Span::current().record("partitions", field::display(PartitionSet::both()));
        self.coordinator
            .request_refresh(PartitionSet::both(), RefreshReason::DateRollover);
        RolloverCheck::Refreshed
    }

    fn apply(&mut self, decision: Decision) {
        match decision {
            Decision::Refresh { partitions, reason } => {
                Span::current().record("partitions", field::display(partitions));
                self.coordinator.request_refresh(partitions, reason);
            }
            Decision::Present => self.present(),
            Decision::Idle => {}
        }
    }

    fn present(&self) {
        Counters::bump(&self.counters.presentation_ticks);
        self.presenter.presentation_tick();
    }

    fn snapshot(&self) -> EngineSnapshot {
        let partitions = self.coordinator.partitions();
        EngineSnapshot {
            current: partitions.get(Partition::Current).copied(),
            next: partitions.get(Partition::Next).copied(),
            in_flight: self.coordinator.is_in_flight(),
            debounce_pending: self.debounce.is_pending(),
            visibility: self.visibility,
            last_known_date: self.rollover.last_known_date(),
            baseline_version: self.cfg.baseline_version.clone(),
        }
    }
}

fn sweep_timer(period: Duration) -> Interval {
    let mut timer = interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
    timer
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
