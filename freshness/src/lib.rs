//! Freshness reconciliation and refresh scheduling for a two-partition
//! (current period / next period) price series.
//!
//! Signals (server push, version poll, focus/visibility resumption, periodic
//! sweeps) are fed into a single [`engine::Engine`] task. For every signal the
//! engine decides, per partition, whether a refetch is warranted and hands the
//! decision to the [`coordinator::RefreshCoordinator`], which guarantees at
//! most one refresh set is in flight at any time.

pub mod clock;
pub mod config;
pub mod coordinator;
pub mod debounce;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod metrics;
pub mod partition;
pub mod policy;
pub mod presenter;
pub mod push;
pub mod rollover;
pub mod signal;
pub mod suspension;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{EngineConfig, FreshnessRules, HourRange, SuspensionThresholds};
pub use coordinator::{RefreshCoordinator, RefreshOutcome, Refetcher};
pub use engine::{Engine, EngineHandle, EngineSnapshot};
pub use error::{EngineError, RefetchError};
pub use partition::{FetchStamp, Partition, PartitionCache, PartitionSet};
pub use policy::{Decision, RefreshReason};
pub use presenter::{NoopPresenter, Presenter};
pub use push::PushMessage;
pub use signal::{ResumeSource, Signal, SignalSource, SweepKind, Visibility};
