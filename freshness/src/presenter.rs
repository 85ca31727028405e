//! Boundary to the presentation layer.
//!
//! The engine never renders anything; it tells a [`Presenter`] what happened
//! and leaves charts, toasts and indicators to it. Every hook is called from
//! the engine task and must return quickly.

use crate::partition::{Partition, PartitionSet};
use crate::policy::RefreshReason;

pub trait Presenter: Send + Sync {
    /// A refresh of `partitions` has been dispatched.
    fn refresh_started(&self, _partitions: PartitionSet, _reason: RefreshReason) {}

    /// An evaluation ended without a refetch; cheap time-dependent
    /// decorations (e.g. a "now" marker) should be redrawn.
    fn presentation_tick(&self) {}

    /// The page went to the background.
    fn page_hidden(&self) {}

    /// The server runs a different version than this session was served
    /// with. Raised at most once per session.
    fn version_changed(&self, _version: &str) {}

    /// The server announced new data for `partition`.
    fn partition_announced(&self, _partition: Partition, _reason: Option<&str>) {}
}

/// Presenter that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPresenter;

impl Presenter for NoopPresenter {}
