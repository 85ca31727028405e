use thiserror::Error;

use crate::partition::Partition;

/// Failure reported by the external refetch operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RefetchError {
    #[error("refetch of {partition} failed: {message}")]
    Failed {
        partition: Partition,
        message: String,
    },

    #[error("the server has no {0} partition")]
    TargetMissing(Partition),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("engine task is no longer running")]
    Closed,

    #[error("engine dropped the snapshot request")]
    SnapshotDropped,
}
