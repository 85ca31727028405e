use freshness::{Partition, PartitionSet, Presenter, RefreshReason};
use tracing::info;

/// Stands in for the page: every presentation side effect becomes a log line.
pub struct LogPresenter;

impl Presenter for LogPresenter {
    fn refresh_started(&self, partitions: PartitionSet, reason: RefreshReason) {
        info!(target: "presenter", %partitions, %reason, "refreshing");
    }

    fn presentation_tick(&self) {
        info!(target: "presenter", "now-line updated");
    }

    fn page_hidden(&self) {
        info!(target: "presenter", "page hidden");
    }

    fn version_changed(&self, version: &str) {
        info!(target: "presenter", %version, "new version available; reload to update");
    }

    fn partition_announced(&self, partition: Partition, reason: Option<&str>) {
        info!(target: "presenter", %partition, reason = reason.unwrap_or("-"), "prices updated");
    }
}
