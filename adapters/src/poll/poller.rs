//! Version poll fallback.
//!
//! Asks the server for its version on a fixed cadence and reports every
//! answer to the engine, which owns the baseline comparison.

use std::time::Duration;

use freshness::EngineHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{info, warn};

use super::VersionSource;

/// Runs until the engine goes away. Transport errors are logged and the next
/// tick tries again.
pub async fn run_version_poller<S>(source: S, engine: EngineHandle, poll_every: Duration)
where
    S: VersionSource,
{
    let mut ticker = interval(poll_every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(every_s = poll_every.as_secs(), "version poller started");

    loop {
        ticker.tick().await;

        let version = match source.fetch_version().await {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "version poll failed");
                continue;
            }
        };

        if engine.version_reported(version).await.is_err() {
            info!("engine stopped; version poller exiting");
            return;
        }
    }
}
