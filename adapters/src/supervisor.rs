use std::time::Duration;

use freshness::EngineHandle;
use tracing::{info, instrument, warn};

use crate::poll::{VersionSource, run_version_poller};
use crate::push::{PushChannel, PushError};

/// Drive the engine's remote signals for the rest of the session.
///
/// The push channel runs first. Once it ends, for whatever reason other than
/// the engine itself stopping, the version poller takes over permanently.
/// There is no reconnect.
#[instrument(skip_all, fields(push = push.as_ref().map(|p| p.name()).unwrap_or("none")))]
pub async fn run_remote_signals<S>(
    push: Option<Box<dyn PushChannel>>,
    version: S,
    engine: EngineHandle,
    poll_every: Duration,
) where
    S: VersionSource,
{
    if let Some(channel) = push {
        match channel.stream(&engine).await {
            Ok(()) => warn!("push stream closed by server; switching to polling"),
            Err(PushError::EngineClosed) => {
                info!("engine stopped; remote signals done");
                return;
            }
            Err(e) => warn!(error = %e, "push stream failed; switching to polling"),
        }
    } else {
        info!("no push channel configured; polling");
    }

    run_version_poller(version, engine, poll_every).await;
}
