pub mod errors;
pub mod sse;
pub mod ws;

pub use errors::PushError;
pub use sse::{SseClient, SseDecoder};
pub use ws::WsPushClient;

use async_trait::async_trait;
use freshness::EngineHandle;
use freshness::metrics::Counters;
use freshness::push::parse_push_message;
use tracing::{debug, warn};

/// A server-push transport.
#[async_trait]
pub trait PushChannel: Send + Sync {
    /// Short transport name for logs.
    fn name(&self) -> &'static str;

    /// Connect and forward every message to `engine` until the stream ends.
    ///
    /// `Ok(())` means the server closed the stream cleanly. No reconnect is
    /// attempted here; see [`crate::supervisor`].
    async fn stream(&self, engine: &EngineHandle) -> Result<(), PushError>;
}

/// Parse one raw payload and hand it to the engine.
///
/// Malformed and unknown payloads are logged, counted and dropped.
pub async fn forward(raw: &str, engine: &EngineHandle) -> Result<(), PushError> {
    tracing::trace!(raw_event = %raw, "push payload received");

    match parse_push_message(raw) {
        Ok(Some(msg)) => {
            debug!(?msg, "push message forwarded");
            engine
                .push(msg)
                .await
                .map_err(|_| PushError::EngineClosed)?;
        }
        Ok(None) => {
            Counters::bump(&engine.counters().push_ignored);
            debug!("push message of unknown type ignored");
        }
        Err(e) => {
            Counters::bump(&engine.counters().push_ignored);
            warn!(error = %e, raw = %raw, "malformed push payload dropped");
        }
    }
    Ok(())
}
