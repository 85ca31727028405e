//! Transports between the freshness engine and a price server.
//!
//! - [`push`]: server-push channels (SSE, WebSocket) feeding the engine.
//! - [`poll`]: the version poll used when no push channel is alive.
//! - [`refetch`]: the HTTP refetch operation the engine's coordinator calls.
//! - [`supervisor`]: runs push first and falls back to polling for good.

pub mod poll;
pub mod push;
pub mod refetch;
pub mod supervisor;

pub use poll::{HttpVersionClient, PollError, VersionSource, run_version_poller};
pub use push::{PushChannel, PushError, SseClient, SseDecoder, WsPushClient};
pub use refetch::HttpRefetcher;
pub use supervisor::run_remote_signals;
