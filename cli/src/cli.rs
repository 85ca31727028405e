use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PushKind {
    /// Server-sent events on `/events/version`.
    Sse,
    /// WebSocket on `/events/version`.
    Ws,
    /// Poll only.
    None,
}

/// Flags override the `FRESHNESS_*` environment.
#[derive(Debug, Parser)]
#[clap(name = "freshness", version)]
pub struct Cli {
    /// Price server base URL
    #[clap(long)]
    pub base_url: Option<String>,

    /// Server-push transport
    #[clap(long, value_enum)]
    pub push: Option<PushKind>,

    /// Version this session was started with
    #[clap(long)]
    pub app_version: Option<String>,

    /// Version poll interval once push is unavailable
    #[clap(long)]
    pub poll_secs: Option<u64>,

    /// One JSON object per log line
    #[clap(long)]
    pub json_logs: bool,
}
