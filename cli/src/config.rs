use std::time::Duration;

use clap::ValueEnum;

use crate::cli::{Cli, PushKind};

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Price server, e.g. `http://localhost:8000`.
    pub base_url: String,

    /// Baseline version for the reload prompt.
    pub app_version: String,

    pub push: PushKind,

    /// Version poll cadence after push is gone (or when there is none).
    pub poll_every: Duration,

    /// JSON logs. Always on when `APP_ENV=production`.
    pub json_logs: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let base_url = std::env::var("FRESHNESS_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8000".to_string());

        let app_version =
            std::env::var("FRESHNESS_APP_VERSION").unwrap_or_else(|_| "dev".to_string());

        let push = std::env::var("FRESHNESS_PUSH")
            .ok()
            .and_then(|v| PushKind::from_str(&v, true).ok())
            .unwrap_or(PushKind::Sse);

        let poll_secs = std::env::var("FRESHNESS_POLL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|s| *s > 0)
            .unwrap_or(60);

        let json_logs = std::env::var("APP_ENV").unwrap_or_default() == "production";

        Self {
            base_url,
            app_version,
            push,
            poll_every: Duration::from_secs(poll_secs),
            json_logs,
        }
    }

    pub fn with_cli(mut self, cli: &Cli) -> Self {
        if let Some(url) = &cli.base_url {
            self.base_url = url.clone();
        }
        if let Some(version) = &cli.app_version {
            self.app_version = version.clone();
        }
        if let Some(push) = cli.push {
            self.push = push;
        }
        if let Some(secs) = cli.poll_secs.filter(|s| *s > 0) {
            self.poll_every = Duration::from_secs(secs);
        }
        self.json_logs |= cli.json_logs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn base() -> AppConfig {
        AppConfig {
            base_url: "http://localhost:8000".into(),
            app_version: "dev".into(),
            push: PushKind::Sse,
            poll_every: Duration::from_secs(60),
            json_logs: false,
        }
    }

    #[test]
    fn flags_override_environment() {
        let cli = Cli::parse_from([
            "freshness",
            "--base-url",
            "https://prices.example",
            "--push",
            "ws",
            "--poll-secs",
            "15",
            "--json-logs",
        ]);

        let cfg = base().with_cli(&cli);
        assert_eq!(cfg.base_url, "https://prices.example");
        assert_eq!(cfg.push, PushKind::Ws);
        assert_eq!(cfg.poll_every, Duration::from_secs(15));
        assert_eq!(cfg.app_version, "dev");
        assert!(cfg.json_logs);
    }

    #[test]
    fn zero_poll_interval_is_ignored() {
        let cli = Cli::parse_from(["freshness", "--poll-secs", "0", "--push", "none"]);
        let cfg = base().with_cli(&cli);
        assert_eq!(cfg.poll_every, Duration::from_secs(60));
        assert_eq!(cfg.push, PushKind::None);
    }
}
