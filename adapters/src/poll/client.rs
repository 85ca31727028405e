use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::PollError;

/// Anything that can report the server's running version.
#[async_trait]
pub trait VersionSource: Send + Sync {
    async fn fetch_version(&self) -> Result<String, PollError>;
}

#[derive(Debug, Deserialize)]
struct VersionEnvelope {
    version: String,
}

#[derive(Clone)]
pub struct HttpVersionClient {
    http: Client,
    url: String,
}

impl HttpVersionClient {
    pub fn new(base_url: &str) -> Result<Self, PollError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(5))
            .pool_idle_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            url: format!("{}/version", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl VersionSource for HttpVersionClient {
    #[instrument(skip(self), fields(url = %self.url), level = "debug")]
    async fn fetch_version(&self) -> Result<String, PollError> {
        let resp = self.http.get(&self.url).send().await?.error_for_status()?;
        let envelope: VersionEnvelope = resp.json().await?;

        if envelope.version.is_empty() {
            return Err(PollError::InvalidResponse);
        }

        debug!(version = %envelope.version, "server version fetched");
        Ok(envelope.version)
    }
}
