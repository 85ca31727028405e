use std::time::Duration;

use async_trait::async_trait;
use freshness::{Partition, RefetchError, Refetcher};
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument};

/// Refetches one partition's price fragment over HTTP.
///
/// Only completion matters to the engine; the body is read and discarded.
#[derive(Clone)]
pub struct HttpRefetcher {
    http: Client,
    base_url: String,
}

impl HttpRefetcher {
    pub fn new(base_url: &str) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, partition: Partition) -> String {
        let date = match partition {
            Partition::Current => "today",
            Partition::Next => "tomorrow",
        };
        format!("{}/partials/prices?date={date}", self.base_url)
    }
}

fn failed(partition: Partition, e: impl std::fmt::Display) -> RefetchError {
    RefetchError::Failed {
        partition,
        message: e.to_string(),
    }
}

#[async_trait]
impl Refetcher for HttpRefetcher {
    #[instrument(skip(self), fields(partition = %partition), level = "debug")]
    async fn refetch(&self, partition: Partition) -> Result<(), RefetchError> {
        let url = self.url_for(partition);

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| failed(partition, e))?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Err(RefetchError::TargetMissing(partition));
        }

        let resp = resp.error_for_status().map_err(|e| failed(partition, e))?;
        let body = resp.bytes().await.map_err(|e| failed(partition, e))?;

        debug!(bytes = body.len(), "partition fragment fetched");
        Ok(())
    }
}
