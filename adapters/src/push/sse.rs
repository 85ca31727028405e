//! Server-sent events over a streaming reqwest body.

use std::time::Duration;

use async_trait::async_trait;
use freshness::EngineHandle;
use futures::StreamExt;
use reqwest::Client;
use reqwest::header::ACCEPT;
use tracing::{debug, info, instrument};

use super::{PushChannel, PushError, forward};

/// Incremental `text/event-stream` decoder.
///
/// Feed raw body chunks in with [`SseDecoder::push`]; complete events come
/// out as their `data` payload (multiple `data:` lines joined with `\n`).
/// Comment lines and the `event`, `id` and `retry` fields are skipped.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(end) = self.buf.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=end).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches('\n').trim_end_matches('\r');

            if line.is_empty() {
                if !self.data.is_empty() {
                    events.push(self.data.join("\n"));
                    self.data.clear();
                }
                continue;
            }

            if line.starts_with(':') {
                continue;
            }

            let (field, value) = match line.split_once(':') {
                Some((f, v)) => (f, v.strip_prefix(' ').unwrap_or(v)),
                None => (line, ""),
            };
            if field == "data" {
                self.data.push(value.to_string());
            }
        }
        events
    }
}

/// Push channel over `GET {base}/events/version`.
#[derive(Clone)]
pub struct SseClient {
    http: Client,
    url: String,
}

impl SseClient {
    pub fn new(base_url: &str) -> Result<Self, PushError> {
        // No overall timeout: the response body never ends on its own.
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            url: format!("{}/events/version", base_url.trim_end_matches('/')),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl PushChannel for SseClient {
    fn name(&self) -> &'static str {
        "sse"
    }

    #[instrument(skip_all, fields(url = %self.url))]
    async fn stream(&self, engine: &EngineHandle) -> Result<(), PushError> {
        let resp = self
            .http
            .get(&self.url)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await?
            .error_for_status()?;

        info!("sse stream connected");

        let mut body = resp.bytes_stream();
        let mut decoder = SseDecoder::new();

        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            for data in decoder.push(&chunk) {
                forward(&data, engine).await?;
            }
        }

        debug!("sse stream ended by server");
        Ok(())
    }
}
