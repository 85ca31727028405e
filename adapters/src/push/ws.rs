use async_trait::async_trait;
use freshness::EngineHandle;
use futures::StreamExt;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, instrument};

use super::{PushChannel, PushError, forward};

/// Push channel over a WebSocket text stream carrying the same JSON messages
/// as the SSE channel. Connects once; the supervisor decides what happens
/// after the socket ends.
pub struct WsPushClient {
    pub ws_url: String,
}

impl WsPushClient {
    pub fn new(ws_url: String) -> Self {
        Self { ws_url }
    }

    /// `http(s)://host/..` becomes `ws(s)://host/../events/version`.
    pub fn from_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        let ws = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            base.to_string()
        };
        Self::new(format!("{ws}/events/version"))
    }
}

#[async_trait]
impl PushChannel for WsPushClient {
    fn name(&self) -> &'static str {
        "ws"
    }

    #[instrument(skip_all, fields(url = %self.ws_url))]
    async fn stream(&self, engine: &EngineHandle) -> Result<(), PushError> {
        let (mut ws, _) = connect_async(&self.ws_url).await?;
        info!("websocket push connected");

        while let Some(msg) = ws.next().await {
            match msg? {
                Message::Text(text) => forward(text.as_str(), engine).await?,
                Message::Close(frame) => {
                    debug!(?frame, "websocket closed by server");
                    return Ok(());
                }
                Message::Ping(_) | Message::Pong(_) => debug!("keep-alive"),
                other => debug!(msg_type = ?other, "ignoring non-text websocket message"),
            }
        }

        debug!("websocket stream ended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_socket_url_from_http_base() {
        assert_eq!(
            WsPushClient::from_base_url("https://prices.example/").ws_url,
            "wss://prices.example/events/version"
        );
        assert_eq!(
            WsPushClient::from_base_url("http://127.0.0.1:8000").ws_url,
            "ws://127.0.0.1:8000/events/version"
        );
    }
}
