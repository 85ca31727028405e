use thiserror::Error;

#[derive(Error, Debug)]
pub enum PushError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("engine is gone")]
    EngineClosed,
}
