use thiserror::Error;

#[derive(Error, Debug)]
pub enum PollError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid version response")]
    InvalidResponse,
}
