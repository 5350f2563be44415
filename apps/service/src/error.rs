use thiserror::Error;

/// Failures talking to the messaging API
#[derive(Debug, Error)]
pub enum Error {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("API rejected the request: {0}")]
    Rejected(String),
}

pub type Result<T> = std::result::Result<T, Error>;
