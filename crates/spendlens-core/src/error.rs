//! Error types for Spendlens

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not enough data: need at least {required} records, have {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Remote unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("Malformed remote result: {0}")]
    MalformedRemoteResult(String),
}

impl Error {
    /// Whether this error came from talking to the remote API.
    ///
    /// These are absorbed by the reconciliation policy and never reach the
    /// presentation layer.
    pub fn is_remote_failure(&self) -> bool {
        matches!(
            self,
            Error::Http(_)
                | Error::Json(_)
                | Error::RemoteUnavailable(_)
                | Error::MalformedRemoteResult(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
