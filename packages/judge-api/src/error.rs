use reqwest::StatusCode;
use thiserror::Error;

/// Failures talking to the judge API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid judge API base URL '{0}'")]
    InvalidBaseUrl(String),

    #[error("judge API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("judge API returned {status} for {url}")]
    Status { status: StatusCode, url: String },

    #[error("judge API response is not a submission list: {0}")]
    Decode(#[source] serde_json::Error),
}

impl ApiError {
    /// True for failures to reach the judge or get a successful reply from it,
    /// as opposed to a reply whose body could not be understood.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { .. })
    }
}

/// One submission object in an otherwise valid response could not be decoded.
#[derive(Debug, Error)]
#[error("submission at index {index} is malformed: {reason}")]
pub struct RecordError {
    /// Position of the offending object in the upstream array.
    pub index: usize,
    pub reason: String,
}
