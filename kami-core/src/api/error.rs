use reqwest::StatusCode;
use thiserror::Error;

/// Errors returned by [`ApiClient`](super::ApiClient) calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, connect, timeout, ...)
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-2xx status
    #[error("Server returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// The response body was not the expected JSON
    #[error("Invalid response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status(),
            ApiError::Decode(_) => None,
        }
    }

    /// True when the server rejected the session token.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}

/// Result type for API calls
pub type ApiResult<T> = Result<T, ApiError>;
