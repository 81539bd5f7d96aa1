// src/error.rs
use thiserror::Error;

use crate::pitch::state::TransitionError;
use crate::validation::ValidationErrors;

/// Every failure the client library can report.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Request rejected: {message}")]
    Rejected { message: String },

    #[error("Response envelope carried no data")]
    MissingData,

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("No video file selected")]
    NoFileSelected,

    #[error("Invalid media ({code}): {message}")]
    InvalidMedia { code: &'static str, message: String },

    #[error("Another request is already in flight")]
    Busy,

    #[error(transparent)]
    Transition(TransitionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<TransitionError> for ApiError {
    fn from(value: TransitionError) -> Self {
        match value {
            TransitionError::Busy { .. } => ApiError::Busy,
            TransitionError::NoFileSelected => ApiError::NoFileSelected,
            other => ApiError::Transition(other),
        }
    }
}

impl ApiError {
    /// Transport failures and server-side 5xx/429 are worth polling through.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Transport(_) => true,
            ApiError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        let server = ApiError::Status {
            status: 503,
            message: "busy".to_string(),
        };
        let client = ApiError::Status {
            status: 400,
            message: "bad".to_string(),
        };
        assert!(server.is_transient());
        assert!(!client.is_transient());
        assert!(!ApiError::Unauthorized("expired".to_string()).is_transient());
        assert!(ApiError::NotFound("pitch".to_string()).is_not_found());
    }
}
