// src/types/envelope.rs
//! The `{ success, message, data }` wrapper every endpoint answers with

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    /// Unwrap a payload the endpoint must always return.
    pub fn into_data(self) -> Result<T, ApiError> {
        self.into_optional()?.ok_or(ApiError::MissingData)
    }

    /// Unwrap a payload that may legitimately be absent (`data: null`).
    pub fn into_optional(self) -> Result<Option<T>, ApiError> {
        if !self.success {
            return Err(ApiError::Rejected {
                message: self
                    .message
                    .unwrap_or_else(|| "request was not successful".to_string()),
            });
        }
        Ok(self.data)
    }
}

/// Envelope for mutations that only report an outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl Ack {
    pub fn into_result(self) -> Result<(), ApiError> {
        if self.success {
            Ok(())
        } else {
            Err(ApiError::Rejected {
                message: self
                    .message
                    .unwrap_or_else(|| "request was not successful".to_string()),
            })
        }
    }
}

/// Pull a human readable message out of an error body, if it is an envelope.
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<Ack>(body)
        .ok()
        .and_then(|ack| ack.message)
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                "Unknown error".to_string()
            } else {
                body.to_string()
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_envelope_becomes_rejected() {
        let env: ApiEnvelope<String> =
            serde_json::from_str(r#"{"success":false,"message":"Job not found"}"#).unwrap();
        match env.into_data() {
            Err(ApiError::Rejected { message }) => assert_eq!(message, "Job not found"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_missing_data_is_an_error_only_when_required() {
        let env: ApiEnvelope<String> =
            serde_json::from_str(r#"{"success":true,"data":null}"#).unwrap();
        assert!(matches!(env.clone().into_data(), Err(ApiError::MissingData)));
        assert_eq!(env.into_optional().unwrap(), None);
    }

    #[test]
    fn test_error_message_prefers_envelope_message() {
        assert_eq!(
            error_message(r#"{"success":false,"message":"Token expired"}"#),
            "Token expired"
        );
        assert_eq!(error_message("gateway timeout"), "gateway timeout");
        assert_eq!(error_message(""), "Unknown error");
    }
}
