//! Error types for Drive operations

use serde::Deserialize;
use thiserror::Error;

use drive_transport::TransportError;

/// Exact message Drive returns on a permission check failure. Operations
/// that touch permissions treat this as terminal and never retry it.
pub const INSUFFICIENT_PERMISSIONS_MESSAGE: &str =
    "The user does not have sufficient permissions for this file.";

/// Drive client errors
#[derive(Error, Debug)]
pub enum DriveError {
    /// The API answered with a non-success status
    #[error("Drive API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Network or stream fault below the API layer
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The API answered successfully but the body did not decode
    #[error("failed to parse API response: {0}")]
    Parse(String),

    /// Caller did not supply a permission id where one is required
    #[error("missing a permission id")]
    MissingPermissionId,

    /// Caller-supplied parameters failed validation before any network attempt
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

pub type Result<T> = std::result::Result<T, DriveError>;

impl DriveError {
    /// Remote status code, if this error came from the API
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// True for the 403 the API returns when the authenticated user lacks
    /// access to the file. Matched on the exact message so that other 403s
    /// (rate limits in particular) keep their retryable classification.
    pub fn is_insufficient_permissions(&self) -> bool {
        matches!(
            self,
            Self::Api { status: 403, message } if message == INSUFFICIENT_PERMISSIONS_MESSAGE
        )
    }
}

/// Drive error envelope: `{"error": {"code": ..., "message": ...}}`
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Build an [`DriveError::Api`] from a non-success response body, pulling
/// the message out of the error envelope when the body carries one.
pub(crate) fn api_error(status: u16, body: &[u8]) -> DriveError {
    let message = match serde_json::from_slice::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) => String::from_utf8_lossy(body).to_string(),
    };

    DriveError::Api { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_parses_envelope() {
        let body = br#"{"error":{"code":404,"message":"File not found: abc"}}"#;
        let err = api_error(404, body);

        assert_eq!(err.status(), Some(404));
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "Drive API error (status 404): File not found: abc"
        );
    }

    #[test]
    fn test_api_error_falls_back_to_raw_body() {
        let err = api_error(500, b"backend unavailable");

        assert!(matches!(
            &err,
            DriveError::Api { status: 500, message } if message == "backend unavailable"
        ));
    }

    #[test]
    fn test_insufficient_permissions_requires_exact_message() {
        let fatal = DriveError::Api {
            status: 403,
            message: INSUFFICIENT_PERMISSIONS_MESSAGE.to_string(),
        };
        assert!(fatal.is_insufficient_permissions());

        let rate_limited = DriveError::Api {
            status: 403,
            message: "User rate limit exceeded".to_string(),
        };
        assert!(!rate_limited.is_insufficient_permissions());

        let not_found = DriveError::Api {
            status: 404,
            message: INSUFFICIENT_PERMISSIONS_MESSAGE.to_string(),
        };
        assert!(!not_found.is_insufficient_permissions());
    }
}
