//! Error types for airdesk.

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur in airdesk operations.
#[derive(Error, Debug)]
pub enum AirdeskError {
    /// The caller passed a missing or malformed argument. Raised before any network call.
    #[error("{0}")]
    Validation(String),

    /// The remote API answered with a non-2xx status.
    #[error("{message} ({status} {status_text})")]
    Request {
        status: u16,
        status_text: String,
        /// Error type declared by the remote body, e.g. `NOT_FOUND`.
        error_type: Option<String>,
        message: String,
    },

    /// No response was received at all.
    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Gave up after {0} pages; the server kept returning an offset")]
    PageLimitExceeded(usize),
}

/// Result type alias for airdesk operations.
pub type AirdeskResult<T> = Result<T, AirdeskError>;

impl AirdeskError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        AirdeskError::Validation(msg.into())
    }

    /// The `type` reported in the failure envelope.
    pub fn error_type(&self) -> &str {
        match self {
            AirdeskError::Validation(_) => "ValidationError",
            AirdeskError::Request { error_type, .. } => {
                error_type.as_deref().unwrap_or("RequestError")
            }
            AirdeskError::Network(_) => "NetworkError",
            AirdeskError::Decode(_) => "DecodeError",
            AirdeskError::Config(_) => "ConfigError",
            AirdeskError::PageLimitExceeded(_) => "PageLimitExceeded",
        }
    }

    /// HTTP status of the remote response, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            AirdeskError::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the remote answered 404 for the requested record.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Normalize into the failure envelope handed to presentation code.
    pub fn envelope(&self) -> ErrorEnvelope {
        let (status_text, message) = match self {
            AirdeskError::Request {
                status_text,
                message,
                ..
            } => (status_text.clone(), message.clone()),
            other => (String::new(), other.to_string()),
        };

        ErrorEnvelope {
            success: false,
            data: None,
            status: self.status(),
            status_text,
            message,
            error_type: self.error_type().to_string(),
        }
    }
}

/// Failure envelope: `{success: false, data: null, status, statusText, message, type}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub success: bool,
    pub data: Option<()>,
    pub status: Option<u16>,
    pub status_text: String,
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: String,
}
