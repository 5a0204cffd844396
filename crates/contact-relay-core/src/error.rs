//! Error types for Contact Relay
//!
//! One variant per failure class in the intake pipeline. The server maps
//! these onto HTTP status codes; the client maps the machine code strings
//! onto localized user-facing messages.

use thiserror::Error;

/// Result type alias for Contact Relay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Contact Relay
#[derive(Debug, Error)]
pub enum Error {
    // ==========================================================================
    // Request Shape Errors
    // ==========================================================================
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    // ==========================================================================
    // Validation Errors
    // ==========================================================================
    #[error("Validation error: {0}")]
    Validation(String),

    // ==========================================================================
    // Security Rejections
    // ==========================================================================
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("Message flagged as spam: {0}")]
    SpamRejected(String),

    #[error("Invalid consent token")]
    ConsentTokenInvalid,

    // ==========================================================================
    // Delivery Errors
    // ==========================================================================
    #[error("Mail dispatch failed: {0}")]
    Dispatch(String),

    /// Client-side transport failure (connection refused, timeout, bad wire
    /// data). Never produced by the server pipeline.
    #[error("Transport error: {0}")]
    Transport(String),

    // ==========================================================================
    // Infrastructure Errors
    // ==========================================================================
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns the error type string (for JSON responses)
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::MethodNotAllowed(_) => "METHOD_NOT_ALLOWED",
            Self::MalformedRequest(_) => "MALFORMED_REQUEST",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::RateLimited => "RATE_LIMITED",
            Self::SpamRejected(_) => "SPAM_REJECTED",
            Self::ConsentTokenInvalid => "CONSENT_TOKEN_INVALID",
            Self::Dispatch(_) => "DISPATCH_FAILURE",
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::Io(_) => "OS_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Internal(_) => "UNHANDLED_EXCEPTION",
        }
    }

    /// HTTP status code mirrored into the response body on failure.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::MalformedRequest(_) | Self::Validation(_) => 400,
            Self::SpamRejected(_) | Self::ConsentTokenInvalid => 403,
            Self::MethodNotAllowed(_) => 405,
            Self::RateLimited => 429,
            Self::Dispatch(_)
            | Self::Transport(_)
            | Self::Io(_)
            | Self::Serialization(_)
            | Self::Internal(_) => 500,
        }
    }

    /// Whether the client retry policy may re-attempt after this error.
    ///
    /// Validation and rate-limit rejections are terminal: re-sending the same
    /// payload cannot change the outcome. Only transport-level and
    /// unclassified 500-class failures are worth another attempt.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transport(_)
                | Self::Dispatch(_)
                | Self::Io(_)
                | Self::Serialization(_)
                | Self::Internal(_)
        )
    }

    /// The summary safe to place in a response body.
    ///
    /// User-correctable failures keep their full display form; everything
    /// 500-class (and the spam verdict's matched term) collapses to a
    /// generic sentence. Full detail goes to the local log only.
    #[must_use]
    pub fn safe_message(&self) -> String {
        match self {
            Self::SpamRejected(_) => "Message flagged as spam".to_string(),
            Self::Dispatch(_)
            | Self::Transport(_)
            | Self::Io(_)
            | Self::Serialization(_)
            | Self::Internal(_) => "Server error occurred".to_string(),
            other => other.to_string(),
        }
    }

    /// Reconstruct the failure class from a server response code.
    ///
    /// Used by the client to classify outcomes it did not produce itself;
    /// unknown codes collapse to `Internal` (retryable, surfaced generically).
    #[must_use]
    pub fn from_status(code: u16, message: &str) -> Self {
        match code {
            400 => Self::Validation(message.to_string()),
            403 => Self::SpamRejected(message.to_string()),
            405 => Self::MethodNotAllowed(message.to_string()),
            429 => Self::RateLimited,
            _ => Self::Internal(message.to_string()),
        }
    }
}
