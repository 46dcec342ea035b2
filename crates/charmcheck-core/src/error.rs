//! Core error types for charmcheck-core.
//!
//! This module defines the error hierarchy using thiserror. Report errors
//! are classified so the UI can map each variant to a remediation panel;
//! relay errors are logged and swallowed per the optimistic-unlock design.

use thiserror::Error;

/// Core error type for charmcheck-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Report-generation errors
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// Outbound relay errors
    #[error("Relay error: {0}")]
    Relay(#[from] RelayError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Errors from the generative report provider.
///
/// Every variant is non-fatal: the session always leaves the user with a
/// forward path (retry, manual key entry, or the deterministic fallback
/// report).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// No API key from any source (override, manual entry, environment).
    #[error("no API key configured")]
    MissingCredential,

    /// The provider rejected the supplied API key.
    #[error("API key was rejected by the provider")]
    InvalidCredential,

    /// Rate or quota limit hit (HTTP 429).
    #[error("request quota exceeded")]
    QuotaExceeded,

    /// Provider-side failure (HTTP 5xx).
    #[error("provider unavailable (HTTP {status})")]
    ProviderUnavailable { status: u16 },

    /// Empty payload, or a payload that does not parse as a report.
    #[error("provider returned an empty or unparseable response")]
    EmptyResponse,

    /// Anything else. The message is already truncated for display.
    #[error("unexpected provider error: {message}")]
    Unknown { message: String },
}

impl ReportError {
    /// Whether the remediation panel should open the manual key input.
    pub fn prompts_for_key(&self) -> bool {
        matches!(
            self,
            ReportError::MissingCredential
                | ReportError::InvalidCredential
                | ReportError::QuotaExceeded
        )
    }
}

/// Errors from the subscription endpoint or the report-delivery webhook.
#[derive(Error, Debug)]
pub enum RelayError {
    /// Endpoint responded with a non-success status.
    #[error("relay endpoint returned HTTP {status}")]
    Endpoint { status: u16 },

    /// Transport-level failure (DNS, TLS, connection reset, ...).
    #[error("relay transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Client-side input validation errors. No network call is made when one
/// of these is raised.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required free-text field was empty after trimming.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Answer recorded against a question id not in the bank.
    #[error("unknown question id: {0}")]
    UnknownQuestion(u32),

    /// Answer value is not one of the fixed answer options.
    #[error("value {value} is not one of the answer options")]
    InvalidOptionValue { value: i32 },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
