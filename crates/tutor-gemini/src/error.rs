//! Internal error types for Gemini operations.
//!
//! These errors are internal to `tutor-gemini` and are mapped to core port
//! errors at the boundary.

use thiserror::Error;

/// Result type alias for Gemini operations.
pub type GeminiResult<T> = Result<T, GeminiError>;

#[derive(Debug, Error)]
pub enum GeminiError {
    /// No API key configured.
    #[error("API key is missing")]
    MissingApiKey,

    /// API request failed with an HTTP error status.
    #[error("Gemini API request failed with status {status}: {message}")]
    ApiRequestFailed { status: u16, message: String },

    /// The response parsed but lacked the expected payload.
    #[error("Gemini returned no {expected}")]
    EmptyResponse { expected: &'static str },

    /// Network or HTTP client error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// URL construction error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON parsing error.
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),
}
