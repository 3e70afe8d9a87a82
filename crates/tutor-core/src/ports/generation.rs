//! Language-generation port.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::UserGoals;

/// Errors from the language-generation collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// No API credential configured.
    #[error("API key is missing")]
    MissingCredential,

    /// Transport failure (DNS, TLS, timeout, connection reset).
    #[error("Network error: {message}")]
    Network { message: String },

    /// The service answered with a non-success status.
    #[error("Generation request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    /// The service answered but produced no text.
    #[error("No text generated")]
    EmptyResult,
}

/// Produces an assistant reply for a prompt.
#[async_trait]
pub trait GenerationPort: Send + Sync {
    /// Generate a reply to `prompt`, steered by the learner's goals.
    async fn generate(&self, prompt: &str, goals: &UserGoals) -> Result<String, GenerationError>;
}
