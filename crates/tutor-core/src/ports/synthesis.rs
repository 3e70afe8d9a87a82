//! Speech-synthesis port.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::VoicePersona;

/// Errors from the speech-synthesis collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthesisError {
    /// No API credential configured.
    #[error("API key is missing")]
    MissingCredential,

    /// Transport failure (DNS, TLS, timeout, connection reset).
    #[error("Network error: {message}")]
    Network { message: String },

    /// The service answered with a non-success status.
    #[error("Synthesis request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    /// The service answered but returned no audio payload.
    #[error("No audio data received")]
    EmptyResult,
}

/// Turns text into speech.
///
/// The returned payload is base64-encoded little-endian 16-bit mono PCM at
/// 24 kHz.
#[async_trait]
pub trait SynthesisPort: Send + Sync {
    async fn synthesize(&self, text: &str, voice: VoicePersona) -> Result<String, SynthesisError>;
}
