//! Read-aloud error types.

use tutor_core::{GenerationError, MessageId, SynthesisError};

use crate::pcm::DecodeError;

/// Errors that can occur while producing or playing message audio.
#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    /// The synthesis payload could not be turned into PCM.
    #[error("Failed to decode audio payload: {0}")]
    Decode(#[from] DecodeError),

    /// A zero-length buffer was handed to the playback engine.
    #[error("Refusing to play zero-length audio for message {message_id}")]
    InvalidAudio { message_id: MessageId },

    /// Speech synthesis failed upstream.
    #[error("Speech synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),

    /// Reply generation failed upstream.
    #[error("Response generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// The message id is not part of the conversation.
    #[error("Unknown message {0}")]
    UnknownMessage(MessageId),

    /// The message exists but has no decoded audio yet.
    #[error("Message {0} has no audio yet")]
    NoAudio(MessageId),

    /// Nothing left to speak once formatting was stripped.
    #[error("Nothing to speak: message text is empty")]
    EmptyText,

    /// A source node was driven out of order (e.g. stopped before start).
    #[error("Audio source is in the wrong state: {0}")]
    SourceState(&'static str),

    /// Failed to open the audio output stream.
    #[error("Failed to open audio output stream: {0}")]
    OutputStreamError(String),

    /// IO error (WAV export).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
