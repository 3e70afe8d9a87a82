//! Core domain types and collaborator ports for the study tutor.
//!
//! This crate has no knowledge of audio output devices or HTTP clients.
//! It defines:
//!
//! - the chat domain ([`Message`], [`Conversation`]) and the decoded audio
//!   buffer a message can carry ([`DecodedAudio`]),
//! - the process-wide study configuration ([`StudyConfig`], [`VoicePersona`],
//!   [`UserGoals`]) and its validation rules,
//! - the ports implemented by remote adapters ([`GenerationPort`],
//!   [`SynthesisPort`]).

pub mod config;
pub mod domain;
pub mod ports;

// Re-export commonly used types for convenience
pub use config::{
    ConfigError, DEFAULT_PLAYBACK_RATE, MAX_PLAYBACK_RATE, MIN_PLAYBACK_RATE, StudyConfig,
    UserGoals, VoicePersona, clamp_rate, validate_rate,
};
pub use domain::{AudioBufferError, Conversation, DecodedAudio, Message, MessageId, MessageRole};
pub use ports::{GenerationError, GenerationPort, SynthesisError, SynthesisPort};
