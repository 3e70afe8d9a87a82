//! Read-aloud engine for the study tutor.
//!
//! Turns synthesized speech into playable, exportable audio and keeps exactly
//! one playback session alive at a time.
//!
//! - [`pcm`] decodes base64 16-bit PCM from the speech service.
//! - [`wav`] encodes decoded audio as a downloadable WAV file.
//! - [`engine`] runs one session over an [`AudioGraph`] and derives position
//!   from the graph clock.
//! - [`controller`] is the state machine that the CLI drives.
//! - [`session`] ties reply generation to the controller.

pub mod controller;
pub mod engine;
pub mod error;
pub mod graph;
pub mod guard;
pub mod pcm;
pub mod session;
pub mod text_utils;
pub mod ticker;
pub mod wav;

mod sync;

// Re-export key types for convenience
pub use controller::{
    ControllerSettings, EndReason, PlaybackController, PlaybackEvent, ReadOutcome,
};
pub use engine::{PlaybackEngine, PlaybackSnapshot, SessionHandle};
pub use error::VoiceError;
#[cfg(feature = "local-playback")]
pub use graph::RodioGraph;
pub use graph::{AudioGraph, GraphEvent, SourceNode, VirtualGraph};
pub use guard::{GenerationGuard, GenerationPermit};
pub use pcm::DecodeError;
pub use session::{FALLBACK_REPLY, StudySession, Turn};
