//! Audio graph abstraction.
//!
//! The playback engine never talks to a sound device directly. It asks an
//! [`AudioGraph`] for a clock and for one-shot [`SourceNode`]s, which keeps
//! the session arithmetic testable without speakers:
//!
//! | Implementor | Where used |
//! |---|---|
//! | [`VirtualGraph`] | Headless runs and tests; manual or wall-clock time, no output |
//! | `RodioGraph` | Desktop CLI with feature `local-playback`; rodio on a dedicated thread |
//!
//! A source node plays one buffer exactly once. Restarting playback (seek,
//! rate change, replay) always means creating a fresh node.

use std::sync::Arc;

use tutor_core::DecodedAudio;

use crate::error::VoiceError;

mod virtual_graph;

#[cfg(feature = "local-playback")]
mod rodio_graph;

#[cfg(feature = "local-playback")]
pub use rodio_graph::RodioGraph;
pub use virtual_graph::{GraphEvent, VirtualGraph};

// ── AudioGraph ─────────────────────────────────────────────────────

/// Clock plus source factory.
pub trait AudioGraph: Send + Sync {
    /// Monotonically non-decreasing graph time, in seconds.
    fn current_time(&self) -> f64;

    /// Create an unconnected, unstarted source for `buffer`.
    fn create_source(&self, buffer: Arc<DecodedAudio>) -> Result<Box<dyn SourceNode>, VoiceError>;
}

// ── SourceNode ─────────────────────────────────────────────────────

/// A one-shot player for a single buffer.
///
/// Expected call order: `set_playback_rate`* → `connect` → `start` →
/// `stop`? → `disconnect`. Calling `stop` on a node that is not playing is an
/// error; callers tearing a session down treat that error as benign.
pub trait SourceNode: Send {
    /// Speed multiplier applied from `start` onwards.
    fn set_playback_rate(&mut self, rate: f32);

    /// Attach the node to the graph output.
    fn connect(&mut self) -> Result<(), VoiceError>;

    /// Begin playing `offset_secs` into the buffer.
    fn start(&mut self, offset_secs: f64) -> Result<(), VoiceError>;

    /// Halt playback.
    fn stop(&mut self) -> Result<(), VoiceError>;

    /// Detach from the graph output. Idempotent.
    fn disconnect(&mut self);
}
