//! Playback engine: owns at most one playback session.
//!
//! A session is one buffer playing from one start offset at one rate. Seeking
//! and rate changes restart the session from the current position on a fresh
//! source node. Position is derived from the graph clock, never from the
//! output device:
//!
//! ```text
//! position = min(offset_at_start + (now - graph_time_at_start) * rate, duration)
//! ```

use std::sync::Arc;

use tutor_core::{DecodedAudio, MessageId, clamp_rate};

use crate::error::VoiceError;
use crate::graph::{AudioGraph, SourceNode};

/// Identifies one playback session.
///
/// `generation` increases with every session the engine starts, so two
/// sessions for the same message are still distinguishable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionHandle {
    pub message_id: MessageId,
    pub generation: u64,
}

/// Point-in-time view of the active session.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSnapshot {
    pub handle: SessionHandle,
    pub position: f64,
    pub duration: f64,
    pub rate: f32,
}

impl PlaybackSnapshot {
    /// Position as a fraction of duration in `[0, 1]`.
    #[must_use]
    pub fn fraction(&self) -> f64 {
        if self.duration > 0.0 {
            (self.position / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.position >= self.duration
    }
}

struct ActiveSession {
    handle: SessionHandle,
    audio: Arc<DecodedAudio>,
    node: Box<dyn SourceNode>,
    offset_at_start: f64,
    graph_time_at_start: f64,
    rate: f32,
}

impl ActiveSession {
    fn position(&self, now: f64) -> f64 {
        let elapsed = (now - self.graph_time_at_start).max(0.0) * f64::from(self.rate);
        (self.offset_at_start + elapsed).min(self.audio.duration_secs())
    }
}

/// Single-session playback over an [`AudioGraph`].
pub struct PlaybackEngine {
    graph: Arc<dyn AudioGraph>,
    session: Option<ActiveSession>,
    generation: u64,
}

impl PlaybackEngine {
    pub fn new(graph: Arc<dyn AudioGraph>) -> Self {
        Self {
            graph,
            session: None,
            generation: 0,
        }
    }

    /// Start playing `audio` for `message_id`, replacing any active session.
    ///
    /// `start_offset` is clamped into `[0, duration]` and `rate` into the
    /// supported range. A zero-length buffer is rejected before the current
    /// session is touched.
    pub fn play(
        &mut self,
        message_id: MessageId,
        audio: Arc<DecodedAudio>,
        start_offset: f64,
        rate: f32,
    ) -> Result<SessionHandle, VoiceError> {
        let duration = audio.duration_secs();
        if duration <= 0.0 {
            tracing::warn!(message_id = %message_id, "Refusing to play empty audio buffer");
            return Err(VoiceError::InvalidAudio { message_id });
        }

        self.teardown();

        let offset = if start_offset.is_finite() {
            start_offset.clamp(0.0, duration)
        } else {
            0.0
        };
        let rate = clamp_rate(rate);

        let mut node = self.graph.create_source(Arc::clone(&audio))?;
        node.set_playback_rate(rate);
        if let Err(e) = node.connect().and_then(|()| node.start(offset)) {
            node.disconnect();
            return Err(e);
        }
        let graph_time_at_start = self.graph.current_time();

        self.generation += 1;
        let handle = SessionHandle {
            message_id,
            generation: self.generation,
        };

        tracing::debug!(
            message_id = %handle.message_id,
            generation = handle.generation,
            offset,
            rate,
            duration,
            "Playback session started"
        );

        self.session = Some(ActiveSession {
            handle: handle.clone(),
            audio,
            node,
            offset_at_start: offset,
            graph_time_at_start,
            rate,
        });
        Ok(handle)
    }

    /// End the active session, if any. Idempotent.
    pub fn stop(&mut self) -> Option<SessionHandle> {
        self.teardown()
    }

    fn teardown(&mut self) -> Option<SessionHandle> {
        let mut session = self.session.take()?;
        // A node that already ran to completion refuses a second stop; that
        // is expected here.
        if let Err(e) = session.node.stop() {
            tracing::debug!(error = %e, "Ignoring stop error during teardown");
        }
        session.node.disconnect();
        tracing::debug!(
            message_id = %session.handle.message_id,
            generation = session.handle.generation,
            "Playback session ended"
        );
        Some(session.handle)
    }

    /// Current position in seconds; `0.0` when idle.
    #[must_use]
    pub fn current_position(&self) -> f64 {
        let now = self.graph.current_time();
        self.session.as_ref().map_or(0.0, |s| s.position(now))
    }

    /// Duration of the active buffer; `0.0` when idle.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.session
            .as_ref()
            .map_or(0.0, |s| s.audio.duration_secs())
    }

    /// Whether the active session has reached the end of its buffer.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.snapshot().is_some_and(|s| s.is_finished())
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<PlaybackSnapshot> {
        let session = self.session.as_ref()?;
        Some(PlaybackSnapshot {
            handle: session.handle.clone(),
            position: session.position(self.graph.current_time()),
            duration: session.audio.duration_secs(),
            rate: session.rate,
        })
    }

    #[must_use]
    pub fn active_session(&self) -> Option<SessionHandle> {
        self.session.as_ref().map(|s| s.handle.clone())
    }

    /// Whether `handle` still names the active session.
    #[must_use]
    pub fn is_current(&self, handle: &SessionHandle) -> bool {
        self.session.as_ref().is_some_and(|s| &s.handle == handle)
    }

    /// Restart the active session at `rate` from the current position.
    ///
    /// Returns the new handle, or `None` when nothing is playing.
    pub fn set_rate(&mut self, rate: f32) -> Result<Option<SessionHandle>, VoiceError> {
        let Some((message_id, audio)) = self.current_buffer() else {
            return Ok(None);
        };
        let position = self.current_position();
        self.play(message_id, audio, position, rate).map(Some)
    }

    /// Restart the active session at `position`, keeping its rate.
    pub fn seek(&mut self, position: f64) -> Result<Option<SessionHandle>, VoiceError> {
        let Some(rate) = self.session.as_ref().map(|s| s.rate) else {
            return Ok(None);
        };
        let Some((message_id, audio)) = self.current_buffer() else {
            return Ok(None);
        };
        self.play(message_id, audio, position, rate).map(Some)
    }

    fn current_buffer(&self) -> Option<(MessageId, Arc<DecodedAudio>)> {
        self.session
            .as_ref()
            .map(|s| (s.handle.message_id.clone(), Arc::clone(&s.audio)))
    }
}

impl Drop for PlaybackEngine {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::VirtualGraph;

    fn seconds(secs: u32) -> Arc<DecodedAudio> {
        Arc::new(DecodedAudio::mono(vec![0.0; 24_000 * secs as usize], 24_000).unwrap())
    }

    fn engine() -> (VirtualGraph, PlaybackEngine) {
        let graph = VirtualGraph::manual();
        let engine = PlaybackEngine::new(Arc::new(graph.clone()));
        (graph, engine)
    }

    #[test]
    fn test_position_follows_clock_and_rate() {
        let (graph, mut engine) = engine();
        engine.play("m1".into(), seconds(10), 0.0, 2.0).unwrap();
        graph.advance(1.5);
        assert!((engine.current_position() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_position_clamps_to_duration() {
        let (graph, mut engine) = engine();
        engine.play("m1".into(), seconds(2), 0.0, 1.0).unwrap();
        graph.advance(5.0);
        assert!((engine.current_position() - 2.0).abs() < 1e-9);
        assert!(engine.is_finished());
    }

    #[test]
    fn test_offset_is_clamped_into_buffer() {
        let (_graph, mut engine) = engine();
        engine.play("m1".into(), seconds(2), 9.0, 1.0).unwrap();
        assert!((engine.current_position() - 2.0).abs() < 1e-9);
        engine.play("m1".into(), seconds(2), -1.0, 1.0).unwrap();
        assert!(engine.current_position().abs() < 1e-9);
    }

    #[test]
    fn test_empty_buffer_rejected_without_teardown() {
        let (graph, mut engine) = engine();
        let handle = engine.play("m1".into(), seconds(3), 0.0, 1.0).unwrap();
        let empty = Arc::new(DecodedAudio::mono(Vec::new(), 24_000).unwrap());
        let err = engine.play("m2".into(), empty, 0.0, 1.0).unwrap_err();
        assert!(matches!(err, VoiceError::InvalidAudio { .. }));
        assert!(engine.is_current(&handle));
        assert_eq!(graph.connected_sources(), 1);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (graph, mut engine) = engine();
        let handle = engine.play("m1".into(), seconds(3), 0.0, 1.0).unwrap();
        assert_eq!(engine.stop(), Some(handle));
        assert_eq!(engine.stop(), None);
        assert_eq!(graph.connected_sources(), 0);
        assert!(engine.current_position().abs() < f64::EPSILON);
    }

    #[test]
    fn test_generation_increases_per_session() {
        let (_graph, mut engine) = engine();
        let a = engine.play("m1".into(), seconds(1), 0.0, 1.0).unwrap();
        let b = engine.play("m1".into(), seconds(1), 0.0, 1.0).unwrap();
        assert_eq!(a.message_id, b.message_id);
        assert!(b.generation > a.generation);
        assert!(!engine.is_current(&a));
    }

    #[test]
    fn test_seek_keeps_rate() {
        let (graph, mut engine) = engine();
        engine.play("m1".into(), seconds(10), 0.0, 1.5).unwrap();
        engine.seek(4.0).unwrap().unwrap();
        graph.advance(2.0);
        assert!((engine.current_position() - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_rate_change_when_idle_is_noop() {
        let (graph, mut engine) = engine();
        assert_eq!(engine.set_rate(1.5).unwrap(), None);
        assert_eq!(graph.start_count(), 0);
    }
}
