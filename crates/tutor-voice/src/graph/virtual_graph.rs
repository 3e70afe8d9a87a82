//! Silent audio graph with an inspectable clock.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use tutor_core::DecodedAudio;

use super::{AudioGraph, SourceNode};
use crate::error::VoiceError;
use crate::sync::lock;

/// Something that happened to a virtual source node.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphEvent {
    Created { node: u64 },
    Connected { node: u64 },
    Started { node: u64, offset: f64, rate: f32 },
    Stopped { node: u64 },
    Disconnected { node: u64 },
}

enum Clock {
    /// Time only moves when [`VirtualGraph::advance`] is called.
    Manual(f64),
    /// Wall-clock seconds since construction.
    Realtime(Instant),
}

struct Inner {
    clock: Mutex<Clock>,
    next_node: AtomicU64,
    connected: AtomicUsize,
    log: Mutex<Vec<GraphEvent>>,
}

impl Inner {
    fn record(&self, event: GraphEvent) {
        tracing::trace!(?event, "virtual graph");
        lock(&self.log).push(event);
    }
}

/// An [`AudioGraph`] that produces no sound.
///
/// Cloning is cheap and every clone observes the same clock and event log,
/// so a test can keep one handle while the engine owns another.
#[derive(Clone)]
pub struct VirtualGraph {
    inner: Arc<Inner>,
}

impl VirtualGraph {
    /// A graph whose clock starts at zero and advances only on request.
    #[must_use]
    pub fn manual() -> Self {
        Self::with_clock(Clock::Manual(0.0))
    }

    /// A graph whose clock follows wall time. Used when there is no output
    /// device but progress should still move.
    #[must_use]
    pub fn realtime() -> Self {
        Self::with_clock(Clock::Realtime(Instant::now()))
    }

    fn with_clock(clock: Clock) -> Self {
        Self {
            inner: Arc::new(Inner {
                clock: Mutex::new(clock),
                next_node: AtomicU64::new(1),
                connected: AtomicUsize::new(0),
                log: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Move a manual clock forward. Negative or non-finite steps and
    /// realtime clocks are ignored.
    pub fn advance(&self, secs: f64) {
        if !secs.is_finite() || secs < 0.0 {
            return;
        }
        if let Clock::Manual(now) = &mut *lock(&self.inner.clock) {
            *now += secs;
        }
    }

    /// Number of nodes currently attached to the output.
    #[must_use]
    pub fn connected_sources(&self) -> usize {
        self.inner.connected.load(Ordering::SeqCst)
    }

    /// Snapshot of every node event so far.
    #[must_use]
    pub fn events(&self) -> Vec<GraphEvent> {
        lock(&self.inner.log).clone()
    }

    /// How many `start` calls the graph has seen.
    #[must_use]
    pub fn start_count(&self) -> usize {
        lock(&self.inner.log)
            .iter()
            .filter(|e| matches!(e, GraphEvent::Started { .. }))
            .count()
    }
}

impl AudioGraph for VirtualGraph {
    fn current_time(&self) -> f64 {
        match &*lock(&self.inner.clock) {
            Clock::Manual(now) => *now,
            Clock::Realtime(epoch) => epoch.elapsed().as_secs_f64(),
        }
    }

    fn create_source(&self, buffer: Arc<DecodedAudio>) -> Result<Box<dyn SourceNode>, VoiceError> {
        let id = self.inner.next_node.fetch_add(1, Ordering::SeqCst);
        self.inner.record(GraphEvent::Created { node: id });
        Ok(Box::new(VirtualSource {
            id,
            graph: Arc::clone(&self.inner),
            _buffer: buffer,
            rate: 1.0,
            state: NodeState::Idle,
            connected: false,
        }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeState {
    Idle,
    Playing,
    Stopped,
}

struct VirtualSource {
    id: u64,
    graph: Arc<Inner>,
    _buffer: Arc<DecodedAudio>,
    rate: f32,
    state: NodeState,
    connected: bool,
}

impl SourceNode for VirtualSource {
    fn set_playback_rate(&mut self, rate: f32) {
        self.rate = rate;
    }

    fn connect(&mut self) -> Result<(), VoiceError> {
        if !self.connected {
            self.connected = true;
            self.graph.connected.fetch_add(1, Ordering::SeqCst);
            self.graph.record(GraphEvent::Connected { node: self.id });
        }
        Ok(())
    }

    fn start(&mut self, offset_secs: f64) -> Result<(), VoiceError> {
        if self.state != NodeState::Idle {
            return Err(VoiceError::SourceState("source can only be started once"));
        }
        self.state = NodeState::Playing;
        self.graph.record(GraphEvent::Started {
            node: self.id,
            offset: offset_secs,
            rate: self.rate,
        });
        Ok(())
    }

    fn stop(&mut self) -> Result<(), VoiceError> {
        if self.state != NodeState::Playing {
            return Err(VoiceError::SourceState("source is not playing"));
        }
        self.state = NodeState::Stopped;
        self.graph.record(GraphEvent::Stopped { node: self.id });
        Ok(())
    }

    fn disconnect(&mut self) {
        if self.connected {
            self.connected = false;
            self.graph.connected.fetch_sub(1, Ordering::SeqCst);
            self.graph.record(GraphEvent::Disconnected { node: self.id });
        }
    }
}

impl Drop for VirtualSource {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone() -> Arc<DecodedAudio> {
        Arc::new(DecodedAudio::mono(vec![0.0; 2_400], 24_000).unwrap())
    }

    #[test]
    fn test_manual_clock_only_moves_forward() {
        let graph = VirtualGraph::manual();
        assert!(graph.current_time().abs() < f64::EPSILON);
        graph.advance(1.25);
        graph.advance(-3.0);
        graph.advance(f64::NAN);
        assert!((graph.current_time() - 1.25).abs() < 1e-12);
    }

    #[test]
    fn test_stop_before_start_is_an_error() {
        let graph = VirtualGraph::manual();
        let mut node = graph.create_source(tone()).unwrap();
        assert!(matches!(node.stop(), Err(VoiceError::SourceState(_))));
        node.start(0.0).unwrap();
        node.stop().unwrap();
        assert!(node.stop().is_err());
    }

    #[test]
    fn test_dropping_node_disconnects() {
        let graph = VirtualGraph::manual();
        let mut node = graph.create_source(tone()).unwrap();
        node.connect().unwrap();
        assert_eq!(graph.connected_sources(), 1);
        drop(node);
        assert_eq!(graph.connected_sources(), 0);
    }
}
