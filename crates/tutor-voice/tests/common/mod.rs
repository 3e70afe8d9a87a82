//! Shared mocks for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tokio::sync::Notify;
use tutor_core::{
    GenerationError, GenerationPort, StudyConfig, SynthesisError, SynthesisPort, UserGoals,
    VoicePersona,
};
use tutor_voice::{PlaybackController, PlaybackEvent, VirtualGraph};

/// Base64 payload holding `secs` seconds of 24 kHz silence.
pub fn silence_payload(secs: f64) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let samples = (secs * 24_000.0) as usize;
    STANDARD.encode(vec![0u8; samples * 2])
}

// ── Mock synthesizer ───────────────────────────────────────────────

/// Returns a fixed-length silent payload, optionally parking each call until
/// the test releases it.
pub struct MockSynth {
    pub calls: AtomicUsize,
    pub voices: Mutex<Vec<VoicePersona>>,
    pub texts: Mutex<Vec<String>>,
    pub entered: Notify,
    pub release: Notify,
    gated: bool,
    failures_left: AtomicUsize,
    payload: String,
}

impl MockSynth {
    pub fn new(secs: f64) -> Arc<Self> {
        Arc::new(Self::build(false, 0, silence_payload(secs)))
    }

    /// Every call waits for `release` after signalling `entered`.
    pub fn gated(secs: f64) -> Arc<Self> {
        Arc::new(Self::build(true, 0, silence_payload(secs)))
    }

    /// The first `failures` calls fail with a network error.
    pub fn failing(failures: usize, secs: f64) -> Arc<Self> {
        Arc::new(Self::build(false, failures, silence_payload(secs)))
    }

    /// Returns three bytes of PCM, which cannot be whole 16-bit samples.
    pub fn odd_length() -> Arc<Self> {
        Arc::new(Self::build(false, 0, "AAAA".to_string()))
    }

    fn build(gated: bool, failures: usize, payload: String) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            voices: Mutex::new(Vec::new()),
            texts: Mutex::new(Vec::new()),
            entered: Notify::new(),
            release: Notify::new(),
            gated,
            failures_left: AtomicUsize::new(failures),
            payload,
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SynthesisPort for MockSynth {
    async fn synthesize(&self, text: &str, voice: VoicePersona) -> Result<String, SynthesisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.voices.lock().unwrap().push(voice);
        self.texts.lock().unwrap().push(text.to_string());

        if self.gated {
            self.entered.notify_one();
            self.release.notified().await;
        }

        let failed = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(SynthesisError::Network {
                message: "connection reset".into(),
            });
        }
        Ok(self.payload.clone())
    }
}

// ── Mock generator ─────────────────────────────────────────────────

pub struct MockGenerator {
    reply: Result<String, GenerationError>,
    pub seen_goals: Mutex<Vec<UserGoals>>,
}

impl MockGenerator {
    pub fn replying(reply: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.into()),
            seen_goals: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(error: GenerationError) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(error),
            seen_goals: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl GenerationPort for MockGenerator {
    async fn generate(&self, _prompt: &str, goals: &UserGoals) -> Result<String, GenerationError> {
        self.seen_goals.lock().unwrap().push(goals.clone());
        self.reply.clone()
    }
}

// ── Helpers ────────────────────────────────────────────────────────

pub fn controller(
    synth: Arc<MockSynth>,
    config: StudyConfig,
) -> (
    VirtualGraph,
    PlaybackController,
    tokio::sync::mpsc::UnboundedReceiver<PlaybackEvent>,
) {
    let graph = VirtualGraph::manual();
    let (controller, rx) = PlaybackController::new(Arc::new(graph.clone()), synth, config);
    (graph, controller, rx)
}

/// Drain all pending events from the event receiver and return them.
pub fn drain_events(
    rx: &mut tokio::sync::mpsc::UnboundedReceiver<PlaybackEvent>,
) -> Vec<PlaybackEvent> {
    let mut events = Vec::new();
    while let Ok(e) = rx.try_recv() {
        events.push(e);
    }
    events
}

/// Events minus the periodic progress noise.
pub fn without_progress(events: Vec<PlaybackEvent>) -> Vec<PlaybackEvent> {
    events
        .into_iter()
        .filter(|e| !matches!(e, PlaybackEvent::Progress { .. }))
        .collect()
}
