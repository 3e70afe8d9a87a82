//! Playback controller, the read-aloud state machine.
//!
//! Owns the conversation, the generation guard, the playback engine and the
//! progress ticker, and turns user intents (read, stop, change speed, seek)
//! into engine operations. Observers follow along through a
//! [`PlaybackEvent`] channel.
//!
//! ```text
//!   on_manual_read ──► cached? ──yes──────────────────────────► play(0)
//!                        │no
//!                        ▼
//!                 guard.try_acquire ──taken──► AlreadyGenerating
//!                        │permit
//!                        ▼
//!            synthesize ─► decode ─► attach ─► intent unchanged? ──► play(0)
//!                                                   │moved on
//!                                                   ▼
//!                                              Superseded (cached only)
//! ```
//!
//! The controller is cheap to clone and every method takes `&self`. Locks are
//! never held across an `.await`.

use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use tokio::sync::mpsc;
use tutor_core::{
    Conversation, DecodedAudio, Message, MessageId, StudyConfig, SynthesisPort, VoicePersona,
};

use crate::engine::{PlaybackEngine, PlaybackSnapshot, SessionHandle};
use crate::error::VoiceError;
use crate::graph::AudioGraph;
use crate::guard::GenerationGuard;
use crate::sync::lock;
use crate::text_utils::clean_for_speech;
use crate::ticker::{DEFAULT_TICK, Ticker};
use crate::{pcm, wav};

// ── Public types ───────────────────────────────────────────────────

/// Tunables that are not part of the user-facing study config.
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    /// How often an active session reports progress.
    pub progress_interval: Duration,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            progress_interval: DEFAULT_TICK,
        }
    }
}

/// Why a playback session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// Played through to the end of the buffer.
    Finished,
    /// Stopped by the user (or a cleared conversation).
    Stopped,
    /// Replaced by another session (new read, seek or rate change).
    Superseded,
}

/// Events emitted by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    SessionStarted {
        handle: SessionHandle,
        offset: f64,
        duration: f64,
        rate: f32,
    },

    /// Periodic position update for the active session.
    Progress {
        handle: SessionHandle,
        position: f64,
        duration: f64,
        fraction: f64,
    },

    SessionEnded {
        handle: SessionHandle,
        reason: EndReason,
    },

    /// A message entered or left the generation guard.
    GeneratingChanged {
        message_id: MessageId,
        generating: bool,
    },

    /// Audio was decoded and attached to a message.
    AudioReady { message_id: MessageId, duration: f64 },

    /// Synthesis or decoding failed; the message keeps no audio.
    AudioFailed { message_id: MessageId, error: String },
}

/// Result of a read or autoplay request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Playback started with this session.
    Playing(SessionHandle),
    /// Audio is attached to the message but was not played.
    Cached,
    /// A synthesis for this message is already in flight; nothing was done.
    AlreadyGenerating,
    /// Synthesis finished after a newer intent; audio cached, not played.
    Superseded,
    /// The message disappeared while its audio was being synthesized.
    Discarded,
    /// Autoplay is switched off.
    AutoplayDisabled,
    /// The audio could not be played (zero-length buffer).
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    Play,
    CacheOnly,
}

// ── Controller ─────────────────────────────────────────────────────

struct Inner {
    engine: Mutex<PlaybackEngine>,
    conversation: Mutex<Conversation>,
    config: Mutex<StudyConfig>,
    guard: GenerationGuard,
    synthesizer: Arc<dyn SynthesisPort>,
    ticker: Mutex<Option<Ticker>>,
    /// Bumped by every accepted playback intent.
    intent: AtomicU64,
    event_tx: mpsc::UnboundedSender<PlaybackEvent>,
    settings: ControllerSettings,
}

/// Read-aloud state machine shared by the CLI and the study session.
#[derive(Clone)]
pub struct PlaybackController {
    inner: Arc<Inner>,
}

impl PlaybackController {
    /// Create a controller with default settings.
    ///
    /// Returns the controller and the event receiver; dropping the receiver
    /// is allowed but every emitted event then logs a warning.
    pub fn new(
        graph: Arc<dyn AudioGraph>,
        synthesizer: Arc<dyn SynthesisPort>,
        config: StudyConfig,
    ) -> (Self, mpsc::UnboundedReceiver<PlaybackEvent>) {
        Self::with_settings(graph, synthesizer, config, ControllerSettings::default())
    }

    pub fn with_settings(
        graph: Arc<dyn AudioGraph>,
        synthesizer: Arc<dyn SynthesisPort>,
        config: StudyConfig,
        settings: ControllerSettings,
    ) -> (Self, mpsc::UnboundedReceiver<PlaybackEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let controller = Self {
            inner: Arc::new(Inner {
                engine: Mutex::new(PlaybackEngine::new(graph)),
                conversation: Mutex::new(Conversation::new()),
                config: Mutex::new(config),
                guard: GenerationGuard::new(),
                synthesizer,
                ticker: Mutex::new(None),
                intent: AtomicU64::new(0),
                event_tx,
                settings,
            }),
        };
        (controller, event_rx)
    }

    // ── Conversation ───────────────────────────────────────────────

    pub fn push_message(&self, message: Message) -> MessageId {
        lock(&self.inner.conversation).push(message)
    }

    /// Fill in a placeholder's text. Returns `false` if the message is gone.
    pub fn resolve_content(&self, id: &MessageId, content: &str) -> bool {
        lock(&self.inner.conversation).resolve_content(id, content)
    }

    #[must_use]
    pub fn message(&self, id: &MessageId) -> Option<Message> {
        lock(&self.inner.conversation).get(id).cloned()
    }

    /// Snapshot of the whole conversation, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<Message> {
        lock(&self.inner.conversation).iter().cloned().collect()
    }

    /// Stop playback, then drop every message.
    pub fn clear_conversation(&self) {
        self.on_stop();
        lock(&self.inner.conversation).clear();
        tracing::info!("Conversation cleared");
    }

    // ── Configuration ──────────────────────────────────────────────

    #[must_use]
    pub fn config(&self) -> StudyConfig {
        *lock(&self.inner.config)
    }

    pub fn set_voice(&self, voice: VoicePersona) {
        lock(&self.inner.config).voice = voice;
    }

    pub fn set_auto_play(&self, enabled: bool) {
        lock(&self.inner.config).auto_play = enabled;
    }

    // ── Intents ────────────────────────────────────────────────────

    /// The user asked to hear a message.
    pub async fn on_manual_read(&self, id: &MessageId) -> Result<ReadOutcome, VoiceError> {
        self.read(id, Delivery::Play).await
    }

    /// A reply just finished generating; play it if autoplay is on.
    pub async fn on_autoplay_after_generation(
        &self,
        id: &MessageId,
    ) -> Result<ReadOutcome, VoiceError> {
        if !self.config().auto_play {
            tracing::debug!(message_id = %id, "Autoplay disabled, skipping");
            return Ok(ReadOutcome::AutoplayDisabled);
        }
        self.read(id, Delivery::Play).await
    }

    /// Synthesize and attach audio without playing it.
    pub async fn prefetch(&self, id: &MessageId) -> Result<ReadOutcome, VoiceError> {
        self.read(id, Delivery::CacheOnly).await
    }

    /// Stop playback. Always succeeds; returns the session that ended.
    pub fn on_stop(&self) -> Option<SessionHandle> {
        self.bump_intent();
        let mut engine = lock(&self.inner.engine);
        let ended = engine.stop();
        self.cancel_ticker();
        if let Some(handle) = &ended {
            self.emit(PlaybackEvent::SessionEnded {
                handle: handle.clone(),
                reason: EndReason::Stopped,
            });
        }
        drop(engine);
        ended
    }

    /// Change the playback rate. An active session restarts from its current
    /// position at the new rate. Returns the rate actually applied.
    pub fn on_rate_change(&self, rate: f32) -> Result<f32, VoiceError> {
        let applied = lock(&self.inner.config).set_speed(rate);
        tracing::debug!(requested = rate, applied, "Playback rate changed");

        let mut engine = lock(&self.inner.engine);
        let previous = engine.active_session();
        let result = engine.set_rate(applied);
        self.reconcile(&engine, previous);
        drop(engine);

        result.map(|_| applied)
    }

    /// Jump to `position` seconds in the active session.
    pub fn on_seek(&self, position: f64) -> Result<Option<SessionHandle>, VoiceError> {
        let mut engine = lock(&self.inner.engine);
        let previous = engine.active_session();
        let result = engine.seek(position);
        self.reconcile(&engine, previous);
        drop(engine);

        result
    }

    // ── Progress ───────────────────────────────────────────────────

    /// Poll the active session once, emitting progress or completion.
    ///
    /// The ticker calls this automatically; callers without a runtime can
    /// drive it by hand.
    pub fn tick(&self) -> Option<PlaybackSnapshot> {
        self.poll(None)
    }

    /// Current position without side effects.
    #[must_use]
    pub fn progress_snapshot(&self) -> Option<PlaybackSnapshot> {
        lock(&self.inner.engine).snapshot()
    }

    #[must_use]
    pub fn active_session(&self) -> Option<SessionHandle> {
        lock(&self.inner.engine).active_session()
    }

    #[must_use]
    pub fn is_generating(&self, id: &MessageId) -> bool {
        self.inner.guard.contains(id)
    }

    // ── Export ─────────────────────────────────────────────────────

    /// WAV bytes for a message's audio.
    pub fn export_wav(&self, id: &MessageId) -> Result<Vec<u8>, VoiceError> {
        let audio = self.cached_audio(id)?;
        Ok(wav::encode(&audio))
    }

    /// Write a message's audio into `dir`, returning the file path.
    pub fn save_wav(&self, id: &MessageId, dir: &Path) -> Result<PathBuf, VoiceError> {
        let audio = self.cached_audio(id)?;
        let path = dir.join(wav::export_file_name(id));
        wav::write_wav(&path, &audio)?;
        Ok(path)
    }

    // ── Internals ──────────────────────────────────────────────────

    fn cached_audio(&self, id: &MessageId) -> Result<Arc<DecodedAudio>, VoiceError> {
        let conversation = lock(&self.inner.conversation);
        let message = conversation
            .get(id)
            .ok_or_else(|| VoiceError::UnknownMessage(id.clone()))?;
        message
            .audio()
            .cloned()
            .ok_or_else(|| VoiceError::NoAudio(id.clone()))
    }

    async fn read(&self, id: &MessageId, delivery: Delivery) -> Result<ReadOutcome, VoiceError> {
        let (text, cached) = {
            let conversation = lock(&self.inner.conversation);
            let message = conversation
                .get(id)
                .ok_or_else(|| VoiceError::UnknownMessage(id.clone()))?;
            (message.content.clone(), message.audio().cloned())
        };

        if let Some(audio) = cached {
            return match delivery {
                Delivery::CacheOnly => Ok(ReadOutcome::Cached),
                Delivery::Play => {
                    self.bump_intent();
                    self.start_playback(id, audio)
                }
            };
        }

        let speech = clean_for_speech(&text);
        if speech.is_empty() {
            return Err(VoiceError::EmptyText);
        }

        let Some(permit) = self.inner.guard.try_acquire(id) else {
            tracing::debug!(message_id = %id, "Synthesis already in flight, ignoring request");
            return Ok(ReadOutcome::AlreadyGenerating);
        };

        let intent = match delivery {
            Delivery::Play => self.bump_intent(),
            Delivery::CacheOnly => self.current_intent(),
        };

        self.emit(PlaybackEvent::GeneratingChanged {
            message_id: id.clone(),
            generating: true,
        });
        let result = self.synthesize_and_attach(id, &speech).await;
        drop(permit);
        self.emit(PlaybackEvent::GeneratingChanged {
            message_id: id.clone(),
            generating: false,
        });

        let audio = match result {
            Ok(Some(audio)) => audio,
            Ok(None) => return Ok(ReadOutcome::Discarded),
            Err(e) => {
                tracing::warn!(message_id = %id, error = %e, "Failed to generate audio");
                self.emit(PlaybackEvent::AudioFailed {
                    message_id: id.clone(),
                    error: e.to_string(),
                });
                return Err(e);
            }
        };

        match delivery {
            Delivery::CacheOnly => Ok(ReadOutcome::Cached),
            Delivery::Play if self.current_intent() != intent => {
                tracing::debug!(
                    message_id = %id,
                    "Newer playback intent arrived during synthesis, not playing"
                );
                Ok(ReadOutcome::Superseded)
            }
            Delivery::Play => self.start_playback(id, audio),
        }
    }

    /// Returns `Ok(None)` if the message was removed while synthesizing.
    async fn synthesize_and_attach(
        &self,
        id: &MessageId,
        speech: &str,
    ) -> Result<Option<Arc<DecodedAudio>>, VoiceError> {
        let voice = self.config().voice;
        tracing::debug!(message_id = %id, %voice, chars = speech.len(), "Synthesizing speech");

        let payload = self.inner.synthesizer.synthesize(speech, voice).await?;
        let audio = Arc::new(pcm::decode(&payload)?);

        let attached = {
            let mut conversation = lock(&self.inner.conversation);
            let Some(message) = conversation.get_mut(id) else {
                tracing::debug!(message_id = %id, "Message removed during synthesis");
                return Ok(None);
            };
            message.attach_audio(Arc::clone(&audio));
            message.audio().cloned().unwrap_or(audio)
        };

        self.emit(PlaybackEvent::AudioReady {
            message_id: id.clone(),
            duration: attached.duration_secs(),
        });
        Ok(Some(attached))
    }

    fn start_playback(
        &self,
        id: &MessageId,
        audio: Arc<DecodedAudio>,
    ) -> Result<ReadOutcome, VoiceError> {
        let rate = self.config().speed();

        let mut engine = lock(&self.inner.engine);
        let previous = engine.active_session();
        let result = engine.play(id.clone(), audio, 0.0, rate);
        self.reconcile(&engine, previous);
        drop(engine);

        match result {
            Ok(handle) => Ok(ReadOutcome::Playing(handle)),
            Err(VoiceError::InvalidAudio { message_id }) => {
                tracing::warn!(message_id = %message_id, "Ignoring read of zero-length audio");
                Ok(ReadOutcome::Ignored)
            }
            Err(e) => Err(e),
        }
    }

    /// Emit session events and move the ticker after an engine call that may
    /// have replaced, ended or kept the active session.
    ///
    /// Must run under the engine lock so ticker swaps happen in the same
    /// order as the engine calls that caused them.
    fn reconcile(&self, engine: &PlaybackEngine, previous: Option<SessionHandle>) {
        let snapshot = engine.snapshot();
        let current = snapshot.as_ref().map(|s| &s.handle);
        if previous.as_ref() == current {
            return;
        }

        if let Some(handle) = previous {
            let reason = if current.is_some() {
                EndReason::Superseded
            } else {
                EndReason::Stopped
            };
            self.emit(PlaybackEvent::SessionEnded { handle, reason });
        }

        match snapshot {
            Some(snapshot) => {
                self.emit(PlaybackEvent::SessionStarted {
                    handle: snapshot.handle.clone(),
                    offset: snapshot.position,
                    duration: snapshot.duration,
                    rate: snapshot.rate,
                });
                self.restart_ticker(snapshot.handle);
            }
            None => self.cancel_ticker(),
        }
    }

    fn poll(&self, expected: Option<&SessionHandle>) -> Option<PlaybackSnapshot> {
        let mut engine = lock(&self.inner.engine);
        let snapshot = engine.snapshot()?;
        if expected.is_some_and(|h| *h != snapshot.handle) {
            return None;
        }
        let finished = snapshot.is_finished();
        if finished {
            engine.stop();
        }

        self.emit(PlaybackEvent::Progress {
            handle: snapshot.handle.clone(),
            position: snapshot.position,
            duration: snapshot.duration,
            fraction: snapshot.fraction(),
        });
        if finished {
            tracing::debug!(message_id = %snapshot.handle.message_id, "Playback finished");
            self.emit(PlaybackEvent::SessionEnded {
                handle: snapshot.handle.clone(),
                reason: EndReason::Finished,
            });
            if expected.is_none() {
                self.cancel_ticker();
            }
        }
        drop(engine);
        Some(snapshot)
    }

    fn restart_ticker(&self, handle: SessionHandle) {
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let ticker = Ticker::spawn(self.inner.settings.progress_interval, move || {
            let Some(inner) = weak.upgrade() else {
                return ControlFlow::Break(());
            };
            let controller = Self { inner };
            match controller.poll(Some(&handle)) {
                Some(snapshot) if !snapshot.is_finished() => ControlFlow::Continue(()),
                _ => ControlFlow::Break(()),
            }
        });
        // Dropping the previous ticker aborts it.
        *lock(&self.inner.ticker) = ticker;
    }

    fn cancel_ticker(&self) {
        if let Some(ticker) = lock(&self.inner.ticker).take() {
            ticker.cancel();
        }
    }

    fn bump_intent(&self) -> u64 {
        self.inner.intent.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn current_intent(&self) -> u64 {
        self.inner.intent.load(Ordering::SeqCst)
    }

    /// Emit a playback event. If the receiver is dropped, log and move on.
    fn emit(&self, event: PlaybackEvent) {
        if self.inner.event_tx.send(event).is_err() {
            tracing::warn!("Playback event receiver dropped");
        }
    }
}
