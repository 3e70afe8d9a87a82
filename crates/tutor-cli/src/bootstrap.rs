//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the CLI adapter:
//! - Gemini client (via tutor-gemini) for both replies and speech
//! - Audio graph (rodio when built with `local-playback`, otherwise a silent
//!   realtime graph)
//! - Playback controller and study session (via tutor-voice)
//!
//! Command handlers receive the composed [`CliContext`].

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc::UnboundedReceiver;
use tutor_core::{GenerationPort, StudyConfig, SynthesisPort, UserGoals};
use tutor_gemini::{DefaultGeminiClient, GeminiClientConfig};
use tutor_voice::{AudioGraph, PlaybackController, PlaybackEvent, StudySession, VirtualGraph};

use crate::parser::StudyArgs;

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub study: StudyConfig,
    pub goals: UserGoals,
    pub api_key: Option<String>,
}

impl CliConfig {
    /// Build config from parsed flags (which already include env fallbacks).
    pub fn from_args(args: &StudyArgs) -> Self {
        Self {
            study: args.study_config(),
            goals: args.goals(),
            api_key: args.api_key.clone(),
        }
    }
}

/// Fully composed application context for CLI commands.
pub struct CliContext {
    session: StudySession,
    events: Mutex<Option<UnboundedReceiver<PlaybackEvent>>>,
}

impl CliContext {
    pub const fn session(&self) -> &StudySession {
        &self.session
    }

    pub const fn controller(&self) -> &PlaybackController {
        self.session.controller()
    }

    /// Take the controller's event stream. Only one consumer can hold it;
    /// later calls return `None`.
    pub fn take_events(&self) -> Option<UnboundedReceiver<PlaybackEvent>> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

/// Bootstrap the CLI context against the Gemini API and the local audio
/// output.
pub fn bootstrap(config: CliConfig) -> CliContext {
    let gemini_config = GeminiClientConfig::new().with_optional_api_key(config.api_key.clone());
    if !gemini_config.has_api_key() {
        tracing::warn!("GEMINI_API_KEY is not set; tutor requests will fail");
    }
    let gemini = Arc::new(DefaultGeminiClient::new(&gemini_config));

    compose(config, open_graph(), gemini.clone(), gemini)
}

/// Wire a context from explicit collaborators.
pub fn compose(
    config: CliConfig,
    graph: Arc<dyn AudioGraph>,
    generator: Arc<dyn GenerationPort>,
    synthesizer: Arc<dyn SynthesisPort>,
) -> CliContext {
    tracing::debug!(
        voice = %config.study.voice,
        speed = config.study.speed(),
        auto_play = config.study.auto_play,
        "Composing study session"
    );
    let (controller, events) = PlaybackController::new(graph, synthesizer, config.study);
    let session = StudySession::new(controller, generator, config.goals);
    CliContext {
        session,
        events: Mutex::new(Some(events)),
    }
}

#[cfg(feature = "local-playback")]
fn open_graph() -> Arc<dyn AudioGraph> {
    match tutor_voice::RodioGraph::open_default() {
        Ok(graph) => Arc::new(graph),
        Err(e) => {
            tracing::warn!(error = %e, "No audio output available, playback will be silent");
            Arc::new(VirtualGraph::realtime())
        }
    }
}

#[cfg(not(feature = "local-playback"))]
fn open_graph() -> Arc<dyn AudioGraph> {
    tracing::debug!("Built without local-playback, using silent realtime graph");
    Arc::new(VirtualGraph::realtime())
}
