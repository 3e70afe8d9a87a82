//! End-to-end CLI flows against mock services and a virtual audio graph.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tutor_cli::handlers::speak;
use tutor_cli::{CliConfig, CliContext, compose};
use tutor_core::{
    GenerationError, GenerationPort, StudyConfig, SynthesisError, SynthesisPort, UserGoals,
    VoicePersona,
};
use tutor_voice::{FALLBACK_REPLY, ReadOutcome, VirtualGraph, VoiceError};

/// Base64 of `bytes` zero bytes (a multiple of 3), i.e. silent PCM.
fn silence(bytes: usize) -> String {
    "AAAA".repeat(bytes / 3)
}

struct CannedTutor {
    reply: Result<String, GenerationError>,
}

#[async_trait]
impl GenerationPort for CannedTutor {
    async fn generate(&self, _prompt: &str, _goals: &UserGoals) -> Result<String, GenerationError> {
        self.reply.clone()
    }
}

struct SilentVoice {
    bytes: usize,
    calls: AtomicUsize,
}

impl SilentVoice {
    fn new(bytes: usize) -> Arc<Self> {
        Arc::new(Self {
            bytes,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl SynthesisPort for SilentVoice {
    async fn synthesize(&self, _text: &str, _voice: VoicePersona) -> Result<String, SynthesisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(silence(self.bytes))
    }
}

fn context(
    reply: Result<String, GenerationError>,
    voice: Arc<SilentVoice>,
    auto_play: bool,
) -> CliContext {
    let config = CliConfig {
        study: StudyConfig::new(VoicePersona::Kore, 1.0, auto_play),
        goals: UserGoals::new("chemistry", ""),
        api_key: None,
    };
    compose(
        config,
        Arc::new(VirtualGraph::realtime()),
        Arc::new(CannedTutor { reply }),
        voice,
    )
}

#[tokio::test]
async fn events_can_only_be_taken_once() {
    let ctx = context(Ok("hi".into()), SilentVoice::new(3), false);
    assert!(ctx.take_events().is_some());
    assert!(ctx.take_events().is_none());
}

#[tokio::test]
async fn speak_without_playing_exports_wav() {
    let voice = SilentVoice::new(4800);
    let ctx = context(Ok(String::new()), voice.clone(), false);
    let dir = tempfile::tempdir().unwrap();

    speak::execute(
        &ctx,
        "**Osmosis** moves water".into(),
        Some(dir.path().to_path_buf()),
        true,
    )
    .await
    .unwrap();

    assert_eq!(voice.calls.load(Ordering::SeqCst), 1);
    assert!(ctx.controller().active_session().is_none());

    let messages = ctx.controller().messages();
    assert_eq!(messages.len(), 1);
    let path = dir
        .path()
        .join(format!("study-tutor-{}.wav", messages[0].id));
    let bytes = std::fs::read(path).unwrap();
    assert_eq!(&bytes[..4], b"RIFF");
    assert_eq!(bytes.len(), 44 + 4800);
}

#[tokio::test]
async fn speak_plays_until_finished() {
    // 0.05 s of audio on a wall-clock graph
    let ctx = context(Ok(String::new()), SilentVoice::new(2400), false);

    speak::execute(&ctx, "Short sentence.".into(), None, false)
        .await
        .unwrap();

    assert!(ctx.controller().active_session().is_none());
    assert!(ctx.controller().messages()[0].has_audio());
}

#[tokio::test]
async fn speak_rejects_blank_text() {
    let ctx = context(Ok(String::new()), SilentVoice::new(3), false);
    let err = speak::execute(&ctx, "  **  ".into(), None, true)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Nothing to speak"));
}

#[tokio::test]
async fn session_reply_is_cached_when_autoplay_off() {
    let voice = SilentVoice::new(2400);
    let ctx = context(Ok("Water follows salt.".into()), voice.clone(), false);

    let turn = ctx.session().send_message("why?").await.unwrap();

    assert_eq!(turn.reply, "Water follows salt.");
    assert!(matches!(turn.audio, Ok(ReadOutcome::Cached)));
    assert_eq!(voice.calls.load(Ordering::SeqCst), 1);
    assert!(ctx.controller().active_session().is_none());
}

#[tokio::test]
async fn generation_failure_leaves_fallback_reply() {
    let voice = SilentVoice::new(3);
    let ctx = context(Err(GenerationError::MissingCredential), voice.clone(), true);

    let err = ctx.session().send_message("hello").await.unwrap_err();

    assert!(matches!(err, VoiceError::Generation(_)));
    let messages = ctx.controller().messages();
    assert_eq!(messages[1].content, FALLBACK_REPLY);
    assert_eq!(voice.calls.load(Ordering::SeqCst), 0);
}
