//! Integration tests for `StudySession::send_message`.

mod common;

use std::sync::Arc;

use common::{MockGenerator, MockSynth, controller};
use tutor_core::{GenerationError, MessageRole, StudyConfig, UserGoals, VoicePersona};
use tutor_voice::{FALLBACK_REPLY, ReadOutcome, StudySession, VoiceError};

fn session(
    generator: Arc<MockGenerator>,
    synth: Arc<MockSynth>,
    config: StudyConfig,
) -> StudySession {
    let (_graph, controller, _rx) = controller(synth, config);
    StudySession::new(controller, generator, UserGoals::new("Pass biology", "Grade 10"))
}

#[tokio::test]
async fn reply_is_generated_voiced_and_played() {
    let generator = MockGenerator::replying("Cells are the **unit** of life.");
    let synth = MockSynth::new(1.5);
    let session = session(Arc::clone(&generator), Arc::clone(&synth), StudyConfig::default());

    let turn = session.send_message("  What is a cell?  ").await.unwrap();

    assert_eq!(turn.reply, "Cells are the **unit** of life.");
    assert!(matches!(turn.audio, Ok(ReadOutcome::Playing(_))));
    assert_eq!(synth.call_count(), 1);

    let messages = session.controller().messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, MessageRole::User);
    assert_eq!(messages[0].content, "What is a cell?");
    assert_eq!(messages[1].id, turn.assistant_id);
    assert!(!messages[1].is_typing);
    assert!(messages[1].has_audio());

    assert_eq!(
        *generator.seen_goals.lock().unwrap(),
        vec![UserGoals::new("Pass biology", "Grade 10")]
    );
}

#[tokio::test]
async fn autoplay_off_prefetches_only() {
    let config = StudyConfig::new(VoicePersona::Charon, 1.0, false);
    let synth = MockSynth::new(1.0);
    let session = session(MockGenerator::replying("Mitosis."), Arc::clone(&synth), config);

    let turn = session.send_message("Explain mitosis").await.unwrap();

    assert!(matches!(turn.audio, Ok(ReadOutcome::Cached)));
    assert!(session.controller().active_session().is_none());
    assert_eq!(*synth.voices.lock().unwrap(), vec![VoicePersona::Charon]);
}

#[tokio::test]
async fn generation_failure_shows_fallback() {
    let synth = MockSynth::new(1.0);
    let session = session(
        MockGenerator::failing(GenerationError::MissingCredential),
        Arc::clone(&synth),
        StudyConfig::default(),
    );

    let err = session.send_message("Hello").await.unwrap_err();
    assert!(matches!(
        err,
        VoiceError::Generation(GenerationError::MissingCredential)
    ));

    let messages = session.controller().messages();
    assert_eq!(messages[1].content, FALLBACK_REPLY);
    assert!(!messages[1].is_typing);
    assert!(!messages[1].has_audio());
    assert_eq!(synth.call_count(), 0);
}

#[tokio::test]
async fn audio_failure_keeps_reply() {
    let session = session(
        MockGenerator::replying("Still here."),
        MockSynth::failing(1, 1.0),
        StudyConfig::default(),
    );

    let turn = session.send_message("Hi").await.unwrap();
    assert!(matches!(turn.audio, Err(VoiceError::Synthesis(_))));
    let reply = session.controller().message(&turn.assistant_id).unwrap();
    assert_eq!(reply.content, "Still here.");
    assert!(!reply.has_audio());
}

#[tokio::test]
async fn blank_input_is_rejected() {
    let session = session(
        MockGenerator::replying("unused"),
        MockSynth::new(1.0),
        StudyConfig::default(),
    );
    assert!(matches!(
        session.send_message("   ").await.unwrap_err(),
        VoiceError::EmptyText
    ));
    assert!(session.controller().messages().is_empty());
}

#[test]
fn goals_can_be_replaced() {
    let session = session(
        MockGenerator::replying("unused"),
        MockSynth::new(1.0),
        StudyConfig::default(),
    );
    session.set_goals(UserGoals::new("Learn chemistry", ""));
    assert_eq!(session.goals().objectives, "Learn chemistry");
}
