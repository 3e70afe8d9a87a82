//! Chat turn orchestration: generate a reply, then voice it.

use std::sync::{Arc, Mutex};

use tutor_core::{GenerationPort, Message, MessageId, MessageRole, UserGoals};

use crate::controller::{PlaybackController, ReadOutcome};
use crate::error::VoiceError;
use crate::sync::lock;

/// Shown in place of a reply when generation fails.
pub const FALLBACK_REPLY: &str = "Sorry, I encountered an error processing your request.";

/// Outcome of one successful [`StudySession::send_message`].
#[derive(Debug)]
pub struct Turn {
    pub user_id: MessageId,
    pub assistant_id: MessageId,
    pub reply: String,
    /// What happened to the reply's audio. Failures here never undo the
    /// reply itself.
    pub audio: Result<ReadOutcome, VoiceError>,
}

/// A tutoring conversation: goals, a reply generator and a playback
/// controller that owns the message list.
pub struct StudySession {
    controller: PlaybackController,
    generator: Arc<dyn GenerationPort>,
    goals: Mutex<UserGoals>,
}

impl StudySession {
    pub fn new(
        controller: PlaybackController,
        generator: Arc<dyn GenerationPort>,
        goals: UserGoals,
    ) -> Self {
        Self {
            controller,
            generator,
            goals: Mutex::new(goals),
        }
    }

    #[must_use]
    pub const fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    #[must_use]
    pub fn goals(&self) -> UserGoals {
        lock(&self.goals).clone()
    }

    pub fn set_goals(&self, goals: UserGoals) {
        *lock(&self.goals) = goals;
    }

    /// Send a learner message and produce the tutor's reply.
    ///
    /// Appends the user message and a typing placeholder, generates the reply,
    /// then fetches its audio (playing it when autoplay is on). If generation
    /// fails the placeholder shows [`FALLBACK_REPLY`] and the error is
    /// returned.
    pub async fn send_message(&self, text: &str) -> Result<Turn, VoiceError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(VoiceError::EmptyText);
        }

        let user_id = self
            .controller
            .push_message(Message::new(MessageRole::User, text));
        let assistant_id = self.controller.push_message(Message::placeholder());
        let goals = self.goals();

        tracing::debug!(%user_id, %assistant_id, chars = text.len(), "Generating reply");
        let reply = match self.generator.generate(text, &goals).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(error = %e, "Reply generation failed");
                self.controller.resolve_content(&assistant_id, FALLBACK_REPLY);
                return Err(VoiceError::Generation(e));
            }
        };

        if !self.controller.resolve_content(&assistant_id, &reply) {
            tracing::debug!(%assistant_id, "Conversation cleared before reply arrived");
            return Ok(Turn {
                user_id,
                assistant_id,
                reply,
                audio: Ok(ReadOutcome::Discarded),
            });
        }

        let audio = if self.controller.config().auto_play {
            self.controller
                .on_autoplay_after_generation(&assistant_id)
                .await
        } else {
            self.controller.prefetch(&assistant_id).await
        };
        if let Err(e) = &audio {
            tracing::warn!(%assistant_id, error = %e, "Reply audio unavailable");
        }

        Ok(Turn {
            user_id,
            assistant_id,
            reply,
            audio,
        })
    }
}
