//! Speak command handler.

use anyhow::{Context, Result};
use std::path::PathBuf;

use tutor_core::{Message, MessageRole};
use tutor_voice::ReadOutcome;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::handlers::playback;
use crate::presentation::PlaybackProgress;

/// Execute the speak command.
///
/// The text is voiced as if the tutor had said it, so it goes through the
/// same read path (and markdown cleanup) as a reply.
pub async fn execute(
    ctx: &CliContext,
    text: String,
    out: Option<PathBuf>,
    no_play: bool,
) -> Result<()> {
    let controller = ctx.controller();
    let mut events = ctx
        .take_events()
        .context("Playback events are already being consumed")?;

    let id = controller.push_message(Message::new(MessageRole::Assistant, text));
    let outcome = if no_play {
        controller.prefetch(&id).await
    } else {
        controller.on_manual_read(&id).await
    }
    .map_err(CliError::from)?;

    if let ReadOutcome::Playing(handle) = &outcome {
        let mut progress = PlaybackProgress::new();
        playback::follow(controller, &mut events, &mut progress, handle).await;
    } else {
        tracing::debug!(?outcome, "Speech not played");
    }

    if let Some(dir) = out {
        playback::save(controller, &id, &dir)?;
    }
    Ok(())
}
