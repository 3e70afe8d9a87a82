//! Ask command handler.
//!
//! Asks a single question, with optional piped stdin context, prints the
//! reply and plays it.

use anyhow::{Context, Result};
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use tutor_voice::{FALLBACK_REPLY, ReadOutcome, VoiceError};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::handlers::playback;
use crate::presentation::PlaybackProgress;

/// Execute the ask command.
pub async fn execute(ctx: &CliContext, question: String, out: Option<PathBuf>) -> Result<()> {
    let stdin = io::stdin();
    let piped_input = if stdin.is_terminal() {
        None
    } else {
        let mut buffer = String::new();
        stdin
            .lock()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        Some(buffer)
    };
    let prompt = build_prompt(&question, piped_input.as_deref());

    let mut events = ctx
        .take_events()
        .context("Playback events are already being consumed")?;

    let turn = match ctx.session().send_message(&prompt).await {
        Ok(turn) => turn,
        Err(e @ VoiceError::Generation(_)) => {
            println!("{FALLBACK_REPLY}");
            return Err(CliError::from(e).into());
        }
        Err(e) => return Err(CliError::from(e).into()),
    };

    println!("{}\n", turn.reply);

    match turn.audio {
        Ok(ReadOutcome::Playing(handle)) => {
            let mut progress = PlaybackProgress::new();
            let reason =
                playback::follow(ctx.controller(), &mut events, &mut progress, &handle).await;
            tracing::debug!(?reason, "Reply playback ended");
        }
        Ok(outcome) => tracing::debug!(?outcome, "Reply not played"),
        Err(e) => eprintln!("⚠️  Audio unavailable: {e}"),
    }

    if let Some(dir) = out {
        playback::save(ctx.controller(), &turn.assistant_id, &dir)?;
    }
    Ok(())
}

/// Combine the question with piped context. Blank context is ignored.
fn build_prompt(question: &str, piped: Option<&str>) -> String {
    match piped.map(str::trim).filter(|c| !c.is_empty()) {
        Some(context) => format!("{context}\n\n{question}"),
        None => question.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_prompt_without_context() {
        assert_eq!(build_prompt("What is ATP?", None), "What is ATP?");
        assert_eq!(build_prompt("What is ATP?", Some("  \n")), "What is ATP?");
    }

    #[test]
    fn test_build_prompt_prepends_context() {
        assert_eq!(
            build_prompt("Summarize this", Some("Mitochondria make ATP.\n")),
            "Mitochondria make ATP.\n\nSummarize this"
        );
    }
}
