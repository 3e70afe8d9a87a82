//! Chat command handler.
//!
//! Interactive tutoring session. Replies play in the background while the
//! prompt stays available for playback commands.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use tokio::sync::mpsc::UnboundedReceiver;
use tutor_core::{MessageId, MessageRole, UserGoals, validate_rate};
use tutor_voice::{EndReason, FALLBACK_REPLY, PlaybackEvent, ReadOutcome, VoiceError};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::handlers::playback;
use crate::presentation::{format_clock, print_history};
use crate::repl::{HELP, ReplCommand};
use crate::utils::{Input, LineReader};

const PROMPT: &str = "you> ";

enum Flow {
    Continue,
    Quit,
}

/// Execute the chat command.
pub async fn execute(ctx: &CliContext, save_dir: PathBuf) -> Result<()> {
    let events = ctx
        .take_events()
        .context("Playback events are already being consumed")?;
    let reporter = tokio::spawn(report_events(events));
    let mut reader = LineReader::spawn()?;

    print_banner(ctx);

    loop {
        let line = match reader.read_line(PROMPT).await? {
            Input::Line(line) => line,
            Input::Interrupted => {
                if ctx.controller().on_stop().is_none() {
                    println!("(type /quit to leave)");
                }
                continue;
            }
            Input::Eof => break,
        };

        let command = match ReplCommand::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("❌ {e}");
                continue;
            }
        };

        match dispatch(ctx, command, &save_dir).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(e) => eprintln!("❌ {e}"),
        }
    }

    ctx.controller().on_stop();
    reporter.abort();
    println!("Goodbye!");
    Ok(())
}

async fn dispatch(
    ctx: &CliContext,
    command: ReplCommand,
    save_dir: &Path,
) -> Result<Flow, CliError> {
    let controller = ctx.controller();
    match command {
        ReplCommand::Empty => {}
        ReplCommand::Say(text) => say(ctx, &text).await?,
        ReplCommand::Read(index) => {
            let id = resolve_message(ctx, index)?;
            match controller.on_manual_read(&id).await? {
                ReadOutcome::AlreadyGenerating => {
                    println!("⏳ Audio for that message is still being generated");
                }
                ReadOutcome::Ignored => println!("Nothing to play for that message"),
                outcome => tracing::debug!(?outcome, "Manual read"),
            }
        }
        ReplCommand::Stop => {
            if controller.on_stop().is_none() {
                println!("Nothing is playing");
            }
        }
        ReplCommand::Speed(rate) => {
            let applied = controller.on_rate_change(validate_rate(rate)?)?;
            println!("Speed {applied}x");
        }
        ReplCommand::Seek(position) => {
            if controller.on_seek(position)?.is_none() {
                println!("Nothing is playing");
            }
        }
        ReplCommand::Save { index, dir } => {
            let id = resolve_message(ctx, index)?;
            playback::save(controller, &id, dir.as_deref().unwrap_or(save_dir))?;
        }
        ReplCommand::Clear => {
            controller.clear_conversation();
            println!("Conversation cleared");
        }
        ReplCommand::Goals {
            objectives,
            knowledge_base,
        } => {
            ctx.session()
                .set_goals(UserGoals::new(objectives, knowledge_base));
            println!("Goals updated");
        }
        ReplCommand::Voice(voice) => {
            controller.set_voice(voice);
            println!("Voice set to {voice}");
        }
        ReplCommand::Autoplay(enabled) => {
            controller.set_auto_play(enabled);
            println!("Autoplay {}", if enabled { "on" } else { "off" });
        }
        ReplCommand::History => print_history(&controller.messages()),
        ReplCommand::Status => print_status(ctx),
        ReplCommand::Help => println!("{HELP}"),
        ReplCommand::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

async fn say(ctx: &CliContext, text: &str) -> Result<(), CliError> {
    match ctx.session().send_message(text).await {
        Ok(turn) => {
            println!("tutor> {}", turn.reply);
            // Synthesis failures are already reported through AudioFailed.
            if let Err(e) = turn.audio {
                tracing::debug!(error = %e, "Reply has no audio");
            }
            Ok(())
        }
        Err(e @ VoiceError::Generation(_)) => {
            println!("tutor> {FALLBACK_REPLY}");
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Message `index` (1-based), or the latest finished tutor reply.
fn resolve_message(ctx: &CliContext, index: Option<usize>) -> Result<MessageId, CliError> {
    let messages = ctx.controller().messages();
    let message = match index {
        Some(n) => messages.get(n - 1).ok_or_else(|| {
            CliError::Arguments(format!("no message {n} (see /history)"))
        })?,
        None => messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::Assistant && !m.is_typing)
            .ok_or_else(|| CliError::Arguments("no tutor reply yet".into()))?,
    };
    Ok(message.id.clone())
}

fn print_banner(ctx: &CliContext) {
    let config = ctx.controller().config();
    println!(
        "📚 Study tutor (voice {}, speed {}x, autoplay {})",
        config.voice,
        config.speed(),
        if config.auto_play { "on" } else { "off" }
    );
    println!("Ask anything, or /help for commands.");
}

fn print_status(ctx: &CliContext) {
    let controller = ctx.controller();
    match controller.progress_snapshot() {
        Some(snapshot) => println!(
            "▶ {} / {} at {}x",
            format_clock(snapshot.position),
            format_clock(snapshot.duration),
            snapshot.rate
        ),
        None => println!("■ Stopped"),
    }
    let config = controller.config();
    let goals = ctx.session().goals();
    println!(
        "Voice {} · autoplay {} · {} message(s)",
        config.voice,
        if config.auto_play { "on" } else { "off" },
        controller.messages().len()
    );
    if !goals.objectives.is_empty() {
        println!("Objectives: {}", goals.objectives);
    }
}

async fn report_events(mut events: UnboundedReceiver<PlaybackEvent>) {
    while let Some(event) = events.recv().await {
        if let Some(line) = status_line(&event) {
            println!("{line}");
        }
    }
}

/// One-line notice for events worth showing between prompts.
fn status_line(event: &PlaybackEvent) -> Option<String> {
    match event {
        PlaybackEvent::SessionStarted {
            offset,
            duration,
            rate,
            ..
        } => Some(format!(
            "▶ Playing from {} of {} at {rate}x",
            format_clock(*offset),
            format_clock(*duration)
        )),
        PlaybackEvent::SessionEnded {
            reason: EndReason::Finished,
            ..
        } => Some("■ Finished".to_string()),
        PlaybackEvent::AudioFailed { error, .. } => Some(format!("⚠️  Audio unavailable: {error}")),
        _ => None,
    }
}
