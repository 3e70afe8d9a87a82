//! Following a playback session until it ends.

use std::path::{Path, PathBuf};
use tokio::sync::mpsc::UnboundedReceiver;
use tutor_core::MessageId;
use tutor_voice::{EndReason, PlaybackController, PlaybackEvent, SessionHandle};

use crate::error::CliError;
use crate::presentation::PlaybackProgress;

/// Show progress for `handle` until it ends. Ctrl+C stops playback.
///
/// Returns `Stopped` if the event stream closes first.
pub async fn follow(
    controller: &PlaybackController,
    events: &mut UnboundedReceiver<PlaybackEvent>,
    progress: &mut PlaybackProgress,
    handle: &SessionHandle,
) -> EndReason {
    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    return EndReason::Stopped;
                };
                if let Some((ended, reason)) = progress.apply(&event) {
                    if &ended == handle {
                        return reason;
                    }
                }
            }
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
                }
                controller.on_stop();
            }
        }
    }
}

/// Save a message's audio into `dir` and report where it went.
pub fn save(
    controller: &PlaybackController,
    id: &MessageId,
    dir: &Path,
) -> Result<PathBuf, CliError> {
    std::fs::create_dir_all(dir)?;
    let path = controller.save_wav(id, dir)?;
    println!("💾 Saved {}", path.display());
    Ok(path)
}
