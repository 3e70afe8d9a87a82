//! Terminal progress bar fed by controller events.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tutor_voice::{EndReason, PlaybackEvent, SessionHandle};

use super::format::format_clock;

/// Renders the active playback session as an indicatif bar.
///
/// Feed it every [`PlaybackEvent`]; it creates a bar when a session starts,
/// moves it on progress and clears it when the session ends.
pub struct PlaybackProgress {
    visible: bool,
    active: Option<ActiveBar>,
}

struct ActiveBar {
    handle: SessionHandle,
    bar: ProgressBar,
    duration: f64,
}

impl PlaybackProgress {
    /// Draw to stderr.
    pub const fn new() -> Self {
        Self {
            visible: true,
            active: None,
        }
    }

    /// Track sessions without drawing anything.
    pub const fn hidden() -> Self {
        Self {
            visible: false,
            active: None,
        }
    }

    /// Apply one event. Returns the session and reason when a session ends.
    pub fn apply(&mut self, event: &PlaybackEvent) -> Option<(SessionHandle, EndReason)> {
        match event {
            PlaybackEvent::SessionStarted {
                handle,
                offset,
                duration,
                rate,
            } => {
                self.clear();
                let bar = self.create_bar(*duration);
                bar.set_message(format!("▶ {rate}x"));
                bar.set_position(millis(*offset));
                bar.set_prefix(clock_pair(*offset, *duration));
                self.active = Some(ActiveBar {
                    handle: handle.clone(),
                    bar,
                    duration: *duration,
                });
                None
            }
            PlaybackEvent::Progress {
                handle, position, ..
            } => {
                if let Some(active) = self.active.as_ref().filter(|a| &a.handle == handle) {
                    active.bar.set_position(millis(*position));
                    active.bar.set_prefix(clock_pair(*position, active.duration));
                }
                None
            }
            PlaybackEvent::SessionEnded { handle, reason } => {
                if self.active.as_ref().is_some_and(|a| &a.handle == handle) {
                    self.clear();
                }
                Some((handle.clone(), *reason))
            }
            PlaybackEvent::AudioFailed { message_id, error } => {
                tracing::debug!(%message_id, "Audio failed");
                if self.visible {
                    eprintln!("⚠️  Audio unavailable: {error}");
                }
                None
            }
            PlaybackEvent::GeneratingChanged { .. } | PlaybackEvent::AudioReady { .. } => None,
        }
    }

    /// Position and length of the bar in milliseconds, if a session is shown.
    pub fn position(&self) -> Option<(u64, u64)> {
        self.active
            .as_ref()
            .map(|a| (a.bar.position(), a.bar.length().unwrap_or_default()))
    }

    fn create_bar(&self, duration: f64) -> ProgressBar {
        let target = if self.visible {
            ProgressDrawTarget::stderr()
        } else {
            ProgressDrawTarget::hidden()
        };
        let bar = ProgressBar::with_draw_target(Some(millis(duration)), target);
        bar.set_style(
            ProgressStyle::with_template("{msg} [{bar:40.cyan/blue}] {prefix}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        bar
    }

    fn clear(&mut self) {
        if let Some(active) = self.active.take() {
            active.bar.finish_and_clear();
        }
    }
}

impl Default for PlaybackProgress {
    fn default() -> Self {
        Self::new()
    }
}

fn clock_pair(position: f64, duration: f64) -> String {
    format!("{} / {}", format_clock(position), format_clock(duration))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn millis(secs: f64) -> u64 {
    if secs.is_finite() && secs > 0.0 {
        (secs * 1000.0).round() as u64
    } else {
        0
    }
}
