//! Shared CLI presentation utilities.
//!
//! Keep this module format-only: no playback or conversation logic.

pub mod format;
pub mod progress;

// Re-export commonly used items
pub use format::{format_clock, print_history, truncate_string};
pub use progress::PlaybackProgress;
