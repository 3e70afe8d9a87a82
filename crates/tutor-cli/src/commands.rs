//! Main commands enum.
//!
//! This module defines the available commands for the CLI tool.

use std::path::PathBuf;

use clap::Subcommand;

/// Available commands for the study tutor.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask the tutor one question and hear the answer
    Ask {
        /// The question. Piped stdin is added as extra context.
        question: String,
        /// Also save the answer's audio as a WAV file in this directory
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Read a piece of text aloud with the configured voice
    Speak {
        /// Text to speak
        text: String,
        /// Save the audio as a WAV file in this directory
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Synthesize (and export) without playing
        #[arg(long)]
        no_play: bool,
    },

    /// Start an interactive tutoring session
    Chat {
        /// Directory used by `/save` when none is given
        #[arg(long, default_value = ".")]
        save_dir: PathBuf,
    },

    /// List the available voice personas
    Voices,
}
