//! Main CLI parser and top-level argument handling.
//!
//! This module defines the root CLI structure with global options. Every
//! study option can also come from the environment (or a `.env` file).

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args, Parser};
use tutor_core::{DEFAULT_PLAYBACK_RATE, StudyConfig, UserGoals, VoicePersona, validate_rate};

use crate::commands::Commands;

/// Command-line interface definition for the study tutor.
///
/// This is the top-level parser that handles global options and dispatches
/// to subcommands.
#[derive(Parser)]
#[command(name = "tutor")]
#[command(about = "Study with an AI tutor that reads its answers aloud")]
#[command(version)]
pub struct Cli {
    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub study: StudyArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Options shared by every command that talks to the tutor.
#[derive(Args, Debug, Clone)]
pub struct StudyArgs {
    /// Gemini API key
    #[arg(long = "api-key", env = "GEMINI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Voice persona (Puck, Charon, Kore, Fenrir, Zephyr)
    #[arg(long, env = "TUTOR_VOICE", default_value_t = VoicePersona::Puck, global = true)]
    pub voice: VoicePersona,

    /// Playback rate between 0.5 and 2.0
    #[arg(
        long,
        env = "TUTOR_SPEED",
        default_value_t = DEFAULT_PLAYBACK_RATE,
        value_parser = parse_speed,
        global = true
    )]
    pub speed: f32,

    /// Play replies as soon as their audio is ready
    #[arg(
        long,
        env = "TUTOR_AUTOPLAY",
        default_value = "true",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub autoplay: bool,

    /// What you want to learn in this session
    #[arg(long, env = "TUTOR_OBJECTIVES", default_value = "", global = true)]
    pub objectives: String,

    /// Notes or material the tutor should draw on
    #[arg(long = "knowledge", env = "TUTOR_KNOWLEDGE", default_value = "", global = true)]
    pub knowledge_base: String,
}

impl StudyArgs {
    pub fn study_config(&self) -> StudyConfig {
        StudyConfig::new(self.voice, self.speed, self.autoplay)
    }

    pub fn goals(&self) -> UserGoals {
        UserGoals::new(self.objectives.clone(), self.knowledge_base.clone())
    }
}

/// Parse and range-check a playback rate.
fn parse_speed(value: &str) -> Result<f32, String> {
    let rate: f32 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{value}' is not a number"))?;
    validate_rate(rate).map_err(|e| e.to_string())
}
