//! Command-line front end for the study tutor.
//!
//! `tutor ask` answers one question aloud, `tutor speak` voices arbitrary
//! text, and `tutor chat` runs an interactive session with playback
//! commands.

#![deny(unused_crate_dependencies)]

// Silence unused dev-dependency warnings in unit test builds
#[cfg(test)]
use async_trait as _;
#[cfg(test)]
use tempfile as _;
#[cfg(test)]
use tokio_test as _;

// Only the binary initializes these
use dotenvy as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod presentation;
pub mod repl;
pub mod utils;

// Re-export primary types for convenient access
pub use bootstrap::{CliConfig, CliContext, bootstrap, compose};
pub use commands::Commands;
pub use error::CliError;
pub use parser::{Cli, StudyArgs};
pub use repl::ReplCommand;
