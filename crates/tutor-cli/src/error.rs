//! CLI-specific error types and mappings.
//!
//! Maps library errors onto a small set of categories with sysexits-style
//! exit codes.

use thiserror::Error;
use tutor_core::ConfigError;
use tutor_voice::VoiceError;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Argument or REPL command parsing error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (terminal, export directory, ...).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error (bad voice, rate out of range).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The generation or speech service failed.
    #[error("Service error: {0}")]
    Service(String),

    /// Audio could not be decoded, played or exported.
    #[error("Audio error: {0}")]
    Audio(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 1: General error
    /// - 2: Misuse of shell command (invalid arguments)
    /// - 64-78: Reserved for specific error categories (see sysexits.h)
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Arguments(_) => 2, // EX_USAGE
            Self::Audio(_) => 1,
            Self::Service(_) => 69, // EX_UNAVAILABLE
            Self::Io(_) => 74,      // EX_IOERR
            Self::Config(_) => 78,  // EX_CONFIG
        }
    }
}

impl From<VoiceError> for CliError {
    fn from(err: VoiceError) -> Self {
        match err {
            VoiceError::Generation(e) => Self::Service(e.to_string()),
            VoiceError::Synthesis(e) => Self::Service(e.to_string()),
            VoiceError::Io(e) => Self::Io(e.to_string()),
            VoiceError::EmptyText | VoiceError::UnknownMessage(_) => {
                Self::Arguments(err.to_string())
            }
            other => Self::Audio(other.to_string()),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
