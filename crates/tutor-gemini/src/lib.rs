//! Gemini adapter for the study tutor.
//!
//! Provides [`DefaultGeminiClient`], which implements the core
//! `GenerationPort` (tutor replies from `gemini-2.5-flash`) and
//! `SynthesisPort` (base64 PCM from `gemini-2.5-flash-preview-tts`).
//!
//! ```no_run
//! use tutor_gemini::{DefaultGeminiClient, GeminiClientConfig};
//!
//! let client = DefaultGeminiClient::new(
//!     &GeminiClientConfig::new().with_optional_api_key(std::env::var("GEMINI_API_KEY").ok()),
//! );
//! # let _ = client;
//! ```

// DefaultGeminiClient is meant to be used through the core port traits, not
// its internal generic structure
#![allow(private_interfaces)]

mod client;
mod config;
mod error;
mod http;
mod models;
mod port;
mod prompt;

// ============================================================================
// Public API
// ============================================================================

pub use client::DefaultGeminiClient;
pub use config::{
    DEFAULT_BASE_URL, DEFAULT_SPEECH_MODEL, DEFAULT_TEXT_MODEL, GeminiClientConfig,
};
