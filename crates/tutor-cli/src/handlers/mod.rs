//! Command handlers.
//!
//! Handlers follow the canonical pattern:
//! - Signature: `pub async fn execute(ctx: &CliContext, ...) -> Result<()>`
//! - Thin wrappers that:
//!   1. Parse/validate CLI-specific input
//!   2. Call the study session or playback controller
//!   3. Format output for the terminal

pub mod ask;
pub mod chat;
pub mod playback;
pub mod speak;
pub mod voices;
