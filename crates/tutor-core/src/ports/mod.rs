//! Port definitions for remote collaborators.
//!
//! # Design Rules
//!
//! - Ports are object-safe async traits (`Arc<dyn GenerationPort>`), so the
//!   voice crate never names a concrete client.
//! - Error types here are the only failure vocabulary callers see; adapters
//!   map their internal errors at the boundary.

mod generation;
mod synthesis;

pub use generation::{GenerationError, GenerationPort};
pub use synthesis::{SynthesisError, SynthesisPort};
