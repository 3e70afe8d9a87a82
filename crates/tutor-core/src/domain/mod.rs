//! Domain types.
//!
//! These types represent the chat and its audio in the domain model,
//! independent of any infrastructure concerns.

mod audio;
mod chat;

pub use audio::{AudioBufferError, DecodedAudio};
pub use chat::{Conversation, Message, MessageId, MessageRole};
