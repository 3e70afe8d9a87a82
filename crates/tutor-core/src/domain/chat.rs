//! Chat domain types.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::audio::DecodedAudio;

/// Stable identifier of a message for the lifetime of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MessageId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for MessageId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    /// Parse a role from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            _ => None,
        }
    }

    /// Convert role to string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One chat turn.
///
/// Content may be rewritten while an assistant reply resolves. Decoded audio
/// attaches at most once and is never replaced.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: MessageId,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Assistant placeholder still waiting for its text.
    pub is_typing: bool,
    audio: Option<Arc<DecodedAudio>>,
}

impl Message {
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self::with_id(MessageId::generate(), role, content)
    }

    #[must_use]
    pub fn with_id(id: MessageId, role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id,
            role,
            content: content.into(),
            created_at: Utc::now(),
            is_typing: false,
            audio: None,
        }
    }

    /// An empty assistant message that is still waiting for its reply.
    #[must_use]
    pub fn placeholder() -> Self {
        let mut message = Self::new(MessageRole::Assistant, String::new());
        message.is_typing = true;
        message
    }

    /// Decoded audio, if synthesis has succeeded for this message.
    #[must_use]
    pub fn audio(&self) -> Option<&Arc<DecodedAudio>> {
        self.audio.as_ref()
    }

    #[must_use]
    pub const fn has_audio(&self) -> bool {
        self.audio.is_some()
    }

    /// Attach decoded audio. Returns `false` (and keeps the existing buffer)
    /// if audio was already attached.
    pub fn attach_audio(&mut self, audio: Arc<DecodedAudio>) -> bool {
        if self.audio.is_some() {
            tracing::debug!(message_id = %self.id, "Audio already attached, keeping original");
            return false;
        }
        self.audio = Some(audio);
        true
    }
}

/// Ordered list of messages for one session.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Append a message and return its id.
    pub fn push(&mut self, message: Message) -> MessageId {
        let id = message.id.clone();
        self.messages.push(message);
        id
    }

    #[must_use]
    pub fn get(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| &m.id == id)
    }

    pub fn get_mut(&mut self, id: &MessageId) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| &m.id == id)
    }

    /// Message at a zero-based position.
    #[must_use]
    pub fn nth(&self, index: usize) -> Option<&Message> {
        self.messages.get(index)
    }

    /// Replace a message's text and clear its typing flag.
    ///
    /// Returns `false` if the message no longer exists (e.g. the conversation
    /// was cleared while the reply was in flight).
    pub fn resolve_content(&mut self, id: &MessageId, content: impl Into<String>) -> bool {
        match self.get_mut(id) {
            Some(message) => {
                message.content = content.into();
                message.is_typing = false;
                true
            }
            None => false,
        }
    }

    /// Most recent assistant message, if any.
    #[must_use]
    pub fn last_assistant(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::Assistant)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drop every message (and with them, their audio).
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
