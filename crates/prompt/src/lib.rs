//! # Prompt
//!
//! Conversation turn types shared by the session store and the LLM client, plus assembly of the
//! message list sent to the model.
//!
//! ## External interactions
//!
//! - **AI models**: [`build_request_messages`] output is sent to OpenAI-compatible chat APIs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a message, one-to-one with OpenAI Chat Completions API `role` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instruction (API `role: "system"`).
    System,
    /// User message (API `role: "user"`).
    User,
    /// Assistant message (API `role: "assistant"`).
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single chat turn, one-to-one with one element of OpenAI `messages` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

/// Default prompt for a photo sent without a caption.
pub const DEFAULT_IMAGE_PROMPT: &str = "What's in this image?";

/// Builds the message list for a completion request: optional system instruction first, then the
/// conversation in order. A blank system prompt is treated as absent.
pub fn build_request_messages(system_prompt: Option<&str>, history: &[ChatMessage]) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 1);
    if let Some(system) = system_prompt.filter(|s| !s.trim().is_empty()) {
        messages.push(ChatMessage::system(system));
    }
    messages.extend_from_slice(history);
    messages
}

/// Prompt to send alongside an image: the trimmed caption, or [`DEFAULT_IMAGE_PROMPT`].
pub fn image_prompt(caption: &str) -> &str {
    let caption = caption.trim();
    if caption.is_empty() {
        DEFAULT_IMAGE_PROMPT
    } else {
        caption
    }
}
