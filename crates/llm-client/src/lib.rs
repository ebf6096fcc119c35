//! # LLM client abstraction
//!
//! Defines the [`LlmClient`] trait and an OpenAI implementation. Transport-agnostic;
//! used by the meow-bot dispatcher, which tests it against a mock implementation.

use anyhow::Result;
use async_trait::async_trait;
use openai_client::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
};
use prompt::{ChatMessage, MessageRole};

mod config;
mod openai_llm;

pub use config::{EnvLlmConfig, LlmConfig, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS, DEFAULT_VISION_MODEL};
pub use openai_llm::OpenAILlmClient;

/// LLM client interface: text completion over a conversation and one-shot image description.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Returns the model reply for the given conversation (oldest turn first).
    async fn complete(&self, model: &str, messages: Vec<ChatMessage>) -> Result<String>;

    /// Returns the model reply for a single image plus a text prompt.
    /// `image_url` is an https URL or a `data:` URL.
    async fn describe_image(&self, model: &str, image_url: &str, prompt: &str) -> Result<String>;
}

/// Converts a single [`ChatMessage`] into OpenAI API message format.
fn chat_message_to_openai(msg: &ChatMessage) -> Result<ChatCompletionRequestMessage> {
    let content = msg.content.clone();
    let openai_msg: ChatCompletionRequestMessage = match msg.role {
        MessageRole::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        MessageRole::User => ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        MessageRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(content)
            .build()?
            .into(),
    };
    Ok(openai_msg)
}
