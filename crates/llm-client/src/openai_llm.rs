//! OpenAI implementation of [`LlmClient`]: wraps openai-client and prepends the optional system prompt.

use anyhow::Result;
use async_trait::async_trait;
use prompt::ChatMessage;
use std::time::Duration;
use tracing::instrument;

use super::{chat_message_to_openai, LlmClient, LlmConfig};

/// [`LlmClient`] backed by openai-client.
#[derive(Clone)]
pub struct OpenAILlmClient {
    client: openai_client::OpenAIClient,
    system_prompt: Option<String>,
}

impl OpenAILlmClient {
    /// Builds a client from config: key, base URL, request timeout and system prompt.
    pub fn from_config(config: &dyn LlmConfig) -> Result<Self> {
        let client = openai_client::OpenAIClient::new(
            config.api_key().to_string(),
            config.base_url().to_string(),
            Duration::from_secs(config.timeout_secs()),
        )?;
        Ok(Self {
            client,
            system_prompt: config.system_prompt().map(String::from),
        })
    }
}

#[async_trait]
impl LlmClient for OpenAILlmClient {
    #[instrument(skip(self, messages), fields(message_count = messages.len()))]
    async fn complete(&self, model: &str, messages: Vec<ChatMessage>) -> Result<String> {
        let messages = prompt::build_request_messages(self.system_prompt.as_deref(), &messages);
        let openai_messages = messages
            .iter()
            .map(chat_message_to_openai)
            .collect::<Result<Vec<_>>>()?;
        self.client.chat_completion(model, openai_messages).await
    }

    #[instrument(skip(self, image_url, prompt))]
    async fn describe_image(&self, model: &str, image_url: &str, prompt: &str) -> Result<String> {
        self.client.vision_completion(model, prompt, image_url).await
    }
}
