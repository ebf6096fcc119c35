//! # OpenAI API client
//!
//! Thin wrapper around [async-openai] for chat completion over a message list and for
//! vision completion over a single image. Provides token masking for safe logging.

use async_openai::types::{
    ChatCompletionRequestMessageContentPartImageArgs, ChatCompletionRequestMessageContentPartTextArgs,
    ChatCompletionRequestUserMessageContent, ChatCompletionRequestUserMessageContentPart,
    CreateChatCompletionRequest, CreateChatCompletionRequestArgs, ImageDetail, ImageUrlArgs,
};
use async_openai::{config::OpenAIConfig, Client};
use std::sync::Arc;
use std::time::Duration;

pub use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
};

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Masks an API key/token for safe logging: shows first 7 chars + "***" + last 4 chars.
/// If length <= 11, returns "***" to avoid leaking any part of the key.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 11 {
        return "***".to_string();
    }
    let head: String = chars[..7].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}***{}", head, tail)
}

/// OpenAI chat client. Wraps async-openai client; holds the API key only for masked logging.
#[derive(Clone)]
pub struct OpenAIClient {
    client: Arc<Client<OpenAIConfig>>,
    api_key_for_logging: String,
}

impl OpenAIClient {
    /// Builds a client for `base_url` (the official API, a proxy or a compatible endpoint) whose
    /// HTTP requests fail after `timeout`.
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> anyhow::Result<Self> {
        let api_key_for_logging = api_key.clone();
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(base_url);
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client: Arc::new(Client::with_config(config).with_http_client(http_client)),
            api_key_for_logging,
        })
    }

    /// Sends a chat completion request and returns the assistant reply.
    ///
    /// Logs masked API key and token usage. Errors if the response has no choices.
    pub async fn chat_completion(
        &self,
        model: &str,
        messages: Vec<ChatCompletionRequestMessage>,
    ) -> anyhow::Result<String> {
        tracing::info!(
            model = %model,
            message_count = messages.len(),
            api_key = %mask_token(&self.api_key_for_logging),
            "OpenAI chat_completion request"
        );

        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(messages)
            .build()?;

        if let Ok(json) = serde_json::to_string(&request) {
            tracing::debug!(request_json = %json, "OpenAI chat_completion request JSON");
        }

        self.send(request, "chat_completion").await
    }

    /// Sends one user message made of a text part and an image part (`image_url` may be an
    /// https URL or a `data:` URL) and returns the assistant reply.
    pub async fn vision_completion(
        &self,
        model: &str,
        prompt: &str,
        image_url: &str,
    ) -> anyhow::Result<String> {
        tracing::info!(
            model = %model,
            prompt_len = prompt.len(),
            image_url_len = image_url.len(),
            api_key = %mask_token(&self.api_key_for_logging),
            "OpenAI vision_completion request"
        );

        let text_part = ChatCompletionRequestMessageContentPartTextArgs::default()
            .text(prompt)
            .build()?;
        let image_part = ChatCompletionRequestMessageContentPartImageArgs::default()
            .image_url(
                ImageUrlArgs::default()
                    .url(image_url)
                    .detail(ImageDetail::Auto)
                    .build()?,
            )
            .build()?;
        let content = ChatCompletionRequestUserMessageContent::Array(vec![
            ChatCompletionRequestUserMessageContentPart::Text(text_part),
            ChatCompletionRequestUserMessageContentPart::ImageUrl(image_part),
        ]);
        let message: ChatCompletionRequestMessage = ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()?
            .into();

        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(vec![message])
            .build()?;

        self.send(request, "vision_completion").await
    }

    async fn send(&self, request: CreateChatCompletionRequest, op: &str) -> anyhow::Result<String> {
        let response = self.client.chat().create(request).await?;

        if let Some(ref u) = response.usage {
            tracing::info!(
                op = %op,
                prompt_tokens = u.prompt_tokens,
                completion_tokens = u.completion_tokens,
                total_tokens = u.total_tokens,
                "OpenAI usage"
            );
        }

        match response.choices.first() {
            Some(choice) => Ok(choice.message.content.clone().unwrap_or_default()),
            None => anyhow::bail!("No response from OpenAI"),
        }
    }
}
