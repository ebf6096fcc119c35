//! Chat dispatcher: classifies each message, checks the allow-list, and either answers directly
//! (greeting, /newchat, /setmodel, model buttons) or relays the conversation to the LLM.
//!
//! Remote API failures end here as a user-visible failure reply; they never reach the chain
//! as errors and never leave a phantom assistant turn in the history. Unauthorized users get a
//! denial reply and leave no trace in the session store.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use dbot_core::{Bot, Handler, HandlerError, HandlerResponse, Message, Result};
use dbot_telegram::BotUsername;
use llm_client::{LlmClient, DEFAULT_MODEL, DEFAULT_VISION_MODEL};
use prompt::MessageRole;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::allowlist::AllowList;
use crate::commands::{classify, ChatCommand};
use crate::models::{ModelOption, ModelRegistry};
use crate::session::SessionStore;

// --- User-facing texts ---
pub const MSG_NEW_CHAT: &str = "🧹 New chat started. What's on your mind?";
pub const MSG_CHOOSE_MODEL: &str = "Choose a model:";
pub const MSG_REQUEST_FAILED: &str = "😿 Something went wrong, please try again later.";

pub fn greeting_text(name: &str) -> String {
    format!("Meowello 😺 {}!", name)
}

pub fn denial_text(name: &str) -> String {
    format!("👿 {}, you are not registered", name)
}

pub fn model_selected_text(option: &ModelOption) -> String {
    format!("Model set to {} ({}) 😺", option.label, option.id)
}

/// Logs a remote API failure and its cause chain. First item with `first_msg`, rest with "Caused by".
fn log_remote_failure(e: &anyhow::Error, first_msg: &str) {
    for (i, cause) in e.chain().enumerate() {
        if i == 0 {
            let reason = HandlerError::RemoteApi(cause.to_string());
            error!(reason = %reason, "{}", first_msg);
        } else {
            error!(cause = %cause, "Caused by");
        }
    }
}

/// Handler that owns the bot's behavior. Cheap to clone; all state is shared.
#[derive(Clone)]
pub struct ChatDispatcher {
    bot: Arc<dyn Bot>,
    llm_client: Arc<dyn LlmClient>,
    sessions: SessionStore,
    allow_list: Arc<AllowList>,
    models: Arc<ModelRegistry>,
    default_model: String,
    vision_model: String,
    bot_username: BotUsername,
}

impl ChatDispatcher {
    pub fn new(
        bot: Arc<dyn Bot>,
        llm_client: Arc<dyn LlmClient>,
        sessions: SessionStore,
        allow_list: Arc<AllowList>,
        models: Arc<ModelRegistry>,
    ) -> Self {
        Self {
            bot,
            llm_client,
            sessions,
            allow_list,
            models,
            default_model: DEFAULT_MODEL.to_string(),
            vision_model: DEFAULT_VISION_MODEL.to_string(),
            bot_username: BotUsername::default(),
        }
    }

    /// Model used for users who never picked one.
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn with_vision_model(mut self, model: impl Into<String>) -> Self {
        self.vision_model = model.into();
        self
    }

    /// Shares the username cache the runner fills from get_me, for `/cmd@botname` parsing.
    pub fn with_bot_username(mut self, bot_username: BotUsername) -> Self {
        self.bot_username = bot_username;
        self
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    async fn reply(&self, message: &Message, text: impl Into<String>) -> Result<HandlerResponse> {
        let text = text.into();
        self.bot.reply_to(message, &text).await?;
        Ok(HandlerResponse::Reply(text))
    }

    async fn deny(&self, message: &Message) -> Result<HandlerResponse> {
        warn!(
            user_id = message.user.id,
            username = ?message.user.username,
            reason = %HandlerError::Unauthorized,
            "User is not registered"
        );
        self.reply(message, denial_text(message.user.display_name()))
            .await
    }

    async fn new_chat(&self, message: &Message, user: &str) -> Result<HandlerResponse> {
        self.sessions.reset(user).await;
        info!(user = %user, "New chat started");
        self.reply(message, MSG_NEW_CHAT).await
    }

    async fn show_models(&self, message: &Message) -> Result<HandlerResponse> {
        self.bot
            .send_choices(&message.chat, MSG_CHOOSE_MODEL, &self.models.labels())
            .await?;
        Ok(HandlerResponse::Reply(MSG_CHOOSE_MODEL.to_string()))
    }

    async fn select_model(
        &self,
        message: &Message,
        user: &str,
        option: &ModelOption,
    ) -> Result<HandlerResponse> {
        self.sessions.set_model(user, option.id.clone()).await;
        info!(user = %user, model = %option.id, "Model selected");
        self.reply(message, model_selected_text(option)).await
    }

    /// Appends the user turn, sends the whole history, and records the reply only on success.
    async fn chat(&self, message: &Message, user: &str, text: &str) -> Result<HandlerResponse> {
        self.sessions
            .append_turn(user, MessageRole::User, text)
            .await;
        let history = self.sessions.history(user).await;
        let model = self
            .sessions
            .model(user)
            .await
            .unwrap_or_else(|| self.default_model.clone());

        info!(
            user = %user,
            model = %model,
            turns = history.len(),
            "Submitting conversation to LLM"
        );

        match self.llm_client.complete(&model, history).await {
            Ok(reply) => {
                self.sessions
                    .append_turn(user, MessageRole::Assistant, reply.clone())
                    .await;
                self.reply(message, reply).await
            }
            Err(e) => {
                log_remote_failure(&e, "Failed to get LLM response");
                self.reply(message, MSG_REQUEST_FAILED).await
            }
        }
    }

    /// One-shot image question; the session history is neither read nor written.
    async fn describe_photo(
        &self,
        message: &Message,
        file_id: &str,
        caption: &str,
    ) -> Result<HandlerResponse> {
        let bytes = match self.bot.fetch_photo(file_id).await {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(error = %e, file_id = %file_id, "Failed to fetch photo");
                return self.reply(message, MSG_REQUEST_FAILED).await;
            }
        };
        // Telegram re-encodes every `photo` size as JPEG; documents would need their own MIME type.
        let image_url = format!("data:image/jpeg;base64,{}", STANDARD.encode(&bytes));
        let prompt = prompt::image_prompt(caption);

        info!(
            user_id = message.user.id,
            model = %self.vision_model,
            image_bytes = bytes.len(),
            "Submitting photo to LLM"
        );

        match self
            .llm_client
            .describe_image(&self.vision_model, &image_url, prompt)
            .await
        {
            Ok(reply) => self.reply(message, reply).await,
            Err(e) => {
                log_remote_failure(&e, "Failed to get LLM response for photo");
                self.reply(message, MSG_REQUEST_FAILED).await
            }
        }
    }
}

#[async_trait]
impl Handler for ChatDispatcher {
    #[instrument(skip(self, message), fields(user_id = message.user.id))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let bot_username = self.bot_username.read().await.clone().unwrap_or_default();
        let command = classify(message, &self.models, &bot_username);
        if command == ChatCommand::Unsupported {
            return Ok(HandlerResponse::Ignore);
        }

        let user = match message.user.username.as_deref() {
            Some(name) if self.allow_list.is_authorized(Some(name)) => name,
            _ => return self.deny(message).await,
        };

        match command {
            ChatCommand::Start => {
                self.reply(message, greeting_text(message.user.display_name()))
                    .await
            }
            ChatCommand::NewChat => self.new_chat(message, user).await,
            ChatCommand::SetModel => self.show_models(message).await,
            ChatCommand::ModelSelection(option) => self.select_model(message, user, &option).await,
            ChatCommand::Text(text) => self.chat(message, user, &text).await,
            ChatCommand::Photo { file_id, caption } => {
                self.describe_photo(message, &file_id, &caption).await
            }
            ChatCommand::Unsupported => Ok(HandlerResponse::Ignore),
        }
    }
}
