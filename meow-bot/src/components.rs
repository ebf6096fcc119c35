//! Component factory: builds BotComponents and the handler chain from config.

use anyhow::Result;
use dbot_core::Bot;
use dbot_telegram::{BotUsername, TelegramBotAdapter};
use handler_chain::HandlerChain;
use llm_client::{LlmClient, OpenAILlmClient};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::allowlist::AllowList;
use crate::config::BotConfig;
use crate::handlers::{ChatDispatcher, LoggingHandler};
use crate::models::ModelRegistry;
use crate::session::SessionStore;

/// Shared state and clients the handler chain is built from.
#[derive(Clone)]
pub struct BotComponents {
    pub bot: Arc<dyn Bot>,
    pub llm_client: Arc<dyn LlmClient>,
    pub sessions: SessionStore,
    pub allow_list: Arc<AllowList>,
    pub models: Arc<ModelRegistry>,
    pub bot_username: BotUsername,
}

impl BotComponents {
    /// Assembles components around an existing bot and LLM client (tests inject mocks here).
    pub fn new(config: &BotConfig, bot: Arc<dyn Bot>, llm_client: Arc<dyn LlmClient>) -> Self {
        Self {
            bot,
            llm_client,
            sessions: SessionStore::new(),
            allow_list: Arc::new(config.allow_list.clone()),
            models: Arc::new(config.models.clone()),
            bot_username: BotUsername::default(),
        }
    }
}

/// Builds the production components: Telegram adapter and OpenAI client.
#[instrument(skip(config, teloxide_bot))]
pub fn build_bot_components(
    config: &BotConfig,
    teloxide_bot: teloxide::Bot,
) -> Result<BotComponents> {
    let bot: Arc<dyn Bot> = Arc::new(TelegramBotAdapter::new(teloxide_bot));
    let llm_client: Arc<dyn LlmClient> = Arc::new(OpenAILlmClient::from_config(&config.llm)?);
    info!(
        default_model = %config.default_model(),
        vision_model = %config.vision_model(),
        "LLM client ready"
    );
    Ok(BotComponents::new(config, bot, llm_client))
}

/// Chain order: logging, then the dispatcher.
pub fn build_handler_chain(config: &BotConfig, components: &BotComponents) -> HandlerChain {
    let dispatcher = ChatDispatcher::new(
        components.bot.clone(),
        components.llm_client.clone(),
        components.sessions.clone(),
        components.allow_list.clone(),
        components.models.clone(),
    )
    .with_default_model(config.default_model())
    .with_vision_model(config.vision_model())
    .with_bot_username(components.bot_username.clone());

    HandlerChain::new()
        .add_handler(Arc::new(LoggingHandler))
        .add_handler(Arc::new(dispatcher))
}
