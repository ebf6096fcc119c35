//! Bot configuration: Telegram connectivity + LLM settings + allow-list + model registry.
//! Everything is read from the environment once at startup; a missing secret is fatal.

use anyhow::Result;
use dbot_telegram::TelegramConfig;
use llm_client::{EnvLlmConfig, LlmConfig};

use crate::allowlist::AllowList;
use crate::models::ModelRegistry;

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub telegram: TelegramConfig,
    pub llm: EnvLlmConfig,
    pub allow_list: AllowList,
    pub models: ModelRegistry,
}

impl BotConfig {
    /// Load from environment variables. `token` overrides BOT_TOKEN if provided.
    /// Fails when BOT_TOKEN or OPENAI_API_KEY is absent, or when MODELS / the allow-list file is invalid.
    pub fn load(token: Option<String>) -> Result<Self> {
        let telegram = TelegramConfig::load(token)?;
        let llm = EnvLlmConfig::from_env()?;
        let allow_list = AllowList::from_env()?;
        let models = ModelRegistry::from_env()?;
        Ok(Self {
            telegram,
            llm,
            allow_list,
            models,
        })
    }

    /// Validate URLs before anything connects.
    pub fn validate(&self) -> Result<()> {
        self.telegram.validate()?;
        self.llm.validate()?;
        Ok(())
    }

    pub fn bot_token(&self) -> &str {
        &self.telegram.bot_token
    }

    pub fn log_file(&self) -> &str {
        &self.telegram.log_file
    }

    pub fn default_model(&self) -> &str {
        self.llm.default_model()
    }

    pub fn vision_model(&self) -> &str {
        self.llm.vision_model()
    }
}
