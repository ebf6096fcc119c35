//! LLM configuration: trait and env-based implementation.

use anyhow::{Context, Result};
use std::env;

/// Model used for text when the user has not picked one and `MODEL` is unset.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Model used for photos when `VISION_MODEL` is unset.
pub const DEFAULT_VISION_MODEL: &str = "gpt-4o";
/// Whole-request timeout for API calls when `OPENAI_TIMEOUT_SECS` is unset.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// LLM configuration interface for OpenAI-compatible APIs.
pub trait LlmConfig: Send + Sync {
    fn api_key(&self) -> &str;
    fn base_url(&self) -> &str;
    /// Fallback model for users who never ran /setmodel.
    fn default_model(&self) -> &str;
    fn vision_model(&self) -> &str;
    fn system_prompt(&self) -> Option<&str>;
    fn timeout_secs(&self) -> u64;
}

/// LLM config loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EnvLlmConfig {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub default_model: String,
    pub vision_model: String,
    pub system_prompt: Option<String>,
    pub timeout_secs: u64,
}

impl LlmConfig for EnvLlmConfig {
    fn api_key(&self) -> &str {
        &self.openai_api_key
    }
    fn base_url(&self) -> &str {
        &self.openai_base_url
    }
    fn default_model(&self) -> &str {
        &self.default_model
    }
    fn vision_model(&self) -> &str {
        &self.vision_model
    }
    fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }
    fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }
}

impl EnvLlmConfig {
    /// Load from environment variables. `OPENAI_API_KEY` is required.
    pub fn from_env() -> Result<Self> {
        let openai_api_key = env::var("OPENAI_API_KEY")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .context("OPENAI_API_KEY must be provided")?;
        let openai_base_url = env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| openai_client::DEFAULT_BASE_URL.to_string());
        let default_model = env::var("MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let vision_model =
            env::var("VISION_MODEL").unwrap_or_else(|_| DEFAULT_VISION_MODEL.to_string());
        let system_prompt = env::var("SYSTEM_PROMPT")
            .ok()
            .filter(|s| !s.trim().is_empty());
        let timeout_secs = match env::var("OPENAI_TIMEOUT_SECS") {
            Ok(s) => s.trim().parse::<u64>().with_context(|| {
                format!("OPENAI_TIMEOUT_SECS must be a whole number of seconds: {}", s)
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };
        Ok(Self {
            openai_api_key,
            openai_base_url,
            default_model,
            vision_model,
            system_prompt,
            timeout_secs,
        })
    }

    /// Validate config (base URL must parse, timeout must be positive).
    pub fn validate(&self) -> Result<()> {
        if reqwest::Url::parse(&self.openai_base_url).is_err() {
            anyhow::bail!("OPENAI_BASE_URL is not a valid URL: {}", self.openai_base_url);
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("OPENAI_TIMEOUT_SECS must be greater than 0");
        }
        Ok(())
    }
}
