//! # meow-bot
//!
//! Telegram chatbot for a fixed list of registered users. Each user gets one in-memory
//! conversation that is relayed to an OpenAI-compatible chat API; photos go to a vision model.
//! Wires dbot-telegram (transport), handler-chain, and llm-client together.

pub mod allowlist;
pub mod cli;
pub mod commands;
pub mod components;
pub mod config;
pub mod handlers;
pub mod models;
pub mod runner;
pub mod session;

pub use allowlist::AllowList;
pub use cli::{load_config, Cli, Commands};
pub use commands::{classify, ChatCommand, Command};
pub use components::{build_bot_components, build_handler_chain, BotComponents};
pub use config::BotConfig;
pub use handlers::{ChatDispatcher, LoggingHandler};
pub use models::{ModelOption, ModelRegistry};
pub use runner::run_bot;
pub use session::{Session, SessionStore};
