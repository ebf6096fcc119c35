//! # dbot-telegram
//!
//! Telegram bot framework layer: adapters, [`dbot_core::Bot`] implementation, minimal config, REPL runner.
//! Handles only Telegram connectivity and handler-chain execution; no sessions or AI logic.

mod adapters;
mod bot_adapter;
mod config;
mod runner;

pub use adapters::{TelegramMessageWrapper, TelegramUserWrapper};
pub use bot_adapter::{choice_keyboard, TelegramBotAdapter};
pub use config::{TelegramConfig, DEFAULT_LOG_FILE};
pub use runner::{run_repl, BotUsername};
