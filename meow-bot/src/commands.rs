//! Classification of an incoming message into the action the dispatcher takes.
//!
//! Slash commands are parsed with teloxide's [`BotCommands`] derive (so `/newchat@meow_bot`
//! works in groups). Unknown commands are treated as ordinary text. Text that exactly matches a
//! model label is a model selection from the /setmodel keyboard.

use dbot_core::{Message, MessageKind};
use teloxide::utils::command::BotCommands;

use crate::models::{ModelOption, ModelRegistry};

/// Commands registered in the Telegram command menu.
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
pub enum Command {
    #[command(description = "say hello")]
    Start,
    #[command(description = "forget the conversation and start over")]
    NewChat,
    #[command(description = "choose the model")]
    SetModel,
}

/// What one incoming message asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Start,
    NewChat,
    SetModel,
    /// The user tapped a model button.
    ModelSelection(ModelOption),
    Text(String),
    Photo { file_id: String, caption: String },
    /// Neither text nor photo; ignored.
    Unsupported,
}

/// Resolves `message` once; the dispatcher then matches on the result.
pub fn classify(message: &Message, models: &ModelRegistry, bot_username: &str) -> ChatCommand {
    match &message.kind {
        MessageKind::Text => {
            let text = message.content.as_str();
            if let Ok(command) = Command::parse(text, bot_username) {
                return match command {
                    Command::Start => ChatCommand::Start,
                    Command::NewChat => ChatCommand::NewChat,
                    Command::SetModel => ChatCommand::SetModel,
                };
            }
            if let Some(option) = models.resolve(text.trim()) {
                return ChatCommand::ModelSelection(option.clone());
            }
            ChatCommand::Text(text.to_string())
        }
        MessageKind::Photo { file_id } => ChatCommand::Photo {
            file_id: file_id.clone(),
            caption: message.content.clone(),
        },
        MessageKind::Other => ChatCommand::Unsupported,
    }
}
