//! Bot abstraction for sending messages and fetching attachments.
//!
//! [`Bot`] is transport-agnostic; `dbot_telegram::TelegramBotAdapter` implements it via teloxide.
//! Tests substitute a recording implementation.

use crate::error::Result;
use crate::types::{Chat, Message};
use async_trait::async_trait;

/// Abstraction for outbound messaging. Implementations map to a transport (e.g. Telegram).
#[async_trait]
pub trait Bot: Send + Sync {
    /// Sends a text message to the given chat.
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()>;

    /// Sends a reply to the given message (same chat).
    async fn reply_to(&self, message: &Message, text: &str) -> Result<()> {
        self.send_message(&message.chat, text).await
    }

    /// Sends `text` together with a one-time keyboard offering `choices`, one button per row.
    /// Tapping a button sends the button's label back as a plain text message.
    async fn send_choices(&self, chat: &Chat, text: &str, choices: &[String]) -> Result<()>;

    /// Downloads the file behind a transport-specific file id (e.g. a Telegram photo).
    async fn fetch_photo(&self, file_id: &str) -> Result<Vec<u8>>;
}
