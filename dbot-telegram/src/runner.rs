//! REPL runner: converts teloxide messages to core::Message and passes them to HandlerChain.
//! Calls get_me before starting to populate bot_username.

use anyhow::Result;
use dbot_core::ToCoreMessage;
use handler_chain::HandlerChain;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{error, info, instrument, warn};

use super::adapters::TelegramMessageWrapper;

/// Shared cache of the bot's own username (without `@`), filled in before the REPL starts.
pub type BotUsername = Arc<tokio::sync::RwLock<Option<String>>>;

/// Starts the REPL with the given teloxide Bot, HandlerChain, and bot_username cache.
///
/// teloxide delivers the updates of one chat in order and different chats concurrently; the chain
/// is awaited inline so a user's messages are handled in the order they arrived. Chain errors are
/// logged and never stop the REPL. Ctrl-C shuts the dispatcher down gracefully.
#[instrument(skip(bot, handler_chain, bot_username))]
pub async fn run_repl(
    bot: teloxide::Bot,
    handler_chain: HandlerChain,
    bot_username: BotUsername,
) -> Result<()> {
    match bot.get_me().await {
        Ok(me) => {
            if let Some(username) = &me.user.username {
                *bot_username.write().await = Some(username.clone());
                info!(username = %username, "Bot username set before repl");
            }
        }
        Err(e) => warn!(error = %e, "get_me failed; commands addressed with @botname will not match"),
    }

    let chain = handler_chain;
    teloxide::repl(bot, move |_bot: Bot, msg: teloxide::types::Message| {
        let chain = chain.clone();

        async move {
            let core_msg = TelegramMessageWrapper(&msg).to_core();
            info!(
                user_id = core_msg.user.id,
                chat_id = core_msg.chat.id,
                kind = ?core_msg.kind,
                "Received message"
            );

            if let Err(e) = chain.handle(&core_msg).await {
                error!(error = %e, user_id = core_msg.user.id, "Handler chain failed");
            }

            respond(())
        }
    })
    .await;

    info!("REPL stopped");
    Ok(())
}
