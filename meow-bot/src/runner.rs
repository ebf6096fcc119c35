use anyhow::Result;
use dbot_core::init_tracing;
use dbot_telegram::run_repl;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{info, instrument, warn};

use crate::commands::Command;
use crate::components::{build_bot_components, build_handler_chain};
use crate::config::BotConfig;

/// Main entry: validate config, init logging, register the command menu, then run the REPL.
#[instrument(skip(config))]
pub async fn run_bot(config: BotConfig) -> Result<()> {
    config.validate()?;
    init_tracing(config.log_file())?;

    info!(
        registered_users = config.allow_list.len(),
        default_model = %config.default_model(),
        "Initializing bot"
    );
    config.allow_list.log_summary();
    for option in config.models.iter() {
        info!(label = %option.label, model = %option.id, "Model available");
    }

    let teloxide_bot = config.telegram.build_bot()?;
    if let Err(e) = teloxide_bot.set_my_commands(Command::bot_commands()).await {
        warn!(error = %e, "Failed to register bot commands");
    }

    let components = build_bot_components(&config, teloxide_bot.clone())?;
    let handler_chain = build_handler_chain(&config, &components);

    info!("Bot started successfully");

    run_repl(teloxide_bot, handler_chain, components.bot_username.clone()).await
}
