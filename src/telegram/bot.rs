//! Bot initialization and command definitions

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::core::config;

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "I can:")]
pub enum Command {
    #[command(description = "show the welcome message and main menu")]
    Start,
    #[command(description = "show the main menu")]
    Menu,
    #[command(description = "browse product categories")]
    Categories,
    #[command(description = "show your cart")]
    Cart,
    #[command(description = "show your order history")]
    Orders,
    #[command(description = "search for products")]
    Search,
    #[command(description = "get product recommendations")]
    Recommend,
    #[command(description = "show help")]
    Help,
}

/// Creates a Bot instance using the configured token and a shared HTTP client
/// with the crate-wide request timeout.
pub fn create_bot() -> anyhow::Result<Bot> {
    if config::BOT_TOKEN.is_empty() {
        anyhow::bail!("BOT_TELEGRAM_TOKEN is not set");
    }
    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;
    Ok(Bot::with_client(config::BOT_TOKEN.clone(), client))
}

/// Registers the command list in the Telegram UI.
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(Command::bot_commands()).await?;
    Ok(())
}
