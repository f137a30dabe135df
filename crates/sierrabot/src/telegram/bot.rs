//! Bot initialization and command routing
//!
//! This module contains:
//! - Command enum definition and parsing
//! - Bot instance creation
//! - Webhook and command-menu registration

use std::str::FromStr;

use reqwest::ClientBuilder;
use secrecy::ExposeSecret;
use sierracore::config;
use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator};
use teloxide::prelude::*;
use teloxide::types::BotCommand;
use url::Url;

use crate::config::Settings;

/// Bot commands. Names are matched case-sensitively, as Telegram sends them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Command {
    Start,
    Ping,
    CurrencyPrize,
}

impl Command {
    pub fn description(&self) -> &'static str {
        match self {
            Command::Start => "Open the SierraBravo web app",
            Command::Ping => "Check the bot latency",
            Command::CurrencyPrize => "Latest 18k gold and tether prices",
        }
    }

    /// `/name` as shown to users and admins
    pub fn slash_name(&self) -> String {
        format!("/{}", self.as_ref())
    }
}

/// Reads the command from the first token of a message.
///
/// `/ping@SierraBot extra words` is `Ping`; text without a leading slash or
/// with an unknown name is `None`.
pub fn parse_command(text: &str) -> Option<Command> {
    let token = text.split_whitespace().next()?;
    let name = token.strip_prefix('/')?;
    let name = name.split_once('@').map_or(name, |(name, _bot)| name);
    Command::from_str(name).ok()
}

/// Creates a Bot instance with the shared network timeout
pub fn create_bot(settings: &Settings) -> anyhow::Result<Bot> {
    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;
    Ok(Bot::with_client(settings.bot_token.expose_secret(), client))
}

/// Sets up bot commands in Telegram UI
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    let commands: Vec<BotCommand> = Command::iter()
        .map(|c| BotCommand::new(c.as_ref(), c.description()))
        .collect();
    bot.set_my_commands(commands).await?;
    Ok(())
}

/// Points Telegram at `url`, with the secret token when one is configured.
pub async fn register_webhook(bot: &Bot, url: Url, settings: &Settings) -> Result<(), teloxide::RequestError> {
    let request = bot.set_webhook(url);
    match &settings.webhook_secret {
        Some(secret) => request.secret_token(secret.expose_secret().to_string()).await?,
        None => request.await?,
    };
    Ok(())
}
