//! Runtime settings read once from the environment at startup.

use std::path::PathBuf;
use std::time::Duration;

use log::LevelFilter;
use secrecy::SecretString;
use sierracore::config::{market, webapp};
use sierracore::core::parse_level;
use thiserror::Error;
use url::Url;

pub const DEFAULT_DATABASE_PATH: &str = "sierrabravo.sqlite";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_STATIC_DIR: &str = "webapp/static";
pub const DEFAULT_LOG_FILE: &str = "sierrabravo.log";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Everything the bot needs that is not a compile-time constant.
#[derive(Debug)]
pub struct Settings {
    pub bot_token: SecretString,
    pub admin_chat_id: Option<i64>,
    /// Mini App page opened by the `/start` button
    pub webapp_url: Option<Url>,
    /// Public URL registered with `setWebhook`
    pub webhook_url: Option<Url>,
    /// Expected `X-Telegram-Bot-Api-Secret-Token`
    pub webhook_secret: Option<SecretString>,
    pub database_path: String,
    pub port: u16,
    pub static_dir: PathBuf,
    pub log_file_path: String,
    pub log_level: LevelFilter,
    pub market_url: String,
    pub init_data_max_age: Duration,
}

impl Settings {
    /// Reads the process environment. Call after `dotenvy::dotenv()`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds settings from an arbitrary variable source. Blank values count
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bot_token = get("BOT_TOKEN")
            .or_else(|| get("TELOXIDE_TOKEN"))
            .ok_or(ConfigError::Missing("BOT_TOKEN"))?;

        let admin_chat_id = get("ADMIN_CHAT_ID")
            .map(|v| parse_number("ADMIN_CHAT_ID", &v))
            .transpose()?;

        let webapp_url = get("WEBAPP_URL")
            .or_else(|| get("WORKER_URL"))
            .map(|v| parse_url("WEBAPP_URL", &v))
            .transpose()?;

        let webhook_url = get("WEBHOOK_URL")
            .map(|v| parse_url("WEBHOOK_URL", &v))
            .transpose()?;

        let port = get("PORT")
            .map(|v| parse_number("PORT", &v))
            .transpose()?
            .unwrap_or(DEFAULT_PORT);

        let init_data_max_age = get("INIT_DATA_MAX_AGE_SECS")
            .map(|v| parse_number::<u64>("INIT_DATA_MAX_AGE_SECS", &v))
            .transpose()?
            .map(Duration::from_secs)
            .unwrap_or_else(webapp::max_init_data_age);

        Ok(Self {
            bot_token: SecretString::from(bot_token),
            admin_chat_id,
            webapp_url,
            webhook_url,
            webhook_secret: get("WEBHOOK_SECRET").map(SecretString::from),
            database_path: get("DATABASE_PATH").unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string()),
            port,
            static_dir: get("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR)),
            log_file_path: get("LOG_FILE_PATH").unwrap_or_else(|| DEFAULT_LOG_FILE.to_string()),
            log_level: get("LOG_LEVEL")
                .map(|v| parse_level(&v))
                .unwrap_or(LevelFilter::Info),
            market_url: get("MARKET_URL").unwrap_or_else(|| market::IRANJIB_URL.to_string()),
            init_data_max_age,
        })
    }
}

fn parse_number<T>(name: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}

fn parse_url(name: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}
