use std::sync::Arc;

use anyhow::{Context, Result};
use secrecy::ExposeSecret;
use sierracore::core::init_logger;
use sierracore::market::SpotClient;
use sierracore::webapp_auth::signed_query;
use sierracore::MarketClient;
use teloxide::prelude::*;

use sierrabravo::cli::{Cli, Commands};
use sierrabravo::config::Settings;
use sierrabravo::server::{create_router, run_server};
use sierrabravo::storage::create_pool;
use sierrabravo::telegram::bot::{create_bot, register_webhook, setup_bot_commands};
use sierrabravo::telegram::{HandlerDeps, TelegramMessenger};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine, variables may come from the environment
    let _ = dotenvy::dotenv();

    let cli = Cli::parse_args();
    let settings = Settings::from_env().context("Failed to read settings")?;

    init_logger(&settings.log_file_path, settings.log_level)?;

    match cli.command.unwrap_or(Commands::Run { port: None }) {
        Commands::Run { port } => {
            let port = port.unwrap_or(settings.port);
            run_bot(settings, port).await
        }
        Commands::SetWebhook { url } => {
            let url = match url {
                Some(url) => url::Url::parse(&url)?,
                None => settings
                    .webhook_url
                    .clone()
                    .context("No webhook URL, pass --url or set WEBHOOK_URL")?,
            };
            let bot = create_bot(&settings)?;
            register_webhook(&bot, url.clone(), &settings).await?;
            log::info!("Webhook set to {}", url);
            Ok(())
        }
        Commands::DeleteWebhook => {
            create_bot(&settings)?.delete_webhook().await?;
            log::info!("Webhook deleted");
            Ok(())
        }
        Commands::RegisterCommands => {
            setup_bot_commands(&create_bot(&settings)?).await?;
            log::info!("Command menu registered");
            Ok(())
        }
        Commands::Scrape => {
            let summary = MarketClient::new(settings.market_url.as_str())?.fetch_summary().await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        Commands::Sign { data } => {
            let fields: Vec<(String, String)> = url::form_urlencoded::parse(data.as_bytes()).into_owned().collect();
            println!("{}", signed_query(&fields, settings.bot_token.expose_secret()));
            Ok(())
        }
    }
}

async fn run_bot(settings: Settings, port: u16) -> Result<()> {
    log::info!("Starting SierraBravo {}", env!("CARGO_PKG_VERSION"));

    let db_pool = Arc::new(create_pool(&settings.database_path).context("Failed to open database")?);
    let bot = create_bot(&settings)?;

    if let Some(url) = settings.webhook_url.clone() {
        match register_webhook(&bot, url.clone(), &settings).await {
            Ok(()) => log::info!("Webhook set to {}", url),
            Err(e) => log::warn!("Failed to set webhook: {}", e),
        }
    } else {
        log::warn!("WEBHOOK_URL is not set, Telegram must already know where to deliver updates");
    }

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to register command menu: {}", e);
    }

    let market = Arc::new(MarketClient::new(settings.market_url.as_str())?);
    let spot = Arc::new(SpotClient::new()?);
    let deps = HandlerDeps::new(
        db_pool,
        Arc::new(TelegramMessenger::new(bot)),
        market,
        Arc::new(settings),
    );

    run_server(create_router(deps, spot), port).await
}
