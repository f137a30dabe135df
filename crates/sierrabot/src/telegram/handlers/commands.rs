use std::time::Instant;

use sierracore::MarketSummary;

use super::types::HandlerDeps;
use crate::error::{AppError, AppResult};
use crate::storage::{db, get_connection};
use crate::telegram::bot::Command;
use crate::telegram::messenger::WebAppButton;
use crate::telegram::notifications::notify_admin_error;
use crate::telegram::update::IncomingMessage;

pub const WELCOME_TEXT: &str = "This is SierraBravo.\n\nClick the button below to open the app!";
pub const OPEN_WEBAPP_BUTTON: &str = "🚀 Open Web App";
pub const DB_ERROR_TEXT: &str = "An unexpected database error occurred.";
pub const GENERIC_ERROR_TEXT: &str = "An error occurred while processing your command.";
pub const PRICE_LOADING_TEXT: &str = "Fetching latest prices... ⏳";
pub const PRICE_ERROR_TEXT: &str = "⚠️ Could not fetch the latest prices. Please try again later.";

/// `/start`: registers the chat and offers the Mini App.
pub async fn handle_start(deps: &HandlerDeps, message: &IncomingMessage) -> AppResult<()> {
    let target = message.target();

    let registered = get_connection(&deps.db_pool)
        .map_err(AppError::from)
        .and_then(|conn| db::register_user(&conn, target.chat_id).map_err(AppError::from));

    match registered {
        Ok(true) => log::info!("Registered new user {}", target.chat_id),
        Ok(false) => log::debug!("User {} already registered", target.chat_id),
        Err(e) => {
            log::error!("Failed to add user {} to DB: {}", target.chat_id, e);
            deps.messenger.send_text(target, DB_ERROR_TEXT, None).await?;
            return Ok(());
        }
    }

    let button = deps.settings.webapp_url.clone().map(|url| WebAppButton {
        text: OPEN_WEBAPP_BUTTON.to_string(),
        url,
    });
    deps.messenger.send_text(target, WELCOME_TEXT, button.as_ref()).await?;
    Ok(())
}

/// `/ping`: round trip of one `sendMessage`.
pub async fn handle_ping(deps: &HandlerDeps, message: &IncomingMessage) -> AppResult<()> {
    let target = message.target();

    let started = Instant::now();
    let message_id = deps.messenger.send_text(target, "Pinging...", None).await?;
    let latency = started.elapsed().as_millis();

    deps.messenger
        .edit_text(target.chat_id, message_id, &format!("Pong! 🏓\nLatency: {} ms", latency))
        .await
}

/// `/currencyprize`: placeholder first, then the quotes or an error text.
///
/// A failed scrape is handled here (the placeholder is edited and the admin
/// notified), so it does not also trigger the generic error reply.
pub async fn handle_currency_prize(deps: &HandlerDeps, message: &IncomingMessage) -> AppResult<()> {
    let target = message.target();
    let message_id = deps.messenger.send_text(target, PRICE_LOADING_TEXT, None).await?;

    match deps.market.market_summary().await {
        Ok(summary) => {
            deps.messenger
                .edit_text(target.chat_id, message_id, &format_summary(&summary))
                .await
        }
        Err(e) => {
            log::error!("Market summary failed: {}", e);
            deps.messenger
                .edit_text(target.chat_id, message_id, PRICE_ERROR_TEXT)
                .await?;
            notify_admin_error(
                deps.messenger.as_ref(),
                deps.settings.admin_chat_id,
                Command::CurrencyPrize,
                &AppError::from(e),
            )
            .await;
            Ok(())
        }
    }
}

pub fn format_summary(summary: &MarketSummary) -> String {
    format!(
        "🥇 18 Karat Gold (per gram)\nPrice: {} Rial\nChange: {}\n\n💵 Tether (USDT)\nPrice: {} Rial\nChange: {}",
        summary.gold.price, summary.gold.change, summary.tether.price, summary.tether.change
    )
}
