//! Update dispatch and command handlers

mod commands;
mod types;

pub use commands::{
    format_summary, handle_currency_prize, handle_ping, handle_start, DB_ERROR_TEXT, GENERIC_ERROR_TEXT,
    OPEN_WEBAPP_BUTTON, PRICE_ERROR_TEXT, PRICE_LOADING_TEXT, WELCOME_TEXT,
};
pub use types::HandlerDeps;

use super::bot::{parse_command, Command};
use super::notifications::notify_admin_error;
use super::update::Update;

/// Routes one update. Anything without a known command is ignored.
///
/// Handler errors are answered with a generic reply in the same thread and
/// reported to the admin chat; nothing is returned to the webhook caller.
pub async fn handle_update(deps: &HandlerDeps, update: Update) {
    let Some(message) = update.message else {
        log::debug!("Update {} has no message, skipping", update.update_id);
        return;
    };
    let Some(command) = message.text.as_deref().and_then(parse_command) else {
        return;
    };

    log::info!("{} from chat {}", command.slash_name(), message.chat.id);

    let result = match command {
        Command::Start => handle_start(deps, &message).await,
        Command::Ping => handle_ping(deps, &message).await,
        Command::CurrencyPrize => handle_currency_prize(deps, &message).await,
    };

    if let Err(e) = result {
        log::error!("{} failed for chat {}: {}", command.slash_name(), message.chat.id, e);
        if let Err(send_err) = deps
            .messenger
            .send_text(message.target(), GENERIC_ERROR_TEXT, None)
            .await
        {
            log::error!("Failed to send error reply: {}", send_err);
        }
        notify_admin_error(deps.messenger.as_ref(), deps.settings.admin_chat_id, command, &e).await;
    }
}
