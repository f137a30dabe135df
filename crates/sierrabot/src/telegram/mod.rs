//! Telegram surface: update types, commands, handlers and the Mini App API

pub mod bot;
pub mod handlers;
pub mod messenger;
pub mod notifications;
pub mod update;
pub mod webapp;

pub use bot::{create_bot, parse_command, setup_bot_commands, Command};
pub use handlers::{handle_update, HandlerDeps};
pub use messenger::{Messenger, TelegramMessenger, WebAppButton};
pub use update::{ChatTarget, Update};
