//! Outbound messages.
//!
//! Handlers only need to send and edit plain text, so they talk to the
//! `Messenger` trait; `TelegramMessenger` is the teloxide-backed
//! implementation.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, MessageId, ThreadId, WebAppInfo};
use url::Url;

use super::update::ChatTarget;
use crate::error::AppResult;

/// Inline button that opens the Mini App.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebAppButton {
    pub text: String,
    pub url: Url,
}

#[async_trait]
pub trait Messenger: Send + Sync {
    /// Sends `text` and returns the new message id.
    async fn send_text(&self, target: ChatTarget, text: &str, button: Option<&WebAppButton>) -> AppResult<i32>;

    /// Replaces the text of a message the bot sent earlier.
    async fn edit_text(&self, chat_id: i64, message_id: i32, text: &str) -> AppResult<()>;
}

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send_text(&self, target: ChatTarget, text: &str, button: Option<&WebAppButton>) -> AppResult<i32> {
        let mut request = self.bot.send_message(ChatId(target.chat_id), text);
        if let Some(thread_id) = target.thread_id {
            request = request.message_thread_id(ThreadId(MessageId(thread_id)));
        }
        if let Some(button) = button {
            let keyboard = InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::web_app(
                button.text.clone(),
                WebAppInfo {
                    url: button.url.clone(),
                },
            )]]);
            request = request.reply_markup(keyboard);
        }

        let sent = request.await?;
        Ok(sent.id.0)
    }

    async fn edit_text(&self, chat_id: i64, message_id: i32, text: &str) -> AppResult<()> {
        self.bot
            .edit_message_text(ChatId(chat_id), MessageId(message_id), text)
            .await?;
        Ok(())
    }
}
