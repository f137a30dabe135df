//! The part of the Telegram `Update` object the bot reads.
//!
//! Unknown fields are ignored, so callback queries, edits and channel posts
//! deserialize to an update without a `message`.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub message_id: i32,
    pub chat: Chat,
    pub message_thread_id: Option<i32>,
    pub text: Option<String>,
    pub from: Option<Sender>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sender {
    pub id: i64,
    pub first_name: String,
    pub username: Option<String>,
}

/// Where a reply goes: the chat plus the forum topic the command came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatTarget {
    pub chat_id: i64,
    pub thread_id: Option<i32>,
}

impl IncomingMessage {
    pub fn target(&self) -> ChatTarget {
        ChatTarget {
            chat_id: self.chat.id,
            thread_id: self.message_thread_id,
        }
    }
}
