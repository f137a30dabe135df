//! Error reports to the admin chat

use std::error::Error as _;

use super::bot::Command;
use super::messenger::Messenger;
use super::update::ChatTarget;
use crate::error::AppError;

/// Report text: the failing command, the error and its source chain.
pub fn format_error_report(command: Command, error: &AppError) -> String {
    let mut report = format!("Error in command: {}\n\nMessage: {}", command.slash_name(), error);

    let mut source = error.source();
    while let Some(cause) = source {
        report.push_str("\nCaused by: ");
        report.push_str(&cause.to_string());
        source = cause.source();
    }

    report
}

/// Sends the report to `admin_chat_id`. Never fails: a missing admin chat or
/// a failed send is only logged.
pub async fn notify_admin_error(
    messenger: &dyn Messenger,
    admin_chat_id: Option<i64>,
    command: Command,
    error: &AppError,
) {
    let Some(chat_id) = admin_chat_id else {
        log::error!("ADMIN_CHAT_ID is not set, cannot report error in {}", command.slash_name());
        return;
    };

    let target = ChatTarget {
        chat_id,
        thread_id: None,
    };
    if let Err(e) = messenger
        .send_text(target, &format_error_report(command, error), None)
        .await
    {
        log::error!("Failed to send error report to admin: {}", e);
    }
}
