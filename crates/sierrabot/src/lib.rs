//! SierraBravo: a webhook-driven Telegram bot that reports Iranian gold and
//! tether quotes and backs a small Telegram Mini App.
//!
//! Parsing and signature checks live in `sierracore`; this crate owns the
//! Telegram surface, the HTTP server and the user store.

pub mod cli;
pub mod config;
pub mod error;
pub mod server;
pub mod storage;
pub mod telegram;

pub use config::Settings;
pub use error::{AppError, AppResult};
