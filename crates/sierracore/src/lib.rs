//! SierraBravo core: everything the bot needs that does not talk to Telegram.
//!
//! # Module Structure
//!
//! - `core`: configuration constants, error types, logging
//! - `market`: row extraction from the price page, market summary, spot rates
//! - `webapp_auth`: Mini App init-data validation and signing

pub mod core;
pub mod market;
pub mod webapp_auth;

// Re-export commonly used types for convenience
pub use core::{config, FetchError, MarketError};
pub use market::{extract_row, ExtractedRow, MarketClient, MarketSource, MarketSummary, Quote, RowQuery};
pub use webapp_auth::{sign_init_data, validate_init_data, Rejected, ValidatedInitData, WebAppUser};
