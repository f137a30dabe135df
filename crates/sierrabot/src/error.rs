use sierracore::MarketError;
use thiserror::Error;

/// Centralized error type for the bot
///
/// Handlers, storage and the Telegram client all surface this enum; `main`
/// wraps it in `anyhow`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Database connection pool errors
    #[error("Database pool error: {0}")]
    DatabasePool(#[from] r2d2::Error),

    /// Telegram API errors
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// Scrape or rate lookup failed
    #[error("Market error: {0}")]
    Market(#[from] MarketError),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
