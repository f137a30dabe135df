//! Configuration constants, error types and logging

pub mod config;
pub mod error;
pub mod logging;

// Re-exports for convenience
pub use error::{FetchError, MarketError};
pub use logging::{init_logger, parse_level};
