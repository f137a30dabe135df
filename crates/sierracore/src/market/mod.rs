//! Market data: row extraction, the gold/tether summary, spot rates

pub mod extractor;
pub mod fetch;
pub mod spot;
pub mod summary;

// Re-exports for convenience
pub use extractor::{extract_row, ExtractedRow, MarkerScan, RowLocator, RowQuery};
pub use fetch::{MarketClient, MarketSource};
pub use spot::{SpotClient, SpotRates};
pub use summary::{MarketSummary, Quote, GOLD_ROW, TETHER_ROW};
