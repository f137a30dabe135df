//! Gold and tether quotes assembled from one page.

use serde::{Deserialize, Serialize};

use super::extractor::{ExtractedRow, MarkerScan, RowLocator, RowQuery};
use crate::core::config::market::{GOLD_18K_MARKER, TETHER_MARKER};
use crate::core::MarketError;

/// Gold is the first column after its label.
pub const GOLD_ROW: RowQuery<'static> = RowQuery::new(GOLD_18K_MARKER, 0, 1);

/// The tether row carries an extra leading cell, so its columns shift by one.
pub const TETHER_ROW: RowQuery<'static> = RowQuery::new(TETHER_MARKER, 1, 2);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub price: String,
    pub change: String,
}

impl From<ExtractedRow> for Quote {
    fn from(row: ExtractedRow) -> Self {
        Self {
            price: row.value,
            change: row.change,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSummary {
    pub gold: Quote,
    pub tether: Quote,
}

impl MarketSummary {
    /// Reads both rows with the default scan.
    pub fn from_document(html: &str) -> Result<Self, MarketError> {
        Self::with_locator(&MarkerScan, html)
    }

    /// Reads both rows with the given strategy. Both must be present.
    pub fn with_locator<L: RowLocator>(locator: &L, html: &str) -> Result<Self, MarketError> {
        let gold = locator
            .locate(html, &GOLD_ROW)
            .ok_or(MarketError::LayoutChanged { row: "gold" })?;
        let tether = locator
            .locate(html, &TETHER_ROW)
            .ok_or(MarketError::LayoutChanged { row: "tether" })?;

        Ok(Self {
            gold: gold.into(),
            tether: tether.into(),
        })
    }
}
