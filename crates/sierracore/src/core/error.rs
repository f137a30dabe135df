use thiserror::Error;

/// Errors from fetching a remote document or JSON body
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed with status: {0}")]
    Http(reqwest::StatusCode),
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
}

/// Errors from assembling market data
///
/// A missing row is reported per row so the log shows which label moved.
#[derive(Debug, Error)]
pub enum MarketError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A required row could not be located on the page
    #[error("Could not find the {row} row, the page layout may have changed")]
    LayoutChanged { row: &'static str },

    /// A rate API answered without the value we need
    #[error("{0} unavailable")]
    Unavailable(&'static str),
}

impl From<reqwest::Error> for MarketError {
    fn from(err: reqwest::Error) -> Self {
        MarketError::Fetch(FetchError::Reqwest(err))
    }
}
