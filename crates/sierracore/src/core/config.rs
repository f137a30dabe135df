//! Configuration constants shared by the bot and the HTTP layer.
//!
//! Runtime settings (tokens, chat ids, paths) are not read here; the bot
//! builds them once at startup and passes them down explicitly.

use std::time::Duration;

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for outbound HTTP requests (in seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 15;

    /// User agent sent to the scraped page and the rate APIs
    pub const USER_AGENT: &str = concat!("sierrabravo/", env!("CARGO_PKG_VERSION"));

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Market page and rate sources
pub mod market {
    /// Page holding both the gold and the tether rows
    pub const IRANJIB_URL: &str = "https://www.iranjib.ir/";

    /// Row label for the price of one gram of 18 karat gold
    pub const GOLD_18K_MARKER: &str = "هر گرم طلای ۱۸ عیار";

    /// Row label for Tether (USDT)
    pub const TETHER_MARKER: &str = "تتر";

    /// Gold spot price in USD per troy ounce
    pub const GOLD_API_URL: &str = "https://www.gold-api.com/api/XAU/USD";

    /// USD to IRR exchange rate
    pub const CURRENCY_API_URL: &str = "https://api.currencyapi.com/v3/latest?base_currency=USD&currencies=IRR";

    pub const GRAMS_PER_TROY_OUNCE: f64 = 31.1035;

    /// 18 parts gold out of 24
    pub const KARAT_18_PURITY: f64 = 0.75;
}

/// Mini App configuration
pub mod webapp {
    use super::Duration;

    /// HMAC key used to derive the init-data signing key from the bot token
    pub const SIGNING_KEY_LABEL: &[u8] = b"WebAppData";

    /// Header the Mini App front-end puts the raw init data in
    pub const INIT_DATA_HEADER: &str = "X-Telegram-Init-Data";

    /// Init data older than this is refused by the HTTP layer (24 hours)
    pub const MAX_INIT_DATA_AGE_SECS: u64 = 86_400;

    /// Maximum init data age duration
    pub fn max_init_data_age() -> Duration {
        Duration::from_secs(MAX_INIT_DATA_AGE_SECS)
    }
}
