use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Parameters for requesting a window of daily candles from a [`DataProvider`].
///
/// [`DataProvider`]: crate::providers::DataProvider
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CandleRequest {
    /// Exchange market code (e.g., `"KRW-BTC"`).
    pub market: String,

    /// Number of most recent daily candles to return. Must be at least 1.
    ///
    /// Providers page through their API when this exceeds a single response.
    pub count: u32,

    /// Exclusive upper bound of the window (UTC). `None` means "up to now".
    #[serde(default)]
    pub to: Option<DateTime<Utc>>,
}

impl CandleRequest {
    pub fn latest(market: impl Into<String>, count: u32) -> Self {
        Self {
            market: market.into(),
            count,
            to: None,
        }
    }
}
