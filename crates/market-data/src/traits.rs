use async_trait::async_trait;

use crate::{MarketDataError, PriceHistory};

/// Source of per-ticker market data.
///
/// The two calls are independent: a failed price fetch says nothing about
/// short interest, and callers score whatever arrives.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn fetch_price_history(&self, ticker: &str) -> Result<PriceHistory, MarketDataError>;

    /// Short interest as a percent of float. `Ok(None)` when the provider has
    /// no figure for the ticker.
    async fn fetch_short_interest(&self, ticker: &str) -> Result<Option<f64>, MarketDataError>;
}
