use decay_core::MarketObservation;
use serde::{Deserialize, Serialize};

use crate::MarketDataError;

/// Minimum number of daily closes needed to derive a 1-month reference.
pub const MIN_CLOSES: usize = 22;

/// Trading days between the current close and the 1-month reference.
const ONE_MONTH_LOOKBACK: usize = 23;

const AVERAGE_VOLUME_WINDOW: usize = 20;

/// Roughly three months of daily closes and volumes, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    pub closes: Vec<f64>,
    /// Missing volumes are recorded as zero.
    pub volumes: Vec<f64>,
    pub fifty_two_week_high: Option<f64>,
}

impl PriceHistory {
    pub fn to_observation(&self) -> Result<MarketObservation, MarketDataError> {
        let closes = &self.closes;
        if closes.len() < MIN_CLOSES {
            return Err(MarketDataError::InsufficientData(format!(
                "{} closes, need at least {}",
                closes.len(),
                MIN_CLOSES
            )));
        }

        let current_price = closes[closes.len() - 1];
        let price_1m_ago = closes
            .len()
            .checked_sub(ONE_MONTH_LOOKBACK)
            .map(|i| closes[i])
            .unwrap_or(closes[0]);
        let price_3m_ago = closes[0];

        let high_52w = self
            .fifty_two_week_high
            .filter(|h| h.is_finite() && *h > 0.0)
            .unwrap_or_else(|| closes.iter().copied().fold(f64::MIN, f64::max));

        let current_volume = self.volumes.last().copied().unwrap_or(0.0);
        let window_start = self.volumes.len().saturating_sub(AVERAGE_VOLUME_WINDOW);
        let average_volume_20d =
            self.volumes[window_start..].iter().sum::<f64>() / AVERAGE_VOLUME_WINDOW as f64;

        Ok(MarketObservation {
            current_price,
            price_1m_ago,
            price_3m_ago,
            high_52w,
            current_volume,
            average_volume_20d,
        })
    }
}
