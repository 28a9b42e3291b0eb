use decay_core::MarketObservation;
use statrs::statistics::Statistics;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Minimum closes for a meaningful volatility estimate.
pub const MIN_VOLATILITY_CLOSES: usize = 20;

/// Used when no observation is available at all.
pub const DEFAULT_VOLATILITY_ESTIMATE: f64 = 50.0;

/// Annualized volatility (%) from daily closes: population standard deviation
/// of log returns scaled by sqrt(252).
///
/// Returns `None` for short histories. Pairs with a non-positive or
/// non-finite close are skipped.
pub fn annualized_volatility(closes: &[f64]) -> Option<f64> {
    if closes.len() < MIN_VOLATILITY_CLOSES {
        return None;
    }

    let returns: Vec<f64> = closes
        .windows(2)
        .filter(|w| valid_price(w[0]) && valid_price(w[1]))
        .map(|w| (w[1] / w[0]).ln())
        .collect();

    if returns.len() < 2 {
        return None;
    }

    let std_dev = returns.iter().population_std_dev();
    Some(std_dev * TRADING_DAYS_PER_YEAR.sqrt() * 100.0)
}

/// Crude estimate: three times the absolute 1-month change, or a fixed
/// default when the observation or its change is missing.
pub fn placeholder_volatility(observation: Option<&MarketObservation>) -> f64 {
    observation
        .and_then(|obs| obs.metrics().change_1m_pct)
        .map(|change| change.abs() * 3.0)
        .unwrap_or(DEFAULT_VOLATILITY_ESTIMATE)
}

fn valid_price(p: f64) -> bool {
    p.is_finite() && p > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_series_has_no_volatility() {
        assert!(annualized_volatility(&[100.0; 19]).is_none());
    }

    #[test]
    fn test_flat_series_has_zero_volatility() {
        let vol = annualized_volatility(&[100.0; 40]).unwrap();
        assert!(vol.abs() < 1e-9);
    }

    #[test]
    fn test_alternating_series() {
        // Log returns alternate between +r and -r, so the population std dev is r.
        let closes: Vec<f64> = (0..41)
            .map(|i| if i % 2 == 0 { 100.0 } else { 110.0 })
            .collect();
        let r = (110.0_f64 / 100.0).ln();
        let expected = r * 252.0_f64.sqrt() * 100.0;
        let vol = annualized_volatility(&closes).unwrap();
        assert!((vol - expected).abs() < 1e-6, "{vol} vs {expected}");
    }

    #[test]
    fn test_placeholder_volatility() {
        let obs = MarketObservation {
            current_price: 80.0,
            price_1m_ago: 100.0,
            price_3m_ago: 100.0,
            high_52w: 120.0,
            current_volume: 0.0,
            average_volume_20d: 0.0,
        };
        assert!((placeholder_volatility(Some(&obs)) - 60.0).abs() < 1e-9);
        assert_eq!(placeholder_volatility(None), DEFAULT_VOLATILITY_ESTIMATE);
    }
}
