use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use decay_core::{
    MarketObservation, PriceMetrics, ScoringResult, SignalInputs, SignalScores, Tier,
};
use market_data::{annualized_volatility, placeholder_volatility, MarketDataProvider};
use serde::Serialize;

use crate::config::VolatilityMode;

/// Scoring outcome for one ticker, as returned by the read API.
#[derive(Debug, Clone, Serialize)]
pub struct TickerAnalysis {
    pub ticker: String,
    pub timestamp: DateTime<Utc>,
    pub price: Option<PriceMetrics>,
    pub short_interest: Option<f64>,
    pub volatility: f64,
    pub signals: SignalScores,
    pub score: u32,
    pub tier: Tier,
    pub glyph: &'static str,
    #[serde(skip)]
    pub observation: Option<MarketObservation>,
    #[serde(skip)]
    pub result: ScoringResult,
}

/// Fetches inputs for a ticker and runs the scorer.
pub struct Analyzer {
    provider: Arc<dyn MarketDataProvider>,
    volatility_mode: VolatilityMode,
}

impl Analyzer {
    pub fn new(provider: Arc<dyn MarketDataProvider>, volatility_mode: VolatilityMode) -> Self {
        Self {
            provider,
            volatility_mode,
        }
    }

    /// Never fails: provider errors are logged and the affected inputs are
    /// scored as absent.
    pub async fn analyze_ticker(&self, ticker: &str) -> TickerAnalysis {
        let history = match self.provider.fetch_price_history(ticker).await {
            Ok(history) => Some(history),
            Err(e) => {
                tracing::warn!(ticker, "Price history unavailable: {}", e);
                None
            }
        };

        let observation = history.as_ref().and_then(|h| match h.to_observation() {
            Ok(obs) => Some(obs),
            Err(e) => {
                tracing::warn!(ticker, "Cannot derive observation: {}", e);
                None
            }
        });

        let short_interest = match self.provider.fetch_short_interest(ticker).await {
            Ok(pct) => pct,
            Err(e) => {
                tracing::warn!(ticker, "Short interest unavailable: {}", e);
                None
            }
        };

        let volatility = match self.volatility_mode {
            VolatilityMode::Historical => history
                .as_ref()
                .and_then(|h| annualized_volatility(&h.closes))
                .unwrap_or_else(|| placeholder_volatility(observation.as_ref())),
            VolatilityMode::Placeholder => placeholder_volatility(observation.as_ref()),
        };

        let inputs = SignalInputs {
            observation,
            short_interest_pct: short_interest,
            volatility_pct: Some(volatility),
        };
        let result = decay_core::score_inputs(&inputs);
        tracing::debug!(
            ticker,
            score = result.total_score(),
            tier = %result.tier(),
            "Scored ticker"
        );

        TickerAnalysis {
            ticker: ticker.to_string(),
            timestamp: Utc::now(),
            price: observation.as_ref().map(|obs| obs.metrics()),
            short_interest,
            volatility,
            signals: *result.signals(),
            score: result.total_score(),
            tier: result.tier(),
            glyph: result.tier().glyph(),
            observation,
            result,
        }
    }

    /// Analyze tickers one at a time, pausing `delay` between calls to stay
    /// under third-party rate limits.
    pub async fn analyze_watchlist(
        &self,
        tickers: &[String],
        delay: Duration,
    ) -> Vec<TickerAnalysis> {
        let mut results = Vec::with_capacity(tickers.len());
        for (i, ticker) in tickers.iter().enumerate() {
            results.push(self.analyze_ticker(ticker).await);
            if i + 1 < tickers.len() && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubProvider;

    #[tokio::test]
    async fn test_full_data_scores_all_signals() {
        let provider = StubProvider::new().with_decaying("GME").with_short_interest("GME", 25.0);
        let analyzer = Analyzer::new(Arc::new(provider), VolatilityMode::Placeholder);

        let analysis = analyzer.analyze_ticker("GME").await;
        // Placeholder volatility is |-50%| * 3 = 150.
        assert!((analysis.volatility - 150.0).abs() < 1e-9);
        assert!(analysis.price.is_some());
        assert_eq!(analysis.short_interest, Some(25.0));
        assert_eq!(analysis.score, 15 + 16 + 15 + 12 + 15 + 15);
        assert_eq!(analysis.tier, Tier::Critical);
        assert_eq!(analysis.score, analysis.result.total_score());
    }

    #[tokio::test]
    async fn test_provider_failure_degrades_to_independent_signals() {
        let provider = StubProvider::new().with_short_interest("AMC", 32.0);
        let analyzer = Analyzer::new(Arc::new(provider), VolatilityMode::Historical);

        let analysis = analyzer.analyze_ticker("AMC").await;
        assert!(analysis.price.is_none());
        assert!(analysis.observation.is_none());
        // No history at all: placeholder default of 50 scores nothing.
        assert_eq!(analysis.volatility, 50.0);
        assert_eq!(analysis.score, 15);
        assert_eq!(analysis.tier, Tier::Normal);
    }

    #[tokio::test]
    async fn test_historical_volatility_from_closes() {
        let provider = StubProvider::new().with_decaying("RIVN");
        let analyzer = Analyzer::new(Arc::new(provider), VolatilityMode::Historical);

        let analysis = analyzer.analyze_ticker("RIVN").await;
        let closes = StubProvider::decaying_history().closes;
        let expected = annualized_volatility(&closes).unwrap();
        assert!((analysis.volatility - expected).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_watchlist_keeps_order() {
        let provider = StubProvider::new().with_decaying("B");
        let analyzer = Analyzer::new(Arc::new(provider), VolatilityMode::Placeholder);
        let tickers = vec!["A".to_string(), "B".to_string(), "C".to_string()];

        let results = analyzer.analyze_watchlist(&tickers, Duration::ZERO).await;
        let order: Vec<_> = results.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(order, vec!["A", "B", "C"]);
        assert!(results[1].score > results[0].score);
    }
}
