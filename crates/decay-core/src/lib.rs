//! Corporate Decay scoring core
//!
//! Maps raw market observations to six bounded distress signals, a composite
//! 0-100 decay score and a severity tier. Everything here is pure and
//! synchronous, so it can be called concurrently for different tickers.

pub mod scoring;
pub mod types;

pub use scoring::{
    score, score_from_high, score_inputs, score_price_1m, score_price_3m, score_short_interest,
    score_volatility, score_volume,
};
pub use types::{
    MarketObservation, PriceMetrics, ScoringResult, SignalInputs, SignalKind, SignalScores, Tier,
};
