//! Decay signal scoring
//!
//! Each signal is a step function of one metric, checked most-severe-first.
//! Thresholds are inclusive. The handcrafted point values already encode each
//! signal's weight, so the composite is a plain sum.

use crate::types::{MarketObservation, ScoringResult, SignalInputs, SignalScores};

/// D1: 1-month price change (%).
pub fn score_price_1m(change: f64) -> u32 {
    if change <= -40.0 {
        15
    } else if change <= -25.0 {
        12
    } else if change <= -15.0 {
        8
    } else if change <= -10.0 {
        4
    } else {
        0
    }
}

/// D2: 3-month price change (%).
pub fn score_price_3m(change: f64) -> u32 {
    if change <= -60.0 {
        20
    } else if change <= -40.0 {
        16
    } else if change <= -25.0 {
        10
    } else if change <= -15.0 {
        5
    } else {
        0
    }
}

/// D3: distance from the 52-week high (%).
pub fn score_from_high(pct: f64) -> u32 {
    if pct <= -80.0 {
        20
    } else if pct <= -60.0 {
        15
    } else if pct <= -40.0 {
        10
    } else if pct <= -25.0 {
        5
    } else {
        0
    }
}

/// D4: short interest as percent of float. Missing data scores nothing.
pub fn score_short_interest(pct: Option<f64>) -> u32 {
    let Some(pct) = pct else {
        return 0;
    };
    if pct >= 30.0 {
        15
    } else if pct >= 20.0 {
        12
    } else if pct >= 15.0 {
        8
    } else if pct >= 10.0 {
        4
    } else {
        0
    }
}

/// D5: volume anomaly.
///
/// Only scored while the price is falling: `price_change` must be the same
/// 1-month change that fed D1.
pub fn score_volume(ratio: f64, price_change: f64) -> u32 {
    if price_change.is_nan() || price_change >= 0.0 {
        return 0;
    }
    if ratio >= 5.0 {
        15
    } else if ratio >= 3.0 {
        10
    } else if ratio >= 2.0 {
        5
    } else {
        0
    }
}

/// D6: annualized volatility (%).
pub fn score_volatility(vol: f64) -> u32 {
    if vol >= 150.0 {
        15
    } else if vol >= 100.0 {
        10
    } else if vol >= 80.0 {
        6
    } else if vol >= 60.0 {
        3
    } else {
        0
    }
}

/// Score one ticker.
///
/// Price and volume signals need the observation; short interest and
/// volatility are scored from their own inputs even when it is absent.
pub fn score(
    observation: Option<&MarketObservation>,
    short_interest: Option<f64>,
    volatility: Option<f64>,
) -> ScoringResult {
    let (price_1m, price_3m, from_high, volume) = match observation {
        Some(obs) => {
            let m = obs.metrics();
            (
                m.change_1m_pct.map(score_price_1m).unwrap_or(0),
                m.change_3m_pct.map(score_price_3m).unwrap_or(0),
                m.pct_from_high.map(score_from_high).unwrap_or(0),
                m.change_1m_pct
                    .map(|change| score_volume(m.volume_ratio, change))
                    .unwrap_or(0),
            )
        }
        None => (0, 0, 0, 0),
    };

    let signals = SignalScores::new(
        price_1m,
        price_3m,
        from_high,
        score_short_interest(short_interest),
        volume,
        volatility.map(score_volatility).unwrap_or(0),
    );

    ScoringResult::from_signals(signals)
}

pub fn score_inputs(inputs: &SignalInputs) -> ScoringResult {
    score(
        inputs.observation.as_ref(),
        inputs.short_interest_pct,
        inputs.volatility_pct,
    )
}
