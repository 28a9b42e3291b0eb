use serde::{Deserialize, Serialize};

/// Raw price and volume observation for one ticker, as supplied by a market
/// data provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketObservation {
    pub current_price: f64,
    pub price_1m_ago: f64,
    pub price_3m_ago: f64,
    pub high_52w: f64,
    pub current_volume: f64,
    pub average_volume_20d: f64,
}

/// Metrics derived from a [`MarketObservation`].
///
/// Percent changes are `None` when the reference price is not a usable
/// divisor (zero, negative or non-finite).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceMetrics {
    pub current_price: f64,
    pub change_1m_pct: Option<f64>,
    pub change_3m_pct: Option<f64>,
    pub pct_from_high: Option<f64>,
    pub volume_ratio: f64,
}

impl MarketObservation {
    pub fn metrics(&self) -> PriceMetrics {
        PriceMetrics {
            current_price: self.current_price,
            change_1m_pct: percent_change(self.current_price, self.price_1m_ago),
            change_3m_pct: percent_change(self.current_price, self.price_3m_ago),
            pct_from_high: percent_change(self.current_price, self.high_52w),
            volume_ratio: self.volume_ratio(),
        }
    }

    /// Current volume over the 20-day average, 1.0 when the average is unusable.
    pub fn volume_ratio(&self) -> f64 {
        if self.average_volume_20d.is_finite() && self.average_volume_20d > 0.0 {
            self.current_volume / self.average_volume_20d
        } else {
            1.0
        }
    }
}

fn percent_change(current: f64, reference: f64) -> Option<f64> {
    if !reference.is_finite() || reference <= 0.0 || !current.is_finite() {
        return None;
    }
    Some((current - reference) / reference * 100.0)
}

/// Independently optional inputs to the scorer for one ticker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalInputs {
    pub observation: Option<MarketObservation>,
    pub short_interest_pct: Option<f64>,
    pub volatility_pct: Option<f64>,
}

/// The closed set of decay signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalKind {
    Price1M,
    Price3M,
    FromHigh,
    ShortInterest,
    Volume,
    Volatility,
}

impl SignalKind {
    pub const ALL: [SignalKind; 6] = [
        SignalKind::Price1M,
        SignalKind::Price3M,
        SignalKind::FromHigh,
        SignalKind::ShortInterest,
        SignalKind::Volume,
        SignalKind::Volatility,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SignalKind::Price1M => "D1_Price1M",
            SignalKind::Price3M => "D2_Price3M",
            SignalKind::FromHigh => "D3_FromHigh",
            SignalKind::ShortInterest => "D4_ShortInterest",
            SignalKind::Volume => "D5_Volume",
            SignalKind::Volatility => "D6_Volatility",
        }
    }

    /// Point ceiling for the signal. The ceilings sum to 100.
    pub fn max_points(&self) -> u32 {
        match self {
            SignalKind::Price1M => 15,
            SignalKind::Price3M => 20,
            SignalKind::FromHigh => 20,
            SignalKind::ShortInterest => 15,
            SignalKind::Volume => 15,
            SignalKind::Volatility => 15,
        }
    }
}

/// Points awarded by each of the six signals.
///
/// Values are clamped to the signal ceiling on construction, so the total can
/// never leave [0, 100].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SignalScores {
    #[serde(rename = "D1_Price1M")]
    price_1m: u32,
    #[serde(rename = "D2_Price3M")]
    price_3m: u32,
    #[serde(rename = "D3_FromHigh")]
    from_high: u32,
    #[serde(rename = "D4_ShortInterest")]
    short_interest: u32,
    #[serde(rename = "D5_Volume")]
    volume: u32,
    #[serde(rename = "D6_Volatility")]
    volatility: u32,
}

impl SignalScores {
    pub fn new(
        price_1m: u32,
        price_3m: u32,
        from_high: u32,
        short_interest: u32,
        volume: u32,
        volatility: u32,
    ) -> Self {
        Self {
            price_1m: price_1m.min(SignalKind::Price1M.max_points()),
            price_3m: price_3m.min(SignalKind::Price3M.max_points()),
            from_high: from_high.min(SignalKind::FromHigh.max_points()),
            short_interest: short_interest.min(SignalKind::ShortInterest.max_points()),
            volume: volume.min(SignalKind::Volume.max_points()),
            volatility: volatility.min(SignalKind::Volatility.max_points()),
        }
    }

    pub fn get(&self, kind: SignalKind) -> u32 {
        match kind {
            SignalKind::Price1M => self.price_1m,
            SignalKind::Price3M => self.price_3m,
            SignalKind::FromHigh => self.from_high,
            SignalKind::ShortInterest => self.short_interest,
            SignalKind::Volume => self.volume,
            SignalKind::Volatility => self.volatility,
        }
    }

    /// All six signals in D1..D6 order.
    pub fn iter(&self) -> impl Iterator<Item = (SignalKind, u32)> + '_ {
        SignalKind::ALL.iter().map(move |kind| (*kind, self.get(*kind)))
    }

    /// Signals that contributed points.
    pub fn active(&self) -> impl Iterator<Item = (SignalKind, u32)> + '_ {
        self.iter().filter(|(_, points)| *points > 0)
    }

    pub fn total(&self) -> u32 {
        self.iter().map(|(_, points)| points).sum()
    }
}

/// Severity tier, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    Normal,
    Attention,
    Warning,
    Critical,
}

impl Tier {
    pub fn from_score(score: u32) -> Self {
        if score >= 75 {
            Tier::Critical
        } else if score >= 50 {
            Tier::Warning
        } else if score >= 25 {
            Tier::Attention
        } else {
            Tier::Normal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Normal => "NORMAL",
            Tier::Attention => "ATTENTION",
            Tier::Warning => "WARNING",
            Tier::Critical => "CRITICAL",
        }
    }

    /// Display marker. Presentation only.
    pub fn glyph(&self) -> &'static str {
        match self {
            Tier::Normal => "🟢",
            Tier::Attention => "🟡",
            Tier::Warning => "🟠",
            Tier::Critical => "🔴",
        }
    }

    pub fn should_alert(&self) -> bool {
        matches!(self, Tier::Warning | Tier::Critical)
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of scoring one ticker at one evaluation instant.
///
/// `total_score` is always the sum of `signals` and `tier` is always derived
/// from it; the only constructor is [`ScoringResult::from_signals`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoringResult {
    signals: SignalScores,
    total_score: u32,
    tier: Tier,
}

impl ScoringResult {
    pub fn from_signals(signals: SignalScores) -> Self {
        let total_score = signals.total();
        Self {
            signals,
            total_score,
            tier: Tier::from_score(total_score),
        }
    }

    pub fn signals(&self) -> &SignalScores {
        &self.signals
    }

    pub fn total_score(&self) -> u32 {
        self.total_score
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }
}
