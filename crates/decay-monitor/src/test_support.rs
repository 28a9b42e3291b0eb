use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use decay_alerts::{AlertMessage, NotificationChannel, NotificationConfig, NotificationError};
use market_data::{MarketDataError, MarketDataProvider, PriceHistory};

use crate::config::{MonitorConfig, VolatilityMode};

/// In-memory provider. Tickers without history fail like an HTTP 404.
#[derive(Default)]
pub struct StubProvider {
    histories: HashMap<String, PriceHistory>,
    short_interest: HashMap<String, f64>,
}

impl StubProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// 63 closes from 120 down to 100 at the 1-month mark and 50 today;
    /// 52w high 150; today's volume 5x the 20-day average.
    pub fn decaying_history() -> PriceHistory {
        let closes = (0..63)
            .map(|i| {
                if i <= 40 {
                    120.0 - i as f64 * 0.5
                } else {
                    100.0 - (i - 40) as f64 * 50.0 / 22.0
                }
            })
            .collect();
        // Last 20 volumes: 15 x 0, 4 x 375, 1 x 500 -> average 100.
        let mut volumes = vec![1_000.0; 43];
        volumes.extend([0.0; 15]);
        volumes.extend([375.0; 4]);
        volumes.push(500.0);

        PriceHistory {
            closes,
            volumes,
            fifty_two_week_high: Some(150.0),
        }
    }

    pub fn with_decaying(mut self, ticker: &str) -> Self {
        self.histories
            .insert(ticker.to_string(), Self::decaying_history());
        self
    }

    pub fn with_short_interest(mut self, ticker: &str, pct: f64) -> Self {
        self.short_interest.insert(ticker.to_string(), pct);
        self
    }
}

#[async_trait]
impl MarketDataProvider for StubProvider {
    async fn fetch_price_history(&self, ticker: &str) -> Result<PriceHistory, MarketDataError> {
        self.histories
            .get(ticker)
            .cloned()
            .ok_or_else(|| MarketDataError::Status {
                ticker: ticker.to_string(),
                status: 404,
            })
    }

    async fn fetch_short_interest(&self, ticker: &str) -> Result<Option<f64>, MarketDataError> {
        Ok(self.short_interest.get(ticker).copied())
    }
}

/// Records subjects of delivered messages; optionally fails every send.
pub struct RecordingChannel {
    subjects: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl RecordingChannel {
    pub fn new(fail: bool) -> (Self, Arc<Mutex<Vec<String>>>) {
        let subjects = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                subjects: Arc::clone(&subjects),
                fail,
            },
            subjects,
        )
    }
}

#[async_trait]
impl NotificationChannel for RecordingChannel {
    async fn send(&self, message: &AlertMessage) -> Result<(), NotificationError> {
        if self.fail {
            return Err(NotificationError::EmailApi("relay unavailable".to_string()));
        }
        self.subjects
            .lock()
            .unwrap()
            .push(message.subject.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

pub fn test_config(watchlist: &[&str]) -> MonitorConfig {
    MonitorConfig {
        watchlist: watchlist.iter().map(|t| t.to_string()).collect(),
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        analyze_delay: Duration::ZERO,
        cron_delay: Duration::ZERO,
        daily_run_hour_utc: 13,
        scheduler_enabled: false,
        volatility_mode: VolatilityMode::Placeholder,
        dashboard_url: None,
        notifications: NotificationConfig::default(),
    }
}
