use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::{MarketDataError, MarketDataProvider, PriceHistory};

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const QUOTE_SUMMARY_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";

#[derive(Clone)]
pub struct YahooFinanceClient {
    client: reqwest::Client,
    chart_url: String,
    quote_summary_url: String,
}

impl YahooFinanceClient {
    pub fn new() -> Result<Self, MarketDataError> {
        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            client,
            chart_url: CHART_URL.to_string(),
            quote_summary_url: QUOTE_SUMMARY_URL.to_string(),
        })
    }

    /// Point the client at different endpoints (mirrors, local fixtures).
    pub fn with_base_urls(mut self, chart_url: &str, quote_summary_url: &str) -> Self {
        self.chart_url = chart_url.trim_end_matches('/').to_string();
        self.quote_summary_url = quote_summary_url.trim_end_matches('/').to_string();
        self
    }

    async fn get_json(&self, ticker: &str, url: &str) -> Result<Value, MarketDataError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(MarketDataError::Status {
                ticker: ticker.to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl MarketDataProvider for YahooFinanceClient {
    /// Three months of daily closes and volumes.
    async fn fetch_price_history(&self, ticker: &str) -> Result<PriceHistory, MarketDataError> {
        let url = format!("{}/{}?interval=1d&range=3mo", self.chart_url, ticker);
        let json = self.get_json(ticker, &url).await?;
        let history = parse_chart(&json)?;
        tracing::debug!(ticker, closes = history.closes.len(), "Fetched price history");
        Ok(history)
    }

    async fn fetch_short_interest(&self, ticker: &str) -> Result<Option<f64>, MarketDataError> {
        let url = format!(
            "{}/{}?modules=defaultKeyStatistics",
            self.quote_summary_url, ticker
        );
        let json = self.get_json(ticker, &url).await?;
        Ok(parse_short_interest(&json))
    }
}

/// Parse a chart response. Null closes are dropped; null volumes count as zero.
pub fn parse_chart(json: &Value) -> Result<PriceHistory, MarketDataError> {
    let result = json
        .get("chart")
        .and_then(|v| v.get("result"))
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .ok_or_else(|| MarketDataError::Parse("No chart data found".to_string()))?;

    let quote = result
        .get("indicators")
        .and_then(|v| v.get("quote"))
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .ok_or_else(|| MarketDataError::Parse("No quote data found".to_string()))?;

    let closes = quote
        .get("close")
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().filter_map(|v| v.as_f64()).collect())
        .unwrap_or_default();

    let volumes = quote
        .get("volume")
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().map(|v| v.as_f64().unwrap_or(0.0)).collect())
        .unwrap_or_default();

    let fifty_two_week_high = result
        .get("meta")
        .and_then(|m| m.get("fiftyTwoWeekHigh"))
        .and_then(|v| v.as_f64());

    Ok(PriceHistory {
        closes,
        volumes,
        fifty_two_week_high,
    })
}

/// Short percent of float from a quote-summary response, scaled to 0-100.
/// Missing or zero figures are treated as unavailable.
pub fn parse_short_interest(json: &Value) -> Option<f64> {
    json.get("quoteSummary")
        .and_then(|v| v.get("result"))
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .and_then(|r| r.get("defaultKeyStatistics"))
        .and_then(|s| s.get("shortPercentOfFloat"))
        .and_then(|s| s.get("raw"))
        .and_then(|v| v.as_f64())
        .filter(|raw| *raw != 0.0)
        .map(|raw| raw * 100.0)
}
