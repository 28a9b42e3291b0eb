use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status} for {ticker}")]
    Status { ticker: String, status: u16 },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),
}
