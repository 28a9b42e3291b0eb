//! Market data collaborators for the decay monitor.
//!
//! Fetches daily price history and short interest, and derives the
//! [`decay_core::MarketObservation`] and volatility inputs the scorer consumes.

pub mod error;
pub mod history;
pub mod traits;
pub mod volatility;
pub mod yahoo_finance;

pub use error::MarketDataError;
pub use history::PriceHistory;
pub use traits::MarketDataProvider;
pub use volatility::{annualized_volatility, placeholder_volatility};
pub use yahoo_finance::YahooFinanceClient;
