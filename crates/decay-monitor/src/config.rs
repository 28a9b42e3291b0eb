use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use decay_alerts::NotificationConfig;
use serde::{Deserialize, Serialize};

const MAX_TICKER_LEN: usize = 12;

/// Watchlist used when `WATCHLIST` is not set.
pub const DEFAULT_WATCHLIST: &[&str] = &[
    // Meme / retail
    "GME", "AMC", "BBBY",
    // Unprofitable tech
    "SNAP", "LYFT", "PTON", "W", "WISH", "HOOD",
    // EV / SPACs
    "RIVN", "LCID", "NKLA", "QS", "GOEV",
    // Distressed retail
    "M", "KSS", "GPS", "BBY",
    // High debt
    "PARA", "WBD", "DISH",
    // Crypto adjacent
    "COIN", "MSTR", "RIOT", "MARA",
];

/// How the volatility input is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolatilityMode {
    /// Annualized stdev of daily log returns, placeholder when history is short.
    Historical,
    /// Three times the absolute 1-month change.
    Placeholder,
}

impl FromStr for VolatilityMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "historical" => Ok(VolatilityMode::Historical),
            "placeholder" => Ok(VolatilityMode::Placeholder),
            other => bail!("unknown volatility mode '{}'", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub watchlist: Vec<String>,
    pub bind_addr: SocketAddr,
    pub analyze_delay: Duration,
    pub cron_delay: Duration,
    pub daily_run_hour_utc: u32,
    pub scheduler_enabled: bool,
    pub volatility_mode: VolatilityMode,
    pub dashboard_url: Option<String>,
    pub notifications: NotificationConfig,
}

impl MonitorConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| -> String {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let watchlist = match lookup("WATCHLIST").filter(|v| !v.trim().is_empty()) {
            Some(list) => parse_watchlist(&list)?,
            None => DEFAULT_WATCHLIST.iter().map(|t| t.to_string()).collect(),
        };
        if watchlist.is_empty() {
            bail!("WATCHLIST contains no tickers");
        }

        let daily_run_hour_utc: u32 = var("DAILY_RUN_HOUR_UTC", "13")
            .parse()
            .context("DAILY_RUN_HOUR_UTC must be an integer")?;
        if daily_run_hour_utc > 23 {
            bail!("DAILY_RUN_HOUR_UTC must be between 0 and 23, got {}", daily_run_hour_utc);
        }

        Ok(Self {
            watchlist,
            bind_addr: var("BIND_ADDR", "0.0.0.0:3000")
                .parse()
                .context("BIND_ADDR must be a socket address")?,
            analyze_delay: Duration::from_millis(
                var("ANALYZE_DELAY_MS", "200")
                    .parse()
                    .context("ANALYZE_DELAY_MS must be an integer")?,
            ),
            cron_delay: Duration::from_millis(
                var("CRON_DELAY_MS", "300")
                    .parse()
                    .context("CRON_DELAY_MS must be an integer")?,
            ),
            daily_run_hour_utc,
            scheduler_enabled: var("SCHEDULER_ENABLED", "true")
                .parse()
                .context("SCHEDULER_ENABLED must be true or false")?,
            volatility_mode: var("VOLATILITY_MODE", "historical").parse()?,
            dashboard_url: lookup("DASHBOARD_URL").filter(|v| !v.trim().is_empty()),
            notifications: NotificationConfig::from_lookup(&lookup)
                .context("Invalid notification settings")?,
        })
    }
}

/// Comma-separated tickers, normalized, duplicates dropped. Any entry that
/// is not a valid ticker fails the whole list.
pub fn parse_watchlist(raw: &str) -> Result<Vec<String>> {
    let mut tickers: Vec<String> = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let ticker = normalize_ticker(entry)
            .with_context(|| format!("WATCHLIST entry '{}' is not a valid ticker", entry))?;
        if !tickers.contains(&ticker) {
            tickers.push(ticker);
        }
    }
    Ok(tickers)
}

/// Upper-cased ticker, or `None` if it is not safe to splice into provider URLs.
pub fn normalize_ticker(raw: &str) -> Option<String> {
    let ticker = raw.trim().to_ascii_uppercase();
    let valid = !ticker.is_empty()
        && ticker.len() <= MAX_TICKER_LEN
        && ticker
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='));
    valid.then_some(ticker)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<MonitorConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        MonitorConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.watchlist.len(), 25);
        assert_eq!(config.watchlist[0], "GME");
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.analyze_delay, Duration::from_millis(200));
        assert_eq!(config.cron_delay, Duration::from_millis(300));
        assert_eq!(config.daily_run_hour_utc, 13);
        assert!(config.scheduler_enabled);
        assert_eq!(config.volatility_mode, VolatilityMode::Historical);
        assert!(config.dashboard_url.is_none());
        assert_eq!(config.notifications.smtp_port, 587);
        assert!(config.notifications.discord_webhook_url.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("WATCHLIST", "gme, amc ,GME,,tsla"),
            ("DAILY_RUN_HOUR_UTC", "7"),
            ("VOLATILITY_MODE", "Placeholder"),
            ("SCHEDULER_ENABLED", "false"),
            ("DASHBOARD_URL", "https://decay.example.com"),
        ])
        .unwrap();
        assert_eq!(config.watchlist, vec!["GME", "AMC", "TSLA"]);
        assert_eq!(config.daily_run_hour_utc, 7);
        assert_eq!(config.volatility_mode, VolatilityMode::Placeholder);
        assert!(!config.scheduler_enabled);
        assert_eq!(config.dashboard_url.as_deref(), Some("https://decay.example.com"));
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert!(config_from(&[("DAILY_RUN_HOUR_UTC", "24")]).is_err());
        assert!(config_from(&[("ANALYZE_DELAY_MS", "soon")]).is_err());
        assert!(config_from(&[("VOLATILITY_MODE", "implied")]).is_err());
        assert!(config_from(&[("WATCHLIST", " , ,")]).is_err());
    }

    #[test]
    fn test_watchlist_rejects_unsafe_tickers() {
        let err = config_from(&[("WATCHLIST", "GME,../etc/passwd")]).unwrap_err();
        assert!(format!("{:#}", err).contains("../etc/passwd"));
        assert!(config_from(&[("WATCHLIST", "GME,ABCDEFGHIJKLMN")]).is_err());
        assert!(config_from(&[("WATCHLIST", "GME,A B")]).is_err());
    }

    #[test]
    fn test_notification_settings_loaded_from_same_source() {
        let config = config_from(&[
            ("SMTP_PORT", "2525"),
            ("SMTP_TLS", "none"),
            ("DISCORD_WEBHOOK_URL", "https://discord.example.com/hook"),
        ])
        .unwrap();
        assert_eq!(config.notifications.smtp_port, 2525);
        assert_eq!(config.notifications.smtp_tls, decay_alerts::SmtpTls::None);
        assert!(config.notifications.discord_webhook_url.is_some());
    }

    #[test]
    fn test_malformed_notification_settings_are_errors() {
        let err = config_from(&[("SMTP_PORT", "not-a-port")]).unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid notification settings"));
        assert!(config_from(&[("SMTP_TLS", "ssl")]).is_err());
    }

    #[test]
    fn test_normalize_ticker() {
        assert_eq!(normalize_ticker(" brk.b ").as_deref(), Some("BRK.B"));
        assert_eq!(normalize_ticker("^GSPC").as_deref(), Some("^GSPC"));
        assert_eq!(normalize_ticker("GME/../x"), None);
        assert_eq!(normalize_ticker("ABCDEFGHIJKLMN"), None);
        assert_eq!(normalize_ticker("   "), None);
    }
}
