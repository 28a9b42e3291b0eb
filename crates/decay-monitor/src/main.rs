use anyhow::{Context, Result};
use decay_monitor::{run_daily_cycle, AppState, MonitorConfig};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        eprintln!("PANIC: {info}");
        tracing::error!("PANIC: {info}");
    }));

    let config = MonitorConfig::from_env()?;
    tracing::info!("Configuration loaded");
    tracing::info!("  Watchlist: {} tickers", config.watchlist.len());
    tracing::info!("  Volatility mode: {:?}", config.volatility_mode);
    tracing::info!(
        "  Delays: analyze {}ms, cron {}ms",
        config.analyze_delay.as_millis(),
        config.cron_delay.as_millis()
    );

    let state = AppState::from_config(config)?;

    match std::env::args().nth(1).as_deref() {
        Some("run-once") => {
            let report = run_daily_cycle(
                &state.analyzer,
                &state.coordinator,
                &state.notifier,
                &state.config.watchlist,
                state.config.cron_delay,
            )
            .await;
            let json = serde_json::to_string_pretty(&report).context("Failed to encode report")?;
            println!("{json}");
            Ok(())
        }
        Some(other) => anyhow::bail!("unknown command '{}' (expected: run-once)", other),
        None => decay_monitor::run_server(state).await,
    }
}
