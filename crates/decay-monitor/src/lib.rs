//! Corporate Decay Monitor service: configuration, evaluation driver, daily
//! scheduler and HTTP read API around the scoring core.

pub mod analyzer;
pub mod config;
pub mod cycle;
pub mod routes;
pub mod scheduler;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use anyhow::{Context, Result};
use decay_alerts::{AlertCoordinator, NotificationService};
use market_data::YahooFinanceClient;

pub use analyzer::{Analyzer, TickerAnalysis};
pub use config::{MonitorConfig, VolatilityMode};
pub use cycle::{run_daily_cycle, CycleReport};

/// Shared, read-only state for handlers and the scheduler.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    pub coordinator: Arc<AlertCoordinator>,
    pub notifier: Arc<NotificationService>,
    pub config: Arc<MonitorConfig>,
}

impl AppState {
    /// Wire the Yahoo Finance provider and the configured notification
    /// channels around `config`.
    pub fn from_config(config: MonitorConfig) -> Result<Self> {
        let provider = YahooFinanceClient::new().context("Failed to build market data client")?;

        let mut coordinator = AlertCoordinator::new();
        if let Some(url) = &config.dashboard_url {
            coordinator = coordinator.with_dashboard_url(url.clone());
        }

        let notifier = NotificationService::new(&config.notifications);

        Ok(Self {
            analyzer: Arc::new(Analyzer::new(Arc::new(provider), config.volatility_mode)),
            coordinator: Arc::new(coordinator),
            notifier: Arc::new(notifier),
            config: Arc::new(config),
        })
    }
}

/// Serve the read API and, if enabled, run the daily scheduler.
pub async fn run_server(state: AppState) -> Result<()> {
    let addr = state.config.bind_addr;

    if state.config.scheduler_enabled {
        scheduler::spawn_daily(state.clone());
        tracing::info!(
            "Daily scheduler enabled ({:02}:00 UTC)",
            state.config.daily_run_hour_utc
        );
    }

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Corporate Decay Monitor listening on {}", addr);

    axum::serve(listener, routes::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
