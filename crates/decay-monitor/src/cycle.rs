use std::time::Duration;

use chrono::{DateTime, Utc};
use decay_alerts::{AlertCoordinator, NotificationService};
use decay_core::{ScoringResult, Tier};
use serde::Serialize;

use crate::analyzer::Analyzer;

/// Summary of one daily evaluation run.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub timestamp: DateTime<Utc>,
    pub analyzed: usize,
    pub alerts_sent: Vec<String>,
    pub alerts_failed: Vec<String>,
    pub critical: Vec<String>,
    pub warning: Vec<String>,
    /// `None` when the digest was suppressed, otherwise whether it was delivered.
    pub digest_sent: Option<bool>,
}

/// Analyze the watchlist, alert on every WARNING/CRITICAL ticker, then send
/// the digest. Delivery failures are recorded in the report, not retried.
pub async fn run_daily_cycle(
    analyzer: &Analyzer,
    coordinator: &AlertCoordinator,
    notifier: &NotificationService,
    watchlist: &[String],
    delay: Duration,
) -> CycleReport {
    tracing::info!("Daily decay cycle started ({} tickers)", watchlist.len());

    let analyses = analyzer.analyze_watchlist(watchlist, delay).await;

    let mut alerts_sent = Vec::new();
    let mut alerts_failed = Vec::new();
    for analysis in analyses.iter().filter(|a| coordinator.should_alert(&a.result)) {
        let message = coordinator.format_alert_message(
            &analysis.ticker,
            &analysis.result,
            analysis.observation.as_ref(),
        );
        if notifier.dispatch(&message).await {
            alerts_sent.push(analysis.ticker.clone());
        } else {
            alerts_failed.push(analysis.ticker.clone());
        }
    }

    let batch: Vec<(String, ScoringResult)> = analyses
        .iter()
        .map(|a| (a.ticker.clone(), a.result))
        .collect();

    let digest_sent = match coordinator.format_daily_digest(&batch) {
        Some(digest) => Some(notifier.dispatch(&digest).await),
        None => {
            tracing::info!("No WARNING or CRITICAL tickers, daily digest suppressed");
            None
        }
    };

    let in_tier = |tier: Tier| -> Vec<String> {
        analyses
            .iter()
            .filter(|a| a.tier == tier)
            .map(|a| a.ticker.clone())
            .collect()
    };

    let report = CycleReport {
        timestamp: Utc::now(),
        analyzed: analyses.len(),
        critical: in_tier(Tier::Critical),
        warning: in_tier(Tier::Warning),
        alerts_sent,
        alerts_failed,
        digest_sent,
    };

    tracing::info!(
        "Daily decay cycle completed: {} analyzed, {} alerts sent, {} failed",
        report.analyzed,
        report.alerts_sent.len(),
        report.alerts_failed.len()
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VolatilityMode;
    use crate::test_support::{RecordingChannel, StubProvider};
    use std::sync::Arc;

    fn tickers(list: &[&str]) -> Vec<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    #[tokio::test]
    async fn test_cycle_alerts_and_digest() {
        let provider = StubProvider::new()
            .with_decaying("GME")
            .with_short_interest("GME", 25.0);
        let analyzer = Analyzer::new(Arc::new(provider), VolatilityMode::Placeholder);
        let (channel, sent) = RecordingChannel::new(false);
        let notifier = NotificationService::with_channels(vec![Box::new(channel)]);

        let report = run_daily_cycle(
            &analyzer,
            &AlertCoordinator::new(),
            &notifier,
            &tickers(&["SPY", "GME"]),
            Duration::ZERO,
        )
        .await;

        assert_eq!(report.analyzed, 2);
        assert_eq!(report.critical, vec!["GME"]);
        assert!(report.warning.is_empty());
        assert_eq!(report.alerts_sent, vec!["GME"]);
        assert_eq!(report.digest_sent, Some(true));

        let subjects = sent.lock().unwrap().clone();
        assert_eq!(subjects.len(), 2);
        assert!(subjects[0].contains("GME - CRITICAL"));
        assert!(subjects[1].starts_with("📊 Corporate Decay Daily: 1 critical"));
    }

    #[tokio::test]
    async fn test_quiet_cycle_sends_nothing() {
        let analyzer = Analyzer::new(Arc::new(StubProvider::new()), VolatilityMode::Placeholder);
        let (channel, sent) = RecordingChannel::new(false);
        let notifier = NotificationService::with_channels(vec![Box::new(channel)]);

        let report = run_daily_cycle(
            &analyzer,
            &AlertCoordinator::new(),
            &notifier,
            &tickers(&["AAA", "BBB"]),
            Duration::ZERO,
        )
        .await;

        assert_eq!(report.analyzed, 2);
        assert!(report.alerts_sent.is_empty());
        assert_eq!(report.digest_sent, None);
        assert!(sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delivery_failure_is_reported() {
        let analyzer = Analyzer::new(
            Arc::new(StubProvider::new().with_decaying("LCID")),
            VolatilityMode::Placeholder,
        );
        let (channel, _sent) = RecordingChannel::new(true);
        let notifier = NotificationService::with_channels(vec![Box::new(channel)]);

        let report = run_daily_cycle(
            &analyzer,
            &AlertCoordinator::new(),
            &notifier,
            &tickers(&["LCID"]),
            Duration::ZERO,
        )
        .await;

        assert!(report.alerts_sent.is_empty());
        assert_eq!(report.alerts_failed, vec!["LCID"]);
        assert_eq!(report.digest_sent, Some(false));
    }
}
