//! Alert decisions and message formatting.
//!
//! Everything here is pure: the coordinator turns scoring results into
//! [`AlertMessage`]s and leaves delivery to [`crate::NotificationService`].

use chrono::{DateTime, Utc};
use decay_core::{MarketObservation, ScoringResult, Tier};

use crate::{AlertMessage, MessageKind};

const MONITOR_NAME: &str = "Corporate Decay Monitor";

/// True for tiers that warrant an individual notification.
pub fn should_alert(result: &ScoringResult) -> bool {
    result.tier().should_alert()
}

/// Suggested action for a tier.
pub fn recommendation(tier: Tier) -> &'static str {
    match tier {
        Tier::Critical => "🚨 EXIT positions immediately. Consider buying puts.",
        Tier::Warning => "⚠️ Review positions and prepare an exit. Monitor closely.",
        Tier::Attention => "👀 Keep under observation. Re-check the investment thesis.",
        Tier::Normal => "No action required.",
    }
}

/// Formats alerts and digests. Holds only presentation settings.
#[derive(Debug, Clone, Default)]
pub struct AlertCoordinator {
    dashboard_url: Option<String>,
}

impl AlertCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dashboard_url(mut self, url: impl Into<String>) -> Self {
        self.dashboard_url = Some(url.into());
        self
    }

    pub fn should_alert(&self, result: &ScoringResult) -> bool {
        should_alert(result)
    }

    /// Individual alert for one ticker. The price section is left out when no
    /// observation is available.
    pub fn format_alert_message(
        &self,
        ticker: &str,
        result: &ScoringResult,
        observation: Option<&MarketObservation>,
    ) -> AlertMessage {
        let tier = result.tier();
        let score = result.total_score();

        let price_section = observation
            .map(|obs| {
                let m = obs.metrics();
                format!(
                    "\nCurrent price: ${:.2}\n1M change: {}\n3M change: {}\nFrom 52W high: {}\n",
                    m.current_price,
                    format_pct(m.change_1m_pct),
                    format_pct(m.change_3m_pct),
                    format_pct(m.pct_from_high),
                )
            })
            .unwrap_or_default();

        let mut signal_lines: Vec<String> = result
            .signals()
            .active()
            .map(|(kind, points)| format!("• {}: {} pts", kind.label(), points))
            .collect();
        if signal_lines.is_empty() {
            signal_lines.push("• none".to_string());
        }

        let body = format!(
            "{glyph} CORPORATE DECAY ALERT\n\
             \n\
             Ticker: {ticker}\n\
             Score: {score}/100\n\
             Tier: {tier}\n\
             {price_section}\n\
             Active signals:\n\
             {signals}\n\
             \n\
             ---\n\
             Recommended action: {action}\n\
             \n\
             ---\n\
             {footer}",
            glyph = tier.glyph(),
            signals = signal_lines.join("\n"),
            action = recommendation(tier),
            footer = self.footer(),
        );

        AlertMessage {
            kind: MessageKind::TickerAlert {
                ticker: ticker.to_string(),
                tier,
                score,
            },
            subject: format!(
                "{} CORPORATE DECAY: {} - {} ({}/100)",
                tier.glyph(),
                ticker,
                tier,
                score
            ),
            body,
            timestamp: Utc::now(),
        }
    }

    /// Daily digest for a whole batch, or `None` when nothing reached
    /// WARNING or CRITICAL.
    pub fn format_daily_digest(&self, batch: &[(String, ScoringResult)]) -> Option<AlertMessage> {
        self.format_daily_digest_at(batch, Utc::now())
    }

    pub fn format_daily_digest_at(
        &self,
        batch: &[(String, ScoringResult)],
        generated_at: DateTime<Utc>,
    ) -> Option<AlertMessage> {
        let in_tier = |tier: Tier| -> Vec<&(String, ScoringResult)> {
            batch.iter().filter(|(_, r)| r.tier() == tier).collect()
        };
        let critical = in_tier(Tier::Critical);
        let warning = in_tier(Tier::Warning);
        let attention = in_tier(Tier::Attention);

        if critical.is_empty() && warning.is_empty() {
            return None;
        }

        let body = format!(
            "📊 CORPORATE DECAY - DAILY SUMMARY\n\
             \n\
             {critical}\n\
             \n\
             {warning}\n\
             \n\
             {attention}\n\
             \n\
             ---\n\
             Total monitored: {total}\n\
             Timestamp: {timestamp}\n\
             \n\
             {footer}",
            critical = render_bucket(Tier::Critical, "CRITICAL", &critical),
            warning = render_bucket(Tier::Warning, "WARNING", &warning),
            attention = render_bucket(Tier::Attention, "ATTENTION", &attention),
            total = batch.len(),
            timestamp = generated_at.to_rfc3339(),
            footer = self.footer(),
        );

        Some(AlertMessage {
            kind: MessageKind::DailyDigest {
                critical: critical.len(),
                warning: warning.len(),
                attention: attention.len(),
                total: batch.len(),
            },
            subject: format!(
                "📊 Corporate Decay Daily: {} critical, {} warning",
                critical.len(),
                warning.len()
            ),
            body,
            timestamp: generated_at,
        })
    }

    fn footer(&self) -> String {
        match &self.dashboard_url {
            Some(url) => format!("{MONITOR_NAME}\n{url}"),
            None => MONITOR_NAME.to_string(),
        }
    }
}

fn render_bucket(tier: Tier, heading: &str, entries: &[&(String, ScoringResult)]) -> String {
    let lines = if entries.is_empty() {
        "none".to_string()
    } else {
        entries
            .iter()
            .map(|(ticker, r)| format!("{} {}: {}/100", tier.glyph(), ticker, r.total_score()))
            .collect::<Vec<_>>()
            .join("\n")
    };
    format!("{} {} ({}):\n{}", tier.glyph(), heading, entries.len(), lines)
}

fn format_pct(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.1}%", v))
        .unwrap_or_else(|| "n/a".to_string())
}
