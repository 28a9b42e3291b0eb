//! Alert coordination and notification delivery for the decay monitor.

pub mod coordinator;
mod email_api;
mod smtp;
mod templates;

pub use coordinator::{recommendation, should_alert, AlertCoordinator};
pub use email_api::EmailApiNotifier;
pub use smtp::SmtpNotifier;
pub use templates::EmailTemplate;

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use decay_core::Tier;
use serde::{Deserialize, Serialize};

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(15);

/// What a message is about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MessageKind {
    TickerAlert {
        ticker: String,
        tier: Tier,
        score: u32,
    },
    DailyDigest {
        critical: usize,
        warning: usize,
        attention: usize,
        total: usize,
    },
}

/// A formatted notification ready for delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertMessage {
    pub kind: MessageKind,
    pub subject: String,
    pub body: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl AlertMessage {
    /// Most severe tier the message reports, used for colouring.
    pub fn severity(&self) -> Tier {
        match &self.kind {
            MessageKind::TickerAlert { tier, .. } => *tier,
            MessageKind::DailyDigest { critical, .. } if *critical > 0 => Tier::Critical,
            MessageKind::DailyDigest { warning, .. } if *warning > 0 => Tier::Warning,
            MessageKind::DailyDigest { attention, .. } if *attention > 0 => Tier::Attention,
            MessageKind::DailyDigest { .. } => Tier::Normal,
        }
    }
}

/// Trait for notification channels.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn send(&self, message: &AlertMessage) -> Result<(), NotificationError>;
    fn name(&self) -> &str;
}

/// Errors from the notification system.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("SMTP error: {0}")]
    Smtp(String),
    #[error("Email API error: {0}")]
    EmailApi(String),
    #[error("Discord webhook error: {0}")]
    Discord(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Configuration for the notification service.
#[derive(Debug, Clone, Default)]
pub struct NotificationConfig {
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_from: Option<String>,
    pub recipients: Vec<String>,
    pub smtp_tls: SmtpTls,
    pub email_api_url: Option<String>,
    pub email_api_sender: String,
    pub email_api_name: String,
    pub discord_webhook_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SmtpTls {
    #[default]
    StartTls,
    Tls,
    None,
}

impl NotificationConfig {
    /// Load from a key lookup (usually the process environment). Unset or
    /// blank keys take their defaults; a malformed port or TLS mode is a
    /// `Config` error.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, NotificationError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let recipients = var("NOTIFICATION_EMAIL_TO")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let smtp_tls = match var("SMTP_TLS") {
            Some(mode) => mode.parse()?,
            None => SmtpTls::default(),
        };

        let smtp_port: u16 = match var("SMTP_PORT") {
            Some(port) => port.trim().parse().map_err(|_| {
                NotificationError::Config(format!("SMTP_PORT must be a port number: '{}'", port))
            })?,
            None => 587,
        };

        Ok(Self {
            smtp_host: var("SMTP_HOST"),
            smtp_port,
            smtp_username: var("SMTP_USERNAME"),
            smtp_password: var("SMTP_PASSWORD"),
            smtp_from: var("SMTP_FROM_ADDRESS"),
            recipients,
            smtp_tls,
            email_api_url: var("EMAIL_API_URL"),
            email_api_sender: var("EMAIL_API_SENDER")
                .unwrap_or_else(|| "corporate-decay".to_string()),
            email_api_name: var("EMAIL_API_NAME")
                .unwrap_or_else(|| "Corporate Decay Monitor".to_string()),
            discord_webhook_url: var("DISCORD_WEBHOOK_URL"),
        })
    }
}

impl FromStr for SmtpTls {
    type Err = NotificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "starttls" => Ok(SmtpTls::StartTls),
            "tls" => Ok(SmtpTls::Tls),
            "none" => Ok(SmtpTls::None),
            other => Err(NotificationError::Config(format!(
                "SMTP_TLS must be starttls, tls or none, got '{}'",
                other
            ))),
        }
    }
}

/// Dispatches messages to every configured channel.
pub struct NotificationService {
    channels: Vec<Box<dyn NotificationChannel>>,
}

impl NotificationService {
    pub fn new(config: &NotificationConfig) -> Self {
        let mut channels: Vec<Box<dyn NotificationChannel>> = Vec::new();

        if config.smtp_host.is_some() && config.smtp_from.is_some() && !config.recipients.is_empty()
        {
            match SmtpNotifier::new(config) {
                Ok(notifier) => {
                    tracing::info!(
                        "Email notifications enabled (SMTP -> {} recipients)",
                        config.recipients.len()
                    );
                    channels.push(Box::new(notifier));
                }
                Err(e) => {
                    tracing::warn!("Failed to initialize SMTP notifier: {}", e);
                }
            }
        }

        if config.email_api_url.is_some() && !config.recipients.is_empty() {
            match EmailApiNotifier::new(config) {
                Ok(notifier) => {
                    tracing::info!(
                        "Email relay notifications enabled ({} recipients)",
                        config.recipients.len()
                    );
                    channels.push(Box::new(notifier));
                }
                Err(e) => {
                    tracing::warn!("Failed to initialize email relay notifier: {}", e);
                }
            }
        }

        if let Some(ref webhook_url) = config.discord_webhook_url {
            match DiscordWebhookNotifier::new(webhook_url, WEBHOOK_TIMEOUT) {
                Ok(notifier) => {
                    tracing::info!("Discord webhook notifications enabled");
                    channels.push(Box::new(notifier));
                }
                Err(e) => {
                    tracing::warn!("Failed to initialize Discord notifier: {}", e);
                }
            }
        }

        if channels.is_empty() {
            tracing::info!("No notification channels configured");
        }

        Self { channels }
    }

    pub fn with_channels(channels: Vec<Box<dyn NotificationChannel>>) -> Self {
        Self { channels }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Send a message once through every channel.
    ///
    /// Returns true only when at least one channel is configured and all of
    /// them accepted the message. Failures are logged, never retried.
    pub async fn dispatch(&self, message: &AlertMessage) -> bool {
        if self.channels.is_empty() {
            tracing::warn!("Dropping notification '{}': no channels configured", message.subject);
            return false;
        }

        let mut all_sent = true;
        for channel in &self.channels {
            match channel.send(message).await {
                Ok(()) => tracing::debug!("Sent notification via {}", channel.name()),
                Err(e) => {
                    tracing::warn!("Failed to send notification via {}: {}", channel.name(), e);
                    all_sent = false;
                }
            }
        }
        all_sent
    }
}

/// Discord webhook notifier.
struct DiscordWebhookNotifier {
    webhook_url: String,
    client: reqwest::Client,
}

impl DiscordWebhookNotifier {
    fn new(webhook_url: &str, timeout: Duration) -> Result<Self, NotificationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotificationError::Config(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            webhook_url: webhook_url.to_string(),
            client,
        })
    }
}

fn discord_color(tier: Tier) -> u32 {
    match tier {
        Tier::Critical => 0xef4444,
        Tier::Warning => 0xf97316,
        Tier::Attention => 0xeab308,
        Tier::Normal => 0x22c55e,
    }
}

#[async_trait]
impl NotificationChannel for DiscordWebhookNotifier {
    async fn send(&self, message: &AlertMessage) -> Result<(), NotificationError> {
        let payload = serde_json::json!({
            "embeds": [{
                "title": message.subject,
                "description": message.body,
                "color": discord_color(message.severity()),
                "timestamp": message.timestamp.to_rfc3339(),
            }]
        });

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotificationError::Discord(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NotificationError::Discord(format!(
                "webhook returned {}",
                response.status()
            )));
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "discord-webhook"
    }
}
