use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::{AlertMessage, NotificationChannel, NotificationConfig, NotificationError};

/// Delivers email through an HTTP relay that accepts
/// `{to, subject, message, sendFrom, name}` and answers `{"success": bool}`.
pub struct EmailApiNotifier {
    client: reqwest::Client,
    url: String,
    recipients: Vec<String>,
    sender: String,
    display_name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RelayRequest<'a> {
    to: &'a str,
    subject: &'a str,
    message: &'a str,
    send_from: &'a str,
    name: &'a str,
}

impl EmailApiNotifier {
    pub fn new(config: &NotificationConfig) -> Result<Self, NotificationError> {
        let url = config
            .email_api_url
            .clone()
            .ok_or_else(|| NotificationError::Config("EMAIL_API_URL not set".into()))?;

        if config.recipients.is_empty() {
            return Err(NotificationError::Config(
                "No NOTIFICATION_EMAIL_TO addresses".into(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| NotificationError::Config(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            client,
            url,
            recipients: config.recipients.clone(),
            sender: config.email_api_sender.clone(),
            display_name: config.email_api_name.clone(),
        })
    }
}

/// The relay reports delivery in its body, not its status code.
fn relay_accepted(response: &serde_json::Value) -> bool {
    response.get("success").and_then(|v| v.as_bool()) == Some(true)
}

#[async_trait]
impl NotificationChannel for EmailApiNotifier {
    async fn send(&self, message: &AlertMessage) -> Result<(), NotificationError> {
        for recipient in &self.recipients {
            let request = RelayRequest {
                to: recipient,
                subject: &message.subject,
                message: &message.body,
                send_from: &self.sender,
                name: &self.display_name,
            };

            let response: serde_json::Value = self
                .client
                .post(&self.url)
                .json(&request)
                .send()
                .await
                .map_err(|e| NotificationError::EmailApi(e.to_string()))?
                .json()
                .await
                .map_err(|e| {
                    NotificationError::EmailApi(format!("Invalid relay response: {}", e))
                })?;

            if !relay_accepted(&response) {
                return Err(NotificationError::EmailApi(format!(
                    "Relay rejected message for {}",
                    recipient
                )));
            }
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "email-api"
    }
}
