use std::time::Duration;

use async_trait::async_trait;
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::templates::EmailTemplate;
use crate::{AlertMessage, NotificationChannel, NotificationConfig, NotificationError, SmtpTls};

type Transport = AsyncSmtpTransport<Tokio1Executor>;

const SMTP_TIMEOUT: Duration = Duration::from_secs(15);

/// Delivers each message as one multipart email addressed to every recipient.
pub struct SmtpNotifier {
    transport: Transport,
    from: Mailbox,
    recipients: Vec<Mailbox>,
}

impl SmtpNotifier {
    pub fn new(config: &NotificationConfig) -> Result<Self, NotificationError> {
        let host = config
            .smtp_host
            .as_deref()
            .ok_or_else(|| NotificationError::Config("SMTP_HOST not set".into()))?;
        let from = config
            .smtp_from
            .as_deref()
            .ok_or_else(|| NotificationError::Config("SMTP_FROM_ADDRESS not set".into()))?
            .parse::<Mailbox>()
            .map_err(|e| NotificationError::Config(format!("Invalid from address: {}", e)))?;

        let mut recipients = Vec::with_capacity(config.recipients.len());
        for addr in &config.recipients {
            match addr.parse::<Mailbox>() {
                Ok(mailbox) => recipients.push(mailbox),
                Err(e) => tracing::warn!("Skipping recipient '{}': {}", addr, e),
            }
        }
        if recipients.is_empty() {
            return Err(NotificationError::Config(
                "No valid NOTIFICATION_EMAIL_TO addresses".into(),
            ));
        }

        Ok(Self {
            transport: build_transport(host, config)?,
            from,
            recipients,
        })
    }

    fn compose(&self, message: &AlertMessage) -> Result<Message, NotificationError> {
        let builder = self.recipients.iter().fold(
            Message::builder()
                .from(self.from.clone())
                .subject(message.subject.clone()),
            |builder, to| builder.to(to.clone()),
        );

        builder
            .multipart(MultiPart::alternative_plain_html(
                message.body.clone(),
                EmailTemplate::render(message),
            ))
            .map_err(|e| NotificationError::Smtp(format!("Failed to build email: {}", e)))
    }
}

fn build_transport(
    host: &str,
    config: &NotificationConfig,
) -> Result<Transport, NotificationError> {
    let builder = match config.smtp_tls {
        SmtpTls::Tls => Transport::relay(host),
        SmtpTls::StartTls => Transport::starttls_relay(host),
        SmtpTls::None => Ok(Transport::builder_dangerous(host)),
    }
    .map_err(|e| NotificationError::Smtp(format!("SMTP transport error: {}", e)))?
    .port(config.smtp_port)
    .timeout(Some(SMTP_TIMEOUT));

    let builder = match (&config.smtp_username, &config.smtp_password) {
        (Some(user), Some(pass)) => {
            builder.credentials(Credentials::new(user.clone(), pass.clone()))
        }
        _ => builder,
    };

    Ok(builder.build())
}

#[async_trait]
impl NotificationChannel for SmtpNotifier {
    async fn send(&self, message: &AlertMessage) -> Result<(), NotificationError> {
        let email = self.compose(message)?;
        self.transport
            .send(email)
            .await
            .map_err(|e| NotificationError::Smtp(format!("Failed to send email: {}", e)))?;
        Ok(())
    }

    fn name(&self) -> &str {
        "smtp"
    }
}
