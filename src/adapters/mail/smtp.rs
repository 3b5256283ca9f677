//! SMTP delivery using lettre

use crate::config::{EmailConfig, configured};
use crate::services::channel::ChannelError;
use crate::services::mail::{MailTransport, OutgoingMail};
use anyhow::Context;
use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, Message, SmtpTransport, Transport};

#[derive(Clone)]
pub struct SmtpMailer {
    mailer: SmtpTransport,
    from: Mailbox,
}

impl std::fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailer").field("from", &self.from.to_string()).finish_non_exhaustive()
    }
}

impl SmtpMailer {
    /// Builds the SMTP transport, or `None` when no relay host is configured.
    ///
    /// # Errors
    /// Returns an error if the sender address cannot be parsed or the relay cannot be set up.
    pub fn from_config(config: &EmailConfig) -> anyhow::Result<Option<Self>> {
        let Some(host) = configured(config.smtp_host.as_deref()) else {
            return Ok(None);
        };
        let Some(from) = configured(config.from_address.as_deref()).or_else(|| configured(config.to_address.as_deref()))
        else {
            return Ok(None);
        };
        let from: Mailbox = from.parse().context("Failed to parse sender address")?;

        let username = configured(config.smtp_username.as_deref());
        let password = configured(config.smtp_password.as_deref());

        let mailer = if let (Some(username), Some(password)) = (username, password) {
            tracing::info!(smtp_host = %host, smtp_port = config.smtp_port, "SMTP mailer initialized with authentication and TLS");
            SmtpTransport::relay(host)
                .context("Failed to configure SMTP relay")?
                .port(config.smtp_port)
                .credentials(Credentials::new(username.to_string(), password.to_string()))
                .build()
        } else {
            tracing::info!(
                smtp_host = %host,
                smtp_port = config.smtp_port,
                "SMTP credentials not configured, using unauthenticated connection"
            );
            SmtpTransport::builder_dangerous(host).port(config.smtp_port).build()
        };

        Ok(Some(Self { mailer, from }))
    }

    fn build_message(&self, mail: &OutgoingMail) -> Result<Message, ChannelError> {
        let to: Mailbox = mail.to.parse().map_err(|e| ChannelError::Transport(format!("Invalid recipient: {e}")))?;

        let mut builder = Message::builder().from(self.from.clone()).to(to).subject(mail.subject.clone());
        // The form's address check is looser than RFC 5322; such senders get no Reply-To.
        match mail.reply_to.parse::<Address>() {
            Ok(address) => builder = builder.reply_to(Mailbox::new(Some(mail.reply_to_name.clone()), address)),
            Err(e) => tracing::debug!(error = %e, "Skipping Reply-To header"),
        }

        builder
            .multipart(MultiPart::alternative_plain_html(mail.text_body.clone(), mail.html_body.clone()))
            .map_err(|e| ChannelError::Transport(format!("Failed to build email: {e}")))
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn deliver(&self, mail: &OutgoingMail) -> Result<(), ChannelError> {
        let message = self.build_message(mail)?;
        let mailer = self.mailer.clone();

        tokio::task::spawn_blocking(move || mailer.send(&message))
            .await
            .map_err(|e| ChannelError::Transport(format!("SMTP task failed: {e}")))?
            .map_err(|e| ChannelError::Transport(format!("SMTP delivery failed: {e}")))?;

        Ok(())
    }
}
