use crate::config::{EmailConfig, MailTransportKind};
use crate::services::mail::MailTransport;
use std::sync::Arc;

pub mod emailjs;
pub mod smtp;

pub use emailjs::EmailJsMailer;
pub use smtp::SmtpMailer;

/// Builds the configured mail transport once at startup.
///
/// Returns `Ok(None)` when the selected transport lacks live configuration, leaving the email
/// channel to report itself as not configured.
///
/// # Errors
/// Returns an error if a configured SMTP relay cannot be set up.
pub fn from_config(config: &EmailConfig, client: &reqwest::Client) -> anyhow::Result<Option<Arc<dyn MailTransport>>> {
    let transport: Option<Arc<dyn MailTransport>> = match config.transport {
        MailTransportKind::Smtp => SmtpMailer::from_config(config)?.map(|m| Arc::new(m) as Arc<dyn MailTransport>),
        MailTransportKind::Emailjs => {
            EmailJsMailer::from_config(config, client.clone()).map(|m| Arc::new(m) as Arc<dyn MailTransport>)
        }
    };

    if transport.is_none() {
        tracing::warn!(transport = ?config.transport, "Mail transport is not configured; email delivery will fail fast");
    }

    Ok(transport)
}
