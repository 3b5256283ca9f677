use crate::domain::delivery::{ChannelKind, DeliveryOutcome};
use crate::domain::markup::escape_html;
use crate::domain::submission::Submission;
use crate::services::channel::{Channel, ChannelError};
use crate::services::mail::{MailParams, MailTransport, OutgoingMail};
use async_trait::async_trait;
use std::sync::Arc;
use time::format_description::well_known::Rfc3339;

/// Delivers every submission to one fixed inbox through an injected mail transport.
#[derive(Debug)]
pub struct EmailChannel {
    transport: Option<Arc<dyn MailTransport>>,
    to_address: Option<String>,
    site_name: String,
}

impl EmailChannel {
    #[must_use]
    pub const fn new(transport: Option<Arc<dyn MailTransport>>, to_address: Option<String>, site_name: String) -> Self {
        Self { transport, to_address, site_name }
    }

    /// Composes the message. Free-text fields are HTML-escaped in both bodies; the address is
    /// escaped only in the HTML body. Headers and template params carry the values verbatim.
    #[must_use]
    pub fn compose(&self, to: &str, submission: &Submission) -> OutgoingMail {
        let timestamp = submission.submitted_at.format(&Rfc3339).unwrap_or_default();
        let phone = submission.phone_or_placeholder();

        let name = escape_html(&submission.name);
        let escaped_phone = escape_html(phone);
        let subject = escape_html(&submission.subject);
        let message = escape_html(&submission.message);

        let text_body = format!(
            "New contact form submission received:\n\n\
             Name: {name}\n\
             Email: {email}\n\
             Phone: {escaped_phone}\n\
             Subject: {subject}\n\
             Timestamp: {timestamp}\n\n\
             Message:\n\
             {message}\n\n\
             ---\n\
             Sent from {site}\n",
            email = submission.email,
            site = self.site_name,
        );

        let html_body = format!(
            "<h2>New Contact Form Submission</h2>\n\
             <p><strong>Name:</strong> {name}</p>\n\
             <p><strong>Email:</strong> {email}</p>\n\
             <p><strong>Phone:</strong> {escaped_phone}</p>\n\
             <p><strong>Subject:</strong> {subject}</p>\n\
             <p><strong>Timestamp:</strong> {timestamp}</p>\n\
             <p><strong>Message:</strong></p>\n\
             <p>{html_message}</p>\n\
             <hr>\n\
             <p><em>Sent from {site}</em></p>\n",
            email = escape_html(&submission.email),
            html_message = message.replace('\n', "<br>\n"),
            site = escape_html(&self.site_name),
        );

        OutgoingMail {
            to: to.to_string(),
            reply_to: submission.email.clone(),
            reply_to_name: submission.name.clone(),
            subject: format!("New Contact Form Submission: {}", submission.subject),
            text_body,
            html_body,
            params: MailParams {
                from_name: submission.name.clone(),
                from_email: submission.email.clone(),
                phone: phone.to_string(),
                subject: submission.subject.clone(),
                message: submission.message.clone(),
            },
        }
    }
}

#[async_trait]
impl Channel for EmailChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Email
    }

    #[tracing::instrument(level = "debug", skip_all, err(level = "warn"))]
    async fn send(&self, submission: &Submission) -> Result<DeliveryOutcome, ChannelError> {
        let to = self.to_address.as_deref().ok_or(ChannelError::NotConfigured("destination address"))?;
        let transport = self.transport.as_ref().ok_or(ChannelError::NotConfigured("mail transport"))?;

        let mail = self.compose(to, submission);
        transport.deliver(&mail).await?;

        tracing::info!("Contact email handed to mail transport");
        Ok(DeliveryOutcome::Delivered)
    }
}
