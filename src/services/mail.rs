use crate::services::channel::ChannelError;
use async_trait::async_trait;

/// A fully composed message addressed to the operator's inbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub reply_to: String,
    pub reply_to_name: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
    /// Structured fields for template-based providers.
    pub params: MailParams,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailParams {
    pub from_name: String,
    pub from_email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
}

/// Hands a composed message to a mail provider. Built once at startup and shared.
#[async_trait]
pub trait MailTransport: Send + Sync + std::fmt::Debug {
    /// # Errors
    /// Returns `ChannelError::Transport` when the provider refuses or cannot be reached.
    async fn deliver(&self, mail: &OutgoingMail) -> Result<(), ChannelError>;
}
