use crate::domain::delivery::{ChannelKind, DeliveryOutcome};
use crate::domain::submission::Submission;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    #[error("Channel is not configured: missing {0}")]
    NotConfigured(&'static str),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
}

impl ChannelError {
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::NotConfigured(_) => "not_configured",
            Self::Transport(_) => "transport",
            Self::Timeout(_) => "timeout",
        }
    }
}

impl From<reqwest::Error> for ChannelError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

#[async_trait]
pub trait Channel: Send + Sync + std::fmt::Debug {
    fn kind(&self) -> ChannelKind;

    /// Makes a single delivery attempt for a validated submission.
    ///
    /// # Errors
    /// Returns `ChannelError::NotConfigured` without touching the network when the channel lacks
    /// live configuration, and `ChannelError::Transport` when the downstream service rejects it.
    async fn send(&self, submission: &Submission) -> Result<DeliveryOutcome, ChannelError>;
}
