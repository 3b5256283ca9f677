use crate::config::{RelayConfig, configured};
use crate::domain::delivery::{ChannelKind, DeliveryOutcome};
use crate::domain::submission::Submission;
use crate::services::channel::{Channel, ChannelError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;

#[derive(Debug, Serialize)]
struct RelayPayload<'a> {
    name: &'a str,
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<&'a str>,
    subject: &'a str,
    message: &'a str,
    timestamp: String,
}

#[derive(Debug, Deserialize)]
struct RelayResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Forwards submissions as JSON to a generic HTTP sink.
#[derive(Debug, Clone)]
pub struct RelayChannel {
    client: reqwest::Client,
    endpoint: Option<String>,
}

impl RelayChannel {
    #[must_use]
    pub fn from_config(config: &RelayConfig, client: reqwest::Client) -> Self {
        Self { client, endpoint: configured(config.endpoint.as_deref()).map(str::to_string) }
    }
}

#[async_trait]
impl Channel for RelayChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Relay
    }

    #[tracing::instrument(level = "debug", skip_all, err(level = "warn"))]
    async fn send(&self, submission: &Submission) -> Result<DeliveryOutcome, ChannelError> {
        let endpoint = self.endpoint.as_deref().ok_or(ChannelError::NotConfigured("relay endpoint"))?;

        let payload = RelayPayload {
            name: &submission.name,
            email: &submission.email,
            phone: submission.phone.as_deref(),
            subject: &submission.subject,
            message: &submission.message,
            timestamp: submission.submitted_at.format(&Rfc3339).unwrap_or_default(),
        };

        let response = self.client.post(endpoint).json(&payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ChannelError::Transport(format!("Relay endpoint responded with {status}")));
        }

        let body: RelayResponse =
            response.json().await.map_err(|e| ChannelError::Transport(format!("Invalid relay response: {e}")))?;
        if !body.success {
            return Err(ChannelError::Transport(body.error.unwrap_or_else(|| "Relay request failed".to_string())));
        }

        Ok(DeliveryOutcome::Delivered)
    }
}
