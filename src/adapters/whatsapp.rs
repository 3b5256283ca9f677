use crate::config::{WhatsAppConfig, configured};
use crate::domain::delivery::{ChannelKind, DeliveryOutcome};
use crate::domain::submission::Submission;
use crate::services::channel::{Channel, ChannelError};
use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    to: &'a str,
    message: &'a str,
}

/// WhatsApp delivery: a Business API call when an endpoint is configured, otherwise a
/// click-to-chat link the caller has to open.
#[derive(Debug, Clone)]
pub struct WhatsAppChannel {
    client: reqwest::Client,
    recipient: Option<String>,
    link_base: String,
    api_endpoint: Option<String>,
    api_token: Option<String>,
    site_name: String,
}

impl WhatsAppChannel {
    #[must_use]
    pub fn from_config(config: &WhatsAppConfig, site_name: String, client: reqwest::Client) -> Self {
        Self {
            client,
            recipient: configured(config.recipient.as_deref()).map(normalize_number),
            link_base: config.link_base.trim_end_matches('/').to_string(),
            api_endpoint: configured(config.api_endpoint.as_deref()).map(str::to_string),
            api_token: configured(config.api_token.as_deref()).map(str::to_string),
            site_name,
        }
    }

    #[must_use]
    pub fn compose(&self, submission: &Submission) -> String {
        format!(
            "*New Contact Form Submission*\n\n\
             *Name:* {}\n\
             *Email:* {}\n\
             *Phone:* {}\n\
             *Subject:* {}\n\n\
             *Message:*\n\
             {}\n\n\
             ---\n\
             Sent from {}",
            submission.name,
            submission.email,
            submission.phone_or_placeholder(),
            submission.subject,
            submission.message,
            self.site_name,
        )
    }

    #[must_use]
    pub fn deep_link(&self, recipient: &str, text: &str) -> String {
        format!("{}/{}?text={}", self.link_base, recipient, urlencoding::encode(text))
    }
}

#[async_trait]
impl Channel for WhatsAppChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Whatsapp
    }

    #[tracing::instrument(level = "debug", skip_all, err(level = "warn"))]
    async fn send(&self, submission: &Submission) -> Result<DeliveryOutcome, ChannelError> {
        let recipient = self.recipient.as_deref().ok_or(ChannelError::NotConfigured("WhatsApp recipient"))?;
        let text = self.compose(submission);

        let Some(endpoint) = self.api_endpoint.as_deref() else {
            let url = self.deep_link(recipient, &text);
            tracing::info!(
                submitter = %submission.name,
                phone = submission.phone_or_placeholder(),
                link = %url,
                "WhatsApp deep link prepared"
            );
            return Ok(DeliveryOutcome::LinkPresented { url });
        };

        let mut request = self.client.post(endpoint).json(&ApiMessage { to: recipient, message: &text });
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ChannelError::Transport(format!("WhatsApp API responded with {status}")));
        }

        tracing::info!(
            submitter = %submission.name,
            phone = submission.phone_or_placeholder(),
            recipient = %recipient,
            "WhatsApp message accepted by API"
        );
        Ok(DeliveryOutcome::Delivered)
    }
}

fn normalize_number(number: &str) -> String {
    number.chars().filter(char::is_ascii_digit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::submission::RawSubmission;
    use crate::services::validator::SubmissionSchema;

    fn config(recipient: Option<&str>) -> WhatsAppConfig {
        WhatsAppConfig {
            recipient: recipient.map(str::to_string),
            link_base: "https://wa.me/".to_string(),
            api_endpoint: Some("YOUR_WHATSAPP_API_ENDPOINT".to_string()),
            api_token: None,
        }
    }

    fn submission() -> Submission {
        let raw: RawSubmission = [
            ("name", "Tom & Jerry"),
            ("email", "o'brien@x.com"),
            ("phone", "+966504877945"),
            ("subject", "Hi & bye"),
            ("message", "2 < 3"),
        ]
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
        SubmissionSchema::new(false).validate(&raw).unwrap()
    }

    #[tokio::test]
    async fn test_link_presented_without_api() {
        let channel = WhatsAppChannel::from_config(&config(Some("+966 50 487 7945")), "Site".to_string(), reqwest::Client::new());

        let outcome = channel.send(&submission()).await.unwrap();
        let DeliveryOutcome::LinkPresented { url } = outcome else {
            panic!("expected a deep link, got {outcome:?}");
        };
        assert!(url.starts_with("https://wa.me/966504877945?text="));
        assert!(url.contains("%2ANew%20Contact%20Form%20Submission%2A"));
        assert!(url.contains("Tom%20%26%20Jerry"));
        assert!(!url.contains("amp"));
        assert!(!url.contains(' '));
        assert!(!url.contains('\n'));
    }

    #[tokio::test]
    async fn test_not_configured_without_recipient() {
        let channel = WhatsAppChannel::from_config(&config(None), "Site".to_string(), reqwest::Client::new());
        assert_eq!(channel.send(&submission()).await, Err(ChannelError::NotConfigured("WhatsApp recipient")));
    }

    #[test]
    fn test_compose_contains_all_fields() {
        let channel = WhatsAppChannel::from_config(&config(Some("1")), "My Site".to_string(), reqwest::Client::new());
        let text = channel.compose(&submission());
        assert!(text.contains("*Name:* Tom & Jerry\n"));
        assert!(text.contains("*Email:* o'brien@x.com\n"));
        assert!(text.contains("*Phone:* +966504877945"));
        assert!(text.contains("*Subject:* Hi & bye\n"));
        assert!(text.contains("2 < 3"));
        assert!(!text.contains("&amp;") && !text.contains("&#39;") && !text.contains("&lt;"));
        assert!(text.ends_with("Sent from My Site"));
    }
}
