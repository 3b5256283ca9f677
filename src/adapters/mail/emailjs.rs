use crate::config::{EmailConfig, configured};
use crate::services::channel::ChannelError;
use crate::services::mail::{MailTransport, OutgoingMail};
use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    #[serde(rename = "accessToken", skip_serializing_if = "Option::is_none")]
    access_token: Option<&'a str>,
    template_params: TemplateParams<'a>,
}

#[derive(Debug, Serialize)]
struct TemplateParams<'a> {
    from_name: &'a str,
    from_email: &'a str,
    phone: &'a str,
    subject: &'a str,
    message: &'a str,
    to_email: &'a str,
}

/// Template-based delivery through the EmailJS REST API.
#[derive(Debug, Clone)]
pub struct EmailJsMailer {
    client: reqwest::Client,
    endpoint: String,
    service_id: String,
    template_id: String,
    public_key: String,
    access_token: Option<String>,
}

impl EmailJsMailer {
    /// Returns `None` unless service id, template id and public key are all configured.
    #[must_use]
    pub fn from_config(config: &EmailConfig, client: reqwest::Client) -> Option<Self> {
        Some(Self {
            client,
            endpoint: config.emailjs_endpoint.clone(),
            service_id: configured(config.emailjs_service_id.as_deref())?.to_string(),
            template_id: configured(config.emailjs_template_id.as_deref())?.to_string(),
            public_key: configured(config.emailjs_public_key.as_deref())?.to_string(),
            access_token: configured(config.emailjs_access_token.as_deref()).map(str::to_string),
        })
    }
}

#[async_trait]
impl MailTransport for EmailJsMailer {
    async fn deliver(&self, mail: &OutgoingMail) -> Result<(), ChannelError> {
        let request = SendRequest {
            service_id: &self.service_id,
            template_id: &self.template_id,
            user_id: &self.public_key,
            access_token: self.access_token.as_deref(),
            template_params: TemplateParams {
                from_name: &mail.params.from_name,
                from_email: &mail.params.from_email,
                phone: &mail.params.phone,
                subject: &mail.params.subject,
                message: &mail.params.message,
                to_email: &mail.to,
            },
        };

        let response = self.client.post(&self.endpoint).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChannelError::Transport(format!("EmailJS responded with {status}: {body}")));
        }

        Ok(())
    }
}
