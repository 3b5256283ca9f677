use crate::domain::delivery::ChannelKind;
use clap::{Args, Parser, ValueEnum};
use ipnetwork::IpNetwork;

/// Prefix marking a value copied from a setup guide but never filled in.
const PLACEHOLDER_PREFIX: &str = "YOUR_";

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    #[command(flatten)]
    pub server: ServerConfig,

    #[command(flatten)]
    pub rate_limit: RateLimitConfig,

    #[command(flatten)]
    pub schema: SchemaConfig,

    #[command(flatten)]
    pub delivery: DeliveryConfig,

    #[command(flatten)]
    pub email: EmailConfig,

    #[command(flatten)]
    pub whatsapp: WhatsAppConfig,

    #[command(flatten)]
    pub relay: RelayConfig,

    #[command(flatten)]
    pub audit: AuditConfig,

    #[command(flatten)]
    pub telemetry: TelemetryConfig,
}

#[derive(Clone, Debug, Args)]
pub struct ServerConfig {
    /// Host to listen on
    #[arg(long, env = "CONTACT_RELAY_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "CONTACT_RELAY_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Seconds to wait for in-flight work during shutdown
    #[arg(long, env = "CONTACT_RELAY_SHUTDOWN_TIMEOUT_SECS", default_value_t = 5)]
    pub shutdown_timeout_secs: u64,

    /// Maximum accepted request body size in bytes
    #[arg(long, env = "CONTACT_RELAY_MAX_BODY_BYTES", default_value_t = 65_536)]
    pub max_body_bytes: usize,

    /// Comma-separated list of CIDRs to trust for X-Forwarded-For IP extraction
    #[arg(
        long,
        env = "CONTACT_RELAY_TRUSTED_PROXIES",
        default_value = "10.0.0.0/8,172.16.0.0/12,192.168.0.0/16,127.0.0.1/32",
        value_delimiter = ','
    )]
    pub trusted_proxies: Vec<IpNetwork>,
}

#[derive(Clone, Debug, Args)]
pub struct RateLimitConfig {
    /// Contact submissions per second allowed for a single client
    #[arg(long = "rate-limit-per-second", env = "CONTACT_RELAY_RATE_LIMIT_PER_SECOND", default_value_t = 1)]
    pub per_second: u32,

    /// Burst allowance for a single client
    #[arg(long = "rate-limit-burst", env = "CONTACT_RELAY_RATE_LIMIT_BURST", default_value_t = 5)]
    pub burst: u32,
}

#[derive(Clone, Debug, Args)]
pub struct SchemaConfig {
    /// Reject submissions that do not carry a phone number
    #[arg(long, env = "CONTACT_RELAY_REQUIRE_PHONE", default_value_t = false)]
    pub require_phone: bool,
}

#[derive(Clone, Debug, Args)]
pub struct DeliveryConfig {
    /// Channels to fan submissions out to
    #[arg(
        long = "channels",
        env = "CONTACT_RELAY_CHANNELS",
        value_enum,
        value_delimiter = ',',
        default_value = "email,whatsapp"
    )]
    pub channels: Vec<ChannelKind>,

    /// Channel whose outcome decides whether a submission succeeded
    #[arg(long = "primary-channel", env = "CONTACT_RELAY_PRIMARY_CHANNEL", value_enum, default_value = "email")]
    pub primary: ChannelKind,

    /// Upper bound for a single channel attempt
    #[arg(long = "channel-timeout-secs", env = "CONTACT_RELAY_CHANNEL_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout_secs: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum MailTransportKind {
    #[default]
    Smtp,
    Emailjs,
}

#[derive(Clone, Debug, Args)]
pub struct EmailConfig {
    /// How outgoing mail is handed off
    #[arg(long = "mail-transport", env = "CONTACT_RELAY_MAIL_TRANSPORT", value_enum, default_value = "smtp")]
    pub transport: MailTransportKind,

    /// Inbox that receives every submission
    #[arg(long = "mail-to", env = "CONTACT_RELAY_MAIL_TO")]
    pub to_address: Option<String>,

    /// Site name used in the footer of every message
    #[arg(long = "site-name", env = "CONTACT_RELAY_SITE_NAME", default_value = "Launch Supp Portfolio")]
    pub site_name: String,

    /// SMTP relay host
    #[arg(long = "smtp-host", env = "CONTACT_RELAY_SMTP_HOST")]
    pub smtp_host: Option<String>,

    /// SMTP relay port
    #[arg(long = "smtp-port", env = "CONTACT_RELAY_SMTP_PORT", default_value_t = 587)]
    pub smtp_port: u16,

    /// SMTP username; leave unset for unauthenticated local relays
    #[arg(long = "smtp-username", env = "CONTACT_RELAY_SMTP_USERNAME")]
    pub smtp_username: Option<String>,

    /// SMTP password
    #[arg(long = "smtp-password", env = "CONTACT_RELAY_SMTP_PASSWORD", hide_env_values = true)]
    pub smtp_password: Option<String>,

    /// Envelope sender; defaults to the destination address
    #[arg(long = "mail-from", env = "CONTACT_RELAY_MAIL_FROM")]
    pub from_address: Option<String>,

    /// EmailJS REST endpoint
    #[arg(
        long = "emailjs-endpoint",
        env = "CONTACT_RELAY_EMAILJS_ENDPOINT",
        default_value = "https://api.emailjs.com/api/v1.0/email/send"
    )]
    pub emailjs_endpoint: String,

    /// EmailJS service id
    #[arg(long = "emailjs-service-id", env = "CONTACT_RELAY_EMAILJS_SERVICE_ID")]
    pub emailjs_service_id: Option<String>,

    /// EmailJS template id
    #[arg(long = "emailjs-template-id", env = "CONTACT_RELAY_EMAILJS_TEMPLATE_ID")]
    pub emailjs_template_id: Option<String>,

    /// EmailJS public key
    #[arg(long = "emailjs-public-key", env = "CONTACT_RELAY_EMAILJS_PUBLIC_KEY")]
    pub emailjs_public_key: Option<String>,

    /// EmailJS private access token
    #[arg(long = "emailjs-access-token", env = "CONTACT_RELAY_EMAILJS_ACCESS_TOKEN", hide_env_values = true)]
    pub emailjs_access_token: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct WhatsAppConfig {
    /// Phone number (international format, digits only) that receives messages
    #[arg(long = "whatsapp-recipient", env = "CONTACT_RELAY_WHATSAPP_RECIPIENT")]
    pub recipient: Option<String>,

    /// Base of the click-to-chat deep link
    #[arg(long = "whatsapp-link-base", env = "CONTACT_RELAY_WHATSAPP_LINK_BASE", default_value = "https://wa.me")]
    pub link_base: String,

    /// Business API endpoint; when unset the channel only builds a deep link
    #[arg(long = "whatsapp-api-endpoint", env = "CONTACT_RELAY_WHATSAPP_API_ENDPOINT")]
    pub api_endpoint: Option<String>,

    /// Bearer token for the Business API
    #[arg(long = "whatsapp-api-token", env = "CONTACT_RELAY_WHATSAPP_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct RelayConfig {
    /// HTTP endpoint that receives the submission as JSON
    #[arg(long = "relay-endpoint", env = "CONTACT_RELAY_RELAY_ENDPOINT")]
    pub endpoint: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct AuditConfig {
    /// Append-only log with one line per accepted submission
    #[arg(long = "audit-log", env = "CONTACT_RELAY_AUDIT_LOG", default_value = "contact_log.txt")]
    pub path: std::path::PathBuf,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Debug, Args)]
pub struct TelemetryConfig {
    /// Log output format
    #[arg(long = "log-format", env = "CONTACT_RELAY_LOG_FORMAT", value_enum, default_value = "text")]
    pub log_format: LogFormat,

    /// OTLP collector endpoint; tracing and metrics export is disabled when unset
    #[arg(long = "otlp-endpoint", env = "CONTACT_RELAY_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

impl Config {
    #[must_use]
    pub fn load() -> Self {
        Self::parse()
    }
}

/// Returns the trimmed value when it is present, non-empty and not a setup-guide placeholder.
#[must_use]
pub fn configured(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty() && !v.starts_with(PLACEHOLDER_PREFIX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::parse_from(["contact-relay"]);
        assert_eq!(config.server.port, 3000);
        assert!(!config.schema.require_phone);
        assert_eq!(config.delivery.channels, vec![ChannelKind::Email, ChannelKind::Whatsapp]);
        assert_eq!(config.delivery.primary, ChannelKind::Email);
        assert_eq!(config.delivery.timeout_secs, 10);
        assert_eq!(config.email.transport, MailTransportKind::Smtp);
        assert_eq!(config.whatsapp.link_base, "https://wa.me");
    }

    #[test]
    fn test_channel_list_parsing() {
        let config = Config::parse_from([
            "contact-relay",
            "--channels",
            "relay,email",
            "--primary-channel",
            "relay",
            "--require-phone",
        ]);
        assert_eq!(config.delivery.channels, vec![ChannelKind::Relay, ChannelKind::Email]);
        assert_eq!(config.delivery.primary, ChannelKind::Relay);
        assert!(config.schema.require_phone);
    }

    #[test]
    fn test_configured_rejects_placeholders() {
        assert_eq!(configured(None), None);
        assert_eq!(configured(Some("  ")), None);
        assert_eq!(configured(Some("YOUR_SERVICE_ID")), None);
        assert_eq!(configured(Some(" service_abc ")), Some("service_abc"));
    }
}
