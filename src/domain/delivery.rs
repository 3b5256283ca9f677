use clap::ValueEnum;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Email,
    Whatsapp,
    Relay,
}

impl ChannelKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Whatsapp => "whatsapp",
            Self::Relay => "relay",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a channel achieved for one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The downstream service accepted the message.
    Delivered,
    /// A deep link was built for the caller to open; nothing was confirmed downstream.
    LinkPresented { url: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryResult {
    pub channel: ChannelKind,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl DeliveryResult {
    #[must_use]
    pub fn from_outcome(channel: ChannelKind, outcome: DeliveryOutcome) -> Self {
        let link = match outcome {
            DeliveryOutcome::Delivered => None,
            DeliveryOutcome::LinkPresented { url } => Some(url),
        };
        Self { channel, success: true, error: None, link }
    }

    #[must_use]
    pub const fn failed(channel: ChannelKind, error: String) -> Self {
        Self { channel, success: false, error: Some(error), link: None }
    }
}

/// Combined outcome of every channel attempted for one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    pub overall_success: bool,
    pub primary: ChannelKind,
    pub per_channel: Vec<DeliveryResult>,
}

impl AggregateResult {
    #[must_use]
    pub fn new(primary: ChannelKind, per_channel: Vec<DeliveryResult>) -> Self {
        let overall_success = per_channel.iter().any(|r| r.channel == primary && r.success);
        Self { overall_success, primary, per_channel }
    }

    #[must_use]
    pub fn channel(&self, kind: ChannelKind) -> Option<&DeliveryResult> {
        self.per_channel.iter().find(|r| r.channel == kind)
    }

    /// The primary channel's error, when it failed.
    #[must_use]
    pub fn primary_error(&self) -> Option<&str> {
        self.channel(self.primary).and_then(|r| r.error.as_deref())
    }
}
