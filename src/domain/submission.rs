use std::collections::HashMap;
use time::OffsetDateTime;

/// Untrusted form input keyed by field name.
pub type RawSubmission = HashMap<String, String>;

/// A validated contact-form submission.
///
/// Fields hold the trimmed values exactly as submitted. Renderers that produce HTML or log output
/// escape them with [`crate::domain::markup::escape_html`]. The value is never mutated after
/// validation and is shared read-only with every channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    /// Client-supplied creation time, or the receive time when the client sent none.
    pub submitted_at: OffsetDateTime,
    pub received_at: OffsetDateTime,
}

impl Submission {
    #[must_use]
    pub fn phone_or_placeholder(&self) -> &str {
        self.phone.as_deref().unwrap_or("-")
    }
}

/// Canonical field names of the contact form.
pub mod fields {
    pub const NAME: &str = "name";
    pub const EMAIL: &str = "email";
    pub const PHONE: &str = "phone";
    pub const SUBJECT: &str = "subject";
    pub const MESSAGE: &str = "message";
    pub const TIMESTAMP: &str = "timestamp";
}
