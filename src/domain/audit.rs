use crate::domain::markup::escape_html;
use crate::domain::submission::Submission;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRecord {
    pub timestamp: OffsetDateTime,
    pub name: String,
    pub email: String,
    pub subject: String,
}

impl AuditRecord {
    /// Renders the record as a single newline-terminated log line with name and subject
    /// HTML-escaped.
    #[must_use]
    pub fn to_line(&self) -> String {
        let timestamp = self.timestamp.format(&Rfc3339).unwrap_or_else(|_| self.timestamp.to_string());
        format!(
            "{timestamp} - {} ({}) - {}\n",
            single_line(&escape_html(&self.name)),
            single_line(&self.email),
            single_line(&escape_html(&self.subject))
        )
    }
}

impl From<&Submission> for AuditRecord {
    fn from(submission: &Submission) -> Self {
        Self {
            timestamp: submission.received_at,
            name: submission.name.clone(),
            email: submission.email.clone(),
            subject: submission.subject.clone(),
        }
    }
}

// One record per line, whatever the submitter typed.
fn single_line(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}
