use crate::config::SchemaConfig;
use crate::domain::submission::{RawSubmission, Submission, fields};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+]?[1-9]\d{0,15}$").expect("phone pattern is valid")
});

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Field '{0}' is required")]
    MissingField(&'static str),
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("Invalid phone number")]
    InvalidPhone,
    #[error("Invalid timestamp")]
    InvalidTimestamp,
    #[error("Field '{0}' must be a string")]
    InvalidField(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Required,
    Optional,
}

/// Which form fields must be present, in the order they are checked.
#[derive(Debug, Clone)]
pub struct SubmissionSchema {
    fields: Vec<(&'static str, Requirement)>,
}

impl SubmissionSchema {
    #[must_use]
    pub fn new(require_phone: bool) -> Self {
        let phone = if require_phone { Requirement::Required } else { Requirement::Optional };
        Self {
            fields: vec![
                (fields::NAME, Requirement::Required),
                (fields::EMAIL, Requirement::Required),
                (fields::PHONE, phone),
                (fields::SUBJECT, Requirement::Required),
                (fields::MESSAGE, Requirement::Required),
            ],
        }
    }

    #[must_use]
    pub fn requirement(&self, field: &str) -> Option<Requirement> {
        self.fields.iter().find(|(name, _)| *name == field).map(|(_, req)| *req)
    }

    /// Validates untrusted form input. Values are trimmed but otherwise kept verbatim; escaping
    /// happens where they are rendered.
    ///
    /// # Errors
    /// Returns the first failing check: a missing required field (in schema order), then the
    /// email syntax, then the phone pattern, then the timestamp format.
    pub fn validate(&self, raw: &RawSubmission) -> Result<Submission, ValidationError> {
        for (field, requirement) in &self.fields {
            if *requirement == Requirement::Required && trimmed(raw, field).is_none() {
                return Err(ValidationError::MissingField(field));
            }
        }

        let email = trimmed(raw, fields::EMAIL).ok_or(ValidationError::MissingField(fields::EMAIL))?;
        if !is_valid_email(email) {
            return Err(ValidationError::InvalidEmail);
        }

        let phone = match trimmed(raw, fields::PHONE) {
            Some(phone) if !is_valid_phone(phone) => return Err(ValidationError::InvalidPhone),
            other => other,
        };

        let received_at = OffsetDateTime::now_utc();
        let submitted_at = match trimmed(raw, fields::TIMESTAMP) {
            Some(ts) => OffsetDateTime::parse(ts, &Rfc3339).map_err(|_| ValidationError::InvalidTimestamp)?,
            None => received_at,
        };

        Ok(Submission {
            name: trimmed(raw, fields::NAME).unwrap_or_default().to_string(),
            email: email.to_string(),
            phone: phone.map(str::to_string),
            subject: trimmed(raw, fields::SUBJECT).unwrap_or_default().to_string(),
            message: trimmed(raw, fields::MESSAGE).unwrap_or_default().to_string(),
            submitted_at,
            received_at,
        })
    }
}

impl From<&SchemaConfig> for SubmissionSchema {
    fn from(config: &SchemaConfig) -> Self {
        Self::new(config.require_phone)
    }
}

/// Flattens a decoded JSON object into form input. `null` counts as absent; nested values are
/// rejected.
///
/// # Errors
/// Returns `ValidationError::InvalidField` for array or object values.
pub fn raw_from_json(object: serde_json::Map<String, serde_json::Value>) -> Result<RawSubmission, ValidationError> {
    use serde_json::Value;

    let mut raw = RawSubmission::with_capacity(object.len());
    for (key, value) in object {
        let value = match value {
            Value::Null => continue,
            Value::String(s) => s,
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::Array(_) | Value::Object(_) => return Err(ValidationError::InvalidField(key)),
        };
        raw.insert(key, value);
    }
    Ok(raw)
}

fn trimmed<'a>(raw: &'a RawSubmission, field: &str) -> Option<&'a str> {
    raw.get(field).map(|v| v.trim()).filter(|v| !v.is_empty())
}

#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Phone numbers are matched with all whitespace removed.
#[must_use]
pub fn is_valid_phone(phone: &str) -> bool {
    let compact: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
    PHONE_PATTERN.is_match(&compact)
}
