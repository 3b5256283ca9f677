use crate::domain::audit::AuditRecord;
use crate::domain::delivery::{AggregateResult, ChannelKind, DeliveryResult};
use crate::domain::submission::{RawSubmission, Submission};
use crate::services::audit::AuditSink;
use crate::services::channel::{Channel, ChannelError};
use crate::services::validator::{SubmissionSchema, ValidationError};
use opentelemetry::{KeyValue, global, metrics::Counter};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

#[derive(Clone, Debug)]
struct Metrics {
    submissions_total: Counter<u64>,
    channel_failures_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("contact-relay");
        Self {
            submissions_total: meter
                .u64_counter("contact_submissions_total")
                .with_description("Contact submissions by outcome")
                .build(),
            channel_failures_total: meter
                .u64_counter("contact_channel_failures_total")
                .with_description("Failed channel attempts by channel and reason")
                .build(),
        }
    }
}

/// Validates submissions and fans them out to every enabled channel.
#[derive(Clone, Debug)]
pub struct SubmissionService {
    schema: SubmissionSchema,
    channels: Vec<Arc<dyn Channel>>,
    primary: ChannelKind,
    channel_timeout: Duration,
    audit: Arc<dyn AuditSink>,
    metrics: Metrics,
}

impl SubmissionService {
    /// Creates the orchestrator.
    ///
    /// # Errors
    /// Returns an error if the primary channel is not among the enabled channels.
    pub fn new(
        schema: SubmissionSchema,
        channels: Vec<Arc<dyn Channel>>,
        primary: ChannelKind,
        channel_timeout: Duration,
        audit: Arc<dyn AuditSink>,
    ) -> anyhow::Result<Self> {
        if !channels.iter().any(|c| c.kind() == primary) {
            anyhow::bail!("Primary channel '{primary}' is not among the enabled channels");
        }
        Ok(Self { schema, channels, primary, channel_timeout, audit, metrics: Metrics::new() })
    }

    #[must_use]
    pub const fn primary(&self) -> ChannelKind {
        self.primary
    }

    /// Processes one submission end to end.
    ///
    /// # Errors
    /// Returns the validation failure when the input is rejected; in that case no channel is
    /// invoked and nothing is audited. Channel failures are reported inside the `AggregateResult`.
    #[tracing::instrument(err(level = "debug"), skip_all)]
    pub async fn submit(&self, raw: &RawSubmission) -> Result<(Arc<Submission>, AggregateResult), ValidationError> {
        let submission = match self.schema.validate(raw) {
            Ok(submission) => Arc::new(submission),
            Err(e) => {
                self.metrics.submissions_total.add(1, &[KeyValue::new("outcome", "rejected")]);
                return Err(e);
            }
        };

        let attempts = self.channels.iter().map(|channel| self.attempt(Arc::clone(channel), &submission));
        let per_channel = futures::future::join_all(attempts).await;
        let aggregate = AggregateResult::new(self.primary, per_channel);

        // Spawned so the write completes even if the request future is dropped.
        let audit = Arc::clone(&self.audit);
        let record = AuditRecord::from(submission.as_ref());
        if let Err(e) = tokio::spawn(async move { audit.record(&record).await }).await {
            tracing::error!(error = %e, "Audit task failed");
        }

        let outcome = if aggregate.overall_success { "delivered" } else { "failed" };
        self.metrics.submissions_total.add(1, &[KeyValue::new("outcome", outcome)]);
        if aggregate.overall_success {
            tracing::info!(primary = %self.primary, "Contact submission captured");
        } else {
            tracing::warn!(
                primary = %self.primary,
                error = aggregate.primary_error().unwrap_or_default(),
                "Primary channel failed for contact submission"
            );
        }

        Ok((submission, aggregate))
    }

    async fn attempt(&self, channel: Arc<dyn Channel>, submission: &Submission) -> DeliveryResult {
        let kind = channel.kind();
        let result = match timeout(self.channel_timeout, channel.send(submission)).await {
            Ok(result) => result,
            Err(_) => Err(ChannelError::Timeout(self.channel_timeout)),
        };

        match result {
            Ok(outcome) => DeliveryResult::from_outcome(kind, outcome),
            Err(e) => {
                self.metrics.channel_failures_total.add(
                    1,
                    &[KeyValue::new("channel", kind.as_str()), KeyValue::new("reason", e.reason())],
                );
                tracing::warn!(channel = %kind, error = %e, "Channel delivery failed");
                DeliveryResult::failed(kind, e.to_string())
            }
        }
    }
}
