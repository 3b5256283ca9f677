use crate::domain::audit::AuditRecord;
use async_trait::async_trait;
use opentelemetry::{global, metrics::Counter};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

#[derive(Clone, Debug)]
struct Metrics {
    written: Counter<u64>,
    failures: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("contact-relay");
        Self {
            written: meter
                .u64_counter("contact_audit_records_total")
                .with_description("Audit lines appended for accepted submissions")
                .build(),
            failures: meter
                .u64_counter("contact_audit_failures_total")
                .with_description("Audit lines that could not be written")
                .build(),
        }
    }
}

/// Append-only record of accepted submissions.
#[async_trait]
pub trait AuditSink: Send + Sync + std::fmt::Debug {
    /// Records one accepted submission. Never fails the caller; failures are only logged.
    async fn record(&self, record: &AuditRecord);
}

#[derive(Debug)]
pub struct FileAuditLog {
    path: PathBuf,
    // Serializes writers so lines never interleave.
    lock: Mutex<()>,
    metrics: Metrics,
}

impl FileAuditLog {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()), metrics: Metrics::new() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn append(&self, line: &str) -> std::io::Result<()> {
        let _guard = self.lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new().create(true).append(true).open(&self.path).await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }
}

#[async_trait]
impl AuditSink for FileAuditLog {
    async fn record(&self, record: &AuditRecord) {
        match self.append(&record.to_line()).await {
            Ok(()) => self.metrics.written.add(1, &[]),
            Err(e) => {
                self.metrics.failures.add(1, &[]);
                tracing::error!(error = %e, path = %self.path.display(), "Failed to append audit record");
            }
        }
    }
}
