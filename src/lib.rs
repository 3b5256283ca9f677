#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

pub mod adapters;
pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod telemetry;

use crate::adapters::email::EmailChannel;
use crate::adapters::relay::RelayChannel;
use crate::adapters::whatsapp::WhatsAppChannel;
use crate::config::Config;
use crate::domain::delivery::ChannelKind;
use crate::services::audit::{AuditSink, FileAuditLog};
use crate::services::channel::Channel;
use crate::services::mail::MailTransport;
use crate::services::submission_service::SubmissionService;
use crate::services::validator::SubmissionSchema;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// The wired application: the HTTP router plus the orchestrator behind it.
#[derive(Debug)]
pub struct App {
    pub router: axum::Router,
    pub submission_service: SubmissionService,
}

/// Wires channels, the audit log and the HTTP surface from configuration.
///
/// Capabilities that talk to the outside world can be injected; anything not injected is built
/// from the configuration exactly once.
#[derive(Debug)]
pub struct AppBuilder {
    config: Config,
    mail_transport: Option<Arc<dyn MailTransport>>,
    audit_sink: Option<Arc<dyn AuditSink>>,
    http_client: Option<reqwest::Client>,
}

impl AppBuilder {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config, mail_transport: None, audit_sink: None, http_client: None }
    }

    #[must_use]
    pub fn with_mail_transport(mut self, transport: Arc<dyn MailTransport>) -> Self {
        self.mail_transport = Some(transport);
        self
    }

    #[must_use]
    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit_sink = Some(sink);
        self
    }

    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Builds the application.
    ///
    /// # Errors
    /// Returns an error if the HTTP client or mail transport cannot be created, or if the primary
    /// channel is not enabled.
    pub fn build(self) -> anyhow::Result<App> {
        let config = self.config;
        let channel_timeout = Duration::from_secs(config.delivery.timeout_secs);

        let client = match self.http_client {
            Some(client) => client,
            None => reqwest::Client::builder().timeout(channel_timeout).build()?,
        };

        let mail_transport = match self.mail_transport {
            Some(transport) => Some(transport),
            None => adapters::mail::from_config(&config.email, &client)?,
        };

        let mut channels: Vec<Arc<dyn Channel>> = Vec::new();
        let mut enabled: Vec<ChannelKind> = Vec::new();
        for kind in &config.delivery.channels {
            if enabled.contains(kind) {
                continue;
            }
            enabled.push(*kind);
            let channel: Arc<dyn Channel> = match kind {
                ChannelKind::Email => Arc::new(EmailChannel::new(
                    mail_transport.clone(),
                    config::configured(config.email.to_address.as_deref()).map(str::to_string),
                    config.email.site_name.clone(),
                )),
                ChannelKind::Whatsapp => Arc::new(WhatsAppChannel::from_config(
                    &config.whatsapp,
                    config.email.site_name.clone(),
                    client.clone(),
                )),
                ChannelKind::Relay => Arc::new(RelayChannel::from_config(&config.relay, client.clone())),
            };
            channels.push(channel);
        }

        let audit_sink = self
            .audit_sink
            .unwrap_or_else(|| Arc::new(FileAuditLog::new(config.audit.path.clone())) as Arc<dyn AuditSink>);

        let submission_service = SubmissionService::new(
            SubmissionSchema::from(&config.schema),
            channels,
            config.delivery.primary,
            channel_timeout,
            audit_sink,
        )?;

        tracing::info!(
            channels = ?enabled,
            primary = %config.delivery.primary,
            require_phone = config.schema.require_phone,
            "Contact relay wired"
        );

        let router = api::app_router(&config, submission_service.clone());
        Ok(App { router, submission_service })
    }
}

/// Flips the shutdown channel on Ctrl+C or SIGTERM.
pub fn spawn_signal_handler(shutdown_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            () = ctrl_c => tracing::info!("Received Ctrl+C signal"),
            () = terminate => tracing::info!("Received SIGTERM signal"),
        }

        tracing::info!("Starting graceful shutdown...");
        let _ = shutdown_tx.send(true);
    });
}

/// Routes panics through tracing so they reach the configured log sink.
pub fn setup_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let location = info.location().map(ToString::to_string).unwrap_or_default();
        tracing::error!(panic = %info, location = %location, "Panic occurred");
    }));
}
