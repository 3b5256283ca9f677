#![allow(dead_code, clippy::unwrap_used, clippy::missing_panics_doc, unreachable_pub, missing_debug_implementations)]
use async_trait::async_trait;
use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use clap::Parser;
use contact_relay::AppBuilder;
use contact_relay::config::Config;
use contact_relay::services::channel::ChannelError;
use contact_relay::services::mail::{MailTransport, OutgoingMail};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Once};
use tokio::sync::Mutex;

static INIT: Once = Once::new();

pub fn setup_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into())
            .add_directive("contact_relay=debug".parse().unwrap())
            .add_directive("tower=warn".parse().unwrap())
            .add_directive("hyper=warn".parse().unwrap())
            .add_directive("reqwest=warn".parse().unwrap());

        tracing_subscriber::fmt().with_env_filter(filter).init();
    });
}

/// Stands in for SMTP; records what would have been sent.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutgoingMail>>,
    pub fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self { fail: true, ..Default::default() }
    }
}

#[async_trait]
impl MailTransport for RecordingMailer {
    async fn deliver(&self, mail: &OutgoingMail) -> Result<(), ChannelError> {
        if self.fail {
            return Err(ChannelError::Transport("mailbox unavailable".to_string()));
        }
        self.sent.lock().await.push(mail.clone());
        Ok(())
    }
}

/// A downstream HTTP service (relay sink or WhatsApp API) that records request bodies.
pub struct TestSink {
    pub url: String,
    pub received: Arc<Mutex<Vec<serde_json::Value>>>,
}

#[derive(Clone)]
struct SinkState {
    received: Arc<Mutex<Vec<serde_json::Value>>>,
    status: StatusCode,
    reply: serde_json::Value,
}

impl TestSink {
    pub async fn spawn(status: StatusCode, reply: serde_json::Value) -> Self {
        let received = Arc::new(Mutex::new(Vec::new()));
        let state = SinkState { received: Arc::clone(&received), status, reply };

        async fn handle(
            State(state): State<SinkState>,
            Json(body): Json<serde_json::Value>,
        ) -> (StatusCode, Json<serde_json::Value>) {
            state.received.lock().await.push(body);
            (state.status, Json(state.reply.clone()))
        }

        let app = Router::new().route("/sink", post(handle)).with_state(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { url: format!("http://{addr}/sink"), received }
    }
}

pub fn get_test_config(extra: &[&str]) -> Config {
    let mut args = vec![
        "contact-relay",
        "--host",
        "127.0.0.1",
        "--port",
        "0",
        "--rate-limit-per-second",
        "10000",
        "--rate-limit-burst",
        "10000",
        "--mail-to",
        "inbox@site.dev",
        "--whatsapp-recipient",
        "966504877945",
        "--channel-timeout-secs",
        "2",
    ];
    args.extend_from_slice(extra);
    Config::parse_from(args)
}

pub struct TestApp {
    pub server_url: String,
    pub client: reqwest::Client,
    pub mailer: Arc<RecordingMailer>,
    pub audit_path: PathBuf,
    _audit_dir: temp_dir::TempDir,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(get_test_config(&[]), RecordingMailer::default()).await
    }

    pub async fn spawn_with(mut config: Config, mailer: RecordingMailer) -> Self {
        setup_tracing();

        let audit_dir = temp_dir::TempDir::new().unwrap();
        let audit_path = audit_dir.child("contact_log.txt");
        config.audit.path = audit_path.clone();

        let mailer = Arc::new(mailer);
        let app = AppBuilder::new(config)
            .with_mail_transport(Arc::clone(&mailer) as Arc<dyn MailTransport>)
            .build()
            .unwrap();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app.router.into_make_service_with_connect_info::<SocketAddr>()).await.unwrap();
        });

        Self {
            server_url: format!("http://{addr}"),
            client: reqwest::Client::new(),
            mailer,
            audit_path,
            _audit_dir: audit_dir,
        }
    }

    pub async fn post_contact(&self, body: &serde_json::Value) -> reqwest::Response {
        self.client.post(format!("{}/contact", self.server_url)).json(body).send().await.unwrap()
    }

    pub async fn audit_lines(&self) -> Vec<String> {
        match tokio::fs::read_to_string(&self.audit_path).await {
            Ok(contents) => contents.lines().map(str::to_string).collect(),
            Err(_) => Vec::new(),
        }
    }
}

pub fn ana() -> serde_json::Value {
    serde_json::json!({
        "name": "Ana",
        "email": "ana@x.com",
        "subject": "Hi",
        "message": "Hello"
    })
}
