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

use contact_relay::config::Config;
use contact_relay::{AppBuilder, telemetry};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::sync::watch;
use tracing::Instrument;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load();
    let telemetry_guard = telemetry::init_telemetry(&config.telemetry)?;

    contact_relay::setup_panic_hook();

    let boot_span = tracing::info_span!("boot_server");
    let (listener, app) = async {
        let app = AppBuilder::new(config.clone()).build()?;

        let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(address = %addr, "listening");

        Ok::<_, anyhow::Error>((listener, app))
    }
    .instrument(boot_span)
    .await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    contact_relay::spawn_signal_handler(shutdown_tx);

    let mut server_rx = shutdown_rx.clone();
    let server = axum::serve(listener, app.router.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async move {
            let _ = server_rx.wait_for(|&s| s).await;
        })
        .into_future();
    tokio::pin!(server);

    let mut drain_rx = shutdown_rx;
    tokio::select! {
        res = &mut server => {
            if let Err(e) = res {
                tracing::error!(error = %e, "Server error");
            }
        }
        _ = drain_rx.wait_for(|&s| s) => {
            let drain = Duration::from_secs(config.server.shutdown_timeout_secs);
            match tokio::time::timeout(drain, &mut server).await {
                Ok(Ok(())) => tracing::info!("In-flight submissions finished."),
                Ok(Err(e)) => tracing::error!(error = %e, "Server error"),
                Err(_) => tracing::warn!("Timeout waiting for in-flight submissions to finish."),
            }
        }
    }

    telemetry_guard.shutdown();
    Ok(())
}
