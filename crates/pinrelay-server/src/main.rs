//! pinrelay - image search relay and proxy
//!
//! Loads configuration, sets up logging and runs the HTTP server.

use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pinrelay_server::config::Args;
use pinrelay_server::{AppState, Server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_format);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        upstream = %args.upstream_endpoint,
        allowed_domains = ?args.allowed_domains,
        timeout_secs = args.upstream_timeout_secs,
        max_retries = args.upstream_max_retries,
        forward_content_type = args.forward_content_type,
        "Starting pinrelay"
    );

    let state = AppState::from_args(&args)?;
    if !state.search.is_configured() {
        warn!("URL not set; search requests will fail until it is configured");
    }

    let server = Server::new(args.bind_addr()?, state);
    server.run(shutdown_signal()).await?;

    info!("pinrelay shutdown complete");
    Ok(())
}

fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);

    if log_format.eq_ignore_ascii_case("pretty") {
        subscriber.init();
    } else {
        subscriber.json().init();
    }
}

/// Resolves when Ctrl+C or SIGTERM is received
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
