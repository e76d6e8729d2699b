//! JSON to Prometheus text push gateway.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info};

use promgate_gateway::{GatewayConfig, GatewayState, HttpForwarder, HttpServer};

/// JSON to Prometheus text push gateway.
#[derive(Parser, Debug)]
#[command(name = "promgate-gateway")]
#[command(about = "Translate JSON metric pushes to Prometheus text and forward them")]
#[command(version)]
struct Args {
    /// Path to configuration file (JSON5 format).
    #[arg(short, long)]
    config: Option<String>,

    /// HTTP listen address (overrides config).
    #[arg(long)]
    listen: Option<String>,

    /// Downstream base URL (overrides config).
    #[arg(long)]
    downstream: Option<String>,

    /// Log level (trace, debug, info, warn, error; overrides config).
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = if let Some(config_path) = &args.config {
        GatewayConfig::load_from_file(config_path)?
    } else {
        GatewayConfig::default()
    };

    // Apply CLI overrides
    if let Some(listen) = args.listen {
        config.listen = listen;
    }
    if let Some(downstream) = args.downstream {
        config.downstream.url = downstream;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    config.validate()?;

    promgate_common::init_tracing(&config.logging)?;

    info!("Starting promgate gateway");

    let listen_addr: SocketAddr = config
        .listen
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid listen address: {}", e))?;

    // Create components
    let forwarder = HttpForwarder::new(&config.downstream)?;
    let state = GatewayState::new(
        Arc::new(forwarder),
        config.downstream.flat_target.clone(),
        config.limits.max_body_bytes,
    );
    let http_server = HttpServer::new(state.clone(), config.routes.clone(), listen_addr);

    info!(
        downstream = %config.downstream.url,
        flat_target = %config.downstream.flat_target,
        "Forwarding translated pushes"
    );

    // Create shutdown signal
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Start HTTP server
    let http_task = tokio::spawn(async move {
        if let Err(e) = http_server.run(shutdown_rx).await {
            error!("HTTP server error: {}", e);
        }
    });

    // Wait for shutdown signal
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate_signal() => {
            info!("Received SIGTERM, shutting down...");
        }
    }

    // Signal shutdown
    shutdown_tx.send(true)?;

    // Wait for the server to drain
    let _ = tokio::time::timeout(Duration::from_secs(5), http_task).await;

    // Print final stats
    let stats = state.stats();
    info!(
        requests_received = stats.requests_received,
        requests_forwarded = stats.requests_forwarded,
        rejected_bad_request = stats.rejected_bad_request,
        body_read_failures = stats.body_read_failures,
        forward_failures = stats.forward_failures,
        "Final statistics"
    );

    info!("Gateway stopped");
    Ok(())
}

#[cfg(unix)]
async fn terminate_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            error!("Failed to install SIGTERM handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate_signal() {
    std::future::pending::<()>().await;
}
