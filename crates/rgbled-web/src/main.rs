//! RGB LED Web Controller
//!
//! HTMX web UI for picking a color and streaming it to an LED controller
//! over a serial link.

mod config;
mod state;
mod web;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::Config;
use rgbled_hw::SessionEvent;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Setup logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/default.toml".to_string());

    let config = Config::load_or_default(&config_path).context("Failed to load configuration")?;
    info!("Loaded configuration from: {}", config_path);

    // Initialize application state
    let state = Arc::new(AppState::new(config.clone()));

    let devices = state.devices();
    if devices.is_empty() {
        warn!(
            "No serial devices matching {}* in {}",
            config.serial.prefix, config.serial.device_dir
        );
    } else {
        info!("Found devices: {}", devices.join(", "));
    }

    // Log session transitions
    let events = state.subscribe().await;
    tokio::spawn(async move {
        log_events(events).await;
    });

    // Setup Unix signal handlers
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
    let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())?;

    let app = web::create_router(state.clone());
    let addr: SocketAddr = config.listen.parse().context("Invalid listen address")?;
    let listener = TcpListener::bind(addr).await?;
    info!("Web server listening on http://{}", addr);

    // Run server with shutdown handling
    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down");
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down");
        }
    }

    state.shutdown().await;
    Ok(())
}

async fn log_events(mut events: broadcast::Receiver<SessionEvent>) {
    loop {
        match events.recv().await {
            Ok(SessionEvent::ColorSent { device, color }) => {
                info!("Sent {} to {}", color, device);
            }
            Ok(SessionEvent::TransmissionFailed { device, reason }) => {
                warn!("Connection to {} dropped: {}", device, reason);
            }
            Ok(event) => info!("Session event: {:?}", event),
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                warn!("Event log missed {} events", missed);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
