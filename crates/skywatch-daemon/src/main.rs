//! Skywatch daemon - forecast monitor and command frontend
//!
//! This binary coordinates:
//! - The periodic forecast-monitoring loop (fetch, detect, alert)
//! - The morning digest task
//! - The HTTP command frontend (queries, subscriptions, health)

mod config;
mod digest;
mod scheduler;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::sync::{watch, RwLock};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use skywatch_core::{ChangeDetector, DetectorConfig, HourlyDetector, PeriodDetector};
use skywatch_monitor::{EngineConfig, MonitorEngine};
use skywatch_notify::{Messenger, TelegramMessenger};
use skywatch_provider::{AccuProvider, WeatherProvider};
use skywatch_store::SubscriptionStore;

use crate::config::{DaemonConfig, DetectionMode};
use crate::digest::DigestTask;
use crate::scheduler::Scheduler;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting skywatch daemon");

    // Load configuration
    let config = DaemonConfig::from_env()?;
    info!("Loaded configuration: {:?}", config);

    // Shared collaborators
    let store = Arc::new(RwLock::new(SubscriptionStore::load(
        &config.subscriptions_file,
    )));
    let provider: Arc<dyn WeatherProvider> = Arc::new(
        AccuProvider::new(config.api_key.clone()).context("Failed to build weather provider")?,
    );
    let messenger: Arc<dyn Messenger> = Arc::new(
        TelegramMessenger::new(config.bot_token.clone())
            .context("Failed to build message transport")?,
    );

    // Detection strategy
    let detector: Box<dyn ChangeDetector> = match config.detection_mode {
        DetectionMode::Periods => Box::new(PeriodDetector::new(DetectorConfig::default())),
        DetectionMode::Hourly => Box::new(HourlyDetector::new(DetectorConfig::default())),
    };
    info!(strategy = detector.name(), "change detector selected");

    let engine = MonitorEngine::new(detector, EngineConfig::default());

    // Graceful shutdown: stop after the current cycle
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            let _ = shutdown_tx.send(true);
        }
    });

    // Background monitor loop
    let scheduler = Scheduler::new(
        engine,
        Arc::clone(&provider),
        Arc::clone(&messenger),
        Arc::clone(&store),
        Duration::from_secs(config.poll_interval),
        shutdown_rx.clone(),
    );
    let monitor_handle = tokio::spawn(scheduler.run());

    // Morning digest
    let digest = DigestTask::new(
        Arc::clone(&provider),
        Arc::clone(&store),
        Arc::clone(&messenger),
        config.digest_hour,
        shutdown_rx.clone(),
    );
    let digest_handle = tokio::spawn(digest.run());

    // HTTP command frontend
    let (app, api_ctx) = skywatch_api::build_app(Arc::clone(&store), Arc::clone(&provider));
    let addr: SocketAddr = config
        .http_bind
        .parse()
        .context("Invalid HTTP bind address")?;
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind TCP listener")?;

    skywatch_api::set_ready(&api_ctx, true);
    info!(%addr, "HTTP frontend listening");

    let mut http_shutdown = shutdown_rx.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = http_shutdown.changed().await;
        })
        .await
        .context("HTTP server error")?;

    monitor_handle
        .await
        .context("monitor task join failed")??;
    digest_handle.await.context("digest task join failed")?;

    info!("skywatch daemon stopped");
    Ok(())
}
