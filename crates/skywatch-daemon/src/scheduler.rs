//! Monitoring cycle scheduler

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::{watch, RwLock};
use tracing::info;

use skywatch_monitor::MonitorEngine;
use skywatch_notify::Messenger;
use skywatch_provider::WeatherProvider;
use skywatch_store::SubscriptionStore;

/// Drives the monitor engine on a fixed cadence until shutdown is
/// requested, finishing the in-flight cycle first.
pub struct Scheduler {
    engine: MonitorEngine,
    provider: Arc<dyn WeatherProvider>,
    messenger: Arc<dyn Messenger>,
    store: Arc<RwLock<SubscriptionStore>>,
    interval: Duration,
    shutdown: watch::Receiver<bool>,
}

impl Scheduler {
    pub fn new(
        engine: MonitorEngine,
        provider: Arc<dyn WeatherProvider>,
        messenger: Arc<dyn Messenger>,
        store: Arc<RwLock<SubscriptionStore>>,
        interval: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            engine,
            provider,
            messenger,
            store,
            interval,
            shutdown,
        }
    }

    /// Run the main monitoring loop
    pub async fn run(mut self) -> Result<()> {
        info!(interval_secs = self.interval.as_secs(), "monitor scheduler started");

        loop {
            if *self.shutdown.borrow() {
                break;
            }

            // Fresh snapshot each cycle; the store is mutated by the
            // command frontend in between.
            let snapshot = self.store.read().await.snapshot();
            self.engine
                .run_cycle(&snapshot, self.provider.as_ref(), self.messenger.as_ref())
                .await;

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = self.shutdown.changed() => {
                    info!("shutdown requested, stopping after current cycle");
                    break;
                }
            }
        }

        info!("monitor scheduler stopped");
        Ok(())
    }
}
