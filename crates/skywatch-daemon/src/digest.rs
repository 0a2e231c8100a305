//! Morning forecast digest

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use tokio::sync::{watch, RwLock};
use tracing::{info, warn};

use skywatch_notify::{report, Messenger};
use skywatch_provider::WeatherProvider;
use skywatch_store::SubscriptionStore;

/// Sends every subscriber their daily forecast at a fixed local hour.
pub struct DigestTask {
    provider: Arc<dyn WeatherProvider>,
    store: Arc<RwLock<SubscriptionStore>>,
    messenger: Arc<dyn Messenger>,
    hour: u32,
    shutdown: watch::Receiver<bool>,
}

impl DigestTask {
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        store: Arc<RwLock<SubscriptionStore>>,
        messenger: Arc<dyn Messenger>,
        hour: u32,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            provider,
            store,
            messenger,
            hour,
            shutdown,
        }
    }

    pub async fn run(mut self) {
        info!(hour = self.hour, "morning digest task started");

        loop {
            let wait = next_digest_delay(Local::now().naive_local(), self.hour);
            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = self.shutdown.changed() => break,
            }

            let snapshot = self.store.read().await.snapshot();
            for (user_id, city) in snapshot {
                if let Err(e) = self.send_one(&user_id, &city).await {
                    warn!(user = %user_id, city = %city, error = %e, "digest delivery failed");
                }
            }

            // Guard against looping straight back into the same minute
            tokio::time::sleep(Duration::from_secs(60)).await;
        }

        info!("morning digest task stopped");
    }

    async fn send_one(&self, user_id: &str, city: &str) -> anyhow::Result<()> {
        let location = self.provider.resolve_location(city).await?;
        let daily = self.provider.fetch_daily(&location).await?;
        let text = report::format_digest(&location.name, &daily);
        self.messenger.send(user_id, &text).await?;
        Ok(())
    }
}

/// Time until the next occurrence of `hour` o'clock local.
fn next_digest_delay(now: NaiveDateTime, hour: u32) -> Duration {
    let today_target = now.date().and_hms_opt(hour, 0, 0).unwrap_or(now);
    let target = if now < today_target {
        today_target
    } else {
        today_target + chrono::Duration::days(1)
    };
    (target - now).to_std().unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 14)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
    }

    #[test]
    fn test_delay_before_target_hour() {
        assert_eq!(
            next_digest_delay(at(6, 30), 8),
            Duration::from_secs(90 * 60)
        );
    }

    #[test]
    fn test_delay_after_target_hour_rolls_to_tomorrow() {
        assert_eq!(
            next_digest_delay(at(9, 0), 8),
            Duration::from_secs(23 * 3600)
        );
    }

    #[test]
    fn test_delay_exactly_at_target_rolls_to_tomorrow() {
        assert_eq!(
            next_digest_delay(at(8, 0), 8),
            Duration::from_secs(24 * 3600)
        );
    }
}
