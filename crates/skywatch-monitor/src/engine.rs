//! One monitoring cycle over all subscriptions

use std::collections::HashSet;

use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use tracing::{debug, info, warn};

use skywatch_core::{
    categorize, normalize, AlertRecord, ChangeDetector, CurrentConditions, ForecastSample,
};
use skywatch_notify::Messenger;
use skywatch_provider::{ProviderResult, WeatherProvider};

use crate::state::MonitorState;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Forward monitoring window passed to the normalizer (hours).
    pub horizon_hours: i64,
    /// Age bound for dedup keys and cached hours (hours).
    pub state_max_age_hours: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            horizon_hours: 24,
            state_max_age_hours: 48,
        }
    }
}

/// Outcome counters for one cycle, for the scheduler's log line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    pub subscriptions: usize,
    pub skipped: usize,
    pub alerts_sent: usize,
}

/// Runs the fetch → normalize → detect → dispatch pipeline for every
/// subscription in the snapshot. Failures are confined to the
/// subscription they occurred in.
pub struct MonitorEngine {
    detector: Box<dyn ChangeDetector>,
    cfg: EngineConfig,
    state: MonitorState,
}

impl MonitorEngine {
    pub fn new(detector: Box<dyn ChangeDetector>, cfg: EngineConfig) -> Self {
        Self {
            detector,
            cfg,
            state: MonitorState::new(),
        }
    }

    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    pub async fn run_cycle(
        &mut self,
        subscriptions: &[(String, String)],
        provider: &dyn WeatherProvider,
        messenger: &dyn Messenger,
    ) -> CycleStats {
        self.run_cycle_at(Utc::now(), subscriptions, provider, messenger)
            .await
    }

    /// Cycle with an explicit wall clock, for tests.
    pub async fn run_cycle_at(
        &mut self,
        now_utc: DateTime<Utc>,
        subscriptions: &[(String, String)],
        provider: &dyn WeatherProvider,
        messenger: &dyn Messenger,
    ) -> CycleStats {
        let live: HashSet<_> = subscriptions.iter().cloned().collect();
        self.state.retain_live(&live);

        let mut stats = CycleStats::default();
        for (user_id, city) in subscriptions {
            stats.subscriptions += 1;
            match self
                .process_subscription(now_utc, user_id, city, provider)
                .await
            {
                Ok(Some(alert)) => {
                    if let Err(e) = messenger.send(&alert.user_id, &alert.text).await {
                        warn!(user = %alert.user_id, city = %alert.city, error = %e,
                              "alert dispatch failed");
                    } else {
                        stats.alerts_sent += 1;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(user = %user_id, city = %city, error = %e,
                          "fetch failed, skipping subscription this cycle");
                    stats.skipped += 1;
                }
            }
        }

        info!(
            subscriptions = stats.subscriptions,
            skipped = stats.skipped,
            alerts = stats.alerts_sent,
            "monitoring cycle complete"
        );
        stats
    }

    async fn process_subscription(
        &mut self,
        now_utc: DateTime<Utc>,
        user_id: &str,
        city: &str,
        provider: &dyn WeatherProvider,
    ) -> ProviderResult<Option<AlertRecord>> {
        let location = provider.resolve_location(city).await?;
        let slots = provider.fetch_forecast(&location).await?;

        let current = if self.detector.needs_current() {
            Some(provider.fetch_current(&location).await?)
        } else {
            None
        };

        // Resolve "now" into the forecast location's local time using
        // the offset the slots carry; an empty batch falls back to UTC.
        let local_now: NaiveDateTime = slots
            .first()
            .map(|s| now_utc.with_timezone(&s.date_time.timezone()).naive_local())
            .unwrap_or_else(|| now_utc.naive_utc());

        let samples = normalize(&slots, now_utc, self.cfg.horizon_hours);
        let current_sample = current.as_ref().map(current_to_sample);

        let state = self.state.entry(user_id, city);
        state.prune(local_now, self.cfg.state_max_age_hours);

        if samples.is_empty() && current_sample.is_none() {
            debug!(user = %user_id, city = %city, "no usable samples this cycle");
            return Ok(None);
        }

        let messages = self.detector.detect(
            &location.name,
            &samples,
            current_sample.as_ref(),
            state,
            local_now,
        );
        if messages.is_empty() {
            return Ok(None);
        }

        Ok(Some(AlertRecord {
            user_id: user_id.to_string(),
            city: city.to_string(),
            text: messages.join("\n\n"),
        }))
    }
}

/// Map current conditions onto a forecast sample at the observation's
/// hour, for the detector strategies that consume them.
fn current_to_sample(current: &CurrentConditions) -> ForecastSample {
    let local = current.observed_at.naive_local();
    let truncated = local
        .date()
        .and_hms_opt(local.hour(), 0, 0)
        .unwrap_or(local);
    ForecastSample {
        timestamp: truncated,
        category: categorize(&current.description),
        description: current.description.clone(),
        wind_speed: current.wind_speed,
        temperature: current.temperature,
    }
}
