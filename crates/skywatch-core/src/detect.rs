//! Change detection over fresh forecast data
//!
//! Two strategies implement [`ChangeDetector`]: the period-based
//! detector compares adjacent weather periods, the hourly detector
//! compares per-hour point samples across polling cycles. Both are
//! pure over their inputs plus the subscription's monitor state, so
//! they are driven identically by the engine and tested without I/O.

use chrono::{Duration, NaiveDateTime, Timelike};
use std::collections::HashMap;

use crate::dedup::NotificationLog;
use crate::segment::segment;
use crate::types::{hour_key, ForecastSample, WeatherCategory, WeatherPeriod};

/// Detection thresholds. Defaults carry the reference constants.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Forward window within which future transitions are alertable (hours).
    pub horizon_hours: f64,
    /// Maximum precipitation-break length reported as "temporary" (hours).
    pub max_gap_hours: f64,
    /// Absolute average-temperature delta that counts as a sharp swing (°C).
    pub temp_swing_threshold: f64,
    /// Average wind speed above which the escalation rule may fire.
    pub wind_alert_threshold: f64,
    /// Next-period wind must exceed this multiple of the current period's.
    pub wind_escalation_factor: f64,
    /// Hourly mode: wind speed crossing that fires on its own.
    pub hourly_wind_threshold: f64,
    /// Hourly mode: temperature ceiling/floor that fire on their own.
    pub hourly_temp_high: f64,
    pub hourly_temp_low: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            horizon_hours: 24.0,
            max_gap_hours: 6.0,
            temp_swing_threshold: 6.0,
            wind_alert_threshold: 15.0,
            wind_escalation_factor: 1.5,
            hourly_wind_threshold: 10.0,
            hourly_temp_high: 30.0,
            hourly_temp_low: 0.0,
        }
    }
}

/// Per-subscription monitor state: the hour-keyed sample cache, the
/// most recent period segmentation, and the notification log.
///
/// Created lazily on the first successful fetch for a subscription and
/// evicted when the subscription disappears; the period list is
/// replaced wholesale each cycle while the log persists across cycles.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionState {
    pub hourly_cache: HashMap<String, ForecastSample>,
    pub periods: Vec<WeatherPeriod>,
    pub notifications: NotificationLog,
}

impl SubscriptionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop log entries and cached hours older than `max_age_hours`.
    pub fn prune(&mut self, now: NaiveDateTime, max_age_hours: i64) {
        self.notifications.evict_older_than(now, max_age_hours);
        self.hourly_cache
            .retain(|_, s| (now - s.timestamp).num_hours() <= max_age_hours);
    }
}

/// A change-detection strategy for one subscription's fresh samples.
pub trait ChangeDetector: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether the engine should fetch current conditions for this
    /// strategy in addition to the forecast.
    fn needs_current(&self) -> bool {
        false
    }

    /// Inspect the fresh samples against the subscription state and
    /// return alert message texts. Implementations mark everything
    /// they emit in the state's notification log, so a second run on
    /// identical input returns nothing.
    fn detect(
        &self,
        city: &str,
        samples: &[ForecastSample],
        current: Option<&ForecastSample>,
        state: &mut SubscriptionState,
        now: NaiveDateTime,
    ) -> Vec<String>;
}

fn fmt_time(t: &NaiveDateTime) -> String {
    t.format("%d.%m at %H:%M").to_string()
}

fn hours_noun(n: i64) -> &'static str {
    if n == 1 {
        "hour"
    } else {
        "hours"
    }
}

/// Period-based detector: segments the batch and evaluates the
/// transition rules over adjacent period pairs.
pub struct PeriodDetector {
    cfg: DetectorConfig,
}

impl PeriodDetector {
    pub fn new(cfg: DetectorConfig) -> Self {
        Self { cfg }
    }

    fn onset_duration_text(duration_hours: f64) -> String {
        let whole = duration_hours as i64;
        if duration_hours >= 3.0 {
            format!(" (prolonged, about {} {})", whole, hours_noun(whole))
        } else if duration_hours >= 1.0 {
            format!(" (brief, about {} {})", whole, hours_noun(whole))
        } else if duration_hours > 0.0 {
            format!(" (brief, about {} minutes)", (duration_hours * 60.0) as i64)
        } else {
            String::new()
        }
    }
}

impl ChangeDetector for PeriodDetector {
    fn name(&self) -> &'static str {
        "periods"
    }

    fn detect(
        &self,
        city: &str,
        samples: &[ForecastSample],
        _current: Option<&ForecastSample>,
        state: &mut SubscriptionState,
        now: NaiveDateTime,
    ) -> Vec<String> {
        let periods = segment(samples);
        state.periods = periods.clone();

        let mut alerts = Vec::new();
        if periods.len() < 2 {
            return alerts;
        }

        // Set when the gap rule fires at pair i: the resumption pair
        // (i+1) must not additionally announce an onset.
        let mut suppress_onset_next = false;

        for i in 0..periods.len() - 1 {
            let suppress_onset = std::mem::take(&mut suppress_onset_next);
            let current = &periods[i];
            let next = &periods[i + 1];

            let key = format!(
                "{}_to_{}",
                hour_key(&current.start_time),
                hour_key(&next.start_time)
            );
            if state.notifications.has_fired(&key) {
                continue;
            }

            let hours_until = (next.start_time - now).num_seconds() as f64 / 3600.0;
            if !(0.0..=self.cfg.horizon_hours).contains(&hours_until) {
                continue;
            }

            // A suppressed onset still counts as handled for dedup.
            let mut fired = suppress_onset;

            // 1. Temporary break in precipitation
            if current.category.is_precipitation() && !next.category.is_precipitation() {
                if let Some(third) = periods.get(i + 2) {
                    if third.category.is_precipitation() {
                        let break_hours =
                            (third.start_time - next.start_time).num_seconds() as f64 / 3600.0;
                        if break_hours <= self.cfg.max_gap_hours {
                            let whole = break_hours as i64;
                            alerts.push(format!(
                                "⏱ Precipitation outlook for {}:\nExpect a break in the {} from {} until {} ({} {})\nPrecipitation resumes afterwards.",
                                city,
                                current.category.label(),
                                fmt_time(&next.start_time),
                                fmt_time(&third.start_time),
                                whole,
                                hours_noun(whole),
                            ));
                            fired = true;
                            suppress_onset_next = true;
                        }
                    }
                }
            }

            // 2. Precipitation onset (skipped when folded into a break alert)
            if !suppress_onset
                && !current.category.is_precipitation()
                && next.category.is_precipitation()
            {
                alerts.push(format!(
                    "🌧 Precipitation ahead in {}:\nExpect {} from {}{}",
                    city,
                    next.category.label(),
                    fmt_time(&next.start_time),
                    Self::onset_duration_text(next.duration_hours()),
                ));
                fired = true;
            }

            // 3. Sharp temperature swing between periods
            let temp_delta = next.avg_temperature() - current.avg_temperature();
            if temp_delta.abs() > self.cfg.temp_swing_threshold {
                let direction = if temp_delta > 0.0 { "warming" } else { "cooling" };
                alerts.push(format!(
                    "🌡 Sharp temperature change in {}:\nExpect {} of {:.1}°C starting {}",
                    city,
                    direction,
                    temp_delta.abs(),
                    fmt_time(&next.start_time),
                ));
                fired = true;
            }

            // 4. Wind escalation
            let next_wind = next.avg_wind_speed();
            if next_wind > self.cfg.wind_alert_threshold
                && next_wind > current.avg_wind_speed() * self.cfg.wind_escalation_factor
            {
                alerts.push(format!(
                    "💨 Wind advisory for {}:\nFrom {} winds strengthen to {:.1} km/h\nTake care outdoors!",
                    city,
                    fmt_time(&next.start_time),
                    next_wind,
                ));
                fired = true;
            }

            // 5. Fog onset
            if next.category == WeatherCategory::Fog && current.category != WeatherCategory::Fog {
                alerts.push(format!(
                    "🌫 Fog warning for {}:\nFog expected from {}. Visibility will be reduced.\nBe careful on the roads!",
                    city,
                    fmt_time(&next.start_time),
                ));
                fired = true;
            }

            if fired {
                state.notifications.mark_fired(key, now);
            }
        }

        alerts
    }
}

/// Hourly detector: compares per-hour point samples (and current
/// conditions mapped onto the current hour) against the previous
/// poll's cache.
pub struct HourlyDetector {
    cfg: DetectorConfig,
}

impl HourlyDetector {
    pub fn new(cfg: DetectorConfig) -> Self {
        Self { cfg }
    }
}

impl ChangeDetector for HourlyDetector {
    fn name(&self) -> &'static str {
        "hourly"
    }

    fn needs_current(&self) -> bool {
        true
    }

    fn detect(
        &self,
        city: &str,
        samples: &[ForecastSample],
        current: Option<&ForecastSample>,
        state: &mut SubscriptionState,
        now: NaiveDateTime,
    ) -> Vec<String> {
        let mut fresh: Vec<ForecastSample> = samples.to_vec();
        if let Some(cur) = current {
            fresh.push(cur.clone());
        }
        fresh.sort_by_key(|s| s.timestamp);

        let now_hour = now.date().and_hms_opt(now.hour(), 0, 0).unwrap_or(now);
        let mut alerts = Vec::new();

        for sample in &fresh {
            let hk = sample.hour_key();

            match state.hourly_cache.get(&hk) {
                None => {
                    let key = format!("first_{}", hk);
                    if !state.notifications.has_fired(&key) {
                        state.notifications.mark_fired(key, now);
                        alerts.push(format!(
                            "📋 New forecast for {}: {} — {}, {:.0}°C, wind {:.1} km/h",
                            city,
                            fmt_time(&sample.timestamp),
                            sample.description,
                            sample.temperature,
                            sample.wind_speed,
                        ));
                    }
                }
                Some(previous) if previous.category != sample.category => {
                    let key = format!("change_{}", hk);
                    if !state.notifications.has_fired(&key) {
                        state.notifications.mark_fired(key, now);
                        alerts.push(format!(
                            "🔄 Forecast revised for {} at {}: {} → {}",
                            city,
                            fmt_time(&sample.timestamp),
                            previous.description,
                            sample.description,
                        ));
                    }
                }
                Some(_) => {}
            }

            if sample.wind_speed > self.cfg.hourly_wind_threshold {
                let key = format!("wind_{}", hk);
                if !state.notifications.has_fired(&key) {
                    state.notifications.mark_fired(key, now);
                    alerts.push(format!(
                        "💨 Strong wind in {} around {}: up to {:.1} km/h",
                        city,
                        fmt_time(&sample.timestamp),
                        sample.wind_speed,
                    ));
                }
            }

            if sample.temperature > self.cfg.hourly_temp_high
                || sample.temperature < self.cfg.hourly_temp_low
            {
                let key = format!("temp_{}", hk);
                if !state.notifications.has_fired(&key) {
                    state.notifications.mark_fired(key, now);
                    let kind = if sample.temperature > self.cfg.hourly_temp_high {
                        "Heat"
                    } else {
                        "Frost"
                    };
                    alerts.push(format!(
                        "🌡 {} warning for {} around {}: {:.0}°C expected",
                        kind,
                        city,
                        fmt_time(&sample.timestamp),
                        sample.temperature,
                    ));
                }
            }

            // Re-reminder when the slot is exactly one hour out.
            if sample.timestamp == now_hour + Duration::hours(1) {
                let key = format!("soon_{}", hk);
                if !state.notifications.has_fired(&key) {
                    state.notifications.mark_fired(key, now);
                    alerts.push(format!(
                        "⏰ {} in one hour: {}, {:.0}°C, wind {:.1} km/h",
                        city, sample.description, sample.temperature, sample.wind_speed,
                    ));
                }
            }

            state.hourly_cache.insert(hk, sample.clone());
        }

        alerts
    }
}
