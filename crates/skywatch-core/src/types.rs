//! Core data types for forecast monitoring

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Weather category inferred from a free-text condition description.
///
/// Category equality (not the description text) drives period
/// segmentation and the detection rules. Descriptions that match no
/// keyword family are carried verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherCategory {
    Rain,
    Snow,
    Fog,
    Cloudy,
    Clear,
    Other(String),
}

impl WeatherCategory {
    /// Rain and snow are the precipitation categories the detection
    /// rules treat specially.
    pub fn is_precipitation(&self) -> bool {
        matches!(self, WeatherCategory::Rain | WeatherCategory::Snow)
    }

    /// Short lowercase label used in alert messages.
    pub fn label(&self) -> &str {
        match self {
            WeatherCategory::Rain => "rain",
            WeatherCategory::Snow => "snow",
            WeatherCategory::Fog => "fog",
            WeatherCategory::Cloudy => "cloudy",
            WeatherCategory::Clear => "clear",
            WeatherCategory::Other(text) => text.as_str(),
        }
    }
}

/// A single normalized forecast sample, local to the forecast location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    /// Location-local timestamp (offset already resolved).
    pub timestamp: NaiveDateTime,
    pub category: WeatherCategory,
    pub description: String,
    /// km/h as provided by the source
    pub wind_speed: f64,
    /// °C
    pub temperature: f64,
}

impl ForecastSample {
    /// Hour-granularity key ("YYYYMMDDHH") for caching and dedup.
    pub fn hour_key(&self) -> String {
        hour_key(&self.timestamp)
    }
}

/// Format a timestamp at hour granularity for cache and dedup keys.
pub fn hour_key(ts: &NaiveDateTime) -> String {
    ts.format("%Y%m%d%H").to_string()
}

/// A maximal contiguous run of samples sharing one weather category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherPeriod {
    pub category: WeatherCategory,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    /// Description of the first sample in the run.
    pub description: String,
    pub samples: Vec<ForecastSample>,
}

impl WeatherPeriod {
    pub fn avg_temperature(&self) -> f64 {
        let sum: f64 = self.samples.iter().map(|s| s.temperature).sum();
        sum / self.samples.len() as f64
    }

    pub fn avg_wind_speed(&self) -> f64 {
        let sum: f64 = self.samples.iter().map(|s| s.wind_speed).sum();
        sum / self.samples.len() as f64
    }

    /// Period length in fractional hours.
    pub fn duration_hours(&self) -> f64 {
        (self.end_time - self.start_time).num_seconds() as f64 / 3600.0
    }
}

/// Raw forecast time-slot as returned by a provider, before
/// normalization. Optional fields reflect payloads with missing data;
/// the normalizer drops incomplete slots.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSlot {
    /// Provider-local timestamp with embedded UTC offset.
    pub date_time: DateTime<FixedOffset>,
    pub description: Option<String>,
    pub wind_speed: Option<f64>,
    pub temperature: Option<f64>,
}

/// Current observed conditions at a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub description: String,
    pub temperature: f64,
    pub wind_speed: f64,
    pub observed_at: DateTime<FixedOffset>,
    pub is_day: bool,
}

/// One-day forecast summary (used by query responses and the morning
/// digest, not by change detection).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub min_temp: f64,
    pub max_temp: f64,
    pub day_description: String,
    pub night_description: String,
    pub day_wind: f64,
    pub night_wind: f64,
    pub day_precip_prob: u8,
    pub night_precip_prob: u8,
}

/// An alert produced by the change detector for one subscription.
/// Ephemeral: dispatched immediately, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertRecord {
    pub user_id: String,
    pub city: String,
    pub text: String,
}
