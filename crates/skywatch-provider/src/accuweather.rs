//! AccuWeather HTTP adapter

use std::collections::HashMap;
use std::time::Duration;

use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use url::Url;

use skywatch_core::{CurrentConditions, DailySummary, ForecastSlot};

use crate::{Location, ProviderError, ProviderResult, WeatherProvider};

const DEFAULT_BASE_URL: &str = "http://dataservice.accuweather.com";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// AccuWeather-backed [`WeatherProvider`].
///
/// Resolved location keys are cached per place name to keep request
/// volume down; the cache lives for the provider's lifetime.
pub struct AccuProvider {
    client: Client,
    base_url: String,
    api_key: String,
    language: String,
    location_cache: RwLock<HashMap<String, Location>>,
}

impl AccuProvider {
    pub fn new(api_key: impl Into<String>) -> ProviderResult<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Point the adapter at a different endpoint (tests, proxies).
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl AsRef<str>,
    ) -> ProviderResult<Self> {
        let base = Url::parse(base_url.as_ref())
            .map_err(|e| ProviderError::BadPayload(format!("invalid base url: {e}")))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            base_url: base.as_str().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            language: "en-us".to_string(),
            location_cache: RwLock::new(HashMap::new()),
        })
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        extra: &[(&str, &str)],
    ) -> ProviderResult<T> {
        let url = format!("{}/{}", self.base_url, path);
        let mut query: Vec<(&str, &str)> = vec![
            ("apikey", self.api_key.as_str()),
            ("language", self.language.as_str()),
        ];
        query.extend_from_slice(extra);

        let response = self.client.get(&url).query(&query).send().await?;
        let response = response.error_for_status()?;
        Ok(response.json::<T>().await?)
    }
}

// Response shapes, tolerant of missing fields. The hourly endpoint
// nests values as Temperature.Value while current conditions use
// Temperature.Metric.Value.

#[derive(Debug, Deserialize)]
struct LocationHit {
    #[serde(rename = "Key")]
    key: String,
    #[serde(rename = "LocalizedName")]
    localized_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeoHit {
    #[serde(rename = "Key")]
    key: Option<String>,
    #[serde(rename = "LocalizedName")]
    localized_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UnitValue {
    #[serde(rename = "Value")]
    value: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct MetricWrap {
    #[serde(rename = "Metric")]
    metric: Option<UnitValue>,
}

#[derive(Debug, Deserialize)]
struct CurrentWind {
    #[serde(rename = "Speed")]
    speed: Option<MetricWrap>,
}

#[derive(Debug, Deserialize)]
struct CurrentPayload {
    #[serde(rename = "WeatherText")]
    weather_text: Option<String>,
    #[serde(rename = "Temperature")]
    temperature: Option<MetricWrap>,
    #[serde(rename = "Wind")]
    wind: Option<CurrentWind>,
    #[serde(rename = "LocalObservationDateTime")]
    observed_at: Option<String>,
    #[serde(rename = "IsDayTime")]
    is_day: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct HourlyWind {
    #[serde(rename = "Speed")]
    speed: Option<UnitValue>,
}

#[derive(Debug, Deserialize)]
struct HourlySlot {
    #[serde(rename = "DateTime")]
    date_time: String,
    #[serde(rename = "IconPhrase")]
    icon_phrase: Option<String>,
    #[serde(rename = "Temperature")]
    temperature: Option<UnitValue>,
    #[serde(rename = "Wind")]
    wind: Option<HourlyWind>,
}

#[derive(Debug, Deserialize)]
struct DailyHalf {
    #[serde(rename = "IconPhrase")]
    icon_phrase: Option<String>,
    #[serde(rename = "Wind")]
    wind: Option<HourlyWind>,
    #[serde(rename = "PrecipitationProbability")]
    precip_probability: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct DailyTemperature {
    #[serde(rename = "Minimum")]
    minimum: Option<UnitValue>,
    #[serde(rename = "Maximum")]
    maximum: Option<UnitValue>,
}

#[derive(Debug, Deserialize)]
struct DailyDay {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Temperature")]
    temperature: Option<DailyTemperature>,
    #[serde(rename = "Day")]
    day: Option<DailyHalf>,
    #[serde(rename = "Night")]
    night: Option<DailyHalf>,
}

#[derive(Debug, Deserialize)]
struct DailyPayload {
    #[serde(rename = "DailyForecasts")]
    daily_forecasts: Vec<DailyDay>,
}

#[async_trait::async_trait]
impl WeatherProvider for AccuProvider {
    async fn resolve_location(&self, name: &str) -> ProviderResult<Location> {
        let cache_key = name.trim().to_lowercase();
        if let Some(hit) = self.location_cache.read().await.get(&cache_key) {
            return Ok(hit.clone());
        }

        let hits: Vec<LocationHit> = self
            .get_json("locations/v1/cities/search", &[("q", name)])
            .await?;

        let hit = hits
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::NotFound(name.to_string()))?;

        let location = Location {
            key: hit.key,
            name: hit.localized_name.unwrap_or_else(|| name.to_string()),
        };
        debug!(place = %name, key = %location.key, "resolved location");

        self.location_cache
            .write()
            .await
            .insert(cache_key, location.clone());
        Ok(location)
    }

    async fn resolve_coordinates(&self, lat: f64, lon: f64) -> ProviderResult<Location> {
        let q = format!("{},{}", lat, lon);
        let hit: GeoHit = self
            .get_json("locations/v1/cities/geoposition/search", &[("q", &q)])
            .await?;

        let key = hit
            .key
            .ok_or_else(|| ProviderError::NotFound(q.clone()))?;
        Ok(Location {
            key,
            name: hit.localized_name.unwrap_or(q),
        })
    }

    async fn fetch_current(&self, location: &Location) -> ProviderResult<CurrentConditions> {
        let path = format!("currentconditions/v1/{}", location.key);
        let payloads: Vec<CurrentPayload> =
            self.get_json(&path, &[("details", "true")]).await?;

        let payload = payloads
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::BadPayload("empty current conditions".to_string()))?;

        let description = payload
            .weather_text
            .ok_or_else(|| ProviderError::BadPayload("missing WeatherText".to_string()))?;
        let temperature = payload
            .temperature
            .and_then(|t| t.metric)
            .and_then(|m| m.value)
            .ok_or_else(|| ProviderError::BadPayload("missing Temperature".to_string()))?;
        let wind_speed = payload
            .wind
            .and_then(|w| w.speed)
            .and_then(|s| s.metric)
            .and_then(|m| m.value)
            .ok_or_else(|| ProviderError::BadPayload("missing Wind".to_string()))?;
        let observed_at = payload
            .observed_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .ok_or_else(|| {
                ProviderError::BadPayload("missing LocalObservationDateTime".to_string())
            })?;

        Ok(CurrentConditions {
            description,
            temperature,
            wind_speed,
            observed_at,
            is_day: payload.is_day.unwrap_or(true),
        })
    }

    async fn fetch_forecast(&self, location: &Location) -> ProviderResult<Vec<ForecastSlot>> {
        let path = format!("forecasts/v1/hourly/12hour/{}", location.key);
        let slots: Vec<HourlySlot> = self
            .get_json(&path, &[("details", "true"), ("metric", "true")])
            .await?;

        let mut out = Vec::with_capacity(slots.len());
        for slot in slots {
            let date_time = match DateTime::parse_from_rfc3339(&slot.date_time) {
                Ok(dt) => dt,
                Err(e) => {
                    warn!(raw = %slot.date_time, error = %e, "skipping slot with bad timestamp");
                    continue;
                }
            };
            out.push(ForecastSlot {
                date_time,
                description: slot.icon_phrase,
                wind_speed: slot.wind.and_then(|w| w.speed).and_then(|s| s.value),
                temperature: slot.temperature.and_then(|t| t.value),
            });
        }
        Ok(out)
    }

    async fn fetch_daily(&self, location: &Location) -> ProviderResult<DailySummary> {
        let path = format!("forecasts/v1/daily/5day/{}", location.key);
        let payload: DailyPayload = self
            .get_json(&path, &[("details", "true"), ("metric", "true")])
            .await?;

        let today = payload
            .daily_forecasts
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::BadPayload("empty daily forecast".to_string()))?;

        let date = DateTime::parse_from_rfc3339(&today.date)
            .map_err(|e| ProviderError::BadPayload(format!("bad forecast date: {e}")))?
            .date_naive();
        let temps = today
            .temperature
            .ok_or_else(|| ProviderError::BadPayload("missing Temperature".to_string()))?;
        let min_temp = temps
            .minimum
            .and_then(|v| v.value)
            .ok_or_else(|| ProviderError::BadPayload("missing Temperature.Minimum".to_string()))?;
        let max_temp = temps
            .maximum
            .and_then(|v| v.value)
            .ok_or_else(|| ProviderError::BadPayload("missing Temperature.Maximum".to_string()))?;

        let half = |half: Option<DailyHalf>, which: &str| -> ProviderResult<(String, f64, u8)> {
            let half =
                half.ok_or_else(|| ProviderError::BadPayload(format!("missing {which}")))?;
            let desc = half
                .icon_phrase
                .ok_or_else(|| ProviderError::BadPayload(format!("missing {which} phrase")))?;
            let wind = half
                .wind
                .and_then(|w| w.speed)
                .and_then(|s| s.value)
                .unwrap_or(0.0);
            Ok((desc, wind, half.precip_probability.unwrap_or(0)))
        };

        let (day_description, day_wind, day_precip_prob) = half(today.day, "Day")?;
        let (night_description, night_wind, night_precip_prob) = half(today.night, "Night")?;

        Ok(DailySummary {
            date,
            min_temp,
            max_temp,
            day_description,
            night_description,
            day_wind,
            night_wind,
            day_precip_prob,
            night_precip_prob,
        })
    }
}
