//! Scripted in-memory provider for tests and local runs

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;

use skywatch_core::{CurrentConditions, DailySummary, ForecastSlot};

use crate::{Location, ProviderError, ProviderResult, WeatherProvider};

/// Provider that serves canned data per city.
///
/// Cities resolve if any scripted data exists for them; everything
/// else is `NotFound`. `set_failing(true)` makes every fetch fail, to
/// exercise the monitor's skip-on-failure path.
#[derive(Default)]
pub struct ScriptedProvider {
    forecasts: Mutex<HashMap<String, Vec<ForecastSlot>>>,
    currents: Mutex<HashMap<String, CurrentConditions>>,
    dailies: Mutex<HashMap<String, DailySummary>>,
    failing: AtomicBool,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_forecast(&self, city: &str, slots: Vec<ForecastSlot>) {
        self.forecasts
            .lock()
            .await
            .insert(city.to_lowercase(), slots);
    }

    pub async fn set_current(&self, city: &str, current: CurrentConditions) {
        self.currents
            .lock()
            .await
            .insert(city.to_lowercase(), current);
    }

    pub async fn set_daily(&self, city: &str, daily: DailySummary) {
        self.dailies.lock().await.insert(city.to_lowercase(), daily);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }

    fn check_available(&self) -> ProviderResult<()> {
        if self.failing.load(Ordering::Relaxed) {
            Err(ProviderError::Unavailable("scripted failure".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait::async_trait]
impl WeatherProvider for ScriptedProvider {
    async fn resolve_location(&self, name: &str) -> ProviderResult<Location> {
        self.check_available()?;
        let city = name.trim().to_lowercase();
        let known = self.forecasts.lock().await.contains_key(&city)
            || self.currents.lock().await.contains_key(&city)
            || self.dailies.lock().await.contains_key(&city);
        if known {
            Ok(Location {
                key: format!("scripted-{city}"),
                name: name.trim().to_string(),
            })
        } else {
            Err(ProviderError::NotFound(name.to_string()))
        }
    }

    async fn resolve_coordinates(&self, lat: f64, lon: f64) -> ProviderResult<Location> {
        self.check_available()?;
        Err(ProviderError::NotFound(format!("{lat},{lon}")))
    }

    async fn fetch_current(&self, location: &Location) -> ProviderResult<CurrentConditions> {
        self.check_available()?;
        let city = location.name.to_lowercase();
        self.currents
            .lock()
            .await
            .get(&city)
            .cloned()
            .ok_or_else(|| ProviderError::BadPayload(format!("no scripted current for {city}")))
    }

    async fn fetch_forecast(&self, location: &Location) -> ProviderResult<Vec<ForecastSlot>> {
        self.check_available()?;
        let city = location.name.to_lowercase();
        self.forecasts
            .lock()
            .await
            .get(&city)
            .cloned()
            .ok_or_else(|| ProviderError::BadPayload(format!("no scripted forecast for {city}")))
    }

    async fn fetch_daily(&self, location: &Location) -> ProviderResult<DailySummary> {
        self.check_available()?;
        let city = location.name.to_lowercase();
        self.dailies
            .lock()
            .await
            .get(&city)
            .cloned()
            .ok_or_else(|| ProviderError::BadPayload(format!("no scripted daily for {city}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    fn slot() -> ForecastSlot {
        ForecastSlot {
            date_time: FixedOffset::east_opt(3600)
                .unwrap()
                .with_ymd_and_hms(2026, 3, 14, 12, 0, 0)
                .unwrap(),
            description: Some("clear sky".to_string()),
            wind_speed: Some(5.0),
            temperature: Some(10.0),
        }
    }

    #[tokio::test]
    async fn test_scripted_city_roundtrip() {
        let provider = ScriptedProvider::new();
        provider.set_forecast("Berlin", vec![slot()]).await;

        let location = provider.resolve_location("berlin").await.unwrap();
        let slots = provider.fetch_forecast(&location).await.unwrap();
        assert_eq!(slots.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_city_not_found() {
        let provider = ScriptedProvider::new();
        let err = provider.resolve_location("Atlantis").await.unwrap_err();
        assert!(matches!(err, ProviderError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_failing_mode() {
        let provider = ScriptedProvider::new();
        provider.set_forecast("Berlin", vec![slot()]).await;
        provider.set_failing(true);

        let err = provider.resolve_location("Berlin").await.unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable(_)));
    }
}
