//! Weather provider adapters
//!
//! This crate provides the interface for resolving place names and
//! fetching current conditions and forecasts from an upstream weather
//! service, plus a scripted in-memory provider for tests and local
//! runs.

pub mod accuweather;
pub mod scripted;

pub use accuweather::*;
pub use scripted::*;

use async_trait::async_trait;
use thiserror::Error;

use skywatch_core::{CurrentConditions, DailySummary, ForecastSlot};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("location not found: {0}")]
    NotFound(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed payload: {0}")]
    BadPayload(String),

    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// A resolved provider location: the provider-specific key plus the
/// display name reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub key: String,
    pub name: String,
}

/// Trait for all weather data providers
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Resolve a free-text place name to a provider location.
    async fn resolve_location(&self, name: &str) -> ProviderResult<Location>;

    /// Resolve a coordinate pair to a provider location.
    async fn resolve_coordinates(&self, lat: f64, lon: f64) -> ProviderResult<Location>;

    /// Current observed conditions at a location.
    async fn fetch_current(&self, location: &Location) -> ProviderResult<CurrentConditions>;

    /// Hourly forecast slots (next ~12 hours), raw and unnormalized.
    async fn fetch_forecast(&self, location: &Location) -> ProviderResult<Vec<ForecastSlot>>;

    /// Today's forecast summary.
    async fn fetch_daily(&self, location: &Location) -> ProviderResult<DailySummary>;
}
