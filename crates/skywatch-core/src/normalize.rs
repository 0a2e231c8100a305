//! Conversion of raw provider slots into normalized samples

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::category::categorize;
use crate::types::{ForecastSample, ForecastSlot};

/// Convert raw provider slots into time-sorted [`ForecastSample`]s.
///
/// Each slot's embedded UTC offset is resolved exactly once here, so
/// everything downstream works in location-local naive time. Slots
/// missing a description, wind speed, or temperature are dropped (the
/// rest of the batch survives), as are slots outside
/// `[local now, local now + horizon_hours]`.
pub fn normalize(
    slots: &[ForecastSlot],
    now_utc: DateTime<Utc>,
    horizon_hours: i64,
) -> Vec<ForecastSample> {
    let mut samples: Vec<ForecastSample> = slots
        .iter()
        .filter_map(|slot| {
            let description = match &slot.description {
                Some(d) if !d.is_empty() => d.clone(),
                _ => {
                    debug!(at = %slot.date_time, "dropping slot without description");
                    return None;
                }
            };
            let (wind_speed, temperature) = match (slot.wind_speed, slot.temperature) {
                (Some(w), Some(t)) => (w, t),
                _ => {
                    debug!(at = %slot.date_time, "dropping slot with missing observations");
                    return None;
                }
            };

            let local = slot.date_time.naive_local();
            let local_now = now_utc.with_timezone(&slot.date_time.timezone()).naive_local();
            if local < local_now || local > local_now + Duration::hours(horizon_hours) {
                return None;
            }

            Some(ForecastSample {
                timestamp: local,
                category: categorize(&description),
                description,
                wind_speed,
                temperature,
            })
        })
        .collect();

    samples.sort_by_key(|s| s.timestamp);
    samples
}
