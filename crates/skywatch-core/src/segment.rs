//! Weather-period segmentation

use crate::types::{ForecastSample, WeatherPeriod};

/// Group a time-sorted sample sequence into maximal contiguous runs
/// sharing the same weather category.
///
/// Consecutive output periods never share a category, and the periods'
/// samples partition the input exactly. An empty input yields an empty
/// period list.
pub fn segment(samples: &[ForecastSample]) -> Vec<WeatherPeriod> {
    let mut periods: Vec<WeatherPeriod> = Vec::new();

    for sample in samples {
        match periods.last_mut() {
            Some(current) if current.category == sample.category => {
                current.end_time = sample.timestamp;
                current.samples.push(sample.clone());
            }
            _ => {
                periods.push(WeatherPeriod {
                    category: sample.category.clone(),
                    start_time: sample.timestamp,
                    end_time: sample.timestamp,
                    description: sample.description.clone(),
                    samples: vec![sample.clone()],
                });
            }
        }
    }

    periods
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::categorize;
    use chrono::{NaiveDate, NaiveDateTime};

    fn ts(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 14)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn sample(hour: u32, desc: &str) -> ForecastSample {
        ForecastSample {
            timestamp: ts(hour),
            category: categorize(desc),
            description: desc.to_string(),
            wind_speed: 5.0,
            temperature: 10.0,
        }
    }

    #[test]
    fn test_empty_input_yields_no_periods() {
        assert!(segment(&[]).is_empty());
    }

    #[test]
    fn test_single_run() {
        let samples = vec![sample(8, "clear sky"), sample(9, "sunny"), sample(10, "clear")];
        let periods = segment(&samples);
        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0].start_time, ts(8));
        assert_eq!(periods[0].end_time, ts(10));
        assert_eq!(periods[0].samples.len(), 3);
        // Representative description comes from the first sample
        assert_eq!(periods[0].description, "clear sky");
    }

    #[test]
    fn test_adjacent_periods_never_share_category() {
        let samples = vec![
            sample(8, "clear sky"),
            sample(9, "light rain"),
            sample(10, "heavy rain"),
            sample(11, "clear sky"),
            sample(12, "snow"),
        ];
        let periods = segment(&samples);
        assert_eq!(periods.len(), 4);
        for pair in periods.windows(2) {
            assert_ne!(pair[0].category, pair[1].category);
        }
    }

    #[test]
    fn test_samples_partition_input_exactly() {
        let samples = vec![
            sample(8, "clear sky"),
            sample(9, "light rain"),
            sample(10, "heavy rain"),
            sample(11, "fog"),
            sample(12, "fog"),
            sample(13, "clear sky"),
        ];
        let periods = segment(&samples);
        let flattened: Vec<ForecastSample> =
            periods.iter().flat_map(|p| p.samples.clone()).collect();
        assert_eq!(flattened, samples);
    }

    #[test]
    fn test_period_bounds_cover_run() {
        let samples = vec![sample(8, "fog"), sample(9, "mist"), sample(10, "clear sky")];
        let periods = segment(&samples);
        assert_eq!(periods.len(), 2);
        assert_eq!(periods[0].start_time, ts(8));
        assert_eq!(periods[0].end_time, ts(9));
        assert_eq!(periods[1].start_time, ts(10));
        assert_eq!(periods[1].end_time, ts(10));
    }
}
