//! Human-readable weather reports for query responses and the digest

use skywatch_core::{CurrentConditions, DailySummary, ForecastSample};

use crate::flavor;

/// Current-conditions report (command response).
pub fn format_current(city: &str, current: &CurrentConditions) -> String {
    let emoji = if current.is_day { "🏙" } else { "🌃" };
    format!(
        "{} {}\n🕒 Local time: {}\n---------------------------------\n🌡 Temperature: {}°C\n🌫 Condition: {}\n💨 Wind: {} km/h\n{}",
        emoji,
        capitalize(city),
        current.observed_at.format("%H:%M"),
        current.temperature,
        current.description,
        current.wind_speed,
        flavor::generate(&current.description, current.wind_speed, current.temperature),
    )
}

/// 12-hour outlook sampled every three hours (command response).
pub fn format_hourly(city: &str, samples: &[ForecastSample]) -> String {
    let mut text = format!(
        "🌍 {} — 12-hour outlook\n---------------------------------\n",
        capitalize(city)
    );
    for sample in samples.iter().step_by(3) {
        text.push_str(&format!(
            "🕒 {}\n🌡 {}°C | 🌫 {} | 💨 {} km/h\n---------------------------------\n",
            sample.timestamp.format("%d-%m %H:%M"),
            sample.temperature,
            sample.description,
            sample.wind_speed,
        ));
    }
    text
}

/// One-day forecast report (command response and morning digest).
pub fn format_daily(city: &str, daily: &DailySummary) -> String {
    let avg = (daily.min_temp + daily.max_temp) / 2.0;
    let max_wind = daily.day_wind.max(daily.night_wind);
    format!(
        "🌍 {} — forecast for {}\n---------------------------------\n🌡 Temperature: {}°C to {}°C (average {:.1}°C)\n☀️ Day: {} (precipitation: {}%)\n🌙 Night: {} (precipitation: {}%)\n💨 Peak wind: {} km/h\n{}",
        capitalize(city),
        daily.date.format("%d.%m.%Y"),
        daily.min_temp,
        daily.max_temp,
        avg,
        daily.day_description,
        daily.day_precip_prob,
        daily.night_description,
        daily.night_precip_prob,
        max_wind,
        flavor::generate(&daily.day_description, max_wind, daily.max_temp),
    )
}

/// Morning digest wrapper around the daily report.
pub fn format_digest(city: &str, daily: &DailySummary) -> String {
    format!(
        "☀️ Good morning! Today's forecast, {}\n{}",
        daily.date.format("%d.%m.%Y"),
        format_daily(city, daily),
    )
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate, TimeZone};
    use skywatch_core::categorize;

    fn current() -> CurrentConditions {
        CurrentConditions {
            description: "Partly cloudy".to_string(),
            temperature: 12.5,
            wind_speed: 9.0,
            observed_at: FixedOffset::east_opt(3600)
                .unwrap()
                .with_ymd_and_hms(2026, 3, 14, 18, 30, 0)
                .unwrap(),
            is_day: true,
        }
    }

    fn daily() -> DailySummary {
        DailySummary {
            date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            min_temp: 2.0,
            max_temp: 11.0,
            day_description: "Mostly sunny".to_string(),
            night_description: "Clear".to_string(),
            day_wind: 14.8,
            night_wind: 7.4,
            day_precip_prob: 10,
            night_precip_prob: 0,
        }
    }

    #[test]
    fn test_format_current_contains_essentials() {
        let text = format_current("berlin", &current());
        assert!(text.contains("Berlin"));
        assert!(text.contains("18:30"));
        assert!(text.contains("12.5°C"));
        assert!(text.contains("Partly cloudy"));
    }

    #[test]
    fn test_format_hourly_steps_by_three() {
        let samples: Vec<ForecastSample> = (0..12)
            .map(|h| ForecastSample {
                timestamp: NaiveDate::from_ymd_opt(2026, 3, 14)
                    .unwrap()
                    .and_hms_opt(h, 0, 0)
                    .unwrap(),
                category: categorize("clear sky"),
                description: "clear sky".to_string(),
                wind_speed: 5.0,
                temperature: 10.0,
            })
            .collect();

        let text = format_hourly("berlin", &samples);
        // hours 0, 3, 6, 9
        assert_eq!(text.matches("clear sky").count(), 4);
        assert!(text.contains("14-03 03:00"));
        assert!(!text.contains("14-03 04:00"));
    }

    #[test]
    fn test_format_daily_aggregates() {
        let text = format_daily("berlin", &daily());
        assert!(text.contains("2°C to 11°C"));
        assert!(text.contains("average 6.5°C"));
        assert!(text.contains("Peak wind: 14.8 km/h"));
        assert!(text.contains("14.03.2026"));
    }

    #[test]
    fn test_digest_wraps_daily() {
        let text = format_digest("berlin", &daily());
        assert!(text.starts_with("☀️ Good morning!"));
        assert!(text.contains("Mostly sunny"));
    }
}
