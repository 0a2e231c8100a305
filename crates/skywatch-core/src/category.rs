//! Keyword classification of condition descriptions

use crate::types::WeatherCategory;

// Keyword families are checked in priority order: rain before snow
// before fog before cloudy before clear, so a description matching
// several families resolves to the most disruptive one. Stems cover
// both English and Russian provider texts (the upstream API is queried
// with a language parameter).
const RAIN_WORDS: &[&str] = &["rain", "shower", "storm", "thunder", "drizzle", "дожд", "ливн", "гроз"];
const SNOW_WORDS: &[&str] = &["snow", "blizzard", "sleet", "flurr", "снег", "метел", "снегопад"];
const FOG_WORDS: &[&str] = &["fog", "mist", "haze", "туман", "мгл"];
const CLOUDY_WORDS: &[&str] = &["cloud", "overcast", "облачн", "пасмурн"];
const CLEAR_WORDS: &[&str] = &["clear", "sunny", "fair", "ясн", "солнечн"];

/// Group free-text condition descriptions into categories so that
/// comparisons between forecast slots are meaningful.
pub fn categorize(description: &str) -> WeatherCategory {
    let desc = description.to_lowercase();

    let contains_any = |words: &[&str]| words.iter().any(|w| desc.contains(w));

    if contains_any(RAIN_WORDS) {
        WeatherCategory::Rain
    } else if contains_any(SNOW_WORDS) {
        WeatherCategory::Snow
    } else if contains_any(FOG_WORDS) {
        WeatherCategory::Fog
    } else if contains_any(CLOUDY_WORDS) {
        WeatherCategory::Cloudy
    } else if contains_any(CLEAR_WORDS) {
        WeatherCategory::Clear
    } else {
        WeatherCategory::Other(description.to_string())
    }
}
