//! Randomized flavor text appended to weather reports
//!
//! A stylistic phrase in the voice of an impatient ship's navigator,
//! picked from enumerated tables keyed by weather category, wind band
//! and temperature band. Pure presentation: alert detection never
//! consults this module.

use rand::seq::SliceRandom;
use rand::Rng;

use skywatch_core::{categorize, WeatherCategory};

const CLEAR_LINES: &[&str] = &[
    "The sky is wide open — perfect conditions for getting underway. Don't waste them!",
    "Not a cloud worth charting. Use this weather while it lasts!",
    "My navigator's instincts say this is a day for new maps. Care to lend a hand?",
];

const CLOUDY_LINES: &[&str] = &[
    "Hmm, those clouds bear watching. Keep an eye on the pressure with me.",
    "That cloud bank isn't dangerous yet, but be ready to move when I say so!",
    "Note those cumulus towers — they promise a change within a few hours. Wrote that down? Good.",
];

const RAIN_LINES: &[&str] = &[
    "I can feel this rain's temper! Check your windows — I'm not rescuing you if you get soaked!",
    "Quit splashing in puddles and see to your things before they're drenched!",
    "A squall like this is nothing if you follow my instructions. So follow them!",
];

const SNOW_LINES: &[&str] = &[
    "Brr! Bundle up before I start getting angry about it!",
    "Snowfall like this hides the footing. Watch your step out there!",
    "Stop admiring the snowflakes — keep warm and mind the wind direction!",
];

const FOG_LINES: &[&str] = &[
    "This fog is trouble! Stay alert or you'll wander straight into a ditch.",
    "Strange fog. Don't stray far — you'll get lost faster than you think.",
    "Even my navigation is useless in soup like this. Stay home if you can!",
];

const UNKNOWN_LINES: &[&str] = &[
    "Odd weather. Even my instincts are puzzled — what do you make of it?",
    "I've never seen conditions quite like this! Stay sharp.",
    "This weather isn't playing by the usual rules. Keep your wits about you!",
];

const WIND_CALM: &[&str] = &[
    "Barely a breath of wind — you'll have to make your own headway.",
    "This breeze wouldn't lift a hat off your head.",
];

const WIND_MODERATE: &[&str] = &[
    "A good steady wind — exactly what we need!",
    "A fair tailwind like this gets you there twice as fast. Use it well!",
];

const WIND_STRONG: &[&str] = &[
    "This wind could take the hat right off your head — hold on to it!",
    "A strong blow today. Keep a grip on anything that flaps!",
];

const WIND_GALE: &[&str] = &[
    "THE WIND IS WILD TODAY! FIND SOMETHING SOLID AND HOLD ON!",
    "That's a proper gale! Shelter first, heroics later!",
];

const TEMP_FREEZING: &[&str] = &[
    "It's properly freezing. Where's your coat? I'm not nursing you through a cold!",
    "Cold as a winter island out there — wear something warm, no arguments!",
];

const TEMP_COOL: &[&str] = &[
    "A bit brisk. Perfect for keeping busy — moving will warm you up!",
    "Pleasantly cool. Good weather for getting work done, wouldn't you say?",
];

const TEMP_WARM: &[&str] = &[
    "Lovely and warm. Enjoy it while you can!",
    "Fine weather for being outside — just don't forget what you're supposed to be doing.",
];

const TEMP_HOT: &[&str] = &[
    "This heat is no joke — find yourself a cold drink, and bring me one too!",
    "Hot as a desert crossing! Stop running around, you're making it worse!",
];

const TEMP_SCORCHING: &[&str] = &[
    "UNBEARABLE! THIS HEAT COULD MELT A COMPASS! GET INTO THE SHADE NOW!",
    "Scorching! Nobody should be out in this — and that includes you!",
];

const GREETINGS: &[&str] = &[
    "Hey, you! ",
    "Listen up! ",
    "Attention! ",
    "Eyes open! ",
    "",
    "Yes, you! ",
];

const CONCLUSIONS: &[&str] = &[
    " And don't forget this forecast wasn't free — information costs money!",
    " Take care, and remember my advice!",
    " Remember that, unless you want trouble!",
    " Don't say I didn't warn you!",
    "",
    " I know what I'm talking about — I'm the best navigator there is!",
    " Now off you go, there's work to do!",
];

fn weather_lines(description: &str) -> &'static [&'static str] {
    match categorize(description) {
        WeatherCategory::Clear => CLEAR_LINES,
        WeatherCategory::Cloudy => CLOUDY_LINES,
        WeatherCategory::Rain => RAIN_LINES,
        WeatherCategory::Snow => SNOW_LINES,
        WeatherCategory::Fog => FOG_LINES,
        WeatherCategory::Other(_) => UNKNOWN_LINES,
    }
}

fn wind_lines(wind_speed: f64) -> &'static [&'static str] {
    if wind_speed < 2.0 {
        WIND_CALM
    } else if wind_speed < 8.0 {
        WIND_MODERATE
    } else if wind_speed < 15.0 {
        WIND_STRONG
    } else {
        WIND_GALE
    }
}

fn temp_lines(temperature: f64) -> &'static [&'static str] {
    if temperature < 0.0 {
        TEMP_FREEZING
    } else if temperature < 15.0 {
        TEMP_COOL
    } else if temperature < 25.0 {
        TEMP_WARM
    } else if temperature < 32.0 {
        TEMP_HOT
    } else {
        TEMP_SCORCHING
    }
}

/// Compose a flavor line for the given conditions.
pub fn generate(description: &str, wind_speed: f64, temperature: f64) -> String {
    let mut rng = rand::thread_rng();

    let pick = |table: &'static [&'static str], rng: &mut rand::rngs::ThreadRng| -> &'static str {
        table.choose(rng).copied().unwrap_or("")
    };

    let greeting = pick(GREETINGS, &mut rng);
    let weather = pick(weather_lines(description), &mut rng);
    let wind = pick(wind_lines(wind_speed), &mut rng);
    let temp = pick(temp_lines(temperature), &mut rng);

    let mut text = format!("{greeting}{weather} {wind} {temp}");
    if rng.gen_bool(0.7) {
        text.push_str(pick(CONCLUSIONS, &mut rng));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_never_empty() {
        for _ in 0..50 {
            assert!(!generate("clear sky", 5.0, 20.0).is_empty());
        }
    }

    #[test]
    fn test_band_selection() {
        assert_eq!(wind_lines(0.5), WIND_CALM);
        assert_eq!(wind_lines(7.9), WIND_MODERATE);
        assert_eq!(wind_lines(14.9), WIND_STRONG);
        assert_eq!(wind_lines(15.0), WIND_GALE);

        assert_eq!(temp_lines(-5.0), TEMP_FREEZING);
        assert_eq!(temp_lines(14.9), TEMP_COOL);
        assert_eq!(temp_lines(24.9), TEMP_WARM);
        assert_eq!(temp_lines(31.9), TEMP_HOT);
        assert_eq!(temp_lines(32.0), TEMP_SCORCHING);
    }

    #[test]
    fn test_weather_table_follows_category() {
        assert_eq!(weather_lines("light rain showers"), RAIN_LINES);
        assert_eq!(weather_lines("scattered clouds"), CLOUDY_LINES);
        assert_eq!(weather_lines("blowing dust"), UNKNOWN_LINES);
    }

    #[test]
    fn test_generate_uses_matching_tables() {
        let text = generate("thick fog", 20.0, 40.0);
        assert!(FOG_LINES.iter().any(|l| text.contains(l)));
        assert!(WIND_GALE.iter().any(|l| text.contains(l)));
        assert!(TEMP_SCORCHING.iter().any(|l| text.contains(l)));
    }
}
