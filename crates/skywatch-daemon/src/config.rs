//! Daemon configuration from environment variables

use anyhow::{bail, Context, Result};
use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionMode {
    Periods,
    Hourly,
}

#[derive(Clone)]
pub struct DaemonConfig {
    /// AccuWeather API key (required)
    pub api_key: String,

    /// Telegram bot token for alert dispatch (required)
    pub bot_token: String,

    /// Seconds between monitoring cycles (default: 7200 = 2 hours)
    pub poll_interval: u64,

    /// HTTP frontend bind address (default: 0.0.0.0:8080)
    pub http_bind: String,

    /// Subscription file path (default: subscriptions.json)
    pub subscriptions_file: String,

    /// Change-detection strategy (default: periods)
    pub detection_mode: DetectionMode,

    /// Local hour of the morning digest (default: 8)
    pub digest_hour: u32,
}

impl DaemonConfig {
    /// Load configuration from environment variables. Missing required
    /// keys are the only fatal startup errors.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("ACCUWEATHER_API_KEY")
            .context("ACCUWEATHER_API_KEY environment variable not set")?;

        let bot_token =
            env::var("BOT_TOKEN").context("BOT_TOKEN environment variable not set")?;

        let poll_interval = env::var("POLL_INTERVAL")
            .unwrap_or_else(|_| "7200".to_string())
            .parse()
            .context("Invalid POLL_INTERVAL")?;

        let http_bind = env::var("HTTP_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let subscriptions_file =
            env::var("SUBSCRIPTIONS_FILE").unwrap_or_else(|_| "subscriptions.json".to_string());

        let detection_mode = match env::var("DETECTION_MODE")
            .unwrap_or_else(|_| "periods".to_string())
            .to_lowercase()
            .as_str()
        {
            "periods" => DetectionMode::Periods,
            "hourly" => DetectionMode::Hourly,
            other => bail!("Invalid DETECTION_MODE: {other} (expected periods or hourly)"),
        };

        let digest_hour: u32 = env::var("DIGEST_HOUR")
            .unwrap_or_else(|_| "8".to_string())
            .parse()
            .context("Invalid DIGEST_HOUR")?;
        if digest_hour > 23 {
            bail!("Invalid DIGEST_HOUR: {digest_hour} (expected 0-23)");
        }

        Ok(Self {
            api_key,
            bot_token,
            poll_interval,
            http_bind,
            subscriptions_file,
            detection_mode,
            digest_hour,
        })
    }
}

// Keep credentials out of startup logs.
impl std::fmt::Debug for DaemonConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DaemonConfig")
            .field("poll_interval", &self.poll_interval)
            .field("http_bind", &self.http_bind)
            .field("subscriptions_file", &self.subscriptions_file)
            .field("detection_mode", &self.detection_mode)
            .field("digest_hour", &self.digest_hour)
            .finish_non_exhaustive()
    }
}
