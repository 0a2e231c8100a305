//! Telegram Bot API transport

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::{Messenger, NotifyError, NotifyResult};

const DEFAULT_BASE_URL: &str = "https://api.telegram.org";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Dispatches messages via the Telegram Bot API `sendMessage` call.
/// The subscription user id doubles as the chat id.
pub struct TelegramMessenger {
    client: Client,
    base_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    description: Option<String>,
}

impl TelegramMessenger {
    pub fn new(token: impl Into<String>) -> NotifyResult<Self> {
        Self::with_base_url(token, DEFAULT_BASE_URL)
    }

    /// Point the transport at a different endpoint (tests).
    pub fn with_base_url(
        token: impl Into<String>,
        base_url: impl AsRef<str>,
    ) -> NotifyResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.as_ref().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }
}

#[async_trait::async_trait]
impl Messenger for TelegramMessenger {
    async fn send(&self, user_id: &str, text: &str) -> NotifyResult<()> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.token);
        let response = self
            .client
            .post(&url)
            .json(&json!({ "chat_id": user_id, "text": text }))
            .send()
            .await?
            .error_for_status()?;

        let body: ApiResponse = response.json().await?;
        if !body.ok {
            return Err(NotifyError::Rejected(
                body.description
                    .unwrap_or_else(|| "no description".to_string()),
            ));
        }
        Ok(())
    }
}
