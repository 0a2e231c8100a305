//! Message dispatch and presentation
//!
//! The [`Messenger`] trait is the outbound boundary: alerts and digest
//! messages go through it, failures are logged by callers and never
//! retried. Flavor text and report formatting live here too — they are
//! presentation only and never feed back into detection.

pub mod flavor;
pub mod report;
pub mod telegram;

pub use flavor::*;
pub use report::*;
pub use telegram::*;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("transport rejected message: {0}")]
    Rejected(String),
}

pub type NotifyResult<T> = Result<T, NotifyError>;

/// Outbound message transport
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send(&self, user_id: &str, text: &str) -> NotifyResult<()>;
}

/// In-memory messenger that records everything it is asked to send.
#[derive(Default)]
pub struct MemoryMessenger {
    sent: Mutex<Vec<(String, String)>>,
}

impl MemoryMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Messenger for MemoryMessenger {
    async fn send(&self, user_id: &str, text: &str) -> NotifyResult<()> {
        self.sent
            .lock()
            .await
            .push((user_id.to_string(), text.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_messenger_records_sends() {
        let messenger = MemoryMessenger::new();
        messenger.send("42", "hello").await.unwrap();
        messenger.send("7", "there").await.unwrap();

        let sent = messenger.sent().await;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0], ("42".to_string(), "hello".to_string()));
    }
}
