//! Outbound notifications.
//!
//! Transitions go to the configured recipient and surface errors to the
//! caller, which logs them. Command replies are best effort and run on their
//! own task, so a slow send never holds up the command loop.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::error::Result;

/// Something that can deliver a text message to a recipient
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn send(&self, recipient: &str, text: &str) -> Result<()>;
}

pub struct Notifier {
    sink: Arc<dyn MessageSink>,
    default_recipient: String,
}

impl Notifier {
    pub fn new(sink: Arc<dyn MessageSink>, default_recipient: String) -> Self {
        Self { sink, default_recipient }
    }

    /// Send to the configured recipient
    pub async fn notify_default(&self, message: &str) -> Result<()> {
        self.sink.send(&self.default_recipient, message).await
    }

    /// Reply to whoever sent a command on a detached task. Failures are
    /// logged and dropped.
    pub fn reply_to(&self, recipient: &str, message: &str) -> JoinHandle<()> {
        let sink = self.sink.clone();
        let recipient = recipient.to_string();
        let message = message.to_string();

        tokio::spawn(async move {
            if let Err(e) = sink.send(&recipient, &message).await {
                warn!(recipient, error = %e, "Failed to reply");
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingSink;
    use std::time::{Duration, Instant};

    #[tokio::test]
    async fn test_notify_default_uses_configured_recipient() {
        let sink = Arc::new(RecordingSink::default());
        let notifier = Notifier::new(sink.clone(), "1001".to_string());

        notifier.notify_default("target is DOWN").await.unwrap();

        assert_eq!(sink.messages(), vec![("1001".to_string(), "target is DOWN".to_string())]);
    }

    #[tokio::test]
    async fn test_notify_default_surfaces_errors() {
        let sink = Arc::new(RecordingSink::failing());
        let notifier = Notifier::new(sink.clone(), "1001".to_string());

        assert!(notifier.notify_default("target is DOWN").await.is_err());
    }

    #[tokio::test]
    async fn test_reply_to_swallows_errors() {
        let sink = Arc::new(RecordingSink::failing());
        let notifier = Notifier::new(sink.clone(), "1001".to_string());

        notifier.reply_to("42", "pong").await.unwrap();

        assert_eq!(sink.attempts(), 1);
        assert!(sink.messages().is_empty());
    }

    #[tokio::test]
    async fn test_reply_to_does_not_wait_for_send() {
        let sink = Arc::new(RecordingSink::slow(Duration::from_secs(2)));
        let notifier = Notifier::new(sink.clone(), "1001".to_string());

        let started = Instant::now();
        let handle = notifier.reply_to("42", "pong");
        assert!(started.elapsed() < Duration::from_millis(500));

        handle.await.unwrap();
        assert_eq!(sink.messages(), vec![("42".to_string(), "pong".to_string())]);
    }
}
