//! Chat command loop.
//!
//! Long-polls the inbound update source and answers `/status`, `/start` and
//! `/ping`. The offset cursor only moves forward: every update is
//! acknowledged before it is handled, so a crash mid-dispatch never replays
//! it, and anything below the cursor in a later response is skipped.

pub mod commands;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

pub use commands::Command;

use crate::error::Result;
use crate::notify::Notifier;
use crate::orchestrator::Monitor;
use crate::orchestrator::messages;

/// How long the source may hold a poll open waiting for updates
pub const LONG_POLL_TIMEOUT: Duration = Duration::from_secs(30);

/// Pause after a failed poll before trying again
pub const ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Pause between successful polls
pub const IDLE_PAUSE: Duration = Duration::from_secs(1);

pub const PING_ACK: &str = "Checking now...";

/// Text message carried by an update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender_id: String,
    pub text: String,
}

/// One entry from the update source. Updates that carry no message still
/// have to be acknowledged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundCommand {
    pub sequence_token: i64,
    pub message: Option<ChatMessage>,
}

/// Source of inbound chat updates
#[async_trait]
pub trait UpdateSource: Send + Sync {
    /// Fetch updates with `sequence_token >= offset`, in arrival order
    async fn poll(&self, offset: i64) -> Result<Vec<InboundCommand>>;
}

pub struct CommandLoop {
    source: Arc<dyn UpdateSource>,
    monitor: Arc<Monitor>,
    notifier: Arc<Notifier>,
    offset: i64,
    error_backoff: Duration,
    idle_pause: Duration,
}

impl CommandLoop {
    pub fn new(source: Arc<dyn UpdateSource>, monitor: Arc<Monitor>, notifier: Arc<Notifier>) -> Self {
        Self {
            source,
            monitor,
            notifier,
            offset: 0,
            error_backoff: ERROR_BACKOFF,
            idle_pause: IDLE_PAUSE,
        }
    }

    #[cfg(test)]
    pub fn with_pauses(mut self, error_backoff: Duration, idle_pause: Duration) -> Self {
        self.error_backoff = error_backoff;
        self.idle_pause = idle_pause;
        self
    }

    /// Next sequence token the loop will ask for
    #[cfg(test)]
    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// Poll and dispatch forever. Poll errors are logged and retried after
    /// the backoff.
    pub async fn run(mut self) {
        info!("Command loop started");

        loop {
            match self.poll_once().await {
                Ok(_) => tokio::time::sleep(self.idle_pause).await,
                Err(e) => {
                    warn!(error = %e, "Error getting updates");
                    tokio::time::sleep(self.error_backoff).await;
                }
            }
        }
    }

    /// One poll/dispatch cycle. Returns how many commands were dispatched.
    pub async fn poll_once(&mut self) -> Result<usize> {
        let updates = self.source.poll(self.offset).await?;

        let mut dispatched = 0;
        for update in updates {
            if update.sequence_token < self.offset {
                debug!(token = update.sequence_token, offset = self.offset, "Skipping already seen update");
                continue;
            }
            self.offset = update.sequence_token + 1;

            let Some(message) = update.message else {
                continue;
            };

            info!(chat_id = %message.sender_id, text = %message.text, "Received message");

            if let Some(command) = Command::parse(&message.text) {
                self.dispatch(command, message.sender_id).await;
                dispatched += 1;
            }
        }

        Ok(dispatched)
    }

    /// Replies go out on their own tasks; only the status snapshot is read
    /// inline.
    async fn dispatch(&self, command: Command, sender_id: String) {
        match command {
            Command::Status => {
                let report = self.monitor.status_report().await;
                self.notifier.reply_to(&sender_id, &report);
            }
            Command::Start => {
                self.notifier.reply_to(&sender_id, &messages::start_message(&sender_id));
            }
            Command::Ping => {
                self.notifier.reply_to(&sender_id, PING_ACK);

                let monitor = self.monitor.clone();
                let notifier = self.notifier.clone();
                tokio::spawn(async move {
                    monitor.run_check().await;
                    let report = monitor.status_report().await;
                    notifier.reply_to(&sender_id, &report);
                });
            }
        }
    }
}
