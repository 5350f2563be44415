//! Telegram Bot API client.
//!
//! Covers the two calls the monitor needs: `sendMessage` for notifications
//! and replies, and long-polling `getUpdates` for inbound commands.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::bot::{ChatMessage, InboundCommand, UpdateSource};
use crate::error::{Error, Result};
use crate::notify::MessageSink;

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Telegram `sendMessage` text limit (UTF-8 characters).
const TELEGRAM_MESSAGE_LIMIT: usize = 4096;

/// Slack on top of the long-poll window before the HTTP client gives up.
const REQUEST_GRACE: Duration = Duration::from_secs(10);

/// `sendMessage` never waits on the long-poll window.
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub text: Option<String>,
    pub chat: Chat,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

impl From<Update> for InboundCommand {
    fn from(update: Update) -> Self {
        let message = update.message.map(|message| ChatMessage {
            sender_id: message.chat.id.to_string(),
            text: message.text.unwrap_or_default(),
        });

        InboundCommand { sequence_token: update.update_id, message }
    }
}

pub struct TelegramClient {
    client: Client,
    api_base: String,
    bot_token: String,
    poll_timeout: Duration,
    send_timeout: Duration,
}

impl TelegramClient {
    pub fn new(api_base: &str, bot_token: &str, poll_timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(poll_timeout + REQUEST_GRACE).build()?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            bot_token: bot_token.to_string(),
            poll_timeout,
            send_timeout: SEND_TIMEOUT,
        })
    }

    #[cfg(test)]
    fn with_send_timeout(mut self, send_timeout: Duration) -> Self {
        self.send_timeout = send_timeout;
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.bot_token, method)
    }

    pub async fn send_message(&self, chat_id: &str, text: &str) -> Result<()> {
        let payload = json!({
            "chat_id": chat_id,
            "text": truncate_message(text, TELEGRAM_MESSAGE_LIMIT),
        });

        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .timeout(self.send_timeout)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Status { status: status.as_u16(), body });
        }

        debug!(chat_id, "Telegram message sent");
        Ok(())
    }

    /// Fetch updates with `update_id >= offset`, holding the request open for
    /// up to the poll timeout when there are none.
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>> {
        let timeout = self.poll_timeout.as_secs().to_string();
        let offset = offset.to_string();

        let response = self
            .client
            .get(self.method_url("getUpdates"))
            .query(&[("offset", offset.as_str()), ("timeout", timeout.as_str())])
            .send()
            .await?;

        let body: ApiResponse<Vec<Update>> = response.json().await?;
        if !body.ok {
            return Err(Error::Rejected(
                body.description.unwrap_or_else(|| "getUpdates returned ok=false".to_string()),
            ));
        }

        Ok(body.result.unwrap_or_default())
    }
}

#[async_trait]
impl MessageSink for TelegramClient {
    async fn send(&self, recipient: &str, text: &str) -> Result<()> {
        self.send_message(recipient, text).await
    }
}

#[async_trait]
impl UpdateSource for TelegramClient {
    async fn poll(&self, offset: i64) -> Result<Vec<InboundCommand>> {
        let updates = self.get_updates(offset).await?;
        Ok(updates.into_iter().map(InboundCommand::from).collect())
    }
}

/// Truncate a message to fit within the Telegram character limit.
fn truncate_message(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let suffix = "\n\n[truncated]";
    let budget = limit - suffix.len();
    let truncated: String = text.chars().take(budget).collect();
    format!("{truncated}{suffix}")
}
