//! In-memory stand-ins for the network-facing traits.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;

use crate::bot::{ChatMessage, InboundCommand, UpdateSource};
use crate::error::{Error, Result};
use crate::monitoring::checker::Checker;
use crate::notify::MessageSink;

#[derive(Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<(String, String)>>,
    attempts: AtomicUsize,
    fail: bool,
    delay: Duration,
}

impl RecordingSink {
    pub fn failing() -> Self {
        Self { fail: true, ..Default::default() }
    }

    /// Takes `delay` to deliver each message
    pub fn slow(delay: Duration) -> Self {
        Self { delay, ..Default::default() }
    }

    pub fn messages(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.messages().into_iter().map(|(_, text)| text).collect()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Wait until at least `count` messages went out, or panic after a few seconds
    pub async fn wait_for(&self, count: usize) -> Vec<(String, String)> {
        self.wait_until(|| self.messages().len() >= count).await;
        self.messages()
    }

    /// Wait until at least `count` sends were attempted, delivered or not
    pub async fn wait_for_attempts(&self, count: usize) {
        self.wait_until(|| self.attempts() >= count).await;
    }

    async fn wait_until(&self, done: impl Fn() -> bool) {
        let wait = async {
            while !done() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        };
        if tokio::time::timeout(Duration::from_secs(5), wait).await.is_err() {
            panic!("timed out after {} attempts, delivered {:?}", self.attempts(), self.messages());
        }
    }
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn send(&self, recipient: &str, text: &str) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail {
            return Err(Error::Status { status: 502, body: "Bad Gateway".to_string() });
        }
        self.sent.lock().unwrap().push((recipient.to_string(), text.to_string()));
        Ok(())
    }
}

/// Replays a fixed sequence of probe outcomes, then repeats the last one
pub struct ScriptedChecker {
    outcomes: Mutex<VecDeque<bool>>,
    last: Mutex<bool>,
    calls: AtomicUsize,
}

impl ScriptedChecker {
    pub fn new(outcomes: impl IntoIterator<Item = bool>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
            last: Mutex::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn always(is_up: bool) -> Self {
        Self::new([is_up])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Checker for ScriptedChecker {
    async fn check(&self, _target: &str) -> anyhow::Result<Option<u16>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut last = self.last.lock().unwrap();
        if let Some(next) = self.outcomes.lock().unwrap().pop_front() {
            *last = next;
        }

        if *last { Ok(None) } else { Err(anyhow!("unreachable")) }
    }
}

/// Hands out queued poll responses and remembers the offsets it was asked for
#[derive(Default)]
pub struct ScriptedSource {
    responses: Mutex<VecDeque<Result<Vec<InboundCommand>>>>,
    offsets: Mutex<Vec<i64>>,
}

impl ScriptedSource {
    pub fn push(&self, commands: Vec<InboundCommand>) {
        self.responses.lock().unwrap().push_back(Ok(commands));
    }

    pub fn push_error(&self) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(Error::Rejected("Too Many Requests".to_string())));
    }

    pub fn offsets(&self) -> Vec<i64> {
        self.offsets.lock().unwrap().clone()
    }
}

#[async_trait]
impl UpdateSource for ScriptedSource {
    async fn poll(&self, offset: i64) -> Result<Vec<InboundCommand>> {
        self.offsets.lock().unwrap().push(offset);
        self.responses.lock().unwrap().pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }
}

pub fn command(sequence_token: i64, sender_id: &str, text: &str) -> InboundCommand {
    InboundCommand {
        sequence_token,
        message: Some(ChatMessage { sender_id: sender_id.to_string(), text: text.to_string() }),
    }
}
