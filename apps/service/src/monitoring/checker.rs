use anyhow::{Result, anyhow};
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use super::types::Target;

/// Number of echo requests sent per host probe
pub const PING_COUNT: u32 = 3;

/// Seconds to wait for each echo reply
pub const PING_WAIT_SECONDS: u64 = 2;

/// Default timeout for HTTP probes
pub const HTTP_TIMEOUT_SECONDS: u64 = 10;

/// Type of reachability check to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckType {
    Http,
    Icmp,
}

/// Checker trait for the different probe strategies
#[async_trait::async_trait]
pub trait Checker: Send + Sync {
    /// Probe the target once, returning the HTTP status code when there is one.
    /// Any error means the target could not be reached.
    async fn check(&self, target: &str) -> Result<Option<u16>>;
}

/// HTTP/HTTPS checker
pub struct HttpChecker {
    client: reqwest::Client,
}

impl HttpChecker {
    pub fn new(timeout_seconds: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Checker for HttpChecker {
    async fn check(&self, target: &str) -> Result<Option<u16>> {
        let response = self
            .client
            .get(target)
            .send()
            .await
            .map_err(|e| anyhow!("HTTP request failed: {}", e))?;

        // Any status, 401 and 503 included, means something answered
        Ok(Some(response.status().as_u16()))
    }
}

/// ICMP checker backed by the system `ping` binary, which avoids needing raw
/// socket privileges in the monitor itself.
pub struct IcmpChecker {
    count: u32,
    wait_seconds: u64,
}

impl IcmpChecker {
    pub fn new(count: u32, wait_seconds: u64) -> Self {
        Self { count, wait_seconds }
    }

    fn command(&self, target: &str) -> Command {
        let mut cmd = Command::new("ping");

        if cfg!(windows) {
            cmd.arg("-n").arg(self.count.to_string());
            cmd.arg("-w").arg((self.wait_seconds * 1000).to_string());
        } else {
            cmd.arg("-c").arg(self.count.to_string());
            cmd.arg("-W").arg(self.wait_seconds.to_string());
        }

        cmd.arg(target)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        cmd
    }

    /// Upper bound for the whole `ping` invocation, in case DNS resolution
    /// inside it hangs.
    fn deadline(&self) -> Duration {
        Duration::from_secs(u64::from(self.count) * self.wait_seconds + 2)
    }
}

impl Default for IcmpChecker {
    fn default() -> Self {
        Self::new(PING_COUNT, PING_WAIT_SECONDS)
    }
}

#[async_trait::async_trait]
impl Checker for IcmpChecker {
    async fn check(&self, target: &str) -> Result<Option<u16>> {
        let status = timeout(self.deadline(), self.command(target).status())
            .await
            .map_err(|_| anyhow!("ping timed out"))?
            .map_err(|e| anyhow!("failed to run ping: {}", e))?;

        if status.success() {
            Ok(None)
        } else {
            Err(anyhow!("ping exited with {}", status))
        }
    }
}

/// Runs the checker matching the configured target and reduces the outcome
/// to reachable or not
#[derive(Clone)]
pub struct Prober {
    target: Target,
    checker: Arc<dyn Checker>,
}

impl Prober {
    /// Pick the strategy for `target`
    pub fn for_target(target: Target, http_timeout_seconds: u64) -> Result<Self> {
        let checker: Arc<dyn Checker> = match target.check_type() {
            CheckType::Http => Arc::new(HttpChecker::new(http_timeout_seconds)?),
            CheckType::Icmp => Arc::new(IcmpChecker::default()),
        };

        Ok(Self { target, checker })
    }

    pub fn with_checker(target: Target, checker: Arc<dyn Checker>) -> Self {
        Self { target, checker }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Probe once. Failing to determine reachability counts as unreachable.
    pub async fn probe(&self) -> bool {
        let start = Instant::now();

        match self.checker.check(self.target.as_str()).await {
            Ok(status_code) => {
                debug!(
                    monitored = %self.target,
                    status_code,
                    latency_ms = start.elapsed().as_millis() as u64,
                    "Probe succeeded"
                );
                true
            }
            Err(e) => {
                debug!(monitored = %self.target, error = %e, "Probe failed");
                false
            }
        }
    }
}
