use std::sync::Arc;
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};

use crate::orchestrator::Monitor;

/// Default seconds between periodic checks
pub const DEFAULT_INTERVAL_SECONDS: u64 = 300;

/// Monitoring scheduler - runs the periodic check for the monitor
pub struct MonitoringScheduler {
    monitor: Arc<Monitor>,
    interval: Duration,
}

impl MonitoringScheduler {
    /// Create a new monitoring scheduler
    pub fn new(monitor: Arc<Monitor>, interval: Duration) -> Self {
        Self { monitor, interval }
    }

    /// Spawn the timer task. The first check runs immediately, then one per
    /// interval until the process exits.
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut timer = interval(self.interval);
            // A slow probe should push the schedule back, not trigger a burst
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                timer.tick().await;
                self.monitor.run_check().await;
            }
        })
    }
}
