/// Orchestrator module - ties the prober, status store and notifier together
///
/// The orchestrator:
/// - Probes the target on demand (timer tick or `/ping`)
/// - Records the outcome and detects transitions
/// - Announces transitions to the configured recipient
///
/// Probes are not serialized: a forced check and a timer tick can be in
/// flight at the same time, and whichever records last wins.

pub mod messages;


use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::monitoring::checker::Prober;
use crate::monitoring::status::StatusStore;
use crate::monitoring::types::{MonitorStatus, StatusSnapshot, Target, TransitionEvent};
use crate::notify::Notifier;

/// Main orchestrator for a single target
pub struct Monitor {
    prober: Prober,
    store: StatusStore,
    notifier: Arc<Notifier>,
}

impl Monitor {
    pub fn new(prober: Prober, notifier: Arc<Notifier>) -> Self {
        Self { prober, store: StatusStore::new(), notifier }
    }

    pub fn target(&self) -> &Target {
        self.prober.target()
    }

    /// Probe, record, and announce the result if the state changed. The
    /// announcement is sent on a detached task.
    pub async fn run_check(&self) -> TransitionEvent {
        let is_up = self.prober.probe().await;
        let now = Utc::now();

        let event = self.store.record_check(is_up, now).await;

        if !event.occurred {
            info!(monitored = %self.target(), "Ping {}: still {}", self.target(), MonitorStatus::from(is_up));
            return event;
        }

        let message = messages::transition_message(self.target(), &event, now);
        warn!(monitored = %self.target(), status = %event.status(), "Status change: {}", message);

        // The transition stays recorded whether or not this goes through
        let notifier = self.notifier.clone();
        let monitored = self.target().to_string();
        tokio::spawn(async move {
            if let Err(e) = notifier.notify_default(&message).await {
                error!(monitored = %monitored, error = %e, "Failed to send notification");
            }
        });

        event
    }

    pub async fn snapshot(&self) -> StatusSnapshot {
        self.store.snapshot().await
    }

    pub async fn status_report(&self) -> String {
        let snapshot = self.snapshot().await;
        messages::status_report(self.target(), &snapshot, Utc::now())
    }
}
