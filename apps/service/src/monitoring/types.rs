use chrono::{DateTime, Utc};

use super::checker::CheckType;

/// What gets probed, classified once when the configuration is loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Bare host name or IP address, probed with ICMP echo
    Host(String),
    /// `http://` or `https://` URL, probed with a GET request
    Url(String),
}

impl Target {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Target::Url(raw.to_string())
        } else {
            Target::Host(raw.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Target::Host(host) => host,
            Target::Url(url) => url,
        }
    }

    pub fn check_type(&self) -> CheckType {
        match self {
            Target::Host(_) => CheckType::Icmp,
            Target::Url(_) => CheckType::Http,
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reachability of the target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorStatus {
    Up,
    Down,
}

impl MonitorStatus {
    pub fn glyph(self) -> &'static str {
        match self {
            MonitorStatus::Up => "🟢",
            MonitorStatus::Down => "🔴",
        }
    }
}

impl From<bool> for MonitorStatus {
    fn from(is_up: bool) -> Self {
        if is_up { MonitorStatus::Up } else { MonitorStatus::Down }
    }
}

impl std::fmt::Display for MonitorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MonitorStatus::Up => write!(f, "UP"),
            MonitorStatus::Down => write!(f, "DOWN"),
        }
    }
}

/// Copy of the monitor's current belief about the target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub is_up: bool,

    /// When `is_up` last flipped. `None` until the first check completes.
    pub last_change: Option<DateTime<Utc>>,

    /// When the most recent check was recorded
    pub last_check: Option<DateTime<Utc>>,
}

impl StatusSnapshot {
    pub fn status(&self) -> MonitorStatus {
        MonitorStatus::from(self.is_up)
    }
}

/// Outcome of recording one check against the previous state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionEvent {
    /// The recorded state differs from the previous one, or this was the first check
    pub occurred: bool,

    pub new_state: bool,

    pub is_first_observation: bool,

    /// `last_change` as it was before this check was recorded
    pub previous_change: Option<DateTime<Utc>>,
}

impl TransitionEvent {
    pub fn status(&self) -> MonitorStatus {
        MonitorStatus::from(self.new_state)
    }
}
