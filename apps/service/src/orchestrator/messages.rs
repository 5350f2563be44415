//! Human-readable texts sent to the operator.

use chrono::{DateTime, Duration, Utc};

use crate::monitoring::types::{StatusSnapshot, Target, TransitionEvent};

/// Text announcing a transition. Only meaningful for events that occurred.
pub fn transition_message(target: &Target, event: &TransitionEvent, now: DateTime<Utc>) -> String {
    let glyph = event.status().glyph();

    match (event.is_first_observation, event.new_state) {
        (true, true) => format!("{glyph} Network monitor started. {target} is UP."),
        (true, false) => format!("{glyph} Network monitor started. {target} is DOWN!"),
        (false, true) => {
            let downtime = event.previous_change.map(|since| now - since).unwrap_or_else(Duration::zero);
            format!("{glyph} {target} is back UP! (was down for {})", format_duration(downtime))
        }
        (false, false) => format!("{glyph} {target} is DOWN!"),
    }
}

pub fn status_report(target: &Target, snapshot: &StatusSnapshot, now: DateTime<Utc>) -> String {
    let status = snapshot.status();

    format!(
        "Target: {}\nStatus: {} {}\nSince: {}\nLast check: {}",
        target,
        status,
        status.glyph(),
        ago(snapshot.last_change, now),
        ago(snapshot.last_check, now),
    )
}

pub fn start_message(sender_id: &str) -> String {
    format!(
        "Network Monitor Bot\n\nYour chat ID: {sender_id}\n\nCommands:\n\
         /status - Check current status\n\
         /ping - Run a check right now"
    )
}

fn ago(at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    match at {
        Some(at) => format!("{} ago", format_duration(now - at)),
        None => "never".to_string(),
    }
}

/// Render as `1h2m3s`, rounded to the nearest second. Negative spans
/// (clock skew) render as `0s`.
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.num_milliseconds().max(0);
    let total = (millis + 500) / 1000;

    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}s")
    } else {
        format!("{seconds}s")
    }
}
