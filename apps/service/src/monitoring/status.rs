//! The monitor's only piece of shared mutable state.
//!
//! Callers never see the fields directly: they either record a check, which
//! is an atomic read-modify-write under the write lock, or take a copy under
//! the read lock.

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::types::{StatusSnapshot, TransitionEvent};

#[derive(Debug, Default)]
pub struct StatusStore {
    state: RwLock<StatusSnapshot>,
}

impl StatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of a check taken at `now`.
    ///
    /// The event fires when `is_up` differs from the recorded state, and
    /// unconditionally for the very first check.
    pub async fn record_check(&self, is_up: bool, now: DateTime<Utc>) -> TransitionEvent {
        let mut state = self.state.write().await;

        let previous_change = state.last_change;
        let is_first_observation = previous_change.is_none();
        let changed = is_up != state.is_up || is_first_observation;

        if changed {
            state.is_up = is_up;
            state.last_change = Some(now);
        }

        // Two checks can race to this point with their timestamps out of
        // order; last_check never moves backwards.
        state.last_check = match state.last_check {
            Some(previous) if previous > now => Some(previous),
            _ => Some(now),
        };

        TransitionEvent {
            occurred: changed,
            new_state: state.is_up,
            is_first_observation,
            previous_change,
        }
    }

    pub async fn snapshot(&self) -> StatusSnapshot {
        *self.state.read().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::seconds(seconds)
    }

    #[tokio::test]
    async fn test_first_check_is_always_a_transition() {
        for is_up in [true, false] {
            let store = StatusStore::new();
            let event = store.record_check(is_up, at(0)).await;

            assert!(event.occurred);
            assert!(event.is_first_observation);
            assert_eq!(event.new_state, is_up);
            assert!(event.previous_change.is_none());
        }
    }

    #[tokio::test]
    async fn test_repeated_value_fires_once() {
        let store = StatusStore::new();

        let first = store.record_check(true, at(0)).await;
        let second = store.record_check(true, at(1)).await;

        assert!(first.occurred);
        assert!(!second.occurred);
        assert!(!second.is_first_observation);
    }

    #[tokio::test]
    async fn test_fires_only_on_edges() {
        let store = StatusStore::new();
        let readings = [true, true, false, false, true, false, false, false, true, true];

        let mut previous: Option<bool> = None;
        for (i, &is_up) in readings.iter().enumerate() {
            let event = store.record_check(is_up, at(i as i64)).await;
            let expected = previous.map_or(true, |p| p != is_up);
            assert_eq!(event.occurred, expected, "check #{i} ({is_up})");
            previous = Some(is_up);
        }
    }

    #[tokio::test]
    async fn test_timestamps() {
        let store = StatusStore::new();

        store.record_check(true, at(0)).await;
        store.record_check(true, at(10)).await;
        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.last_change, Some(at(0)));
        assert_eq!(snapshot.last_check, Some(at(10)));

        let event = store.record_check(false, at(20)).await;
        assert_eq!(event.previous_change, Some(at(0)));
        let snapshot = store.snapshot().await;
        assert!(!snapshot.is_up);
        assert_eq!(snapshot.last_change, Some(at(20)));
        assert_eq!(snapshot.last_check, Some(at(20)));
    }

    #[tokio::test]
    async fn test_last_check_never_precedes_last_change() {
        let store = StatusStore::new();
        let mut last_check = None;

        for (i, is_up) in [true, false, false, true, true, false].into_iter().enumerate() {
            store.record_check(is_up, at(i as i64 * 5)).await;
            let snapshot = store.snapshot().await;

            assert!(snapshot.last_change <= snapshot.last_check);
            assert!(snapshot.last_check >= last_check);
            last_check = snapshot.last_check;
        }
    }

    #[tokio::test]
    async fn test_out_of_order_commit_keeps_latest_check_time() {
        let store = StatusStore::new();

        store.record_check(true, at(30)).await;
        // A slower probe that started earlier commits last
        store.record_check(true, at(20)).await;

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.last_check, Some(at(30)));
        assert!(snapshot.last_change <= snapshot.last_check);
    }

    #[tokio::test]
    async fn test_concurrent_records_and_snapshots() {
        let store = std::sync::Arc::new(StatusStore::new());
        let mut handles = Vec::new();

        for i in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.record_check(i % 2 == 0, at(i)).await;
                store.snapshot().await
            }));
        }

        for handle in handles {
            let snapshot = handle.await.unwrap();
            assert!(snapshot.last_change.is_some());
            assert!(snapshot.last_change <= snapshot.last_check);
        }
    }
}
